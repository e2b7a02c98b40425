//! Tiny verb-object parser for the demo client.
use adventure_runtime::Command;

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    Command(Command),
    Unknown(String),
}

const DIRECTIONS: &[&str] = &["north", "south", "east", "west", "up", "down"];

fn direction(word: &str) -> Option<&'static str> {
    let expanded = match word {
        "n" => "north",
        "s" => "south",
        "e" => "east",
        "w" => "west",
        "u" => "up",
        "d" => "down",
        other => other,
    };
    DIRECTIONS.iter().copied().find(|known| *known == expanded)
}

pub fn parse(line: &str) -> Input {
    let lowered = line.trim().to_ascii_lowercase();
    let words: Vec<&str> = lowered
        .split_whitespace()
        .filter(|word| !matches!(*word, "the" | "a" | "an"))
        .collect();

    if let ["go", word] | [word] = words.as_slice() {
        if let Some(dir) = direction(word) {
            return Input::Command(Command::Go(dir.to_owned()));
        }
    }

    let command = match words.as_slice() {
        [] => return Input::Empty,
        ["quit" | "q"] => return Input::Quit,
        ["look" | "l"] => Command::Look,
        ["wait" | "z"] => Command::Wait,
        ["take" | "get", item] => Command::Take((*item).into()),
        ["drop", item] => Command::Drop((*item).into()),
        ["light", item] | ["turn", "on", item] => Command::Light((*item).into()),
        ["douse" | "extinguish", item] | ["turn", "off", item] => Command::Douse((*item).into()),
        ["examine" | "x", monster] => Command::Examine((*monster).into()),
        ["attack" | "kill" | "hit", monster] => Command::Attack {
            monster: (*monster).into(),
            weapon: None,
        },
        ["attack" | "kill" | "hit", monster, "with", weapon] => Command::Attack {
            monster: (*monster).into(),
            weapon: Some((*weapon).into()),
        },
        ["throw", item, "at", monster] => Command::Throw {
            monster: (*monster).into(),
            item: (*item).into(),
        },
        ["give", item, "to", monster] => Command::Give {
            monster: (*monster).into(),
            item: (*item).into(),
        },
        ["talk", "to", monster] => Command::Talk {
            monster: (*monster).into(),
            topic: None,
        },
        ["say", topic, "to", monster] | ["ask", monster, "about", topic] => Command::Talk {
            monster: (*monster).into(),
            topic: Some((*topic).to_owned()),
        },
        _ => return Input::Unknown(line.trim().to_owned()),
    };
    Input::Command(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_accepts_abbreviations() {
        assert_eq!(parse("n"), Input::Command(Command::Go("north".into())));
        assert_eq!(parse("go down"), Input::Command(Command::Go("down".into())));
        assert!(matches!(parse("go sideways"), Input::Unknown(_)));
    }

    #[test]
    fn articles_are_ignored() {
        assert_eq!(
            parse("kill the troll with the sword"),
            Input::Command(Command::Attack {
                monster: "troll".into(),
                weapon: Some("sword".into()),
            })
        );
    }

    #[test]
    fn dialogue_forms() {
        assert_eq!(
            parse("say odysseus to cyclops"),
            Input::Command(Command::Talk {
                monster: "cyclops".into(),
                topic: Some("odysseus".into()),
            })
        );
        assert_eq!(parse("  "), Input::Empty);
        assert_eq!(parse("quit"), Input::Quit);
    }
}
