use crate::state::MessageCategory;

/// Generic message used when a monster's table lacks a category.
pub fn default_message(category: MessageCategory) -> &'static str {
    match category {
        MessageCategory::Miss => "The blow misses the {monster}.",
        MessageCategory::Unconscious => "The {monster} is knocked senseless.",
        MessageCategory::Kill => "The {monster} falls to the ground, dead.",
        MessageCategory::LightWound => "The {monster} is lightly wounded.",
        MessageCategory::SevereWound => "The {monster} is seriously wounded.",
        MessageCategory::Stagger => "The {monster} staggers back.",
        MessageCategory::LoseWeapon => "The {monster} loses its grip on its weapon.",
        MessageCategory::Hesitate => "The {monster} hesitates.",
        MessageCategory::SittingDuck => "The {monster} is a sitting duck.",
    }
}

/// Fills the `{monster}` and `{weapon}` placeholders.
pub(super) fn render(template: &str, monster: &str, weapon: Option<&str>) -> String {
    template
        .replace("{monster}", monster)
        .replace("{weapon}", weapon.unwrap_or("bare hands"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_category_has_a_default() {
        for category in MessageCategory::iter() {
            assert!(default_message(category).contains("{monster}"));
        }
    }

    #[test]
    fn placeholders_are_filled() {
        assert_eq!(
            render("The {monster} parries your {weapon}.", "troll", Some("sword")),
            "The troll parries your sword."
        );
        assert_eq!(render("{weapon}", "troll", None), "bare hands");
    }
}
