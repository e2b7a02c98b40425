use super::ExprError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Token {
    Ident(String),
    Int(i64),
    Text(String),
    True,
    False,
    Dot,
    LParen,
    RParen,
    Not,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    AddAssign,
    SubAssign,
    Semicolon,
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let symbol = match self {
            Self::Ident(name) => return f.write_str(name),
            Self::Int(value) => return write!(f, "{value}"),
            Self::Text(text) => return write!(f, "'{text}'"),
            Self::True => "true",
            Self::False => "false",
            Self::Dot => ".",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Not => "!",
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::Semicolon => ";",
        };
        f.write_str(symbol)
    }
}

pub(super) fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let peek = |i: usize| chars.get(i).map(|(_, ch)| *ch);

    while let Some(&(offset, ch)) = chars.get(i) {
        let next = peek(i + 1);
        let (token, width) = match (ch, next) {
            (c, _) if c.is_whitespace() => {
                i += 1;
                continue;
            }
            ('&', Some('&')) => (Token::And, 2),
            ('|', Some('|')) => (Token::Or, 2),
            ('=', Some('=')) => (Token::Eq, 2),
            ('!', Some('=')) => (Token::Ne, 2),
            ('<', Some('=')) => (Token::Le, 2),
            ('>', Some('=')) => (Token::Ge, 2),
            ('+', Some('=')) => (Token::AddAssign, 2),
            ('-', Some('=')) => (Token::SubAssign, 2),
            ('!', _) => (Token::Not, 1),
            ('<', _) => (Token::Lt, 1),
            ('>', _) => (Token::Gt, 1),
            ('=', _) => (Token::Assign, 1),
            ('.', _) => (Token::Dot, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (';', _) => (Token::Semicolon, 1),
            ('\'' | '"', _) => {
                let quote = ch;
                let start = i + 1;
                let end = (start..chars.len())
                    .find(|&j| chars[j].1 == quote)
                    .ok_or(ExprError::UnterminatedString { offset })?;
                let text: String = chars[start..end].iter().map(|(_, c)| *c).collect();
                tokens.push(Token::Text(text));
                i = end + 1;
                continue;
            }
            (c, _) if c.is_ascii_digit() || (c == '-' && next.is_some_and(|n| n.is_ascii_digit())) => {
                let start = i;
                let mut end = i + 1;
                while peek(end).is_some_and(|c| c.is_ascii_digit()) {
                    end += 1;
                }
                let literal: String = chars[start..end].iter().map(|(_, c)| *c).collect();
                let value = literal
                    .parse()
                    .map_err(|_| ExprError::UnexpectedChar { ch, offset })?;
                tokens.push(Token::Int(value));
                i = end;
                continue;
            }
            (c, _) if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                let mut end = i + 1;
                while peek(end).is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                    end += 1;
                }
                let word: String = chars[start..end].iter().map(|(_, c)| *c).collect();
                tokens.push(match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word),
                });
                i = end;
                continue;
            }
            _ => return Err(ExprError::UnexpectedChar { ch, offset }),
        };
        tokens.push(token);
        i += width;
    }

    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_operators_and_literals() {
        let tokens = tokenize("!state.open && vars.count >= -2 || 'a b'").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Not,
                Token::Ident("state".into()),
                Token::Dot,
                Token::Ident("open".into()),
                Token::And,
                Token::Ident("vars".into()),
                Token::Dot,
                Token::Ident("count".into()),
                Token::Ge,
                Token::Int(-2),
                Token::Or,
                Token::Text("a b".into()),
            ]
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(tokenize("   "), Err(ExprError::Empty));
        assert!(matches!(
            tokenize("a $ b"),
            Err(ExprError::UnexpectedChar { ch: '$', .. })
        ));
        assert!(matches!(
            tokenize("x == 'open"),
            Err(ExprError::UnterminatedString { .. })
        ));
    }
}
