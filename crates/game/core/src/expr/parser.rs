use super::lexer::Token;
use super::{AssignOp, Assignment, CompareOp, Effect, Expr, ExprError, Path};
use crate::state::PropertyValue;

/// Recursive-descent parser over a token stream.
pub(super) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(super) fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(super) fn condition(mut self) -> Result<Expr, ExprError> {
        let expr = self.or()?;
        self.finish()?;
        Ok(expr)
    }

    pub(super) fn effect(mut self) -> Result<Effect, ExprError> {
        let mut assignments = vec![self.assignment()?];
        while self.eat(&Token::Semicolon) {
            // Trailing separator.
            if self.peek().is_none() {
                break;
            }
            assignments.push(self.assignment()?);
        }
        self.finish()?;
        Ok(Effect(assignments))
    }

    fn assignment(&mut self) -> Result<Assignment, ExprError> {
        let target = self.path()?;
        let op = match self.next() {
            Some(Token::Assign) => AssignOp::Set,
            Some(Token::AddAssign) => AssignOp::Add,
            Some(Token::SubAssign) => AssignOp::Sub,
            Some(other) => return Err(unexpected(other, "'=', '+=' or '-='")),
            None => {
                return Err(ExprError::UnexpectedEnd {
                    expected: "'=', '+=' or '-='",
                });
            }
        };
        let value = self.operand()?;
        Ok(Assignment { target, op, value })
    }

    fn or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        while self.eat(&Token::And) {
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        if self.eat(&Token::LParen) {
            let inner = self.or()?;
            self.expect(&Token::RParen, "')'")?;
            return Ok(inner);
        }
        self.compare()
    }

    fn compare(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.operand()?;
        let op = match self.peek() {
            Some(Token::Eq) => CompareOp::Eq,
            Some(Token::Ne) => CompareOp::Ne,
            Some(Token::Lt) => CompareOp::Lt,
            Some(Token::Le) => CompareOp::Le,
            Some(Token::Gt) => CompareOp::Gt,
            Some(Token::Ge) => CompareOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.operand()?;
        Ok(Expr::Compare(op, Box::new(lhs), Box::new(rhs)))
    }

    fn operand(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Ident(_)) => Ok(Expr::Path(self.path()?)),
            Some(_) => match self.next() {
                Some(Token::Int(value)) => Ok(Expr::Literal(PropertyValue::Int(value))),
                Some(Token::Text(text)) => Ok(Expr::Literal(PropertyValue::Text(text))),
                Some(Token::True) => Ok(Expr::Literal(PropertyValue::Bool(true))),
                Some(Token::False) => Ok(Expr::Literal(PropertyValue::Bool(false))),
                Some(other) => Err(unexpected(other, "a value")),
                None => Err(ExprError::UnexpectedEnd { expected: "a value" }),
            },
            None => Err(ExprError::UnexpectedEnd { expected: "a value" }),
        }
    }

    fn path(&mut self) -> Result<Path, ExprError> {
        let mut segments = vec![self.ident()?];
        while self.eat(&Token::Dot) {
            segments.push(self.ident()?);
        }
        Ok(Path::new(segments))
    }

    fn ident(&mut self) -> Result<String, ExprError> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name),
            Some(other) => Err(unexpected(other, "a name")),
            None => Err(ExprError::UnexpectedEnd { expected: "a name" }),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ExprError> {
        match self.next() {
            Some(ref found) if found == token => Ok(()),
            Some(found) => Err(unexpected(found, expected)),
            None => Err(ExprError::UnexpectedEnd { expected }),
        }
    }

    fn finish(&self) -> Result<(), ExprError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(unexpected(token.clone(), "end of expression")),
        }
    }
}

fn unexpected(token: Token, expected: &'static str) -> ExprError {
    ExprError::UnexpectedToken {
        found: token.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::super::{parse_condition, parse_effect};
    use super::*;

    fn path(source: &str) -> Expr {
        Expr::Path(Path::new(source.split('.').map(str::to_owned).collect()))
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse_condition("a || b && !c").unwrap();
        assert_eq!(
            expr,
            Expr::Or(
                Box::new(path("a")),
                Box::new(Expr::And(
                    Box::new(path("b")),
                    Box::new(Expr::Not(Box::new(path("c"))))
                ))
            )
        );
    }

    #[test]
    fn parses_comparisons_and_groups() {
        let expr = parse_condition("!(monster.health <= 10)").unwrap();
        assert_eq!(
            expr,
            Expr::Not(Box::new(Expr::Compare(
                CompareOp::Le,
                Box::new(path("monster.health")),
                Box::new(Expr::Literal(PropertyValue::Int(10)))
            )))
        );
    }

    #[test]
    fn parses_effect_lists() {
        let effect = parse_effect("flags.fed = true; vars.count += 2;").unwrap();
        assert_eq!(effect.assignments().len(), 2);
        assert_eq!(effect.assignments()[1].op, AssignOp::Add);
        assert_eq!(effect.assignments()[0].target.to_string(), "flags.fed");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_condition("a &&").is_err());
        assert!(parse_condition("(a || b").is_err());
        assert!(parse_condition("a b").is_err());
        assert!(parse_effect("flags.x").is_err());
        assert!(parse_effect("5 = 3").is_err());
    }
}
