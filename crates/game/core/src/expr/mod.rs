//! Condition and effect expressions used by content.
//!
//! Strings such as `"!state.open"` or `"flags.troll_defeated = true"` are
//! parsed into a small tree and evaluated against [`GameState`]. Nothing is
//! executed dynamically: the grammar is fixed and every operator has a fixed
//! arity.
//!
//! ```text
//! expr    := or
//! or      := and ('||' and)*
//! and     := unary ('&&' unary)*
//! unary   := '!' unary | '(' expr ')' | compare
//! compare := operand (cmp operand)?
//! operand := path | integer | 'text' | "text" | true | false
//! effect  := assign (';' assign)*
//! assign  := path ('=' | '+=' | '-=') operand
//! ```
//!
//! [`GameState`]: crate::state::GameState
mod eval;
mod lexer;
mod parser;

use crate::error::{ErrorCategory, GameError};
use crate::state::PropertyValue;

pub use eval::Scope;

/// Parses a condition expression.
pub fn parse_condition(source: &str) -> Result<Expr, ExprError> {
    parser::Parser::new(lexer::tokenize(source)?).condition()
}

/// Parses an effect (one or more assignments separated by `;`).
pub fn parse_effect(source: &str) -> Result<Effect, ExprError> {
    parser::Parser::new(lexer::tokenize(source)?).effect()
}

/// Dotted reference into the game state, e.g. `player.has.lamp`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path(Vec<String>);

impl Path {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn root(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }
}

impl core::fmt::Display for Path {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Literal(PropertyValue),
    Path(Path),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub target: Path,
    pub op: AssignOp,
    pub value: Expr,
}

/// Ordered list of assignments.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Effect(pub Vec<Assignment>);

impl Effect {
    pub fn assignments(&self) -> &[Assignment] {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("unexpected token '{found}' (expected {expected})")]
    UnexpectedToken { found: String, expected: &'static str },

    #[error("unexpected end of expression (expected {expected})")]
    UnexpectedEnd { expected: &'static str },

    #[error("'{0}' cannot be assigned")]
    ReadOnly(String),

    #[error("'{0}' is not numeric")]
    NotNumeric(String),

    #[error("'{value}' is not a valid value for '{path}'")]
    InvalidValue { path: String, value: String },

    #[error("'{0}' needs an acting monster")]
    NoMonster(String),

    #[error("monster '{0}' not found")]
    UnknownMonster(String),

    #[error("monster '{0}' is dead")]
    DeadMonster(String),
}

impl GameError for ExprError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownMonster(_) => ErrorCategory::NotFound,
            _ => ErrorCategory::InvalidAction,
        }
    }

    fn error_code(&self) -> &'static str {
        use ExprError::*;
        match self {
            Empty => "EXPR_EMPTY",
            UnexpectedChar { .. } => "EXPR_UNEXPECTED_CHAR",
            UnterminatedString { .. } => "EXPR_UNTERMINATED_STRING",
            UnexpectedToken { .. } => "EXPR_UNEXPECTED_TOKEN",
            UnexpectedEnd { .. } => "EXPR_UNEXPECTED_END",
            ReadOnly(_) => "EXPR_READ_ONLY",
            NotNumeric(_) => "EXPR_NOT_NUMERIC",
            InvalidValue { .. } => "EXPR_INVALID_VALUE",
            NoMonster(_) => "EXPR_NO_MONSTER",
            UnknownMonster(_) => "EXPR_UNKNOWN_MONSTER",
            DeadMonster(_) => "EXPR_DEAD_MONSTER",
        }
    }
}
