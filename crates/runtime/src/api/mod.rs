//! Types downstream clients interact with.
mod errors;
mod report;

pub use errors::{Result, RuntimeError};
pub use report::{Command, TurnReport};
