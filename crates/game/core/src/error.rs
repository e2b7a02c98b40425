//! Common error infrastructure for adventure-core.
//!
//! This module provides shared types and traits used across all error types in
//! the crate. Domain-specific errors (e.g., `MovementError`, `CombatError`) are
//! defined in their respective modules alongside the operations they validate.
//!
//! # Design Principles
//!
//! - **Result objects, not panics**: Turn processing never propagates errors out
//!   of the subsystem. Failures are carried inside result structs as a typed
//!   reason next to a human-readable message.
//! - **Validation before mutation**: every error is raised before any state is
//!   touched, so a failed operation leaves the world unchanged.
//! - **Stable codes**: each variant exposes a static code for logs and tests.

/// Category of a failure, used for classification and logging priority.
///
/// - **NotFound**: an unknown monster, item, scene or target id
/// - **InvalidAction**: acting on a dead or invulnerable monster, malformed
///   expressions, unreachable movement targets, refused items
/// - **PartialData**: content is missing (no melee message for a category, no
///   dialogue entry); callers degrade to a generic default
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCategory {
    /// Referenced entity does not exist.
    NotFound,

    /// The request was understood but is not allowed in the current state.
    InvalidAction,

    /// Content is incomplete; a default was substituted.
    PartialData,
}

impl ErrorCategory {
    /// Returns true if callers are expected to fall back to a default.
    pub const fn is_degradable(&self) -> bool {
        matches!(self, Self::PartialData)
    }
}

/// Common trait for all adventure-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify by what the caller can do about it, not by impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the category of this error.
    fn category(&self) -> ErrorCategory;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
