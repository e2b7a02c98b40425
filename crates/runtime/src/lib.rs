//! Runtime orchestration for the monster subsystem.
//!
//! This crate wires static content into in-memory oracles and drives turns
//! over a [`adventure_core::GameState`]. Consumers embed [`Runtime`] and feed
//! it [`Command`]s; every command yields a [`TurnReport`] carrying the
//! messages, the monsters' decisions and a state root for replay checks.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator
//! - [`api`] exposes the types downstream clients interact with
//! - [`oracle`] provides data adapters over loaded content
//! - [`config`] resolves the world and AI overrides from the environment
pub mod api;
pub mod config;
pub mod oracle;
pub mod runtime;

mod utils;

pub use api::{Command, Result, RuntimeError, TurnReport};
pub use config::RuntimeConfig;
pub use oracle::{ItemOracleImpl, OracleManager, SceneOracleImpl};
pub use runtime::Runtime;
pub use utils::state_root;
