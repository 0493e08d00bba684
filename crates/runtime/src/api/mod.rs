//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! the planner and the runner can stay focused on their own work.

pub mod errors;
pub mod providers;
pub mod registry;

pub use errors::{ProviderKind, Result, RuntimeError};
pub use providers::{PassProvider, TurnProvider};
pub use registry::ProviderRegistry;
