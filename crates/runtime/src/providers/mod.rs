//! Turn provider implementations.

pub mod planner;
pub mod scripted;

pub use planner::PlannerProvider;
pub use scripted::ScriptedProvider;
