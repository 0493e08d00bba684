//! Turn planning and encounter orchestration on top of `combat-core`.
//!
//! This crate decides what combatants do and drives encounters to a result.
//! The rules engine stays the single authority over state; everything here
//! reads the state and submits commands.
//!
//! Modules are organized by responsibility:
//! - [`scoring`] turns steps into expected-value scores
//! - [`planner`] searches composite turns (moves, actions, pass)
//! - [`api`] exposes the provider abstraction and runtime errors
//! - [`providers`] holds the planner-backed and scripted providers
//! - [`runner`] plays encounters turn by turn
//! - [`oracle`] bundles the content oracles and tuning config
pub mod api;
pub mod oracle;
pub mod planner;
pub mod providers;
pub mod runner;
pub mod scoring;

pub use api::{PassProvider, ProviderKind, ProviderRegistry, Result, RuntimeError, TurnProvider};
pub use oracle::OracleManager;
pub use planner::{PlanStep, TurnCandidate, TurnPlan, TurnPlanner};
pub use providers::{PlannerProvider, ScriptedProvider};
pub use runner::{EncounterOutcome, EncounterReport, EncounterRunner};
pub use scoring::{BaseValueCache, ScoringEngine, StepScore};
