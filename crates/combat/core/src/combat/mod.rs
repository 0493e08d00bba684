//! Roll probabilities and outcome distributions.
//!
//! Shared by the engine, which rolls actual dice, and by scoring, which
//! reasons over the full distribution of results.
pub mod distribution;
pub mod hit;

pub use distribution::Pmf;
pub use hit::{AttackRoll, HitOdds, classify_attack, resolve_natural, save_success_probability};
