//! Text-expansion engine.
//!
//! Data flow for one host signal: the classifier resolves the active surface,
//! the binding layer decides whether the signal may complete a trigger, the
//! matcher finds the trailing token, the registry cache resolves it, and the
//! executor performs the replacement under the reentrancy guard. Every failure
//! degrades to "the signal is ordinary input".

pub mod binding;
mod engine;
pub mod executor;
mod guard;
pub mod logging;
mod matcher;
mod metrics;

pub use binding::{ExpansionRequest, MatchMode, translate};
pub use engine::{Engine, EngineError, Outcome, configured_store};
pub use executor::{Replacement, replace};
pub use guard::{DeferredTask, GuardState, ReentrancyGuard};
pub use matcher::{TriggerHit, TriggerMatcher};
pub use metrics::{EngineMetrics, EngineMetricsSnapshot};
