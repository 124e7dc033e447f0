//! Alert evaluation and advice.
//!
//! Gateway for the threshold table, the evaluator, event type derivation and
//! the recommendation resolver. Route handlers import from here only.

mod evaluator;
mod event_type;
mod recommendations;
mod thresholds;

pub use evaluator::{AlertEvaluator, TriggeredAlert};
pub use event_type::{event_type, humidity_direction, rule_key};
pub use recommendations::{reasons_for, Advice, RecommendationResolver};
pub use thresholds::{Comparison, Severity, ThresholdRule, ThresholdTable};
