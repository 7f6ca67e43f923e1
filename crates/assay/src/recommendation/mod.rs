//! Cleaning recommendations derived from analysis results.
//!
//! Rules are pure functions of a statistics record and the configured
//! thresholds. Every recommendation carries a stable code plus English and
//! Chinese text.

mod engine;
mod recommendation;

pub use engine::RecommendationEngine;
pub use recommendation::{Language, Recommendation, RecommendationCode};
