//! Candidate labels: the raw detector output surfaced next to the results.

use crate::labels::is_generic;
use crate::models::{CandidateLabel, Detection};

/// Labels dropped from candidates regardless of confidence.
const EXCLUDED_LABELS: &[&str] = &["scampi", "noodle"];

/// Single-word labels that still name a dish worth showing.
pub const KNOWN_DISHES: &[&str] = &[
    "pad thai",
    "shrimp pad thai",
    "spaghetti",
    "ramen",
    "cheeseburger",
    "hamburger",
    "pizza",
    "taco",
    "burrito",
    "fried rice",
    "chicken curry",
    "beef stew",
    "caesar salad",
    "egg fried rice",
];

/// Score in [0, 1] as a percentage rounded to one decimal.
pub fn confidence_percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

/// Every detected label as a candidate, in detection order.
pub fn candidates_from(detection: &Detection) -> Vec<CandidateLabel> {
    detection
        .labels
        .iter()
        .map(|l| CandidateLabel {
            label: l.description.trim().to_lowercase(),
            confidence: confidence_percent(l.score),
        })
        .collect()
}

/// Whether a candidate is specific enough to show.
pub fn is_displayable(label: &str) -> bool {
    if is_generic(label) || EXCLUDED_LABELS.contains(&label) {
        return false;
    }
    label.contains(' ') || KNOWN_DISHES.contains(&label)
}

/// Keep only displayable candidates, preserving order.
pub fn filter_candidates(candidates: Vec<CandidateLabel>) -> Vec<CandidateLabel> {
    candidates
        .into_iter()
        .filter(|c| is_displayable(&c.label))
        .collect()
}
