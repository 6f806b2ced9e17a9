//! Inherent risk: frequency x impact, before any control is considered.
//!
//! The `(2, 2)` cell is pinned to [`PINNED_CELL_VALUE`] instead of 4 so that it
//! stays strictly below the lower edge of the "Medio" band. The same rule is
//! reused for residual scores and for every grid cell value.

use crate::error::ScoringError;
use crate::types::Rating;

/// Score assigned to the `(2, 2)` cell.
pub const PINNED_CELL_VALUE: f64 = 3.99;

/// Multiply frequency by impact, applying the `(2, 2)` pin.
///
/// Accepts fractional inputs so residual values can reuse the same rule; the
/// pin only fires when both inputs are exactly 2.
pub fn score(frequency: f64, impact: f64) -> f64 {
    if frequency == 2.0 && impact == 2.0 {
        PINNED_CELL_VALUE
    } else {
        frequency * impact
    }
}

/// Score of a validated grid position.
pub fn cell_score(frequency: Rating, impact: Rating) -> f64 {
    score(frequency.as_f64(), impact.as_f64())
}

/// Validate raw ratings and compute the inherent score.
///
/// Fails with [`ScoringError::InvalidRating`] for anything outside `1..=5`.
pub fn inherent_score(frequency: i64, impact: i64) -> Result<f64, ScoringError> {
    let frequency = Rating::checked("frequency", frequency)?;
    let impact = Rating::checked("impact", impact)?;
    Ok(cell_score(frequency, impact))
}

/// Risk-level inherent score: the worst cause dominates. No causes yields 0.
pub fn max_inherent(scores: impl IntoIterator<Item = f64>) -> f64 {
    scores
        .into_iter()
        .filter(|s| !s.is_nan())
        .fold(0.0, f64::max)
}
