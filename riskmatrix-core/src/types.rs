//! Fundamental value types shared across the engine: ratings and grid cells.

use crate::error::ScoringError;
use crate::inherent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of rows and columns on the risk grid.
pub const GRID_SIZE: u8 = 5;

/// A frequency, probability, or impact rating on the 1-5 scale.
///
/// Construction always validates the range; out-of-range values are rejected
/// rather than clamped so that corrupted upstream data surfaces immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: Rating = Rating(1);
    pub const MAX: Rating = Rating(GRID_SIZE);

    /// Validate a raw value, naming the offending `field` on failure.
    pub fn checked(field: &'static str, value: i64) -> Result<Self, ScoringError> {
        if (1..=i64::from(GRID_SIZE)).contains(&value) {
            Ok(Rating(value as u8))
        } else {
            Err(ScoringError::InvalidRating { field, value })
        }
    }

    pub fn new(value: u8) -> Result<Self, ScoringError> {
        Self::checked("rating", i64::from(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// All ratings in ascending order.
    pub fn all() -> impl Iterator<Item = Rating> {
        (1..=GRID_SIZE).map(Rating)
    }

    /// Step `delta` positions along the scale, `None` when leaving the grid.
    pub fn offset(self, delta: i8) -> Option<Rating> {
        let next = i16::from(self.0) + i16::from(delta);
        if (1..=i16::from(GRID_SIZE)).contains(&next) {
            Some(Rating(next as u8))
        } else {
            None
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = ScoringError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::checked("rating", value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `(probability, impact)` position on the 5x5 grid.
///
/// Ordering is probability-major, matching the iteration order used by the
/// grid resolver. Serialized as the `"prob-imp"` string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridCell {
    pub probability: Rating,
    pub impact: Rating,
}

impl GridCell {
    pub fn new(probability: Rating, impact: Rating) -> Self {
        Self {
            probability,
            impact,
        }
    }

    /// Build a cell from raw integers, validating both axes.
    pub fn from_raw(probability: i64, impact: i64) -> Result<Self, ScoringError> {
        Ok(Self {
            probability: Rating::checked("probability", probability)?,
            impact: Rating::checked("impact", impact)?,
        })
    }

    /// Score of this cell, including the pinned 2x2 value.
    pub fn value(self) -> f64 {
        inherent::cell_score(self.probability, self.impact)
    }

    /// All 25 cells, ascending impact within ascending probability.
    pub fn all() -> impl Iterator<Item = GridCell> {
        Rating::all().flat_map(|p| Rating::all().map(move |i| GridCell::new(p, i)))
    }

    /// Neighbor at the given offsets, `None` when it falls off the grid.
    pub fn neighbor(self, d_probability: i8, d_impact: i8) -> Option<GridCell> {
        Some(GridCell::new(
            self.probability.offset(d_probability)?,
            self.impact.offset(d_impact)?,
        ))
    }

    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.probability, self.impact)
    }
}

impl FromStr for GridCell {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScoringError::InvalidCell(s.to_string());
        let (p, i) = s.trim().split_once('-').ok_or_else(invalid)?;
        let p: i64 = p.trim().parse().map_err(|_| invalid())?;
        let i: i64 = i.trim().parse().map_err(|_| invalid())?;
        GridCell::from_raw(p, i).map_err(|_| invalid())
    }
}

impl TryFrom<String> for GridCell {
    type Error = ScoringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GridCell> for String {
    fn from(cell: GridCell) -> Self {
        cell.to_string()
    }
}
