//! Mapping a scalar risk value back onto a 5x5 grid position.
//!
//! Residual maxima are usually fractional and rarely equal a cell value, yet
//! every consumer displays risk as a cell. Resolution rounds *up*: the
//! tightest cell at or above the target wins, so a plotted residual is never
//! lower than the computed one. Only a target above every cell falls back to
//! the closest cell below.

use crate::types::{GridCell, Rating};
use tracing::trace;

/// Distance under which a cell value counts as an exact match.
pub const EXACT_MATCH_TOLERANCE: f64 = 0.01;

/// How a target was placed on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    UpperBound,
    ClosestBelow,
    /// Target was NaN; the default cell is returned.
    Default,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GridCoordinateResolver;

impl GridCoordinateResolver {
    /// Cell used when nothing better is found.
    pub const DEFAULT_CELL: GridCell = GridCell {
        probability: Rating::MIN,
        impact: Rating::MIN,
    };

    pub fn resolve(target: f64) -> GridCell {
        Self::resolve_with_kind(target).0
    }

    /// Resolve `target`, also reporting which rule selected the cell.
    ///
    /// Ties are settled by iteration order (ascending impact within ascending
    /// probability), first found wins: 12 resolves to `3-4`, not `4-3`.
    pub fn resolve_with_kind(target: f64) -> (GridCell, Resolution) {
        if target.is_nan() {
            return (Self::DEFAULT_CELL, Resolution::Default);
        }

        // Nearest within tolerance: 4 and the pinned 3.99 are closer than it.
        let mut exact: Option<(GridCell, f64)> = None;
        for cell in GridCell::all() {
            let diff = (cell.value() - target).abs();
            if diff < EXACT_MATCH_TOLERANCE && exact.is_none_or(|(_, d)| diff < d) {
                exact = Some((cell, diff));
            }
        }
        if let Some((cell, _)) = exact {
            trace!(target, cell = %cell, "exact grid match");
            return (cell, Resolution::Exact);
        }

        let mut best: Option<(GridCell, f64)> = None;
        for cell in GridCell::all() {
            let value = cell.value();
            if value >= target {
                let diff = value - target;
                if best.is_none_or(|(_, d)| diff < d) {
                    best = Some((cell, diff));
                }
            }
        }
        if let Some((cell, diff)) = best {
            trace!(target, cell = %cell, diff, "resolved to upper bound");
            return (cell, Resolution::UpperBound);
        }

        let mut best = (Self::DEFAULT_CELL, f64::INFINITY);
        for cell in GridCell::all() {
            let diff = (target - cell.value()).abs();
            if diff < best.1 {
                best = (cell, diff);
            }
        }
        trace!(target, cell = %best.0, diff = best.1, "resolved to closest cell below");
        (best.0, Resolution::ClosestBelow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(key: &str) -> GridCell {
        key.parse().unwrap()
    }

    #[test]
    fn test_exact_values_resolve_to_first_cell() {
        assert_eq!(GridCoordinateResolver::resolve(12.0), cell("3-4"));
        assert_eq!(GridCoordinateResolver::resolve(4.0), cell("1-4"));
        assert_eq!(GridCoordinateResolver::resolve(3.99), cell("2-2"));
        assert_eq!(GridCoordinateResolver::resolve(25.0), cell("5-5"));
        assert_eq!(GridCoordinateResolver::resolve(1.0), cell("1-1"));
    }

    #[test]
    fn test_every_cell_value_is_found_exactly() {
        for c in GridCell::all() {
            let (resolved, kind) = GridCoordinateResolver::resolve_with_kind(c.value());
            assert_eq!(kind, Resolution::Exact);
            assert_eq!(resolved.value(), c.value());
        }
    }

    #[test]
    fn test_pinned_value_not_captured_by_neighbouring_four() {
        let (resolved, kind) = GridCoordinateResolver::resolve_with_kind(3.99);
        assert_eq!(resolved, cell("2-2"));
        assert_eq!(kind, Resolution::Exact);
        assert_eq!(GridCoordinateResolver::resolve(4.0), cell("1-4"));
        // Within tolerance of 4 only.
        assert_eq!(GridCoordinateResolver::resolve(4.004), cell("1-4"));
        assert_eq!(GridCoordinateResolver::resolve(3.986), cell("2-2"));
    }

    #[test]
    fn test_fractional_target_rounds_up() {
        // 0.4332 -> smallest value >= is 1
        assert_eq!(GridCoordinateResolver::resolve(0.4332), cell("1-1"));
        // 7 has no cell; 8 is the tightest upper bound (2-4 first)
        let (resolved, kind) = GridCoordinateResolver::resolve_with_kind(7.0);
        assert_eq!(resolved, cell("2-4"));
        assert_eq!(kind, Resolution::UpperBound);
        // 3.5 -> 3.99 beats 4
        assert_eq!(GridCoordinateResolver::resolve(3.5), cell("2-2"));
        // 13 -> 15 (3-5)
        assert_eq!(GridCoordinateResolver::resolve(13.0), cell("3-5"));
    }

    #[test]
    fn test_upper_bound_preferred_over_closer_lower() {
        // 9.1 is 0.1 from 9 but the resolver must choose 10
        assert_eq!(GridCoordinateResolver::resolve(9.1), cell("2-5"));
    }

    #[test]
    fn test_above_grid_falls_back_below() {
        let (resolved, kind) = GridCoordinateResolver::resolve_with_kind(30.0);
        assert_eq!(resolved, cell("5-5"));
        assert_eq!(kind, Resolution::ClosestBelow);
    }

    #[test]
    fn test_nan_and_non_positive_targets() {
        assert_eq!(GridCoordinateResolver::resolve(f64::NAN), cell("1-1"));
        assert_eq!(GridCoordinateResolver::resolve(0.0), cell("1-1"));
        assert_eq!(GridCoordinateResolver::resolve(-5.0), cell("1-1"));
    }
}
