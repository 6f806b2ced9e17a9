//! Risk tolerance: the set of grid cells an administrator accepts.
//!
//! Boundary edges are derived on read from neighbor membership; nothing is
//! cached, so toggling a cell never needs to touch its neighbors.

use crate::types::GridCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Accepted `(probability, impact)` cells. Serialized as an array of
/// `"prob-imp"` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToleranceSet {
    cells: BTreeSet<GridCell>,
}

/// Sides of a cell whose neighbor differs in tolerability.
///
/// `top` faces `impact + 1`, `right` faces `probability + 1`, `bottom`
/// faces `impact - 1`, `left` faces `probability - 1`. A side that runs off
/// the grid never carries an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryEdges {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl BoundaryEdges {
    pub fn any(&self) -> bool {
        self.top || self.right || self.bottom || self.left
    }
}

impl ToleranceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tolerable(&self, cell: GridCell) -> bool {
        self.cells.contains(&cell)
    }

    /// Flip membership of `cell` in place; returns the new membership.
    pub fn toggle(&mut self, cell: GridCell) -> bool {
        if self.cells.remove(&cell) {
            false
        } else {
            self.cells.insert(cell);
            true
        }
    }

    /// Copy of this set with `cell` flipped.
    pub fn toggled(&self, cell: GridCell) -> Self {
        let mut next = self.clone();
        next.toggle(cell);
        next
    }

    pub fn boundary_edges(&self, cell: GridCell) -> BoundaryEdges {
        let own = self.is_tolerable(cell);
        let differs = |dp: i8, di: i8| {
            cell.neighbor(dp, di)
                .is_some_and(|n| self.is_tolerable(n) != own)
        };
        BoundaryEdges {
            top: differs(0, 1),
            right: differs(1, 0),
            bottom: differs(0, -1),
            left: differs(-1, 0),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<GridCell> for ToleranceSet {
    fn from_iter<T: IntoIterator<Item = GridCell>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
