pub(crate) mod a_star;
mod shortest_path;

pub(crate) use a_star::{SearchNode, SearchOutcome, a_star};
pub(crate) use shortest_path::shortest_path;

use crate::geometry::Position;


/// Cost of a horizontal or vertical step
pub const ORTHOGONAL_COST: u32 = 10;

/// Cost of a diagonal step, only used when diagonal movement is enabled
pub const DIAGONAL_COST: u32 = 14;


/// Ordered cells from start to goal, both included
///
/// - empty: no path exists (blocked endpoint, unreachable goal)
/// - a single cell: start and goal are the same cell
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    cells: Vec<Position>,
    cost: u32,
}

impl Path {

    pub(crate) fn new(cells: Vec<Position>, cost: u32) -> Self {
        Self { cells, cost }
    }

    /// The "no path found" result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// Accumulated movement cost, the goal node's gScore
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of cells including start and goal
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of moves, one less than the cell count
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<Position> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<Position> {
        self.cells.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Position> {
        self.cells.iter()
    }

    pub fn into_cells(self) -> Vec<Position> {
        self.cells
    }

    /// Sum of per-step movement costs along a sequence of cells
    /// 10 per orthogonal step, 14 per diagonal step
    pub fn total_cost_of(cells: &[Position]) -> u32 {
        cells.windows(2)
            .map(|pair| if pair[0].is_diagonal_to(&pair[1]) { DIAGONAL_COST } else { ORTHOGONAL_COST })
            .sum()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
