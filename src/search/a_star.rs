use crate::collections::FxIndexSet;
use crate::config::{CornerCutting, SearchConfig};
use crate::engine::CancellationToken;
use crate::geometry::Position;
use crate::grid::{CellKind, Grid};
use crate::progress::{SearchObserver, SearchReport, StepSnapshot};
use super::{DIAGONAL_COST, ORTHOGONAL_COST, Path, shortest_path};

use std::{
    collections::BinaryHeap,
    cmp::Ordering,
    time::Instant,
};


/// Per-search state of one grid cell
/// Lives in an arena indexed by `row * columns + column`, parent links are
/// arena indices so the whole tree is dropped with the arena
#[derive(Debug, Clone)]
pub(crate) struct SearchNode {
    pub(crate) position: Position,
    pub(crate) g_score: u32, // Cost of the best known path from start
    pub(crate) f_score: u32, // g_score + heuristic estimate to goal
    pub(crate) parent: Option<usize>,
    pub(crate) open: bool,
}

impl SearchNode {

    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            g_score: u32::MAX,
            f_score: u32::MAX,
            parent: None,
            open: false,
        }
    }
}


/// Entry on the open list
/// Ordered by f_cost, then by insertion sequence so equal f_costs pop first-in first-out
#[derive(Debug)]
struct OpenEntry {
    index: usize, // arena index of the node
    g_cost: u32, // g_score when pushed, stale once the node improves
    f_cost: u32,
    sequence: u64,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, reverse both keys
        other.f_cost.cmp(&self.f_cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_cost == other.f_cost && self.sequence == other.sequence
    }
}
impl Eq for OpenEntry {}


/// How a search run ended
#[derive(Debug)]
pub(crate) enum SearchOutcome {
    /// Ran to completion, the path is empty when the goal is unreachable
    Completed(Path),
    /// The token was cancelled before the search finished
    Cancelled,
}


/// Neighbour offsets, rows outer and columns inner
const OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];


/// A* over a grid
/// https://en.wikipedia.org/wiki/A*_search_algorithm
///
/// Cells are read from the grid at the moment they are examined, so
/// concurrent updates may or may not be seen by a running search.
/// The token is polled before every expansion.
pub(crate) fn a_star(
    grid: &Grid,
    start: Position,
    goal: Position,
    config: &SearchConfig,
    observer: &dyn SearchObserver,
    cancel: &CancellationToken,
) -> SearchOutcome {

    let started = Instant::now();
    log::debug!("searching {start} -> {goal} with {config:?}");

    let finish = |path: Path, expanded: usize| {
        let report = SearchReport {
            grid,
            start,
            goal,
            path: &path,
            expanded,
            elapsed: started.elapsed(),
        };
        observer.on_result(&report);
        log::debug!("search {start} -> {goal} finished, found={} expanded={expanded}", !path.is_empty());
        SearchOutcome::Completed(path)
    };

    let (Some(start_index), Some(goal_index)) = (grid.index_of(start), grid.index_of(goal)) else {
        log::warn!("search endpoint outside the {}x{} grid: {start} -> {goal}", grid.rows(), grid.columns());
        return finish(Path::empty(), 0);
    };

    // Walled endpoints never have a path, no search is performed
    if grid.kind_at_index(start_index) == CellKind::Wall
        || grid.kind_at_index(goal_index) == CellKind::Wall {
        return finish(Path::empty(), 0);
    }

    // The start is part of the path, so it must be enterable too
    if !grid.kind_at_index(start_index).is_enterable(config.can_jump) {
        log::debug!("start {start} is {:?} and jumping is disabled", grid.kind_at_index(start_index));
        return finish(Path::empty(), 0);
    }

    // Arena of nodes, one per cell, owned by this run only
    let mut nodes: Vec<SearchNode> = (0..grid.len())
        .map(|index| SearchNode::new(grid.position_of(index)))
        .collect();

    // Open List
    // Nodes that need to be evaluated, implemented as priority queue
    // Improving a node pushes a new entry, the old one is skipped when popped
    let mut open_list: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut sequence: u64 = 0;

    // Expanded nodes, kept in expansion order for observers
    let mut closed_list: FxIndexSet<Position> = FxIndexSet::default();

    let h_start = config.heuristic.estimate(start, goal);
    nodes[start_index].g_score = 0;
    nodes[start_index].f_score = h_start;
    nodes[start_index].open = true;
    open_list.push(OpenEntry {
        index: start_index,
        g_cost: 0,
        f_cost: h_start,
        sequence,
    });

    loop {
        if cancel.is_cancelled() {
            log::debug!("search {start} -> {goal} cancelled after {} expansions", closed_list.len());
            return SearchOutcome::Cancelled;
        }

        let Some(OpenEntry { index, g_cost, .. }) = open_list.pop() else {
            break;
        };

        // Skip entries for nodes that were closed or improved since they were pushed
        let current = &nodes[index];
        if !current.open || current.g_score != g_cost {
            continue;
        }
        let position = current.position;
        let current_g = current.g_score;

        log::trace!("expanding {position} g={current_g} f={}", current.f_score);
        observer.on_step(&StepSnapshot {
            grid,
            start,
            goal,
            current: index,
            nodes: &nodes,
            closed: &closed_list,
            open_len: open_list.len(),
        });

        // Check if we've reached the goal
        if index == goal_index {
            let path = Path::new(shortest_path(&nodes, index), current_g);
            let expanded = closed_list.len();
            return finish(path, expanded);
        }

        nodes[index].open = false;
        closed_list.insert(position);

        // loop over neighbors
        for (d_row, d_column) in OFFSETS {
            let diagonal = d_row != 0 && d_column != 0;
            if diagonal && !config.walk_diagonals {
                continue;
            }

            let Some(neighbor) = position.offset(d_row, d_column) else {
                continue;
            };
            let Some(neighbor_index) = grid.index_of(neighbor) else {
                continue;
            };

            if !grid.kind_at_index(neighbor_index).is_enterable(config.can_jump)
                || closed_list.contains(&neighbor) {
                continue;
            }

            if diagonal && cuts_corner(grid, position, d_row, d_column, config) {
                continue;
            }

            // new cost to reach this node = edge cost + node cost
            let edge_cost = if diagonal { DIAGONAL_COST } else { ORTHOGONAL_COST };
            let new_cost = current_g + edge_cost;

            let node = &mut nodes[neighbor_index];
            if node.open && node.g_score <= new_cost {
                // The existing path is as good or better, do nothing
                continue;
            }

            node.g_score = new_cost;
            node.f_score = new_cost + config.heuristic.estimate(neighbor, goal);
            node.parent = Some(index);
            node.open = true;

            sequence += 1;
            open_list.push(OpenEntry {
                index: neighbor_index,
                g_cost: new_cost,
                f_cost: node.f_score,
                sequence,
            });
        }
    }

    let expanded = closed_list.len();
    finish(Path::empty(), expanded)
}


/// Whether the diagonal step from `position` by (d_row, d_column) squeezes past blocked cells
fn cuts_corner(grid: &Grid, position: Position, d_row: isize, d_column: isize, config: &SearchConfig) -> bool {
    let blocked = |p: Option<Position>| {
        p.and_then(|p| grid.kind_at(p))
            .is_none_or(|kind| !kind.is_enterable(config.can_jump))
    };

    match config.corner_cutting {
        CornerCutting::Allow => false,
        CornerCutting::NoSqueeze => {
            blocked(position.offset(d_row, 0)) && blocked(position.offset(0, d_column))
        }
        CornerCutting::Never => {
            blocked(position.offset(d_row, 0)) || blocked(position.offset(0, d_column))
        }
    }
}
