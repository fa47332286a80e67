//! Grid-based A* pathfinding.
//!
//! A [`Grid`] holds a traversability class per cell (open, wall, jumpable).
//! A [`Pathfinder`] bound to it finds lowest-cost routes under a
//! [`SearchConfig`]: 4- or 8-directional movement, corner-cutting rules,
//! jumpable terrain and the choice of [`Heuristic`]. Orthogonal steps cost
//! 10, diagonal steps 14.
//!
//! Searches run either on the caller's thread ([`Pathfinder::find_path_sync`])
//! or on a background thread with a callback ([`Pathfinder::find_path_async`]).
//! Starting a background search cancels the previous unfinished one.
//!
//! ```
//! use std::sync::Arc;
//! use gridstar::{Grid, Pathfinder, SearchConfig};
//!
//! let grid = Grid::parse("
//!     0000
//!     0||0
//!     0000
//! ").unwrap();
//! let finder = Pathfinder::new(Arc::new(grid))
//!     .with_config(SearchConfig::new().with_diagonals(true));
//!
//! let path = finder.find_path_sync((0, 0), (2, 3)).unwrap();
//! assert_eq!(path.start(), Some((0, 0).into()));
//! assert_eq!(path.goal(), Some((2, 3).into()));
//! ```

mod collections;
pub mod config;
pub mod engine;
pub mod errors;
pub mod geometry;
pub mod grid;
pub mod heuristic;
pub mod progress;
pub mod render;
pub mod search;

pub use collections::FxIndexSet;
pub use config::{CornerCutting, DebugMode, SearchConfig};
pub use engine::{CancellationToken, Pathfinder, SearchHandle};
pub use errors::{PathfinderError, PathfinderResult};
pub use geometry::Position;
pub use grid::{Cell, CellKind, Grid};
pub use heuristic::Heuristic;
pub use progress::{LogObserver, NoopObserver, SearchObserver, SearchReport, StepSnapshot};
pub use search::{DIAGONAL_COST, ORTHOGONAL_COST, Path};
