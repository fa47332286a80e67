//! Grid Model: a rectangular map from [`Position`] to traversability class.
//!
//! Cells are stored as atomics so the map can be updated through a shared
//! reference while searches are reading it. A search sees whatever value a
//! cell holds at the instant it is read; there is no snapshot.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::errors::{PathfinderError, PathfinderResult};
use crate::geometry::Position;


/// Traversability class of a cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CellKind {
    #[default]
    Open = 0,
    Wall = 1,
    /// Enterable only when jumping is enabled
    Jumpable = 2,
}

impl CellKind {

    fn from_u8(value: u8) -> CellKind {
        match value {
            1 => CellKind::Wall,
            2 => CellKind::Jumpable,
            _ => CellKind::Open,
        }
    }

    /// Glyph used by the text renderer and parser
    pub fn symbol(&self) -> char {
        match self {
            CellKind::Open => '0',
            CellKind::Wall => '|',
            CellKind::Jumpable => 'J',
        }
    }

    /// Inverse of [`CellKind::symbol`], also accepts `.` and `#`
    pub fn from_symbol(symbol: char) -> Option<CellKind> {
        match symbol {
            '0' | '.' => Some(CellKind::Open),
            '|' | '#' => Some(CellKind::Wall),
            'J' | 'j' => Some(CellKind::Jumpable),
            _ => None,
        }
    }

    /// Whether a mover may stand on this cell
    pub fn is_enterable(&self, can_jump: bool) -> bool {
        match self {
            CellKind::Open => true,
            CellKind::Wall => false,
            CellKind::Jumpable => can_jump,
        }
    }
}


/// A grid position together with its class
/// Immutable: updating the grid replaces the cell rather than editing it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    position: Position,
    kind: CellKind,
}

impl Cell {

    pub fn new(position: Position, kind: CellKind) -> Self {
        Self { position, kind }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }
}


/// Rectangular grid of cells, row-major
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<AtomicU8>,
}

impl Grid {

    /// Build a grid from rows of classes
    /// Fails with `InvalidDimensions` when there are no rows, a row is empty,
    /// or rows differ in length
    pub fn build<R>(rows: &[R]) -> PathfinderResult<Grid>
    where 
        R: AsRef<[CellKind]>,
    {
        let first = rows.first().ok_or_else(|| PathfinderError::InvalidDimensions {
            reason: "grid has no rows".to_string(),
        })?;

        let columns = first.as_ref().len();
        if columns == 0 {
            return Err(PathfinderError::InvalidDimensions {
                reason: "grid rows are empty".to_string(),
            });
        }

        let mut cells = Vec::with_capacity(rows.len() * columns);
        for (index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != columns {
                return Err(PathfinderError::InvalidDimensions {
                    reason: format!("row {index} has {} columns, expected {columns}", row.len()),
                });
            }
            cells.extend(row.iter().map(|kind| AtomicU8::new(*kind as u8)));
        }

        Ok(Grid { rows: rows.len(), columns, cells })
    }

    /// All-open grid of the given size
    pub fn open(rows: usize, columns: usize) -> PathfinderResult<Grid> {
        let row = vec![CellKind::Open; columns];
        Grid::build(&vec![row; rows])
    }

    /// Parse a grid drawn with [`CellKind::symbol`] glyphs, one line per row
    /// Leading and trailing blank lines and surrounding whitespace are ignored
    pub fn parse(text: &str) -> PathfinderResult<Grid> {
        let mut rows = Vec::new();
        for (line_index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut row = Vec::with_capacity(line.len());
            for (column, symbol) in line.chars().enumerate() {
                let kind = CellKind::from_symbol(symbol).ok_or(PathfinderError::ParseGrid {
                    line: line_index + 1,
                    column: column + 1,
                    symbol,
                })?;
                row.push(kind);
            }
            rows.push(row);
        }
        Grid::build(&rows)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false, construction rejects empty grids
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.column < self.columns
    }

    /// Flattened index of a position, None when out of bounds
    pub(crate) fn index_of(&self, position: Position) -> Option<usize> {
        self.contains(position).then(|| position.row * self.columns + position.column)
    }

    pub(crate) fn position_of(&self, index: usize) -> Position {
        Position::new(index / self.columns, index % self.columns)
    }

    /// Bounds-checked lookup
    pub fn cell_at(&self, position: Position) -> Option<Cell> {
        self.kind_at(position).map(|kind| Cell::new(position, kind))
    }

    pub fn kind_at(&self, position: Position) -> Option<CellKind> {
        let index = self.index_of(position)?;
        Some(self.kind_at_index(index))
    }

    pub(crate) fn kind_at_index(&self, index: usize) -> CellKind {
        CellKind::from_u8(self.cells[index].load(Ordering::Relaxed))
    }

    /// Replace the cell at `position`
    /// Out of bounds writes are ignored. A search running at the same time
    /// may observe either the old or the new class.
    pub fn update_cell(&self, position: Position, kind: CellKind) {
        match self.index_of(position) {
            Some(index) => self.cells[index].store(kind as u8, Ordering::Relaxed),
            None => log::trace!("ignoring out of bounds update at {position}"),
        }
    }

    /// Iterate over every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.cells.len()).map(|index| Cell::new(self.position_of(index), self.kind_at_index(index)))
    }
}

impl Clone for Grid {
    fn clone(&self) -> Self {
        let cells = self.cells
            .iter()
            .map(|cell| AtomicU8::new(cell.load(Ordering::Relaxed)))
            .collect();
        Grid { rows: self.rows, columns: self.columns, cells }
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows)
            .field("columns", &self.columns)
            .finish()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::render_grid(self))
    }
}

impl FromStr for Grid {
    type Err = PathfinderError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Grid::parse(text)
    }
}
