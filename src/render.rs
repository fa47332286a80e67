//! Text rendering of grids for terminal debugging.
//!
//! Glyphs: `0` open, `|` wall, `J` jumpable, `S` start, `E` goal,
//! `*` cells on the highlighted route.

use crate::geometry::Position;
use crate::grid::Grid;


/// One line per row, each terminated by a newline
pub fn render_grid(grid: &Grid) -> String {
    let mut out = String::with_capacity(grid.len() + grid.rows());
    for cell in grid.cells() {
        out.push(cell.kind().symbol());
        if cell.position().column + 1 == grid.columns() {
            out.push('\n');
        }
    }
    out
}

/// Render the grid with start, goal and a route marked on it
/// Route cells outside the grid are ignored, start and goal keep their own glyphs
pub fn render_state(grid: &Grid, start: Position, goal: Position, route: &[Position]) -> String {
    let mut canvas: Vec<Vec<char>> = (0..grid.rows())
        .map(|row| {
            (0..grid.columns())
                .map(|column| grid.kind_at(Position::new(row, column)).map_or('?', |kind| kind.symbol()))
                .collect()
        })
        .collect();

    let mut mark = |position: Position, glyph: char| {
        if let Some(slot) = canvas.get_mut(position.row).and_then(|row| row.get_mut(position.column)) {
            *slot = glyph;
        }
    };

    for &position in route {
        if position != start && position != goal {
            mark(position, '*');
        }
    }
    mark(start, 'S');
    mark(goal, 'E');

    let mut out = String::with_capacity(grid.len() + grid.rows());
    for row in canvas {
        out.extend(row);
        out.push('\n');
    }
    out
}
