use num_traits::{Num, Signed, Float};


/// Manhattan distance, in cell steps for 4-directional movement
pub fn manhattan_distance<T>(x1: T, y1: T, x2: T, y2: T) -> T
where 
    T: Num + Copy + Signed,
    {
    (x1 - x2).abs() + (y1 - y2).abs()
}

/// Chebyshev distance - number of king moves between two cells
pub fn chebyshev_distance<T>(x1: T, y1: T, x2: T, y2: T) -> T
where 
    T: Num + Copy + Signed + PartialOrd,
    {
    let dx = (x1 - x2).abs();
    let dy = (y1 - y2).abs();
    if dx > dy { dx } else { dy }
}

/// Euclidean distance, straight line between cell centres
pub fn euclidean<T>(x1: T, y1: T, x2: T, y2: T) -> T
where 
    T: Float,
    {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}


/// Cell coordinate on a grid
/// Two positions are equal iff row and column match, this is the identity
/// used for open/closed set membership
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {

    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Apply a signed offset, None when the result would be negative
    /// Upper bounds are the grid's concern
    pub fn offset(&self, d_row: isize, d_column: isize) -> Option<Position> {
        let row = self.row.checked_add_signed(d_row)?;
        let column = self.column.checked_add_signed(d_column)?;
        Some(Position { row, column })
    }

    /// Absolute (row, column) difference to another position
    pub fn delta(&self, other: &Position) -> (usize, usize) {
        (self.row.abs_diff(other.row), self.column.abs_diff(other.column))
    }

    /// True when `other` is exactly one move away
    /// Diagonal moves only count when `diagonals` is set
    pub fn is_adjacent(&self, other: &Position, diagonals: bool) -> bool {
        match self.delta(other) {
            (0, 1) | (1, 0) => true,
            (1, 1) => diagonals,
            _ => false,
        }
    }

    /// True when the move to `other` changes both row and column
    pub fn is_diagonal_to(&self, other: &Position) -> bool {
        let (dr, dc) = self.delta(other);
        dr != 0 && dc != 0
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, column): (usize, usize)) -> Self {
        Position { row, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}
