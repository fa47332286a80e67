use crate::geometry::{Position, chebyshev_distance, euclidean, manhattan_distance};
use crate::search::{DIAGONAL_COST, ORTHOGONAL_COST};


/// Estimate of the remaining cost from a cell to the goal
/// All variants are scaled to the movement costs (10 orthogonal, 14 diagonal)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    /// 10 * (|dx| + |dy|)
    #[default]
    Manhattan,
    /// Octile distance: 14 * min + 10 * (max - min)
    Diagonal,
    /// 10 * straight line distance, truncated
    Euclidean,
}

impl Heuristic {

    /// Pure function of the two positions
    pub fn estimate(&self, from: Position, to: Position) -> u32 {
        let (x1, y1) = (from.column as i64, from.row as i64);
        let (x2, y2) = (to.column as i64, to.row as i64);

        match self {
            Heuristic::Manhattan => {
                manhattan_distance(x1, y1, x2, y2) as u32 * ORTHOGONAL_COST
            }
            Heuristic::Diagonal => {
                let max = chebyshev_distance(x1, y1, x2, y2) as u32;
                let min = manhattan_distance(x1, y1, x2, y2) as u32 - max;
                DIAGONAL_COST * min + ORTHOGONAL_COST * (max - min)
            }
            Heuristic::Euclidean => {
                let d = euclidean(x1 as f64, y1 as f64, x2 as f64, y2 as f64);
                (ORTHOGONAL_COST as f64 * d) as u32
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimates_at_goal_are_zero() {
        let p = Position::new(3, 7);
        for h in [Heuristic::Manhattan, Heuristic::Diagonal, Heuristic::Euclidean] {
            assert_eq!(h.estimate(p, p), 0);
        }
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(Heuristic::Manhattan.estimate(Position::new(0, 0), Position::new(4, 4)), 80);
        assert_eq!(Heuristic::Manhattan.estimate(Position::new(2, 5), Position::new(0, 1)), 60);
    }

    #[test]
    fn test_diagonal_matches_octile_formula() {
        // 14 * min + 10 * (max - min)
        assert_eq!(Heuristic::Diagonal.estimate(Position::new(0, 0), Position::new(4, 4)), 56);
        assert_eq!(Heuristic::Diagonal.estimate(Position::new(0, 0), Position::new(2, 5)), 58);
        assert_eq!(Heuristic::Diagonal.estimate(Position::new(3, 0), Position::new(0, 0)), 30);

        // same value as the 10 * (dx + dy) + (14 - 2 * 10) * min form
        for (dx, dy) in [(1i64, 6i64), (5, 2), (3, 3), (0, 9)] {
            let expected = 10 * (dx + dy) + (14 - 2 * 10) * dx.min(dy);
            let h = Heuristic::Diagonal.estimate(Position::new(0, 0), Position::new(dy as usize, dx as usize));
            assert_eq!(h as i64, expected);
        }
    }

    #[test]
    fn test_euclidean_truncates() {
        assert_eq!(Heuristic::Euclidean.estimate(Position::new(0, 0), Position::new(3, 4)), 50);
        // 10 * sqrt(2) = 14.14...
        assert_eq!(Heuristic::Euclidean.estimate(Position::new(0, 0), Position::new(1, 1)), 14);
        // 10 * sqrt(5) = 22.36...
        assert_eq!(Heuristic::Euclidean.estimate(Position::new(1, 2), Position::new(0, 0)), 22);
    }
}
