use crate::heuristic::Heuristic;


/// How diagonal moves interact with blocked orthogonal neighbours
/// Only consulted when diagonal movement is enabled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CornerCutting {
    /// Any diagonal into an enterable cell is allowed
    Allow,
    /// Reject a diagonal when both orthogonal cells beside it are blocked
    #[default]
    NoSqueeze,
    /// Reject a diagonal when either orthogonal cell beside it is blocked
    Never,
}


/// Built-in debug output, routed through the `log` facade
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DebugMode {
    #[default]
    Disabled,
    /// Render the grid on every expansion step and once at the end
    LogProgress,
    /// Render the grid and timing once at the end
    LogResult,
}


/// Movement rules and instrumentation for a search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// 8-directional movement, diagonal steps cost 14
    pub walk_diagonals: bool,
    /// Permit entering Jumpable cells
    pub can_jump: bool,
    pub heuristic: Heuristic,
    pub corner_cutting: CornerCutting,
    pub debug_mode: DebugMode,
}

impl SearchConfig {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagonals(mut self, walk_diagonals: bool) -> Self {
        self.walk_diagonals = walk_diagonals;
        self
    }

    pub fn with_jumping(mut self, can_jump: bool) -> Self {
        self.can_jump = can_jump;
        self
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_corner_cutting(mut self, corner_cutting: CornerCutting) -> Self {
        self.corner_cutting = corner_cutting;
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: DebugMode) -> Self {
        self.debug_mode = debug_mode;
        self
    }
}
