use thiserror::Error;

/// Errors surfaced by grid construction and the search engine.
///
/// A search that finds no route is not an error: it yields an empty
/// [`Path`](crate::Path).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathfinderError {
    /// Grid is empty or its rows are not all the same length
    #[error("invalid grid dimensions: {reason}")]
    InvalidDimensions { reason: String },

    /// Sync and async searches were mixed on one engine
    #[error("a synchronous and an asynchronous search cannot run at the same time on one engine")]
    ConcurrentSearchConflict,

    #[error("failed to start search thread: {0}")]
    Spawn(String),

    #[error("unknown grid symbol {symbol:?} at line {line}, column {column}")]
    ParseGrid { line: usize, column: usize, symbol: char },
}

pub type PathfinderResult<T> = Result<T, PathfinderError>;
