use thiserror::Error;

/// Result type for grid, traversal and playback operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing a grid or running a visualization.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown algorithm or generator key, or a bad command line argument.
    #[error("Config error: {0}")]
    Config(String),

    /// The grid is missing its source or destination.
    #[error("State error: {0}")]
    State(String),

    /// The destination was never discovered by the traversal.
    #[error("No path found from source to destination")]
    Unreachable,

    /// An edit would break the single source/destination or wall exclusivity rules.
    /// The grid is left unchanged.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Terminal I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
