//! Error types for the clustering engine.

use thiserror::Error;

/// Errors surfaced by the clustering engine.
///
/// Both variants are local, recoverable-by-caller errors: the engine
/// validates its inputs defensively and never aborts the host. A
/// superseded in-flight query is not an error; stale completions are
/// dropped silently by the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    /// Malformed radius, zoom bounds, or marker coordinates at index build
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Non-positive delta or malformed viewport/bounding box at query time
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClusterError>;
