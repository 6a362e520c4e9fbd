//! Error types for waymark-paths

use thiserror::Error;
use waymark_core::Point;

/// Caller errors raised by the path-planning components.
///
/// "No path" is not an error: searches report it as `None` (or as a
/// [`SearchOutcome`](crate::SearchOutcome) variant).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("position {pos} is outside the {width}x{height} grid")]
    InvalidPosition { pos: Point, width: i32, height: i32 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("movement cost requires a world/mover state")]
    StateRequired,
}

pub type Result<T> = std::result::Result<T, PathError>;
