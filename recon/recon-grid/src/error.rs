//! Error types for grid construction.

use thiserror::Error;

use crate::cell::LatticeCoord;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur during grid construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A lattice coordinate exceeds the pre-declared index bound.
    #[error("lattice coordinate {coord} outside declared index range 0..{max_index}")]
    LatticeOutOfRange {
        /// The offending coordinate.
        coord: LatticeCoord,
        /// The per-axis index bound declared at construction.
        max_index: u64,
    },

    /// Two distinct in-range coordinates produced the same hash key.
    ///
    /// This cannot happen while the range contract holds and indicates a
    /// construction-order bug, not a recoverable condition.
    #[error("hash collision between lattice coordinates {first} and {second}")]
    HashCollision {
        /// Coordinate already stored under the key.
        first: LatticeCoord,
        /// Coordinate that hashed to the same key.
        second: LatticeCoord,
    },

    /// No input samples were provided.
    #[error("no input samples")]
    NoSamples,

    /// The bounding volume is empty or has zero volume.
    #[error("bounding volume is empty or has zero volume")]
    EmptyBounds,

    /// The voxel edge length is not a positive finite number.
    #[error("invalid voxel size: {0}")]
    InvalidCellSize(f64),

    /// The target intersection count is zero.
    #[error("invalid intersection count: {0}")]
    InvalidIntersections(u32),
}
