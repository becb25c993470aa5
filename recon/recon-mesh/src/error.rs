//! Error types for mesh connectivity.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while building mesh connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// A face needs at least three vertices.
    #[error("face has {0} vertices, need at least 3")]
    FaceTooSmall(usize),

    /// A face referenced a vertex index that does not exist.
    #[error("vertex index {index} out of range (mesh has {vertex_count} vertices)")]
    VertexOutOfRange {
        /// The offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face referenced the same vertex more than once.
    #[error("face references a vertex more than once")]
    DegenerateFace,

    /// An attribute array does not match the vertex count.
    #[error("attribute array has {actual} entries, expected {expected}")]
    AttributeLength {
        /// Expected number of entries.
        expected: usize,
        /// Actual number of entries provided.
        actual: usize,
    },
}
