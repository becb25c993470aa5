//! Surface reconstruction toolkit.
//!
//! This umbrella crate re-exports the recon-* crates, providing a unified
//! API for turning unorganized signed-distance samples into a volumetric
//! lattice and representing the polygonized result with adjacency-aware
//! mesh connectivity.
//!
//! # Quick Start
//!
//! ```
//! use recon::prelude::*;
//!
//! // Signed-distance samples around an implicit surface
//! let samples = vec![
//!     SamplePoint::from_coords(0.5, 0.5, 0.25, -0.25),
//!     SamplePoint::from_coords(0.5, 0.5, 0.75, 0.25),
//! ];
//!
//! // Discretize into a sparse lattice
//! let grid = GridBuilder::new()
//!     .voxel_size(1.0)
//!     .bounds(Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)))
//!     .build(&samples)
//!     .unwrap();
//! assert_eq!(grid.cell_count(), 1);
//!
//! // Stitch polygonizer output into half-edge connectivity
//! let mut mesh = HalfEdgeMesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.5));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.5));
//! let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.5));
//! mesh.insert_face(&[a, b, c]).unwrap();
//!
//! // Flatten for an external writer
//! let buffer = MeshBuffer::from_mesh(&mesh);
//! assert_eq!(buffer.triangle_count(), 1);
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Core data structures: `SamplePoint`, `Aabb`
//! - [`grid`] - Sparse voxel hash grid and grid builder
//! - [`mesh`] - Half-edge connectivity and flat-buffer export

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `SamplePoint`, `Aabb`.
pub use recon_types as types;

/// Sparse voxel hash grid and grid builder.
pub use recon_grid as grid;

/// Half-edge connectivity and flat-buffer export.
pub use recon_mesh as mesh;

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use recon_grid::{
        Cell, DistancePolicy, GridBuilder, GridError, GridResolution, HashGrid, LatticeCoord,
        QueryPoint, QueryPointStore,
    };
    pub use recon_mesh::{HalfEdgeMesh, MeshBuffer, MeshError};
    pub use recon_types::{Aabb, Point3, SamplePoint, Vector3};
}
