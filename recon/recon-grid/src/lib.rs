//! Sparse voxel hash grid for signed-distance surface reconstruction.
//!
//! This crate turns an unorganized set of signed-distance samples into a
//! sparse volumetric lattice ready for iso-surface polygonization. Cells
//! are created on demand and keyed by a collision-free hash over a
//! declared index range; the corner samples ("query points") shared by
//! neighboring cells are deduplicated so that adjacent cells reference
//! the identical store entry, keeping the extracted surface free of
//! cracks.
//!
//! # Overview
//!
//! 1. [`GridBuilder`] sizes the lattice from the bounding volume of the
//!    input samples (absolute voxel size or a target intersection count
//!    along the longest axis)
//! 2. Each sample is mapped to its lattice cell; the cell's eight corners
//!    are resolved against already-created neighbors through
//!    [`HashGrid::find_query_point`]
//! 3. Signed distances propagate to corners under a [`DistancePolicy`]
//! 4. Optional boundary extrusion closes single-cell holes
//!
//! An external polygonizer then walks [`HashGrid::cells`] and
//! [`HashGrid::query_points`] to emit triangles.
//!
//! # Example
//!
//! ```
//! use recon_grid::GridBuilder;
//! use recon_types::{Aabb, Point3, SamplePoint};
//!
//! let samples = vec![
//!     SamplePoint::from_coords(0.5, 0.5, 0.5, -0.2),
//!     SamplePoint::from_coords(1.5, 0.5, 0.5, 0.3),
//! ];
//!
//! let grid = GridBuilder::new()
//!     .voxel_size(1.0)
//!     .bounds(Aabb::new(Point3::origin(), Point3::new(2.0, 1.0, 1.0)))
//!     .build(&samples)
//!     .unwrap();
//!
//! // Two adjacent cells share the four corners of their common face
//! assert_eq!(grid.cell_count(), 2);
//! assert_eq!(grid.query_point_count(), 12);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod builder;
mod cell;
mod error;
mod grid;
mod query_point;

pub use builder::{DistancePolicy, GridBuilder, GridResolution};
pub use cell::{
    Cell, LatticeCoord, CELL_CORNERS, CELL_EDGES, CORNER_OFFSETS, INVALID_EDGE_VERTEX,
};
pub use error::{GridError, GridResult};
pub use grid::{lattice_key, HashGrid};
pub use query_point::{QueryPoint, QueryPointStore};
