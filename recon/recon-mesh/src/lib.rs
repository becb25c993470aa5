//! Half-edge mesh connectivity and flat-buffer export.
//!
//! This crate represents the polygon mesh produced by iso-surface
//! polygonization with fast adjacency queries:
//!
//! - [`HalfEdgeMesh`] - Directed-edge connectivity with O(1) face boundary
//!   traversal and O(1) opposite-edge lookup
//! - [`MeshBuffer`] - Flat vertex/index/attribute arrays for export
//!
//! # Ownership
//!
//! Half-edges form cyclic graphs (`next` rings, mutually-referencing
//! `pair`s), so all records live in arenas owned by the mesh and refer to
//! each other by index. Dropping the mesh releases the arenas in one pass;
//! nothing ever walks the graph during teardown.
//!
//! # Example
//!
//! ```
//! use recon_mesh::{HalfEdgeMesh, MeshBuffer};
//! use nalgebra::Point3;
//!
//! let mut mesh = HalfEdgeMesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! let d = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
//!
//! mesh.insert_face(&[a, b, c]).unwrap();
//! mesh.insert_face(&[b, d, c]).unwrap();
//!
//! // The shared edge paired up; the rim stays open
//! assert_eq!(mesh.boundary_edge_count(), 4);
//!
//! let buffer = MeshBuffer::from_mesh(&mesh);
//! assert_eq!(buffer.triangle_count(), 2);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]

mod buffer;
mod error;
mod half_edge;

pub use buffer::MeshBuffer;
pub use error::{MeshError, MeshResult};
pub use half_edge::{Face, FaceEdges, HalfEdge, HalfEdgeMesh, MeshVertex, VertexRing};
