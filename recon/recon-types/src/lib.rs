//! Core geometry types for the recon surface reconstruction toolkit.
//!
//! This crate provides the foundational types shared by the reconstruction
//! pipeline:
//!
//! - [`SamplePoint`] - An input sample: a 3D position with a signed distance
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Layer 0 Crate
//!
//! This crate has no dependencies beyond `nalgebra` and can be used in CLI
//! tools, WASM, servers, or Python bindings.
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Example
//!
//! ```
//! use recon_types::{Aabb, Point3, SamplePoint};
//!
//! let samples = vec![
//!     SamplePoint::from_coords(0.0, 0.0, 0.0, -0.2),
//!     SamplePoint::from_coords(1.0, 2.0, 3.0, 0.4),
//! ];
//!
//! let bounds = SamplePoint::bounds(&samples);
//! assert_eq!(bounds.max, Point3::new(1.0, 2.0, 3.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod sample;

pub use bounds::Aabb;
pub use sample::SamplePoint;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
