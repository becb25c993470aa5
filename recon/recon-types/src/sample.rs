//! Input sample points.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;

/// A single input sample: a 3D position with a signed-distance estimate
/// to the implicit surface being reconstructed.
///
/// Negative distances lie inside the surface, positive outside, by the
/// usual signed-distance convention.
///
/// # Example
///
/// ```
/// use recon_types::{Point3, SamplePoint};
///
/// let sample = SamplePoint::new(Point3::new(1.0, 2.0, 3.0), -0.05);
/// assert!(sample.distance < 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplePoint {
    /// The 3D position of the sample.
    pub position: Point3<f64>,
    /// Signed distance to the implicit surface at this position.
    pub distance: f64,
}

impl SamplePoint {
    /// Create a new sample point.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>, distance: f64) -> Self {
        Self { position, distance }
    }

    /// Create a sample point from raw coordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use recon_types::SamplePoint;
    ///
    /// let sample = SamplePoint::from_coords(1.0, 2.0, 3.0, 0.5);
    /// assert_eq!(sample.position.y, 2.0);
    /// ```
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64, distance: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            distance,
        }
    }

    /// Compute the bounding volume of a slice of samples.
    ///
    /// Returns an empty [`Aabb`] for an empty slice.
    #[must_use]
    pub fn bounds(samples: &[Self]) -> Aabb {
        Aabb::from_points(samples.iter().map(|s| &s.position))
    }
}
