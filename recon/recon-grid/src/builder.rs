//! Grid construction from sampled signed distances.
//!
//! The builder sizes the lattice from a bounding volume, populates cells
//! from the input samples, propagates signed distances to the cell corners
//! under a configurable policy, and optionally extrudes boundary cells to
//! close single-cell holes that would otherwise break polygonization
//! continuity.

use hashbrown::HashMap;
use nalgebra::Vector3;
use rayon::prelude::*;
use recon_types::{Aabb, SamplePoint};
use tracing::{debug, info};

use crate::cell::{Cell, LatticeCoord, CORNER_OFFSETS};
use crate::error::{GridError, GridResult};
use crate::grid::HashGrid;

/// How the lattice resolution is specified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridResolution {
    /// Absolute edge length of a lattice cell.
    VoxelSize(f64),
    /// Target number of sample intersections along the longest axis of
    /// the bounding volume; the effective voxel edge length is
    /// `longest extent / count`.
    Intersections(u32),
}

impl Default for GridResolution {
    fn default() -> Self {
        Self::VoxelSize(1.0)
    }
}

/// How a sample's signed distance is propagated to cell corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistancePolicy {
    /// Assign the distance to the single nearest corner. Ties on an axis
    /// go to the lower lattice index. A later sample mapping to the same
    /// corner overwrites the earlier value.
    #[default]
    NearestCorner,
    /// Distribute the distance to all eight corners of the containing
    /// cell, accumulated as a trilinear-weighted average over all samples
    /// touching each corner.
    TrilinearSplat,
}

/// Builder for a [`HashGrid`] populated from signed-distance samples.
///
/// # Example
///
/// ```
/// use recon_grid::GridBuilder;
/// use recon_types::{Aabb, Point3, SamplePoint};
///
/// let samples = vec![SamplePoint::from_coords(0.5, 0.5, 0.5, -0.1)];
/// let bounds = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
///
/// let grid = GridBuilder::new()
///     .voxel_size(1.0)
///     .bounds(bounds)
///     .build(&samples)
///     .unwrap();
///
/// assert_eq!(grid.cell_count(), 1);
/// assert_eq!(grid.query_point_count(), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    resolution: GridResolution,
    coordinate_scale: Option<Vector3<f64>>,
    extrude: bool,
    policy: DistancePolicy,
    bounds: Option<Aabb>,
}

impl GridBuilder {
    /// Create a builder with default settings: voxel size 1.0, no
    /// coordinate scaling, no extrusion, nearest-corner assignment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lattice resolution.
    #[must_use]
    pub const fn resolution(mut self, resolution: GridResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the resolution as an absolute voxel edge length.
    #[must_use]
    pub const fn voxel_size(self, size: f64) -> Self {
        self.resolution(GridResolution::VoxelSize(size))
    }

    /// Set the resolution as a target intersection count along the
    /// longest axis of the bounding volume.
    #[must_use]
    pub const fn intersections(self, count: u32) -> Self {
        self.resolution(GridResolution::Intersections(count))
    }

    /// Set the per-axis scale applied to reconstructed positions.
    ///
    /// Components are typically ±1 to map between coordinate systems with
    /// flipped axes, or a uniform factor to scale the scene. Lattice
    /// addressing stays in the input coordinate system; only the world
    /// positions of the query points are scaled.
    #[must_use]
    pub const fn coordinate_scale(mut self, scale: Vector3<f64>) -> Self {
        self.coordinate_scale = Some(scale);
        self
    }

    /// Enable or disable boundary extrusion.
    ///
    /// When enabled, every absent cell adjacent to a populated cell is
    /// synthesized after the primary population pass, with corner
    /// distances estimated from the assigned corners it shares. Strictly
    /// additive: populated cells are never touched, and a repeated pass
    /// adds nothing.
    #[must_use]
    pub const fn extrude(mut self, extrude: bool) -> Self {
        self.extrude = extrude;
        self
    }

    /// Set the distance-assignment policy.
    #[must_use]
    pub const fn distance_policy(mut self, policy: DistancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use an explicit bounding volume instead of computing one from the
    /// samples.
    #[must_use]
    pub const fn bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Build the grid from a slice of samples.
    ///
    /// Per-sample lattice addressing runs in parallel; insertion is a
    /// single sequential sweep so corner deduplication sees a consistent
    /// set of already-created neighbors.
    ///
    /// # Errors
    ///
    /// Returns a [`GridError`] for degenerate input (no samples, empty or
    /// zero-volume bounds, non-positive cell size, zero intersections) or
    /// when a sample falls outside the declared lattice range.
    pub fn build(&self, samples: &[SamplePoint]) -> GridResult<HashGrid> {
        if samples.is_empty() {
            return Err(GridError::NoSamples);
        }

        let bounds = self
            .bounds
            .unwrap_or_else(|| SamplePoint::bounds(samples));
        if bounds.is_empty() || bounds.volume() <= 0.0 {
            return Err(GridError::EmptyBounds);
        }

        let voxel_size = match self.resolution {
            GridResolution::VoxelSize(size) => size,
            GridResolution::Intersections(0) => {
                return Err(GridError::InvalidIntersections(0));
            }
            GridResolution::Intersections(count) => bounds.max_extent() / f64::from(count),
        };

        let scale = self
            .coordinate_scale
            .unwrap_or_else(|| Vector3::new(1.0, 1.0, 1.0));
        let mut grid = HashGrid::new(voxel_size, bounds, scale)?;

        // Parallel: map every sample to its lattice address and in-cell
        // fraction. Sequential insertion follows.
        let min = bounds.min;
        #[allow(clippy::cast_possible_truncation)] // floor() of in-range extents
        let prepared: Vec<(LatticeCoord, [f64; 3], f64)> = samples
            .par_iter()
            .map(|sample| {
                let rel = (sample.position - min) / voxel_size;
                let base = rel.map(f64::floor);
                let coord = LatticeCoord::new(base.x as i64, base.y as i64, base.z as i64);
                let frac = [rel.x - base.x, rel.y - base.y, rel.z - base.z];
                (coord, frac, sample.distance)
            })
            .collect();

        let mut splat: HashMap<u32, (f64, f64)> = HashMap::new();
        for (coord, frac, distance) in prepared {
            let corners = *grid.get_or_create_cell(coord)?.corners();
            match self.policy {
                DistancePolicy::NearestCorner => {
                    grid.set_distance(corners[nearest_corner(frac)], distance);
                }
                DistancePolicy::TrilinearSplat => {
                    for (c, offset) in CORNER_OFFSETS.iter().enumerate() {
                        let weight = trilinear_weight(frac, offset);
                        if weight > 0.0 {
                            let entry = splat.entry(corners[c]).or_insert((0.0, 0.0));
                            entry.0 += weight * distance;
                            entry.1 += weight;
                        }
                    }
                }
            }
        }

        for (index, (weighted, total)) in splat {
            grid.set_distance(index, weighted / total);
        }

        let extruded = if self.extrude {
            let added = extrude_boundary(&mut grid)?;
            debug!(added, "extruded boundary cells");
            added
        } else {
            0
        };

        info!(
            cells = grid.cell_count(),
            query_points = grid.query_point_count(),
            extruded,
            "built reconstruction grid"
        );
        Ok(grid)
    }
}

/// Index of the corner nearest to an in-cell fraction, ties per axis
/// toward the lower lattice index.
fn nearest_corner(frac: [f64; 3]) -> usize {
    corner_index(frac[0] > 0.5, frac[1] > 0.5, frac[2] > 0.5)
}

/// Map per-axis high/low flags to a marching-cubes corner index.
const fn corner_index(x: bool, y: bool, z: bool) -> usize {
    match (x, y, z) {
        (false, false, false) => 0,
        (true, false, false) => 1,
        (true, true, false) => 2,
        (false, true, false) => 3,
        (false, false, true) => 4,
        (true, false, true) => 5,
        (true, true, true) => 6,
        (false, true, true) => 7,
    }
}

/// Trilinear weight of a corner for an in-cell fraction.
fn trilinear_weight(frac: [f64; 3], offset: &[i64; 3]) -> f64 {
    let axis = |f: f64, o: i64| if o == 1 { f } else { 1.0 - f };
    axis(frac[0], offset[0]) * axis(frac[1], offset[1]) * axis(frac[2], offset[2])
}

/// Synthesize absent cells adjacent to populated cells.
///
/// Scans the 26-neighborhood of every sample-populated cell; every absent
/// in-range coordinate is created with the extruded flag set, and its
/// still-unassigned corners take the average of the assigned corners the
/// cell shares with its neighbors. Returns the number of cells added.
fn extrude_boundary(grid: &mut HashGrid) -> GridResult<usize> {
    let seeds: Vec<LatticeCoord> = grid
        .cells()
        .filter(|cell| !cell.is_extruded())
        .map(Cell::coord)
        .collect();

    let mut added = 0;
    for seed in seeds {
        for di in -1..=1_i64 {
            for dj in -1..=1_i64 {
                for dk in -1..=1_i64 {
                    if di == 0 && dj == 0 && dk == 0 {
                        continue;
                    }
                    let coord = seed.offset(di, dj, dk);
                    if !grid.in_range(coord) || grid.cell(coord).is_some() {
                        continue;
                    }
                    let corners = *grid.get_or_create(coord, true)?.corners();
                    estimate_corner_distances(grid, &corners);
                    added += 1;
                }
            }
        }
    }
    Ok(added)
}

/// Fill the unassigned corners of a synthesized cell with the average of
/// its assigned ones. Leaves everything untouched when no corner carries
/// a value yet.
fn estimate_corner_distances(grid: &mut HashGrid, corners: &[u32; 8]) {
    let mut sum = 0.0;
    let mut count = 0u32;
    let mut unassigned = Vec::new();

    for &index in corners {
        match grid.query_points().get(index) {
            Some(point) if point.assigned => {
                sum += point.distance;
                count += 1;
            }
            Some(_) => unassigned.push(index),
            None => {}
        }
    }

    if count > 0 {
        let average = sum / f64::from(count);
        for index in unassigned {
            grid.set_distance(index, average);
        }
    }
}
