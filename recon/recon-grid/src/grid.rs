//! Sparse voxel hash grid.
//!
//! Maps a potentially unbounded, sparse 3D integer lattice to the small set
//! of cells that actually contain data. Shared corner samples are
//! deduplicated through the [`QueryPointStore`]: corners are never hashed
//! directly, they are found only through the cells that reference them.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use recon_types::Aabb;
use tracing::debug;

use crate::cell::{Cell, LatticeCoord, CELL_CORNERS, CORNER_OFFSETS};
use crate::error::{GridError, GridResult};
use crate::query_point::{QueryPoint, QueryPointStore};

/// Combine a lattice coordinate into a single hash key.
///
/// The key is `i * max_index² + j * max_index + k`, which is injective for
/// any two distinct triples whose components lie in `0..max_index`. The
/// bound is supplied explicitly so the function is testable without a
/// grid; [`HashGrid`] computes it once at construction and never changes
/// it afterwards.
///
/// Components must already be non-negative (lattice coordinates are
/// relative to the bounding-volume minimum).
#[inline]
#[must_use]
#[allow(clippy::cast_sign_loss)] // callers guarantee non-negative components
pub fn lattice_key(coord: LatticeCoord, max_index: u64) -> u64 {
    (coord.i as u64) * max_index * max_index + (coord.j as u64) * max_index + (coord.k as u64)
}

/// A sparse voxel grid over the lattice covering a bounding volume.
///
/// Cells are created on demand and keyed by a collision-free hash over the
/// declared index range. Each cell references its eight corner query
/// points by index into the grid-owned [`QueryPointStore`]; corners shared
/// between adjacent cells resolve to the identical index, which is what
/// keeps the extracted iso-surface free of cracks.
///
/// # Example
///
/// ```
/// use recon_grid::{HashGrid, LatticeCoord};
/// use recon_types::{Aabb, Point3, Vector3};
///
/// let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 4.0));
/// let mut grid = HashGrid::new(1.0, bounds, Vector3::new(1.0, 1.0, 1.0)).unwrap();
///
/// grid.get_or_create_cell(LatticeCoord::new(0, 0, 0)).unwrap();
/// assert_eq!(grid.cell_count(), 1);
/// assert_eq!(grid.query_point_count(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct HashGrid {
    /// Cells keyed by their lattice hash.
    cells: HashMap<u64, Cell>,
    /// Deduplicated corner samples referenced by the cells.
    query_points: QueryPointStore,
    /// Edge length of a cell.
    voxel_size: f64,
    /// Declared per-axis index ceiling used by the hash.
    max_index: u64,
    /// Maximal index in x direction.
    max_index_x: u64,
    /// Maximal index in y direction.
    max_index_y: u64,
    /// Maximal index in z direction.
    max_index_z: u64,
    /// Bounding volume the lattice covers.
    bounds: Aabb,
    /// Per-axis scale applied to reconstructed positions.
    coordinate_scale: Vector3<f64>,
}

impl HashGrid {
    /// Create an empty grid over a bounding volume.
    ///
    /// The per-axis index ceilings are computed once, before any cell is
    /// inserted: `ceil(extent / voxel_size) + 1` per axis, and the hash
    /// bound is the maximum of those plus one for headroom.
    ///
    /// # Arguments
    ///
    /// * `voxel_size` - Edge length of a lattice cell
    /// * `bounds` - Bounding volume of the input samples
    /// * `coordinate_scale` - Per-axis scale (typically ±1 components)
    ///   applied to every reconstructed position, supporting axis-flipped
    ///   coordinate systems
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidCellSize`] if `voxel_size` is not a
    /// positive finite number, and [`GridError::EmptyBounds`] if the
    /// bounding volume is empty or has zero volume.
    pub fn new(
        voxel_size: f64,
        bounds: Aabb,
        coordinate_scale: Vector3<f64>,
    ) -> GridResult<Self> {
        if voxel_size <= 0.0 || !voxel_size.is_finite() {
            return Err(GridError::InvalidCellSize(voxel_size));
        }
        if bounds.is_empty() || bounds.volume() <= 0.0 {
            return Err(GridError::EmptyBounds);
        }

        let size = bounds.size();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        // extents are finite and non-negative here
        let ceil_index = |extent: f64| (extent / voxel_size).ceil() as u64 + 1;

        let max_index_x = ceil_index(size.x);
        let max_index_y = ceil_index(size.y);
        let max_index_z = ceil_index(size.z);
        let max_index = max_index_x.max(max_index_y).max(max_index_z) + 1;

        debug!(
            voxel_size,
            max_index_x, max_index_y, max_index_z, max_index, "sized reconstruction lattice"
        );

        Ok(Self {
            cells: HashMap::new(),
            query_points: QueryPointStore::new(),
            voxel_size,
            max_index,
            max_index_x,
            max_index_y,
            max_index_z,
            bounds,
            coordinate_scale,
        })
    }

    /// Check whether a coordinate lies inside the declared index range.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // max_index is far below i64::MAX
    pub fn in_range(&self, coord: LatticeCoord) -> bool {
        let bound = self.max_index as i64;
        (0..bound).contains(&coord.i)
            && (0..bound).contains(&coord.j)
            && (0..bound).contains(&coord.k)
    }

    /// Hash a lattice coordinate into its cell key.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LatticeOutOfRange`] if the coordinate lies
    /// outside the declared index range; the hash's injectivity guarantee
    /// only holds inside it.
    pub fn hash(&self, coord: LatticeCoord) -> GridResult<u64> {
        if !self.in_range(coord) {
            return Err(GridError::LatticeOutOfRange {
                coord,
                max_index: self.max_index,
            });
        }
        Ok(lattice_key(coord, self.max_index))
    }

    /// Get the cell at a coordinate, creating it if absent.
    ///
    /// Creation is idempotent: re-requesting the same coordinate returns
    /// the existing cell. On creation, each of the eight corners is
    /// resolved against the already-inserted neighbor cells that could own
    /// that lattice vertex; a corner not yet known gets a fresh unassigned
    /// query point.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LatticeOutOfRange`] for a coordinate outside
    /// the declared range and [`GridError::HashCollision`] if the key is
    /// already taken by a different coordinate (an invariant violation
    /// that cannot occur while the range contract holds).
    pub fn get_or_create_cell(&mut self, coord: LatticeCoord) -> GridResult<&Cell> {
        self.get_or_create(coord, false)
    }

    pub(crate) fn get_or_create(
        &mut self,
        coord: LatticeCoord,
        extruded: bool,
    ) -> GridResult<&Cell> {
        let key = self.hash(coord)?;

        if let Some(existing) = self.cells.get(&key) {
            if existing.coord() != coord {
                return Err(GridError::HashCollision {
                    first: existing.coord(),
                    second: coord,
                });
            }
        } else {
            let corners = self.resolve_corners(coord);
            self.cells.insert(key, Cell::new(coord, corners, extruded));
        }

        Ok(&self.cells[&key])
    }

    /// Resolve the eight corner query points of a cell about to be
    /// created, reusing indices owned by existing neighbors.
    fn resolve_corners(&mut self, coord: LatticeCoord) -> [u32; CELL_CORNERS] {
        let mut corners = [0u32; CELL_CORNERS];
        for (c, slot) in corners.iter_mut().enumerate() {
            *slot = match self.find_query_point(c, coord) {
                Some(index) => index,
                None => {
                    let position = self.corner_position(coord, c);
                    self.query_points.push(QueryPoint::new(position))
                }
            };
        }
        corners
    }

    /// Search the neighbors of a cell for an existing shared query point.
    ///
    /// `corner` names one of the eight corners of the cell at `coord`.
    /// The lattice vertex under that corner is shared with up to seven
    /// other cells; each is probed through its own hash. Returns the index
    /// of the query point if any such neighbor already exists, `None` if
    /// the caller must create a fresh one.
    ///
    /// Pure lookup: no part of the grid is mutated.
    #[must_use]
    pub fn find_query_point(&self, corner: usize, coord: LatticeCoord) -> Option<u32> {
        let vertex = coord.corner_vertex(corner);

        for (other, offset) in CORNER_OFFSETS.iter().enumerate() {
            if other == corner {
                continue;
            }
            let neighbor = vertex.offset(-offset[0], -offset[1], -offset[2]);
            if let Some(cell) = self.cell(neighbor) {
                return Some(cell.corner(other));
            }
        }
        None
    }

    /// Get the cell at a coordinate, if it exists.
    #[must_use]
    pub fn cell(&self, coord: LatticeCoord) -> Option<&Cell> {
        if !self.in_range(coord) {
            return None;
        }
        self.cells
            .get(&lattice_key(coord, self.max_index))
            .filter(|cell| cell.coord() == coord)
    }

    /// Get a mutable reference to the cell at a coordinate, if it exists.
    ///
    /// Intended for the polygonizer's per-cell edge-vertex cache; corner
    /// indices are fixed at creation.
    pub fn cell_mut(&mut self, coord: LatticeCoord) -> Option<&mut Cell> {
        if !self.in_range(coord) {
            return None;
        }
        self.cells
            .get_mut(&lattice_key(coord, self.max_index))
            .filter(|cell| cell.coord() == coord)
    }

    /// World-space position of a corner of the cell at `coord`.
    ///
    /// Derived from the lattice coordinate and voxel size, then scaled by
    /// the coordinate-scale vector.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // lattice indices are far below 2^52
    pub fn corner_position(&self, coord: LatticeCoord, corner: usize) -> Point3<f64> {
        let vertex = coord.corner_vertex(corner);
        Point3::new(
            (self.bounds.min.x + vertex.i as f64 * self.voxel_size) * self.coordinate_scale.x,
            (self.bounds.min.y + vertex.j as f64 * self.voxel_size) * self.coordinate_scale.y,
            (self.bounds.min.z + vertex.k as f64 * self.voxel_size) * self.coordinate_scale.z,
        )
    }

    /// Lattice coordinate of the cell containing a world-space position.
    ///
    /// Positions are in the input coordinate system; the coordinate-scale
    /// vector only affects reconstructed output positions.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // floor() of an in-range extent
    pub fn lattice_coord(&self, position: &Point3<f64>) -> LatticeCoord {
        LatticeCoord::new(
            ((position.x - self.bounds.min.x) / self.voxel_size).floor() as i64,
            ((position.y - self.bounds.min.y) / self.voxel_size).floor() as i64,
            ((position.z - self.bounds.min.z) / self.voxel_size).floor() as i64,
        )
    }

    /// Iterate over all cells.
    ///
    /// The order is unspecified but stable across calls as long as the
    /// grid is not mutated in between.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The deduplicated corner samples referenced by the cells.
    #[must_use]
    pub const fn query_points(&self) -> &QueryPointStore {
        &self.query_points
    }

    /// Number of query points in the grid.
    #[must_use]
    pub fn query_point_count(&self) -> usize {
        self.query_points.len()
    }

    /// Assign a signed distance to a query point, marking it assigned.
    ///
    /// Returns `false` if the index is out of range.
    pub fn set_distance(&mut self, index: u32, distance: f64) -> bool {
        self.query_points.set_distance(index, distance)
    }

    /// Edge length of a lattice cell.
    #[must_use]
    pub const fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    /// The bounding volume the lattice covers.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Per-axis scale applied to reconstructed positions.
    #[must_use]
    pub const fn coordinate_scale(&self) -> &Vector3<f64> {
        &self.coordinate_scale
    }

    /// Per-axis index ceilings `(x, y, z)` computed at construction.
    #[must_use]
    pub const fn dimensions(&self) -> (u64, u64, u64) {
        (self.max_index_x, self.max_index_y, self.max_index_z)
    }

    /// The declared index bound the hash is injective under.
    #[must_use]
    pub const fn max_index(&self) -> u64 {
        self.max_index
    }
}
