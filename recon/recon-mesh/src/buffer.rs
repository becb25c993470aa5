//! Flat-array mesh export buffer.
//!
//! The export contract consumed by external writer components: vertex
//! positions and triangle indices as flat arrays, with optional per-vertex
//! attribute arrays. This module performs no file serialization itself.

use crate::error::{MeshError, MeshResult};
use crate::half_edge::HalfEdgeMesh;

/// Flat arrays describing a triangle mesh for export.
///
/// Positions are xyz-interleaved, indices come as triangle triples.
/// Attribute arrays are optional; accessors return `None` when an
/// attribute was never set. Polygon faces of the source mesh are
/// fan-triangulated on assembly.
///
/// # Example
///
/// ```
/// use recon_mesh::{HalfEdgeMesh, MeshBuffer};
/// use nalgebra::Point3;
///
/// let mut mesh = HalfEdgeMesh::new();
/// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
/// mesh.insert_face(&[a, b, c]).unwrap();
///
/// let buffer = MeshBuffer::from_mesh(&mesh);
/// assert_eq!(buffer.vertex_count(), 3);
/// assert_eq!(buffer.triangle_count(), 1);
/// assert!(buffer.normals().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshBuffer {
    positions: Vec<f64>,
    indices: Vec<u32>,
    normals: Vec<f64>,
    colors: Vec<u8>,
    confidences: Vec<f64>,
    intensities: Vec<f64>,
}

impl MeshBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a buffer from a half-edge mesh.
    ///
    /// Copies every vertex position and flattens each face into triangle
    /// index triples (a fan from the face's first vertex).
    #[must_use]
    pub fn from_mesh(mesh: &HalfEdgeMesh) -> Self {
        let mut positions = Vec::with_capacity(mesh.vertex_count() * 3);
        for index in 0..mesh.vertex_count() {
            #[allow(clippy::cast_possible_truncation)] // bounded by vertex_count
            if let Some(vertex) = mesh.vertex(index as u32) {
                let p = vertex.position();
                positions.extend_from_slice(&[p.x, p.y, p.z]);
            }
        }

        let mut indices = Vec::new();
        for face in 0..mesh.face_count() {
            #[allow(clippy::cast_possible_truncation)] // bounded by face_count
            let vertices: Vec<u32> = mesh.face_vertices(face as u32).collect();
            for window in 1..vertices.len().saturating_sub(1) {
                indices.extend_from_slice(&[
                    vertices[0],
                    vertices[window],
                    vertices[window + 1],
                ]);
            }
        }

        Self {
            positions,
            indices,
            ..Self::default()
        }
    }

    /// Number of vertices in the buffer.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles in the buffer.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat xyz-interleaved vertex positions.
    #[must_use]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Flat triangle index triples.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Set per-vertex unit normals (xyz-interleaved, 3 entries per vertex).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::AttributeLength`] if the array length does not
    /// match the vertex count.
    pub fn set_normals(&mut self, normals: Vec<f64>) -> MeshResult<()> {
        self.check_length(normals.len(), 3)?;
        self.normals = normals;
        Ok(())
    }

    /// Set per-vertex RGB colors (3 bytes per vertex).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::AttributeLength`] on a length mismatch.
    pub fn set_colors(&mut self, colors: Vec<u8>) -> MeshResult<()> {
        self.check_length(colors.len(), 3)?;
        self.colors = colors;
        Ok(())
    }

    /// Set per-vertex confidence values (1 entry per vertex).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::AttributeLength`] on a length mismatch.
    pub fn set_confidences(&mut self, confidences: Vec<f64>) -> MeshResult<()> {
        self.check_length(confidences.len(), 1)?;
        self.confidences = confidences;
        Ok(())
    }

    /// Set per-vertex intensity values (1 entry per vertex).
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::AttributeLength`] on a length mismatch.
    pub fn set_intensities(&mut self, intensities: Vec<f64>) -> MeshResult<()> {
        self.check_length(intensities.len(), 1)?;
        self.intensities = intensities;
        Ok(())
    }

    /// Per-vertex normals, if set.
    #[must_use]
    pub fn normals(&self) -> Option<&[f64]> {
        (!self.normals.is_empty()).then_some(self.normals.as_slice())
    }

    /// Per-vertex colors, if set.
    #[must_use]
    pub fn colors(&self) -> Option<&[u8]> {
        (!self.colors.is_empty()).then_some(self.colors.as_slice())
    }

    /// Per-vertex confidences, if set.
    #[must_use]
    pub fn confidences(&self) -> Option<&[f64]> {
        (!self.confidences.is_empty()).then_some(self.confidences.as_slice())
    }

    /// Per-vertex intensities, if set.
    #[must_use]
    pub fn intensities(&self) -> Option<&[f64]> {
        (!self.intensities.is_empty()).then_some(self.intensities.as_slice())
    }

    fn check_length(&self, actual: usize, per_vertex: usize) -> MeshResult<()> {
        let expected = self.vertex_count() * per_vertex;
        if actual == expected {
            Ok(())
        } else {
            Err(MeshError::AttributeLength { expected, actual })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn quad_mesh() -> HalfEdgeMesh {
        let mut mesh = HalfEdgeMesh::new();
        let v: Vec<u32> = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
        .into_iter()
        .map(|p| mesh.add_vertex(p))
        .collect();
        mesh.insert_face(&v).unwrap();
        mesh
    }

    #[test]
    fn empty_mesh_empty_buffer() {
        let buffer = MeshBuffer::from_mesh(&HalfEdgeMesh::new());
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(buffer.triangle_count(), 0);
    }

    #[test]
    fn positions_are_interleaved() {
        let buffer = MeshBuffer::from_mesh(&quad_mesh());

        assert_eq!(buffer.vertex_count(), 4);
        assert_eq!(buffer.positions().len(), 12);
        assert_relative_eq!(buffer.positions()[3], 1.0); // vertex 1, x
        assert_relative_eq!(buffer.positions()[7], 1.0); // vertex 2, y
    }

    #[test]
    fn quad_fan_triangulates_into_two_triangles() {
        let buffer = MeshBuffer::from_mesh(&quad_mesh());

        assert_eq!(buffer.triangle_count(), 2);
        assert_eq!(buffer.indices(), &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn attribute_accessors_default_to_none() {
        let buffer = MeshBuffer::from_mesh(&quad_mesh());

        assert!(buffer.normals().is_none());
        assert!(buffer.colors().is_none());
        assert!(buffer.confidences().is_none());
        assert!(buffer.intensities().is_none());
    }

    #[test]
    fn attribute_length_is_validated() {
        let mut buffer = MeshBuffer::from_mesh(&quad_mesh());

        let result = buffer.set_normals(vec![0.0; 7]);
        assert_eq!(
            result,
            Err(MeshError::AttributeLength {
                expected: 12,
                actual: 7,
            })
        );

        assert!(buffer.set_normals(vec![0.0; 12]).is_ok());
        assert_eq!(buffer.normals().map(<[f64]>::len), Some(12));
    }

    #[test]
    fn scalar_attributes_use_one_entry_per_vertex() {
        let mut buffer = MeshBuffer::from_mesh(&quad_mesh());

        assert!(buffer.set_confidences(vec![1.0; 4]).is_ok());
        assert!(buffer.set_intensities(vec![0.5; 4]).is_ok());
        assert!(buffer.set_colors(vec![255; 12]).is_ok());

        assert_eq!(buffer.confidences().map(<[f64]>::len), Some(4));
        assert_eq!(buffer.colors().map(<[u8]>::len), Some(12));
    }
}
