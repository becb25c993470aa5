//! Half-edge mesh connectivity.
//!
//! A directed-edge representation of a polygon mesh with O(1) traversal of
//! a face's boundary and O(1) lookup of the opposite-oriented edge sharing
//! the same two endpoints.
//!
//! All vertices, half-edges and faces live in arenas owned by the mesh;
//! `next`, `pair` and `face` are indices into those arenas. Teardown is a
//! single arena release — the structure is cyclic by nature and must never
//! be dropped by chasing `next`/`pair` references.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult};

/// A vertex of a half-edge mesh.
#[derive(Debug, Clone)]
pub struct MeshVertex {
    position: Point3<f64>,
    /// One outgoing half-edge, set when the first incident face arrives.
    edge: Option<u32>,
}

impl MeshVertex {
    /// World-space position of the vertex.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Point3<f64> {
        self.position
    }

    /// One outgoing half-edge, if any face touches this vertex.
    #[inline]
    #[must_use]
    pub const fn edge(&self) -> Option<u32> {
        self.edge
    }
}

/// One direction of a mesh edge.
///
/// Two half-edges of opposite orientation share each undirected edge; a
/// half-edge whose `pair` is `None` lies on the mesh boundary.
#[derive(Debug, Clone)]
pub struct HalfEdge {
    start: u32,
    end: u32,
    next: u32,
    pair: Option<u32>,
    face: u32,
    /// Transient flag for construction-time sweeps.
    used: bool,
}

impl HalfEdge {
    /// Index of the start vertex.
    #[inline]
    #[must_use]
    pub const fn start(&self) -> u32 {
        self.start
    }

    /// Index of the end vertex.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.end
    }

    /// The next half-edge continuing the same face boundary.
    #[inline]
    #[must_use]
    pub const fn next(&self) -> u32 {
        self.next
    }

    /// The opposite-oriented half-edge on the same undirected edge, once
    /// the adjacent face has been inserted.
    #[inline]
    #[must_use]
    pub const fn pair(&self) -> Option<u32> {
        self.pair
    }

    /// The face this half-edge bounds.
    #[inline]
    #[must_use]
    pub const fn face(&self) -> u32 {
        self.face
    }

    /// Whether this half-edge lies on the mesh boundary (no pair).
    #[inline]
    #[must_use]
    pub const fn is_boundary(&self) -> bool {
        self.pair.is_none()
    }
}

/// A face of the mesh: a closed cycle of half-edges.
#[derive(Debug, Clone)]
pub struct Face {
    edge: u32,
    sides: u32,
}

impl Face {
    /// The first half-edge of the face's boundary cycle.
    #[inline]
    #[must_use]
    pub const fn edge(&self) -> u32 {
        self.edge
    }

    /// Number of boundary segments (and vertices) of the face.
    #[inline]
    #[must_use]
    pub const fn sides(&self) -> u32 {
        self.sides
    }
}

/// A polygon mesh with half-edge connectivity.
///
/// Faces are inserted one at a time; each insertion links the face's
/// `next` cycle and pairs every new half-edge against the mirror edge of
/// a previously inserted adjacent face, looked up by the unordered
/// endpoint pair. Half-edges that stay unpaired after all faces are in
/// denote an open boundary — a valid terminal state, surfaced through
/// [`boundary_edge_count`](Self::boundary_edge_count) and
/// [`boundary_loops`](Self::boundary_loops), never an error.
///
/// # Example
///
/// ```
/// use recon_mesh::HalfEdgeMesh;
/// use nalgebra::Point3;
///
/// let mut mesh = HalfEdgeMesh::new();
/// let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
///
/// mesh.insert_face(&[a, b, c]).unwrap();
///
/// // A lone triangle is all boundary
/// assert_eq!(mesh.boundary_edge_count(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    vertices: Vec<MeshVertex>,
    edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    /// Half-edges still waiting for their mirror, keyed by the unordered
    /// endpoint pair.
    open_edges: HashMap<(u32, u32), u32>,
}

impl HalfEdgeMesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        let index = u32::try_from(self.vertices.len()).unwrap_or(u32::MAX);
        self.vertices.push(MeshVertex {
            position,
            edge: None,
        });
        index
    }

    /// Insert a polygon face given its boundary vertices in cyclic order.
    ///
    /// Creates one half-edge per boundary segment, links them into a
    /// `next` cycle, and pairs each new half-edge with its mirror (same
    /// endpoints, opposite order) when the adjacent face was already
    /// inserted. Returns the face index.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::FaceTooSmall`] for fewer than three vertices,
    /// [`MeshError::VertexOutOfRange`] for an unknown vertex index, and
    /// [`MeshError::DegenerateFace`] if a vertex repeats within the face.
    pub fn insert_face(&mut self, vertices: &[u32]) -> MeshResult<u32> {
        if vertices.len() < 3 {
            return Err(MeshError::FaceTooSmall(vertices.len()));
        }
        for &v in vertices {
            if v as usize >= self.vertices.len() {
                return Err(MeshError::VertexOutOfRange {
                    index: v,
                    vertex_count: self.vertices.len(),
                });
            }
        }
        for (idx, &v) in vertices.iter().enumerate() {
            if vertices[idx + 1..].contains(&v) {
                return Err(MeshError::DegenerateFace);
            }
        }

        let face_index = u32::try_from(self.faces.len()).unwrap_or(u32::MAX);
        let base = u32::try_from(self.edges.len()).unwrap_or(u32::MAX);
        let count = vertices.len();

        for (idx, &start) in vertices.iter().enumerate() {
            let successor = (idx + 1) % count;
            #[allow(clippy::cast_possible_truncation)] // face vertex counts are tiny
            self.edges.push(HalfEdge {
                start,
                end: vertices[successor],
                next: base + successor as u32,
                pair: None,
                face: face_index,
                used: false,
            });
        }
        self.faces.push(Face {
            edge: base,
            sides: u32::try_from(count).unwrap_or(u32::MAX),
        });

        for offset in 0..count {
            #[allow(clippy::cast_possible_truncation)]
            let edge_index = base + offset as u32;
            let (start, end) = {
                let edge = &self.edges[edge_index as usize];
                (edge.start, edge.end)
            };

            if self.vertices[start as usize].edge.is_none() {
                self.vertices[start as usize].edge = Some(edge_index);
            }

            let key = normalize_endpoints(start, end);
            if let Some(&candidate) = self.open_edges.get(&key) {
                let mirror = &self.edges[candidate as usize];
                if mirror.pair.is_none() && mirror.start == end && mirror.end == start {
                    self.edges[candidate as usize].pair = Some(edge_index);
                    self.edges[edge_index as usize].pair = Some(candidate);
                    self.open_edges.remove(&key);
                } else {
                    // Third face on the edge, or a duplicate orientation:
                    // the new half-edge stays unpaired
                    warn!(start, end, "non-manifold edge");
                }
            } else {
                self.open_edges.insert(key, edge_index);
            }
        }

        Ok(face_index)
    }

    /// Get a vertex by index.
    #[must_use]
    pub fn vertex(&self, index: u32) -> Option<&MeshVertex> {
        self.vertices.get(index as usize)
    }

    /// Get a half-edge by index.
    #[must_use]
    pub fn edge(&self, index: u32) -> Option<&HalfEdge> {
        self.edges.get(index as usize)
    }

    /// Get a face by index.
    #[must_use]
    pub fn face(&self, index: u32) -> Option<&Face> {
        self.faces.get(index as usize)
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges (twice the undirected interior edge count
    /// plus the boundary edge count).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterate over the half-edge indices of a face's boundary cycle.
    ///
    /// Yields every boundary edge exactly once, in cycle order, starting
    /// from the face's first half-edge. An unknown face index yields
    /// nothing.
    #[must_use]
    pub fn face_edges(&self, face: u32) -> FaceEdges<'_> {
        match self.faces.get(face as usize) {
            Some(f) => FaceEdges {
                mesh: self,
                current: f.edge,
                remaining: f.sides,
            },
            None => FaceEdges {
                mesh: self,
                current: 0,
                remaining: 0,
            },
        }
    }

    /// Iterate over the vertex indices of a face in cycle order.
    pub fn face_vertices(&self, face: u32) -> impl Iterator<Item = u32> + '_ {
        self.face_edges(face)
            .map(move |edge| self.edges[edge as usize].start)
    }

    /// Iterate over the outgoing half-edges around a vertex.
    ///
    /// Walks the standard `pair`/`next` one-ring. The walk stops at a
    /// boundary (an unpaired incoming edge) or when the ring closes, and
    /// is structurally bounded by the total edge count so a corrupt mesh
    /// cannot loop forever.
    #[must_use]
    pub fn vertex_ring(&self, vertex: u32) -> VertexRing<'_> {
        let start = self
            .vertices
            .get(vertex as usize)
            .and_then(MeshVertex::edge);
        VertexRing {
            mesh: self,
            start,
            current: start,
            steps: 0,
        }
    }

    /// Number of half-edges with no pair.
    ///
    /// Zero for a closed manifold mesh; for an open mesh this is the
    /// number of boundary segments.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.pair.is_none()).count()
    }

    /// Iterate over the indices of all boundary half-edges.
    pub fn boundary_edges(&self) -> impl Iterator<Item = u32> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.pair.is_none())
            .map(|(idx, _)| u32::try_from(idx).unwrap_or(u32::MAX))
    }

    /// Check if the mesh is closed (no boundary edges).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.edges.iter().all(|e| e.pair.is_some())
    }

    /// Trace all boundary loops of the mesh.
    ///
    /// Each loop is the ordered list of vertex indices around one hole
    /// (or around the open rim of a surface patch). A closed mesh has no
    /// loops. Uses the per-edge sweep flag, hence `&mut self`.
    pub fn boundary_loops(&mut self) -> Vec<Vec<u32>> {
        for edge in &mut self.edges {
            edge.used = false;
        }

        let mut outgoing: HashMap<u32, Vec<u32>> = HashMap::new();
        let mut seeds = Vec::new();
        for (idx, edge) in self.edges.iter().enumerate() {
            if edge.pair.is_none() {
                let index = u32::try_from(idx).unwrap_or(u32::MAX);
                outgoing.entry(edge.start).or_default().push(index);
                seeds.push(index);
            }
        }

        let mut loops = Vec::new();
        for seed in seeds {
            if self.edges[seed as usize].used {
                continue;
            }

            let mut loop_vertices = Vec::new();
            let mut current = seed;
            loop {
                self.edges[current as usize].used = true;
                loop_vertices.push(self.edges[current as usize].start);

                let end = self.edges[current as usize].end;
                let next = outgoing.get(&end).and_then(|candidates| {
                    candidates
                        .iter()
                        .copied()
                        .find(|&c| !self.edges[c as usize].used)
                });
                match next {
                    Some(edge) => current = edge,
                    None => break,
                }
            }
            loops.push(loop_vertices);
        }

        debug!(count = loops.len(), "traced boundary loops");
        loops
    }
}

/// Normalize an endpoint pair so lookup ignores orientation.
#[inline]
const fn normalize_endpoints(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Iterator over the half-edges of one face boundary cycle.
pub struct FaceEdges<'a> {
    mesh: &'a HalfEdgeMesh,
    current: u32,
    remaining: u32,
}

impl Iterator for FaceEdges<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let edge = self.current;
        self.current = self.mesh.edges[edge as usize].next;
        Some(edge)
    }
}

/// Iterator over the outgoing half-edges around one vertex.
pub struct VertexRing<'a> {
    mesh: &'a HalfEdgeMesh,
    start: Option<u32>,
    current: Option<u32>,
    steps: usize,
}

impl Iterator for VertexRing<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let edge = self.current?;
        if self.steps > 0 && Some(edge) == self.start {
            return None;
        }
        if self.steps >= self.mesh.edges.len() {
            return None;
        }
        self.steps += 1;

        // pair(edge) ends at our vertex; its next starts there again
        self.current = self.mesh.edges[edge as usize]
            .pair
            .map(|p| self.mesh.edges[p as usize].next);
        Some(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> HalfEdgeMesh {
        let mut mesh = HalfEdgeMesh::new();
        let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.insert_face(&[a, b, c]).unwrap();
        mesh
    }

    /// Four consistently wound faces over four vertices.
    fn tetrahedron_mesh() -> HalfEdgeMesh {
        let mut mesh = HalfEdgeMesh::new();
        let v: Vec<u32> = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ]
        .into_iter()
        .map(|p| mesh.add_vertex(p))
        .collect();

        mesh.insert_face(&[v[0], v[2], v[1]]).unwrap();
        mesh.insert_face(&[v[0], v[1], v[3]]).unwrap();
        mesh.insert_face(&[v[1], v[2], v[3]]).unwrap();
        mesh.insert_face(&[v[2], v[0], v[3]]).unwrap();
        mesh
    }

    #[test]
    fn face_needs_three_vertices() {
        let mut mesh = HalfEdgeMesh::new();
        let a = mesh.add_vertex(Point3::origin());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));

        assert_eq!(mesh.insert_face(&[a, b]), Err(MeshError::FaceTooSmall(2)));
    }

    #[test]
    fn face_rejects_unknown_vertex() {
        let mut mesh = HalfEdgeMesh::new();
        let a = mesh.add_vertex(Point3::origin());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));

        let result = mesh.insert_face(&[a, b, 9]);
        assert!(matches!(
            result,
            Err(MeshError::VertexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn face_rejects_repeated_vertex() {
        let mut mesh = HalfEdgeMesh::new();
        let a = mesh.add_vertex(Point3::origin());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));

        assert_eq!(mesh.insert_face(&[a, b, a]), Err(MeshError::DegenerateFace));
    }

    #[test]
    fn single_triangle_is_all_boundary() {
        let mesh = triangle_mesh();

        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.boundary_edge_count(), 3);
        assert!(!mesh.is_closed());
    }

    #[test]
    fn next_cycle_length_equals_face_sides() {
        let mesh = triangle_mesh();
        let edges: Vec<u32> = mesh.face_edges(0).collect();
        assert_eq!(edges.len(), 3);

        // Walking next from each edge returns to it after exactly 3 steps
        for &start in &edges {
            let mut current = start;
            for _ in 0..3 {
                current = mesh.edge(current).unwrap().next();
            }
            assert_eq!(current, start);
        }
    }

    #[test]
    fn quad_face_cycle() {
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

        let face = mesh.insert_face(&v).unwrap();
        let vertices: Vec<u32> = mesh.face_vertices(face).collect();
        assert_eq!(vertices, v);
    }

    #[test]
    fn shared_edge_pairs_both_ways() {
        let mut mesh = HalfEdgeMesh::new();
        let v: Vec<u32> = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]
        .into_iter()
        .map(|p| mesh.add_vertex(p))
        .collect();

        mesh.insert_face(&[v[0], v[1], v[2]]).unwrap();
        mesh.insert_face(&[v[1], v[3], v[2]]).unwrap();

        // One interior edge (1,2), four boundary edges
        assert_eq!(mesh.boundary_edge_count(), 4);

        let paired: Vec<u32> = (0..6)
            .filter(|&e| mesh.edge(e).unwrap().pair().is_some())
            .collect();
        assert_eq!(paired.len(), 2);

        for &e in &paired {
            let pair = mesh.edge(e).unwrap().pair().unwrap();
            assert_eq!(mesh.edge(pair).unwrap().pair(), Some(e));
            assert_eq!(mesh.edge(e).unwrap().start(), mesh.edge(pair).unwrap().end());
            assert_eq!(mesh.edge(e).unwrap().end(), mesh.edge(pair).unwrap().start());
        }
    }

    #[test]
    fn closed_mesh_has_no_boundary() {
        let mut mesh = tetrahedron_mesh();

        assert_eq!(mesh.edge_count(), 12);
        assert!(mesh.is_closed());
        assert_eq!(mesh.boundary_edge_count(), 0);
        assert!(mesh.boundary_loops().is_empty());
    }

    #[test]
    fn open_triangle_has_one_boundary_loop() {
        let mut mesh = triangle_mesh();
        let loops = mesh.boundary_loops();

        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 3);

        let mut sorted = loops[0].clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn vertex_ring_terminates_at_degree() {
        let mesh = tetrahedron_mesh();

        // Every tetrahedron vertex has degree 3
        for vertex in 0..4 {
            let ring: Vec<u32> = mesh.vertex_ring(vertex).collect();
            assert_eq!(ring.len(), 3, "vertex {vertex}");
            for edge in ring {
                assert_eq!(mesh.edge(edge).unwrap().start(), vertex);
            }
        }
    }

    #[test]
    fn vertex_ring_of_isolated_vertex_is_empty() {
        let mut mesh = HalfEdgeMesh::new();
        let v = mesh.add_vertex(Point3::origin());
        assert_eq!(mesh.vertex_ring(v).count(), 0);
    }

    #[test]
    fn boundary_edges_listing_matches_count() {
        let mesh = triangle_mesh();
        let listed: Vec<u32> = mesh.boundary_edges().collect();
        assert_eq!(listed.len(), mesh.boundary_edge_count());
    }
}
