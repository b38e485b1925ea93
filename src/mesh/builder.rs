//! Mesh construction.
//!
//! Producers (triangulators, skeleton builders, procedural generators, hand
//! written fixtures) describe a mesh through the [`MeshConstructor`] contract:
//! push the expected element counts, add vertices, add faces or edges by flat
//! index, add connectivity, then pop the finished mesh. [`HalfEdgeBuilder`]
//! implements that contract for [`HalfEdgeMesh`] without the producer ever
//! seeing half-edge internals.
//!
//! For the common case of a complete face list there are one-shot helpers,
//! [`build_from_faces`] and [`build_from_edges`].
//!
//! # Face winding
//!
//! A face with corners `[c0, c1, ..., cn]` gets one half-edge per corner.
//! Half-edge `k` terminates at corner `k`, its `previous` is the half-edge of
//! corner `k - 1` and its `next` the one of corner `k + 1` (cyclically). The
//! face is anchored at the half-edge of corner 0, and every corner vertex is
//! anchored at its own half-edge.

use std::collections::HashMap;
use std::fmt;

use log::{debug, trace};
use nalgebra::{Point2, Point3};

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::payload::VertexPayload;
use crate::error::{MeshError, Result};

// ==================== Descriptors ====================

/// Three vertex indices of a triangle, or three neighbour face indices.
///
/// `-1` marks a missing entry (no neighbour across that side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct TriangleIndex {
    /// First entry.
    pub i0: i32,
    /// Second entry.
    pub i1: i32,
    /// Third entry.
    pub i2: i32,
}

impl TriangleIndex {
    /// Create a new triangle index.
    pub fn new(i0: i32, i1: i32, i2: i32) -> Self {
        Self { i0, i1, i2 }
    }

    /// The three entries in order.
    pub fn to_array(self) -> [i32; 3] {
        [self.i0, self.i1, self.i2]
    }
}

impl fmt::Display for TriangleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.i0, self.i1, self.i2)
    }
}

/// The two endpoint vertex indices of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct EdgeIndex {
    /// Vertex the first half-edge terminates at.
    pub i0: i32,
    /// Vertex the second half-edge terminates at.
    pub i1: i32,
}

impl EdgeIndex {
    /// Create a new edge index.
    pub fn new(i0: i32, i1: i32) -> Self {
        Self { i0, i1 }
    }
}

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.i0, self.i1)
    }
}

/// Explicit links of one half-edge, by flat half-edge index. `-1` is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct EdgeConnection {
    /// The half-edge being connected.
    pub edge: i32,
    /// New `previous` link.
    pub previous: i32,
    /// New `next` link.
    pub next: i32,
    /// Twin to pair with, or `-1` to keep the current one.
    pub opposite: i32,
}

impl EdgeConnection {
    /// Connection that sets `previous` and `next` and leaves the opposite alone.
    pub fn new(edge: i32, previous: i32, next: i32) -> Self {
        Self {
            edge,
            previous,
            next,
            opposite: -1,
        }
    }

    /// Also link `opposite` as the edge's twin.
    pub fn with_opposite(mut self, opposite: i32) -> Self {
        self.opposite = opposite;
        self
    }
}

/// Element counts a producer reports before emitting a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct MeshDescriptor {
    /// Number of vertices.
    pub vertices: i32,
    /// Number of half-edges.
    pub edges: i32,
    /// Number of faces.
    pub faces: i32,
}

impl MeshDescriptor {
    /// Counts of an existing mesh.
    pub fn of<P: VertexPayload, I: MeshIndex>(mesh: &HalfEdgeMesh<P, I>) -> Self {
        let count = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
        Self {
            vertices: count(mesh.num_vertices()),
            edges: count(mesh.num_halfedges()),
            faces: count(mesh.num_faces()),
        }
    }
}

/// Negative descriptor counts are treated as zero.
fn count(n: i32) -> usize {
    usize::try_from(n).unwrap_or(0)
}

/// Largest number of elements reserved up front from producer counts.
///
/// Counts come from outside the crate, so they only size the first
/// allocation; collections still grow past this as elements arrive.
const MAX_RESERVE: usize = 1 << 16;

fn reserve(n: usize) -> usize {
    n.min(MAX_RESERVE)
}

/// `None` for any negative descriptor entry.
fn optional(index: i32) -> Option<usize> {
    usize::try_from(index).ok()
}

// ==================== Builder contract ====================

/// Contract through which a producer populates a mesh.
///
/// Calls must be bracketed by a push and a pop. Indices are flat positions in
/// the order elements were added: vertices by [`add_vertex`](Self::add_vertex),
/// faces by [`add_face`](Self::add_face), half-edges two per
/// [`add_edge`](Self::add_edge) (or one per face corner).
pub trait MeshConstructor {
    /// The finished mesh type.
    type Mesh;

    /// Start a face mesh expecting `num_vertices` vertices and `num_faces` faces.
    fn push_face_mesh(&mut self, num_vertices: usize, num_faces: usize);

    /// Start an edge mesh (polylines) expecting `num_vertices` vertices and
    /// `num_edges` edges.
    fn push_edge_mesh(&mut self, num_vertices: usize, num_edges: usize);

    /// Start a mesh sized from a producer's descriptor.
    ///
    /// A descriptor with faces starts a face mesh, otherwise an edge mesh.
    fn push_mesh(&mut self, descriptor: &MeshDescriptor) {
        if descriptor.faces > 0 {
            self.push_face_mesh(count(descriptor.vertices), count(descriptor.faces));
        } else {
            self.push_edge_mesh(count(descriptor.vertices), count(descriptor.edges));
        }
    }

    /// Finish the mesh in progress and hand it over.
    fn pop_mesh(&mut self) -> Result<Self::Mesh>;

    /// Append a vertex at a planar position.
    fn add_vertex(&mut self, position: Point2<f64>) -> Result<()>;

    /// Append a face through the given vertex indices, in winding order.
    fn add_face(&mut self, corners: &[usize]) -> Result<()>;

    /// Append a triangle face.
    fn add_triangle(&mut self, triangle: TriangleIndex) -> Result<()> {
        let corners = triangle.to_array().map(optional);
        match corners {
            [Some(a), Some(b), Some(c)] => self.add_face(&[a, b, c]),
            _ => Err(MeshError::invalid_param(
                "triangle",
                triangle,
                "corner index is negative",
            )),
        }
    }

    /// Append an edge between two vertices as a pair of opposite half-edges.
    fn add_edge(&mut self, edge: EdgeIndex) -> Result<()>;

    /// Pair the sides of `face` with its neighbour faces (`-1` = none).
    fn add_face_connection(&mut self, face: usize, neighbors: &[i32]) -> Result<()>;

    /// Set the explicit links of one half-edge.
    fn add_edge_connection(&mut self, connection: EdgeConnection) -> Result<()>;
}

// ==================== HalfEdgeBuilder ====================

/// [`MeshConstructor`] producing a [`HalfEdgeMesh`].
///
/// # Example
/// ```
/// use hbmesh::mesh::{HalfEdgeBuilder, MeshConstructor, TriangleIndex};
/// use nalgebra::Point2;
///
/// let mut builder = HalfEdgeBuilder::<Point2<f64>>::new();
/// builder.push_face_mesh(4, 2);
/// for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
///     builder.add_vertex(Point2::new(x, y)).unwrap();
/// }
/// builder.add_triangle(TriangleIndex::new(0, 1, 2)).unwrap();
/// builder.add_triangle(TriangleIndex::new(0, 2, 3)).unwrap();
/// builder.add_face_connection(0, &[-1, -1, 1]).unwrap();
/// builder.add_face_connection(1, &[0, -1, -1]).unwrap();
///
/// let mesh = builder.pop_mesh().unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert!(mesh.is_valid());
/// ```
#[derive(Debug)]
pub struct HalfEdgeBuilder<P = (), I: MeshIndex = u32> {
    mesh: Option<HalfEdgeMesh<P, I>>,
}

impl<P: VertexPayload, I: MeshIndex> Default for HalfEdgeBuilder<P, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: VertexPayload, I: MeshIndex> HalfEdgeBuilder<P, I> {
    /// Create a builder with no mesh in progress.
    pub fn new() -> Self {
        Self { mesh: None }
    }

    /// Check if a mesh has been pushed and not yet popped.
    pub fn in_progress(&self) -> bool {
        self.mesh.is_some()
    }

    /// The mesh in progress, for inspection.
    pub fn mesh(&self) -> Option<&HalfEdgeMesh<P, I>> {
        self.mesh.as_ref()
    }

    fn mesh_mut(&mut self) -> Result<&mut HalfEdgeMesh<P, I>> {
        self.mesh.as_mut().ok_or(MeshError::NoMeshInProgress)
    }

    /// Append a vertex at a spatial position.
    pub fn add_vertex_3d(&mut self, position: Point3<f64>) -> Result<()> {
        let mesh = self.mesh_mut()?;
        let mut data = P::default();
        data.initialize_3d(position);
        mesh.add_vertex(data);
        Ok(())
    }

    /// Pair every half-edge that has no opposite with the half-edge running
    /// the other way between the same two vertices.
    ///
    /// Used when a producer supplies faces but no neighbour information.
    /// Returns the number of pairs linked.
    pub fn link_opposites(&mut self) -> Result<usize> {
        let mesh = self.mesh_mut()?;

        // Directed (source, terminal) pair of every open half-edge
        let mut edge_map: HashMap<(VertexId<I>, VertexId<I>), HalfEdgeId<I>> = HashMap::new();
        let mut open = Vec::new();
        for (id, he) in mesh.halfedges() {
            if he.opposite.is_valid() || !he.vertex.is_valid() {
                continue;
            }
            let source = mesh.edge_vertex(he.previous);
            if source.is_valid() {
                edge_map.entry((source, he.vertex)).or_insert(id);
                open.push((id, (source, he.vertex)));
            }
        }

        let mut linked = 0;
        for (he, (source, target)) in open {
            if mesh.opposite(he).is_valid() {
                continue;
            }
            if let Some(&twin) = edge_map.get(&(target, source)) {
                if twin != he && !mesh.opposite(twin).is_valid() {
                    mesh.halfedge_mut(he).opposite = twin;
                    mesh.halfedge_mut(twin).opposite = he;
                    linked += 1;
                }
            }
        }
        Ok(linked)
    }
}

impl<P: VertexPayload, I: MeshIndex> MeshConstructor for HalfEdgeBuilder<P, I> {
    type Mesh = HalfEdgeMesh<P, I>;

    fn push_face_mesh(&mut self, num_vertices: usize, num_faces: usize) {
        // Room for each triangle corner and a twin for it.
        self.mesh = Some(HalfEdgeMesh::with_capacity(
            reserve(num_vertices),
            reserve(num_faces.saturating_mul(6)),
            reserve(num_faces),
        ));
    }

    fn push_edge_mesh(&mut self, num_vertices: usize, num_edges: usize) {
        self.mesh = Some(HalfEdgeMesh::with_capacity(
            reserve(num_vertices),
            reserve(num_edges),
            0,
        ));
    }

    fn pop_mesh(&mut self) -> Result<HalfEdgeMesh<P, I>> {
        let mesh = self.mesh.take().ok_or(MeshError::NoMeshInProgress)?;
        debug!("built {}", mesh);
        Ok(mesh)
    }

    fn add_vertex(&mut self, position: Point2<f64>) -> Result<()> {
        let mesh = self.mesh_mut()?;
        let mut data = P::default();
        data.initialize(position);
        mesh.add_vertex(data);
        Ok(())
    }

    fn add_face(&mut self, corners: &[usize]) -> Result<()> {
        let mesh = self.mesh_mut()?;
        let n = corners.len();
        if n < 3 {
            return Err(MeshError::topology(format!(
                "a face needs at least 3 corners, got {}",
                n
            )));
        }
        for &c in corners {
            MeshError::check_index("vertex", c, mesh.num_vertices())?;
        }

        let base = mesh.num_halfedges();
        let face = FaceId::<I>::new(mesh.num_faces());
        let edge = |k: usize| HalfEdgeId::<I>::new(base + k % n);

        mesh.faces.push(Face::new(edge(0)));
        for (k, &c) in corners.iter().enumerate() {
            let vertex = VertexId::new(c);
            let mut he = HalfEdge::new();
            he.set(vertex, face, edge(k + n - 1), edge(k + 1), HalfEdgeId::invalid());
            mesh.halfedges.push(he);
            mesh.vertex_mut(vertex).edge = edge(k);
        }
        Ok(())
    }

    fn add_edge(&mut self, edge: EdgeIndex) -> Result<()> {
        let mesh = self.mesh_mut()?;
        let endpoint = |i: i32| {
            optional(i)
                .ok_or_else(|| MeshError::invalid_param("edge", edge, "endpoint index is negative"))
                .and_then(|i| MeshError::check_index("vertex", i, mesh.num_vertices()))
                .map(VertexId::new)
        };
        let v0 = endpoint(edge.i0)?;
        let v1 = endpoint(edge.i1)?;

        let (e0, e1) = mesh.add_edge_pair();
        mesh.halfedge_mut(e0).vertex = v0;
        mesh.vertex_mut(v0).edge = e0;
        mesh.halfedge_mut(e1).vertex = v1;
        mesh.vertex_mut(v1).edge = e1;
        Ok(())
    }

    fn add_face_connection(&mut self, face: usize, neighbors: &[i32]) -> Result<()> {
        let mesh = self.mesh_mut()?;
        let face = FaceId::<I>::new(MeshError::check_index("face", face, mesh.num_faces())?);

        for neighbor in neighbors.iter().filter_map(|&n| optional(n)) {
            let neighbor = FaceId::new(MeshError::check_index("face", neighbor, mesh.num_faces())?);
            let edges = boundary(mesh, face)?;

            let mut paired = false;
            for edge in edges {
                if let Some(twin) = find_reversed(mesh, edge, neighbor)? {
                    mesh.halfedge_mut(edge).opposite = twin;
                    mesh.halfedge_mut(twin).opposite = edge;
                    paired = true;
                    break;
                }
            }
            if !paired {
                trace!("{:?} shares no side with {:?}, left open", face, neighbor);
            }
        }
        Ok(())
    }

    fn add_edge_connection(&mut self, connection: EdgeConnection) -> Result<()> {
        let mesh = self.mesh_mut()?;
        let len = mesh.num_halfedges();
        let resolve = |i: i32| -> Result<HalfEdgeId<I>> {
            match optional(i) {
                Some(i) => MeshError::check_index("half-edge", i, len).map(HalfEdgeId::new),
                None => Ok(HalfEdgeId::invalid()),
            }
        };

        let edge = resolve(connection.edge)?;
        if !edge.is_valid() {
            return Err(MeshError::invalid_param(
                "edge",
                connection.edge,
                "half-edge index is negative",
            ));
        }
        let previous = resolve(connection.previous)?;
        let next = resolve(connection.next)?;
        let opposite = resolve(connection.opposite)?;

        let he = mesh.halfedge_mut(edge);
        he.previous = previous;
        he.next = next;
        if opposite.is_valid() {
            he.opposite = opposite;
            mesh.halfedge_mut(opposite).opposite = edge;
        }
        Ok(())
    }
}

/// Boundary half-edges of a face, starting at its anchor.
fn boundary<P: VertexPayload, I: MeshIndex>(
    mesh: &HalfEdgeMesh<P, I>,
    face: FaceId<I>,
) -> Result<Vec<HalfEdgeId<I>>> {
    let anchor = mesh.face(face).edge;
    if !anchor.is_valid() {
        return Err(MeshError::topology(format!("{:?} has no boundary edge", face)));
    }
    Ok(mesh.edges_around(anchor, true).collect())
}

/// `(source, terminal)` of a face half-edge; both links are required.
fn directed<P: VertexPayload, I: MeshIndex>(
    mesh: &HalfEdgeMesh<P, I>,
    edge: HalfEdgeId<I>,
) -> Result<(VertexId<I>, VertexId<I>)> {
    let terminal = mesh.edge_vertex(edge);
    if !terminal.is_valid() {
        return Err(MeshError::topology(format!("{:?} has no vertex", edge)));
    }
    let previous = mesh.previous(edge);
    if !previous.is_valid() {
        return Err(MeshError::topology(format!("{:?} has no previous edge", edge)));
    }
    let source = mesh.edge_vertex(previous);
    if !source.is_valid() {
        return Err(MeshError::topology(format!(
            "previous edge of {:?} has no vertex",
            edge
        )));
    }
    Ok((source, terminal))
}

/// Half-edge of `neighbor` running the other way along `edge`, if any.
fn find_reversed<P: VertexPayload, I: MeshIndex>(
    mesh: &HalfEdgeMesh<P, I>,
    edge: HalfEdgeId<I>,
    neighbor: FaceId<I>,
) -> Result<Option<HalfEdgeId<I>>> {
    let (source, terminal) = directed(mesh, edge)?;
    for candidate in boundary(mesh, neighbor)? {
        let (s, t) = directed(mesh, candidate)?;
        if s == terminal && t == source {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

// ==================== One-shot helpers ====================

/// Build a face mesh from positions and a face list, pairing opposites by
/// shared vertex pairs.
///
/// Faces may have any number of corners (at least 3) and are given in winding
/// order. Two half-edges become opposites when one runs `a -> b` and the
/// other `b -> a`; sides with no such partner stay open.
///
/// # Example
/// ```
/// use hbmesh::mesh::{build_from_faces, HalfEdgeMesh};
/// use nalgebra::Point2;
///
/// let positions = [
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ];
/// let mesh: HalfEdgeMesh<Point2<f64>> =
///     build_from_faces(&positions, &[[0usize, 1, 2], [0, 2, 3]]).unwrap();
///
/// assert_eq!(mesh.num_halfedges(), 6);
/// assert_eq!(mesh.halfedges().filter(|(_, he)| he.opposite.is_valid()).count(), 2);
/// ```
pub fn build_from_faces<P, I, F>(positions: &[Point2<f64>], faces: &[F]) -> Result<HalfEdgeMesh<P, I>>
where
    P: VertexPayload,
    I: MeshIndex,
    F: AsRef<[usize]>,
{
    let mut builder = HalfEdgeBuilder::new();
    builder.push_face_mesh(positions.len(), faces.len());
    for &p in positions {
        builder.add_vertex(p)?;
    }
    for face in faces {
        builder.add_face(face.as_ref())?;
    }
    builder.link_opposites()?;
    builder.pop_mesh()
}

/// Build a face mesh from positions, a face list and explicit neighbour faces.
///
/// `neighbors[f]` lists the faces adjacent to face `f` (`-1` = none), as
/// triangulators report them.
pub fn build_from_faces_with_neighbors<P, I, F, N>(
    positions: &[Point2<f64>],
    faces: &[F],
    neighbors: &[N],
) -> Result<HalfEdgeMesh<P, I>>
where
    P: VertexPayload,
    I: MeshIndex,
    F: AsRef<[usize]>,
    N: AsRef<[i32]>,
{
    let mut builder = HalfEdgeBuilder::new();
    builder.push_face_mesh(positions.len(), faces.len());
    for &p in positions {
        builder.add_vertex(p)?;
    }
    for face in faces {
        builder.add_face(face.as_ref())?;
    }
    for (f, n) in neighbors.iter().enumerate() {
        builder.add_face_connection(f, n.as_ref())?;
    }
    builder.pop_mesh()
}

/// Build an edge mesh (polyline network) from positions, edges and explicit
/// half-edge connections.
///
/// Edge `k` produces half-edges `2k` (terminating at `i0`) and `2k + 1`
/// (terminating at `i1`).
pub fn build_from_edges<P, I>(
    positions: &[Point2<f64>],
    edges: &[EdgeIndex],
    connections: &[EdgeConnection],
) -> Result<HalfEdgeMesh<P, I>>
where
    P: VertexPayload,
    I: MeshIndex,
{
    let mut builder = HalfEdgeBuilder::new();
    builder.push_edge_mesh(positions.len(), edges.len() * 2);
    for &p in positions {
        builder.add_vertex(p)?;
    }
    for &edge in edges {
        builder.add_edge(edge)?;
    }
    for &connection in connections {
        builder.add_edge_connection(connection)?;
    }
    builder.pop_mesh()
}
