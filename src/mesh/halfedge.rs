//! Half-edge mesh data structure.
//!
//! This module provides the arena that owns every vertex, half-edge and face
//! of a mesh, plus the traversal primitives the rest of the crate is written
//! against.
//!
//! # Structure
//!
//! - Each undirected edge is split into two **half-edges**, linked as each
//!   other's `opposite`
//! - A half-edge stores its **terminal** vertex (the vertex it points to), its
//!   incident face, and its `next` / `previous` half-edge along the face or
//!   polyline chain
//! - Each vertex stores one incident half-edge that terminates at it
//! - Each face stores one half-edge on its boundary
//!
//! # Open chains
//!
//! Any link may be null. A null link ends a traversal instead of failing, so
//! open polylines, partially built faces and boundary vertices can all be
//! walked with the same iterators as closed faces.

use std::fmt;

use log::debug;
use rayon::prelude::*;

use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::payload::{Position, VertexPayload};
use crate::error::{MeshError, Result};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<P = (), I: MeshIndex = u32> {
    /// One half-edge whose terminal vertex is this vertex.
    /// Null for an isolated vertex.
    pub edge: HalfEdgeId<I>,

    /// Payload (position) of this vertex.
    pub data: P,
}

impl<P: VertexPayload, I: MeshIndex> Vertex<P, I> {
    /// Create an isolated vertex carrying `data`.
    pub fn new(data: P) -> Self {
        Self {
            edge: HalfEdgeId::invalid(),
            data,
        }
    }

    /// Null the incident edge.
    pub fn clear(&mut self) {
        self.edge = HalfEdgeId::invalid();
    }
}

impl<P: Default, I: MeshIndex> Default for Vertex<P, I> {
    fn default() -> Self {
        Self {
            edge: HalfEdgeId::invalid(),
            data: P::default(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge points to.
    pub vertex: VertexId<I>,

    /// The face this half-edge bounds. Null on open chains.
    pub face: FaceId<I>,

    /// The next half-edge along the face or chain.
    pub next: HalfEdgeId<I>,

    /// The previous half-edge along the face or chain.
    pub previous: HalfEdgeId<I>,

    /// The opposite half-edge (pointing in the reverse direction).
    pub opposite: HalfEdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge.
    pub fn new() -> Self {
        Self {
            vertex: VertexId::invalid(),
            face: FaceId::invalid(),
            next: HalfEdgeId::invalid(),
            previous: HalfEdgeId::invalid(),
            opposite: HalfEdgeId::invalid(),
        }
    }

    /// Assign every link at once. No validation is performed.
    pub fn set(
        &mut self,
        vertex: VertexId<I>,
        face: FaceId<I>,
        previous: HalfEdgeId<I>,
        next: HalfEdgeId<I>,
        opposite: HalfEdgeId<I>,
    ) {
        self.vertex = vertex;
        self.face = face;
        self.previous = previous;
        self.next = next;
        self.opposite = opposite;
    }

    /// Null every link.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub edge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given boundary half-edge.
    pub fn new(edge: HalfEdgeId<I>) -> Self {
        Self { edge }
    }

    /// Null the boundary reference. The boundary cycle itself is left linked.
    pub fn clear(&mut self) {
        self.edge = HalfEdgeId::invalid();
    }
}

impl<I: MeshIndex> Default for Face<I> {
    fn default() -> Self {
        Self {
            edge: HalfEdgeId::invalid(),
        }
    }
}

/// A half-edge mesh over polygons or open polylines.
///
/// The mesh owns three ordered collections; every link between elements is a
/// handle into them. `P` is the vertex payload, see [`super::payload`].
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<P = (), I: MeshIndex = u32> {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex<P, I>>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge<I>>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face<I>>,
}

impl<P, I: MeshIndex> fmt::Display for HalfEdgeMesh<P, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HalfEdgeMesh(vertices: {}, half-edges: {}, faces: {})",
            self.vertices.len(),
            self.halfedges.len(),
            self.faces.len()
        )
    }
}

impl<P: VertexPayload, I: MeshIndex> Default for HalfEdgeMesh<P, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: VertexPayload, I: MeshIndex> HalfEdgeMesh<P, I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create an empty mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_halfedges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    /// Clear the mesh, then allocate the given number of default elements.
    ///
    /// Every element starts with null links, ready to be wired by hand or by a
    /// builder.
    pub fn fill(&mut self, num_vertices: usize, num_halfedges: usize, num_faces: usize) {
        self.clear();
        self.vertices.resize_with(num_vertices, Vertex::default);
        self.halfedges.resize(num_halfedges, HalfEdge::new());
        self.faces.resize(num_faces, Face::default());
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.halfedges.clear();
        self.faces.clear();
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by handle.
    ///
    /// # Panics
    /// Panics if the handle is null or out of range.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<P, I> {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex by handle.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<P, I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by handle.
    ///
    /// # Panics
    /// Panics if the handle is null or out of range.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a mutable half-edge by handle.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by handle.
    ///
    /// # Panics
    /// Panics if the handle is null or out of range.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get a mutable face by handle.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Null-tolerant half-edge lookup.
    #[inline]
    pub(crate) fn try_halfedge(&self, id: HalfEdgeId<I>) -> Option<&HalfEdge<I>> {
        if id.is_valid() {
            self.halfedges.get(id.index())
        } else {
            None
        }
    }

    /// Assign every link of a half-edge at once. No validation is performed.
    pub fn set_edge(
        &mut self,
        he: HalfEdgeId<I>,
        vertex: VertexId<I>,
        face: FaceId<I>,
        previous: HalfEdgeId<I>,
        next: HalfEdgeId<I>,
        opposite: HalfEdgeId<I>,
    ) {
        self.halfedge_mut(he)
            .set(vertex, face, previous, next, opposite);
    }

    /// Flat index of a vertex handle, `None` if null or out of range.
    #[inline]
    pub fn vertex_index(&self, v: VertexId<I>) -> Option<usize> {
        v.get().map(VertexId::index).filter(|&i| i < self.vertices.len())
    }

    /// Flat index of a half-edge handle, `None` if null or out of range.
    #[inline]
    pub fn edge_index(&self, he: HalfEdgeId<I>) -> Option<usize> {
        he.get().map(HalfEdgeId::index).filter(|&i| i < self.halfedges.len())
    }

    /// Flat index of a face handle, `None` if null or out of range.
    #[inline]
    pub fn face_index(&self, f: FaceId<I>) -> Option<usize> {
        f.get().map(FaceId::index).filter(|&i| i < self.faces.len())
    }

    // ==================== Half-edge links ====================

    /// Terminal vertex of a half-edge. Null for a null handle.
    #[inline]
    pub fn edge_vertex(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.try_halfedge(he).map_or_else(VertexId::invalid, |e| e.vertex)
    }

    /// Face of a half-edge. Null for a null handle.
    #[inline]
    pub fn edge_face(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.try_halfedge(he).map_or_else(FaceId::invalid, |e| e.face)
    }

    /// Next half-edge along the face or chain. Null for a null handle.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.try_halfedge(he).map_or_else(HalfEdgeId::invalid, |e| e.next)
    }

    /// Previous half-edge along the face or chain. Null for a null handle.
    #[inline]
    pub fn previous(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.try_halfedge(he)
            .map_or_else(HalfEdgeId::invalid, |e| e.previous)
    }

    /// Opposite half-edge. Null for a null handle.
    #[inline]
    pub fn opposite(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.try_halfedge(he)
            .map_or_else(HalfEdgeId::invalid, |e| e.opposite)
    }

    /// The vertex a half-edge leaves from.
    ///
    /// Taken from the opposite half-edge, falling back to the previous one on
    /// chains without opposites.
    pub fn source(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        let opposite = self.opposite(he);
        if opposite.is_valid() {
            self.edge_vertex(opposite)
        } else {
            self.edge_vertex(self.previous(he))
        }
    }

    // ==================== Half-edge cycles ====================

    /// Number of half-edges reached by walking `next` from `he`.
    ///
    /// Counts the full cycle when it closes, or the partial chain up to the
    /// first null link.
    pub fn edge_count(&self, he: HalfEdgeId<I>) -> usize {
        self.edges_around(he, true).count()
    }

    /// Whether walking `next` from `he` returns to `he` without hitting null.
    pub fn is_closed(&self, he: HalfEdgeId<I>) -> bool {
        if self.try_halfedge(he).is_none() {
            return false;
        }
        let mut current = he;
        for _ in 0..self.halfedges.len() {
            current = self.next(current);
            if current == he {
                return true;
            }
            if self.try_halfedge(current).is_none() {
                return false;
            }
        }
        false
    }

    /// Iterate the half-edges of the cycle or chain containing `he`.
    ///
    /// Walks `next` when `ccw` is true and `previous` otherwise, starting with
    /// `he` itself and stopping on return to `he` or at a null link.
    pub fn edges_around(&self, he: HalfEdgeId<I>, ccw: bool) -> EdgeCycleIter<'_, P, I> {
        EdgeCycleIter::new(self, he, ccw)
    }

    /// Iterate the terminal vertices along the cycle or chain containing `he`.
    ///
    /// Stops, without yielding, at the first half-edge with a null vertex.
    pub fn vertices_around(
        &self,
        he: HalfEdgeId<I>,
        ccw: bool,
    ) -> impl Iterator<Item = VertexId<I>> + Clone + '_ {
        self.edges_around(he, ccw)
            .map_while(move |e| self.edge_vertex(e).get())
    }

    // ==================== Vertices ====================

    /// Add an isolated vertex and return its handle.
    pub fn add_vertex(&mut self, data: P) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(data));
        id
    }

    /// Add an unlinked half-edge and return its handle.
    pub fn add_halfedge(&mut self) -> HalfEdgeId<I> {
        let id = HalfEdgeId::new(self.halfedges.len());
        self.halfedges.push(HalfEdge::new());
        id
    }

    /// Add two unlinked half-edges that are each other's opposite.
    pub fn add_edge_pair(&mut self) -> (HalfEdgeId<I>, HalfEdgeId<I>) {
        let e0 = self.add_halfedge();
        let e1 = self.add_halfedge();
        self.halfedge_mut(e0).opposite = e1;
        self.halfedge_mut(e1).opposite = e0;
        (e0, e1)
    }

    /// Add a face with the given boundary half-edge and return its handle.
    ///
    /// The boundary edges' face links are not touched.
    pub fn add_face_record(&mut self, edge: HalfEdgeId<I>) -> FaceId<I> {
        let id = FaceId::new(self.faces.len());
        self.faces.push(Face::new(edge));
        id
    }

    /// Incident half-edge of a vertex. Null for a null handle.
    #[inline]
    pub fn vertex_edge(&self, v: VertexId<I>) -> HalfEdgeId<I> {
        if !v.is_valid() {
            return HalfEdgeId::invalid();
        }
        self.vertices
            .get(v.index())
            .map_or_else(HalfEdgeId::invalid, |vert| vert.edge)
    }

    /// Vertex reached through the incident edge's `previous`.
    pub fn vertex_previous(&self, v: VertexId<I>) -> VertexId<I> {
        self.edge_vertex(self.previous(self.vertex_edge(v)))
    }

    /// Vertex reached through the incident edge's `next`.
    pub fn vertex_next(&self, v: VertexId<I>) -> VertexId<I> {
        self.edge_vertex(self.next(self.vertex_edge(v)))
    }

    /// Number of half-edges in the rotation around `v`.
    ///
    /// Rotates with `next.opposite`, stopping when the rotation closes or a
    /// link is null (a boundary vertex).
    pub fn vertex_edge_count(&self, v: VertexId<I>) -> usize {
        self.vertex_edges(v, true).count()
    }

    /// Iterate the rotation of half-edges terminating at `v`.
    ///
    /// `ccw` rotates with `next.opposite`, otherwise with `opposite.previous`.
    /// An isolated vertex yields nothing.
    pub fn vertex_edges(&self, v: VertexId<I>, ccw: bool) -> VertexRotationIter<'_, P, I> {
        VertexRotationIter::new(self, self.vertex_edge(v), ccw)
    }

    // ==================== Faces ====================

    /// Number of half-edges on the boundary of `f`; 0 if it has no boundary.
    pub fn face_edge_count(&self, f: FaceId<I>) -> usize {
        match self.face_index(f) {
            Some(i) => self.edge_count(self.faces[i].edge),
            None => 0,
        }
    }

    /// Null the boundary reference of `f` without unlinking its cycle.
    pub fn clear_face(&mut self, f: FaceId<I>) {
        self.face_mut(f).clear();
    }

    /// Remove every face and null the face link of every half-edge.
    pub fn remove_faces(&mut self) {
        debug!("removing all {} faces", self.faces.len());
        self.faces.clear();
        for he in &mut self.halfedges {
            he.face = FaceId::invalid();
        }
    }

    /// Remove one face, keeping the order of the remaining faces.
    ///
    /// Every half-edge that bounded `f` loses its face link; links to faces
    /// stored after `f` are shifted down to follow the compaction.
    pub fn remove_face(&mut self, f: FaceId<I>) -> Result<()> {
        let removed = MeshError::check_index("face", f.index(), self.faces.len())?;
        self.faces.remove(removed);

        let mut detached = 0usize;
        for he in &mut self.halfedges {
            if he.face == f {
                he.face = FaceId::invalid();
                detached += 1;
            } else if he.face.is_valid() && he.face.index() > removed {
                he.face = FaceId::new(he.face.index() - 1);
            }
        }
        debug!("removed face {:?}, detached {} half-edges", f, detached);
        Ok(())
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex handles.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their handles.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId<I>, &Vertex<P, I>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge handles.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their handles.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, &HalfEdge<I>)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all face handles.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their handles.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId<I>, &Face<I>)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    // ==================== Compaction ====================

    /// Drop the vertices and half-edges whose `keep` flag is false.
    ///
    /// Survivors keep their relative order. Every handle is remapped to the
    /// new indices; handles to dropped elements become null, except face and
    /// vertex anchors, which move to a surviving half-edge of the same cycle
    /// or with the same terminal vertex when there is one.
    pub(crate) fn compact(&mut self, keep_vertex: &[bool], keep_edge: &[bool]) {
        debug_assert_eq!(keep_vertex.len(), self.vertices.len());
        debug_assert_eq!(keep_edge.len(), self.halfedges.len());

        let vertex_map = compaction_map(keep_vertex);
        let edge_map = compaction_map(keep_edge);

        // Re-anchor faces whose boundary edge is going away.
        for fi in 0..self.faces.len() {
            let anchor = self.faces[fi].edge;
            if self.try_halfedge(anchor).is_some() && !keep_edge[anchor.index()] {
                let replacement = self
                    .edges_around(anchor, true)
                    .find(|e| keep_edge[e.index()])
                    .unwrap_or_else(HalfEdgeId::invalid);
                self.faces[fi].edge = replacement;
            }
        }

        // Re-anchor surviving vertices whose incident edge is going away.
        for vi in 0..self.vertices.len() {
            let anchor = self.vertices[vi].edge;
            if !keep_vertex[vi] || self.try_halfedge(anchor).is_none() || keep_edge[anchor.index()]
            {
                continue;
            }
            let v = VertexId::new(vi);
            let replacement = self
                .halfedges()
                .find(|(id, he)| keep_edge[id.index()] && he.vertex == v)
                .map_or_else(HalfEdgeId::invalid, |(id, _)| id);
            self.vertices[vi].edge = replacement;
        }

        let remap_edge = |h: HalfEdgeId<I>| -> HalfEdgeId<I> {
            remap(h.get().map(HalfEdgeId::index), &edge_map)
                .map_or_else(HalfEdgeId::invalid, HalfEdgeId::new)
        };
        let remap_vertex = |v: VertexId<I>| -> VertexId<I> {
            remap(v.get().map(VertexId::index), &vertex_map)
                .map_or_else(VertexId::invalid, VertexId::new)
        };

        let vertices = std::mem::take(&mut self.vertices);
        self.vertices = vertices
            .into_iter()
            .zip(keep_vertex)
            .filter(|(_, keep)| **keep)
            .map(|(mut v, _)| {
                v.edge = remap_edge(v.edge);
                v
            })
            .collect();

        let halfedges = std::mem::take(&mut self.halfedges);
        self.halfedges = halfedges
            .into_iter()
            .zip(keep_edge)
            .filter(|(_, keep)| **keep)
            .map(|(mut he, _)| {
                he.vertex = remap_vertex(he.vertex);
                he.next = remap_edge(he.next);
                he.previous = remap_edge(he.previous);
                he.opposite = remap_edge(he.opposite);
                he
            })
            .collect();

        for f in &mut self.faces {
            f.edge = remap_edge(f.edge);
        }
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check the link invariants, reporting the first violation.
    ///
    /// Verified: every non-null handle is in range, opposites are mutual,
    /// `next.previous` points back wherever both are set, every vertex
    /// anchor terminates at its vertex, and walking a face's boundary only
    /// meets half-edges of that face.
    pub fn validate(&self) -> Result<()> {
        let in_range = |valid: bool, index: usize, len: usize| !valid || index < len;
        let nv = self.vertices.len();
        let ne = self.halfedges.len();
        let nf = self.faces.len();

        for (vid, v) in self.vertices() {
            if !in_range(v.edge.is_valid(), v.edge.index(), ne) {
                return Err(MeshError::topology(format!(
                    "{:?} references missing {:?}",
                    vid, v.edge
                )));
            }
            if v.edge.is_valid() && self.halfedge(v.edge).vertex != vid {
                return Err(MeshError::topology(format!(
                    "{:?} is anchored to {:?}, which terminates elsewhere",
                    vid, v.edge
                )));
            }
        }

        for (heid, he) in self.halfedges() {
            let links_ok = in_range(he.vertex.is_valid(), he.vertex.index(), nv)
                && in_range(he.face.is_valid(), he.face.index(), nf)
                && in_range(he.next.is_valid(), he.next.index(), ne)
                && in_range(he.previous.is_valid(), he.previous.index(), ne)
                && in_range(he.opposite.is_valid(), he.opposite.index(), ne);
            if !links_ok {
                return Err(MeshError::topology(format!(
                    "{:?} has an out-of-range link: {:?}",
                    heid, he
                )));
            }

            if he.opposite.is_valid() && self.halfedge(he.opposite).opposite != heid {
                return Err(MeshError::topology(format!(
                    "{:?} and {:?} are not mutual opposites",
                    heid, he.opposite
                )));
            }

            if he.next.is_valid() {
                let back = self.halfedge(he.next).previous;
                if back.is_valid() && back != heid {
                    return Err(MeshError::topology(format!(
                        "{:?}.next.previous is {:?}",
                        heid, back
                    )));
                }
            }
        }

        for (fid, f) in self.faces() {
            if !in_range(f.edge.is_valid(), f.edge.index(), ne) {
                return Err(MeshError::topology(format!(
                    "{:?} references missing {:?}",
                    fid, f.edge
                )));
            }
            if let Some(stray) = self
                .edges_around(f.edge, true)
                .find(|&e| self.edge_face(e) != fid)
            {
                return Err(MeshError::topology(format!(
                    "boundary of {:?} runs through {:?} of {:?}",
                    fid,
                    stray,
                    self.edge_face(stray)
                )));
            }
        }

        Ok(())
    }
}

impl<P: Position, I: MeshIndex> HalfEdgeMesh<P, I> {
    /// Apply an affine transform to every vertex position, in parallel.
    ///
    /// Use [`Self::transform_sequential`] for single-threaded execution.
    pub fn transform(&mut self, m: &P::Transform) {
        self.vertices
            .par_iter_mut()
            .for_each(|v| v.data.transform(m));
    }

    /// Apply an affine transform to every vertex position on the calling thread.
    pub fn transform_sequential(&mut self, m: &P::Transform) {
        for v in &mut self.vertices {
            v.data.transform(m);
        }
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &P {
        &self.vertex(v).data
    }
}

/// New index of each kept element, in order.
fn compaction_map(keep: &[bool]) -> Vec<Option<usize>> {
    let mut next = 0;
    keep.iter()
        .map(|&k| {
            if k {
                next += 1;
                Some(next - 1)
            } else {
                None
            }
        })
        .collect()
}

#[inline]
fn remap(index: Option<usize>, map: &[Option<usize>]) -> Option<usize> {
    index.and_then(|i| map.get(i).copied().flatten())
}

/// Iterator over the half-edges of a face cycle or chain.
///
/// Created by [`HalfEdgeMesh::edges_around`]. Cloning restarts nothing: each
/// clone continues independently from the same position, and calling
/// `edges_around` again always starts a fresh walk.
#[derive(Clone)]
pub struct EdgeCycleIter<'a, P = (), I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<P, I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    ccw: bool,
    remaining: usize,
}

impl<'a, P: VertexPayload, I: MeshIndex> EdgeCycleIter<'a, P, I> {
    fn new(mesh: &'a HalfEdgeMesh<P, I>, start: HalfEdgeId<I>, ccw: bool) -> Self {
        Self {
            mesh,
            start,
            current: start,
            ccw,
            // A walk that never revisits its start (a chain running into
            // another cycle) is cut off after visiting every half-edge once.
            remaining: mesh.num_halfedges(),
        }
    }
}

impl<'a, P: VertexPayload, I: MeshIndex> Iterator for EdgeCycleIter<'a, P, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let he = self.mesh.try_halfedge(self.current)?;
        let result = self.current;

        self.current = if self.ccw { he.next } else { he.previous };
        self.remaining = if self.current == self.start {
            0
        } else {
            self.remaining - 1
        };

        Some(result)
    }
}

/// Iterator over the rotation of half-edges terminating at a vertex.
///
/// Created by [`HalfEdgeMesh::vertex_edges`].
#[derive(Clone)]
pub struct VertexRotationIter<'a, P = (), I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<P, I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    ccw: bool,
    remaining: usize,
}

impl<'a, P: VertexPayload, I: MeshIndex> VertexRotationIter<'a, P, I> {
    fn new(mesh: &'a HalfEdgeMesh<P, I>, start: HalfEdgeId<I>, ccw: bool) -> Self {
        Self {
            mesh,
            start,
            current: start,
            ccw,
            remaining: mesh.num_halfedges(),
        }
    }
}

impl<'a, P: VertexPayload, I: MeshIndex> Iterator for VertexRotationIter<'a, P, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.mesh.try_halfedge(self.current)?;
        let result = self.current;

        // ccw: the spoke after `e` is the opposite of the edge leaving the
        // vertex right after `e`. cw undoes that step.
        self.current = if self.ccw {
            self.mesh.opposite(self.mesh.next(result))
        } else {
            self.mesh.previous(self.mesh.opposite(result))
        };
        self.remaining = if self.current == self.start {
            0
        } else {
            self.remaining - 1
        };

        Some(result)
    }
}
