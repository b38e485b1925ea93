//! Flattening a half-edge mesh back into index arrays.
//!
//! Downstream consumers (renderers, other geometry passes) want a position
//! list plus a flat index buffer: `face_vertices` indices per face for a
//! face mesh, or two indices per undirected edge for a polyline network.

use std::collections::HashSet;

use log::warn;

use super::halfedge::HalfEdgeMesh;
use super::index::MeshIndex;
use super::payload::VertexPayload;
use crate::error::{MeshError, Result};

/// Positions plus a flat index buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh<T> {
    /// One position per vertex, in mesh order.
    pub positions: Vec<T>,
    /// Flat vertex indices: `face_vertices` per face, or 2 per edge.
    pub indices: Vec<usize>,
}

impl<T> IndexedMesh<T> {
    /// Number of primitives when every primitive has `arity` indices.
    pub fn num_primitives(&self, arity: usize) -> usize {
        if arity == 0 {
            0
        } else {
            self.indices.len() / arity
        }
    }
}

/// Vertex indices of every face, `face_vertices` per face, in face order.
///
/// Each face is walked counter-clockwise from its anchor edge, so a face
/// built from corners `[a, b, c]` comes back as `[a, b, c]`. Vertices that
/// cannot be indexed are skipped; a face whose remaining count differs from
/// `face_vertices` (including a face with no boundary) is an error.
pub fn face_indices<P: VertexPayload, I: MeshIndex>(
    mesh: &HalfEdgeMesh<P, I>,
    face_vertices: usize,
) -> Result<Vec<usize>> {
    // A well-formed face mesh has no more corners than half-edges.
    let expected = mesh.num_faces().saturating_mul(face_vertices);
    let mut indices = Vec::with_capacity(expected.min(mesh.num_halfedges()));

    for (f, face) in mesh.faces() {
        let start = indices.len();
        for v in mesh.vertices_around(face.edge, true) {
            match mesh.vertex_index(v) {
                Some(i) => indices.push(i),
                None => warn!("skipping {:?} on {:?}: not a vertex of this mesh", v, f),
            }
        }

        let found = indices.len() - start;
        if found != face_vertices {
            return Err(MeshError::topology(format!(
                "{:?} has {} vertices, expected {}",
                f, found, face_vertices
            )));
        }
    }

    Ok(indices)
}

/// Vertex index pairs, one per undirected edge.
///
/// Half-edges without an opposite are not part of an undirected edge and are
/// skipped. Each pair is emitted once, from whichever half comes first in
/// mesh order, as `[terminal, opposite's terminal]`.
pub fn edge_indices<P: VertexPayload, I: MeshIndex>(mesh: &HalfEdgeMesh<P, I>) -> Vec<usize> {
    let mut indices = Vec::with_capacity(mesh.num_halfedges());
    let mut emitted = HashSet::new();

    for (he, edge) in mesh.halfedges() {
        if !edge.opposite.is_valid() || emitted.contains(&he) {
            continue;
        }

        let pair = (
            mesh.vertex_index(edge.vertex),
            mesh.vertex_index(mesh.edge_vertex(edge.opposite)),
        );
        match pair {
            (Some(i0), Some(i1)) => {
                indices.push(i0);
                indices.push(i1);
                emitted.insert(edge.opposite);
            }
            _ => warn!("skipping {:?}: endpoint has no vertex", he),
        }
    }

    indices
}

/// Copy positions and flatten topology into an [`IndexedMesh`].
///
/// `face_vertices == 0` exports the mesh as edge lines, anything else as
/// faces of that many vertices.
///
/// # Example
/// ```
/// use hbmesh::mesh::{build_from_faces, to_indexed_mesh, HalfEdgeMesh};
/// use nalgebra::Point2;
///
/// let positions = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
/// let mesh: HalfEdgeMesh<Point2<f64>> = build_from_faces(&positions, &[[0usize, 1, 2]]).unwrap();
///
/// let indexed = to_indexed_mesh(&mesh, 3).unwrap();
/// assert_eq!(indexed.positions, positions);
/// assert_eq!(indexed.indices, vec![0, 1, 2]);
/// ```
pub fn to_indexed_mesh<P: VertexPayload, I: MeshIndex>(
    mesh: &HalfEdgeMesh<P, I>,
    face_vertices: usize,
) -> Result<IndexedMesh<P>> {
    let positions = mesh.vertices().map(|(_, v)| v.data.clone()).collect();
    let indices = if face_vertices == 0 {
        edge_indices(mesh)
    } else {
        face_indices(mesh, face_vertices)?
    };
    Ok(IndexedMesh { positions, indices })
}
