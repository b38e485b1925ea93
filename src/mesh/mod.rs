//! Core mesh data structures.
//!
//! This module provides the half-edge representation of polygon meshes and
//! open polyline networks, the contract producers use to build one, and the
//! export back to flat index arrays.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`] (aliased as [`Mesh`]), an arena that
//! owns every vertex, half-edge and face. Elements refer to each other through
//! nullable handles, so faces, boundaries and dangling polylines all use the
//! same representation.
//!
//! # Handles
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! These are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing `u16`, `u32`, or `u64` depending on mesh size.
//!
//! # Payloads
//!
//! The `P` parameter selects what a vertex carries: `()` for pure topology,
//! [`nalgebra::Point2`] or [`nalgebra::Point3`] for geometry. See
//! [`VertexPayload`] and [`Position`].
//!
//! # Construction
//!
//! ```
//! use hbmesh::mesh::{build_from_faces, HalfEdgeMesh, FaceId};
//! use nalgebra::Point2;
//!
//! let positions = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.5, 1.0),
//! ];
//! let mesh: HalfEdgeMesh<Point2<f64>> = build_from_faces(&positions, &[[0usize, 1, 2]]).unwrap();
//!
//! assert_eq!(mesh.face_edge_count(FaceId::new(0)), 3);
//! ```

mod builder;
pub mod export;
mod halfedge;
mod index;
mod payload;
mod rotation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use builder::{
    build_from_edges, build_from_faces, build_from_faces_with_neighbors, EdgeConnection,
    EdgeIndex, HalfEdgeBuilder, MeshConstructor, MeshDescriptor, TriangleIndex,
};
pub use export::{edge_indices, face_indices, to_indexed_mesh, IndexedMesh};
pub use halfedge::{EdgeCycleIter, Face, HalfEdge, HalfEdgeMesh, Vertex, VertexRotationIter};
pub use index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use payload::{angle_360, Position, VertexPayload};

/// Shorthand for [`HalfEdgeMesh`].
pub type Mesh<P = (), I = u32> = HalfEdgeMesh<P, I>;
