//! # hbmesh
//!
//! A half-edge mesh kernel for 2D and 3D geometry passes.
//!
//! hbmesh stores polygon meshes and open polyline networks as a graph of
//! directed half-edges, and provides the pieces geometry code is written
//! against: a builder contract that producers (triangulators, skeleton
//! builders, procedural generators) drive to populate a mesh, traversal of
//! face boundaries and vertex rotations, in-place edits, vertex welding, and
//! export back to flat index arrays.
//!
//! ## Features
//!
//! - **Arena of handles**: elements refer to each other through nullable,
//!   type-safe indices, so open chains and boundaries need no special casing
//! - **Flexible indexing**: 16-bit, 32-bit and 64-bit handles
//! - **Payload per mesh**: topology only, 2D points or 3D points
//! - **Rotation edits**: insert spokes around a vertex, ordered by angle for
//!   planar meshes
//!
//! ## Building Meshes
//!
//! ```
//! use hbmesh::prelude::*;
//! use nalgebra::Point2;
//!
//! let positions = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ];
//! let faces = [[0usize, 1, 2], [0, 2, 3]];
//!
//! let mesh: HalfEdgeMesh<Point2<f64>> = build_from_faces(&positions, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_faces(), 2);
//! assert!(mesh.is_valid());
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use hbmesh::prelude::*;
//! use nalgebra::Point2;
//!
//! # let positions = [
//! #     Point2::new(0.0, 0.0),
//! #     Point2::new(1.0, 0.0),
//! #     Point2::new(1.0, 1.0),
//! #     Point2::new(0.0, 1.0),
//! # ];
//! # let mesh: HalfEdgeMesh<Point2<f64>> =
//! #     build_from_faces(&positions, &[[0usize, 1, 2], [0, 2, 3]]).unwrap();
//! // Corners of a face, counter-clockwise from its anchor edge
//! let f = FaceId::new(0);
//! let corners: Vec<_> = mesh.vertices_around(mesh.face(f).edge, true).collect();
//! assert_eq!(corners, vec![VertexId::new(0), VertexId::new(1), VertexId::new(2)]);
//!
//! // Half-edges terminating at a vertex, in rotation order
//! for spoke in mesh.vertex_edges(VertexId::new(2), true) {
//!     println!("spoke {:?} from {:?}", spoke, mesh.source(spoke));
//! }
//! ```
//!
//! ## Welding and Export
//!
//! ```
//! use hbmesh::prelude::*;
//! use hbmesh::algo::weld::{weld_vertices, WeldOptions};
//! use hbmesh::mesh::to_indexed_mesh;
//! use nalgebra::Point2;
//!
//! let positions = [
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(0.0, 1.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(2.0, 0.0),
//!     Point2::new(2.0, 1.0),
//! ];
//! let mut mesh: HalfEdgeMesh<Point2<f64>> =
//!     build_from_faces(&positions, &[[0usize, 1, 2], [3, 4, 5]]).unwrap();
//!
//! weld_vertices(&mut mesh, &WeldOptions::default().with_tolerance(1e-3)).unwrap();
//!
//! let indexed = to_indexed_mesh(&mesh, 3).unwrap();
//! assert_eq!(indexed.positions.len(), 5);
//! assert_eq!(indexed.indices, vec![0, 1, 2, 1, 3, 4]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use hbmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_edges, build_from_faces, EdgeConnection, EdgeIndex, Face, FaceId, HalfEdge,
        HalfEdgeBuilder, HalfEdgeId, HalfEdgeMesh, Mesh, MeshConstructor, MeshIndex, Position,
        TriangleIndex, Vertex, VertexId, VertexPayload,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::{Affine3, Matrix4, Point2, Point3, Vector3};

    #[test]
    fn test_tetrahedron() {
        let positions = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 1.0),
            Point2::new(0.5, 0.5),
        ];

        let faces = vec![
            [0usize, 2, 1], // bottom
            [0, 1, 3],      // front
            [1, 2, 3],      // right
            [2, 0, 3],      // left
        ];

        let mesh: HalfEdgeMesh<Point3<f64>> = build_from_faces(&positions, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());

        // Closed: every half-edge has a twin and every rotation closes up
        assert!(mesh.halfedges().all(|(_, he)| he.opposite.is_valid()));
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.vertex_edge_count(v), 3, "{:?} should have 3 spokes", v);
        }
    }

    #[test]
    fn test_lift_planar_mesh() {
        let positions = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        let mut mesh: Mesh<Point3<f64>, u16> = build_from_faces(&positions, &[[0usize, 1, 2]]).unwrap();

        let lift = Affine3::from_matrix_unchecked(Matrix4::new_translation(&Vector3::new(
            0.0, 0.0, 2.0,
        )));
        mesh.transform(&lift);

        for (_, v) in mesh.vertices() {
            assert!((v.data.z - 2.0).abs() < 1e-12);
        }
        assert_eq!(*mesh.position(VertexId::new(1)), Point3::new(1.0, 0.0, 2.0));
    }
}
