//! Hand-wired meshes shared by the unit tests.
//!
//! These are wired link by link with `fill` + `set_edge`, without going
//! through the builder, so they also pin down the exact link layout the
//! builder is expected to produce.

use nalgebra::Point2;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::payload::VertexPayload;

fn wire_triangle<P: VertexPayload, I: MeshIndex>(mesh: &mut HalfEdgeMesh<P, I>) {
    let (v, e, f) = (VertexId::<I>::new, HalfEdgeId::<I>::new, FaceId::<I>::new);
    let null = HalfEdgeId::invalid();
    mesh.fill(3, 3, 1);

    mesh.face_mut(f(0)).edge = e(0);
    for i in 0..3 {
        mesh.vertex_mut(v(i)).edge = e(i);
    }
    mesh.set_edge(e(0), v(0), f(0), e(2), e(1), null);
    mesh.set_edge(e(1), v(1), f(0), e(0), e(2), null);
    mesh.set_edge(e(2), v(2), f(0), e(1), e(0), null);
}

/// One closed triangle: 3 vertices, 3 half-edges, 1 face, no opposites.
pub fn triangle() -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new();
    wire_triangle(&mut mesh);
    mesh
}

/// [`triangle`] with planar positions.
pub fn triangle_2d(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> HalfEdgeMesh<Point2<f64>> {
    let mut mesh = HalfEdgeMesh::new();
    wire_triangle(&mut mesh);
    for (i, p) in [a, b, c].into_iter().enumerate() {
        mesh.vertex_mut(VertexId::new(i)).data = p;
    }
    mesh
}

/// Four arms around a center: 5 vertices, 8 half-edges, no faces.
///
/// ```text
///         3
///         |
///    0 -- 4 -- 2
///         |
///         1
/// ```
///
/// Vertex 4 is the center. Arm `k` is the pair `(2k, 2k + 1)`, where `2k`
/// terminates at the center and `2k + 1` at the arm's tip.
pub fn cross() -> HalfEdgeMesh {
    let (v, e) = (VertexId::<u32>::new, HalfEdgeId::<u32>::new);
    let null = HalfEdgeId::invalid();
    let no_face = FaceId::invalid();
    let mut mesh = HalfEdgeMesh::new();
    mesh.fill(5, 8, 0);

    mesh.vertex_mut(v(0)).edge = e(1);
    mesh.vertex_mut(v(1)).edge = e(3);
    mesh.vertex_mut(v(2)).edge = e(5);
    mesh.vertex_mut(v(3)).edge = e(7);
    mesh.vertex_mut(v(4)).edge = e(0);

    mesh.set_edge(e(0), v(4), no_face, null, e(7), e(1));
    mesh.set_edge(e(1), v(0), no_face, e(2), null, e(0));
    mesh.set_edge(e(2), v(4), no_face, null, e(1), e(3));
    mesh.set_edge(e(3), v(1), no_face, e(4), null, e(2));
    mesh.set_edge(e(4), v(4), no_face, null, e(3), e(5));
    mesh.set_edge(e(5), v(2), no_face, e(6), null, e(4));
    mesh.set_edge(e(6), v(4), no_face, null, e(5), e(7));
    mesh.set_edge(e(7), v(3), no_face, e(0), null, e(6));
    mesh
}

/// A square split into four triangles around its center: 5 vertices,
/// 12 half-edges, 4 faces.
///
/// Vertex 4 is the center, 0..4 the corners. Half-edges 0..8 are the four
/// interior spokes (paired as opposites), 8..12 the outer boundary, which has
/// no opposites.
pub fn square_with_center() -> HalfEdgeMesh {
    let (v, e, f) = (VertexId::<u32>::new, HalfEdgeId::<u32>::new, FaceId::<u32>::new);
    let null = HalfEdgeId::invalid();
    let mut mesh = HalfEdgeMesh::new();
    mesh.fill(5, 12, 4);

    mesh.vertex_mut(v(0)).edge = e(1);
    mesh.vertex_mut(v(1)).edge = e(3);
    mesh.vertex_mut(v(2)).edge = e(5);
    mesh.vertex_mut(v(3)).edge = e(7);
    mesh.vertex_mut(v(4)).edge = e(0);

    for i in 0..4 {
        mesh.face_mut(f(i)).edge = e(8 + i);
    }

    mesh.set_edge(e(0), v(4), f(3), e(11), e(7), e(1));
    mesh.set_edge(e(1), v(0), f(0), e(2), e(8), e(0));
    mesh.set_edge(e(2), v(4), f(0), e(8), e(1), e(3));
    mesh.set_edge(e(3), v(1), f(1), e(4), e(9), e(2));
    mesh.set_edge(e(4), v(4), f(1), e(9), e(3), e(5));
    mesh.set_edge(e(5), v(2), f(2), e(6), e(10), e(4));
    mesh.set_edge(e(6), v(4), f(2), e(10), e(5), e(7));
    mesh.set_edge(e(7), v(3), f(3), e(0), e(11), e(6));

    mesh.set_edge(e(8), v(1), f(0), e(1), e(2), null);
    mesh.set_edge(e(9), v(2), f(1), e(3), e(4), null);
    mesh.set_edge(e(10), v(3), f(2), e(5), e(6), null);
    mesh.set_edge(e(11), v(0), f(3), e(7), e(0), null);
    mesh
}
