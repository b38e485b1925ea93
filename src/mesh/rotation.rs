//! Editing the rotation of half-edges around a vertex.
//!
//! The spokes of a vertex `v` are the half-edges terminating at `v`. Their
//! rotation order is not stored anywhere explicitly; it is encoded in the
//! `next` / `previous` links between each spoke and the *opposite* of the
//! following spoke:
//!
//! ```text
//! spoke.next == following_spoke.opposite
//! following_spoke.opposite.previous == spoke
//! ```
//!
//! so that `next.opposite` rotates from one spoke to the following one. The
//! operations here splice spokes into and out of that encoding.

use nalgebra::{Point2, Vector2};

use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, MeshIndex, VertexId};
use super::payload::{angle_360, VertexPayload};
use crate::error::{MeshError, Result};

impl<P: VertexPayload, I: MeshIndex> HalfEdgeMesh<P, I> {
    /// Add `he` to the rotation of `v`, after the last existing spoke.
    ///
    /// `he` becomes a spoke of `v` (its vertex is set to `v`). The first spoke
    /// only anchors the vertex; later spokes are spliced in through their
    /// opposites, which must therefore exist.
    pub fn insert_edge(&mut self, v: VertexId<I>, he: HalfEdgeId<I>) -> Result<()> {
        self.check_vertex(v)?;
        self.check_halfedge(he)?;

        let anchor = self.vertex(v).edge;
        if !anchor.is_valid() {
            self.halfedge_mut(he).vertex = v;
            self.vertex_mut(v).edge = he;
            return Ok(());
        }

        let opposite = self.require_opposite(he)?;
        let anchor_opposite = self.require_opposite(anchor)?;

        // With a single spoke the anchor is also the last spoke.
        let last = self.vertex_edges(v, true).last().unwrap_or(anchor);
        self.halfedge_mut(he).vertex = v;
        self.link(he, anchor_opposite);
        self.link(last, opposite);
        Ok(())
    }

    /// Take `he` out of the rotation of `v`.
    ///
    /// Nothing happens unless `he` is the vertex's anchor edge. The vertex is
    /// re-anchored to the following spoke (null when `he` was the only one).
    ///
    /// On polyline networks, where neither `he` nor its opposite bounds a
    /// face, `he` is also unlinked from its neighbours so that the rotation no
    /// longer reaches it. Spokes of a face keep their links: in a face mesh
    /// the rotation links are the face boundary links, and the faces stay
    /// closed.
    pub fn remove_edge(&mut self, v: VertexId<I>, he: HalfEdgeId<I>) {
        let anchor = self.vertex_edge(v);
        if !anchor.is_valid() || anchor != he {
            return;
        }

        let replacement = self
            .vertex_edges(v, true)
            .find(|&e| e != he)
            .unwrap_or_else(HalfEdgeId::invalid);
        self.vertex_mut(v).edge = replacement;

        let faced = self.edge_face(he).is_valid() || self.edge_face(self.opposite(he)).is_valid();
        if !faced {
            self.excise_spoke(he);
        }
    }

    /// Unlink a spoke from the spokes on either side of it.
    fn excise_spoke(&mut self, he: HalfEdgeId<I>) {
        let opposite = self.opposite(he);
        let before = self.previous(opposite);
        let after = self.next(he);
        let has_before = before.is_valid() && before != he;
        let has_after = after.is_valid() && after != opposite;

        if has_before && has_after && self.opposite(before) != after {
            self.link(before, after);
        } else {
            // Zero or one spoke left: it becomes a lone, unlinked spoke.
            if has_before {
                self.halfedge_mut(before).next = HalfEdgeId::invalid();
            }
            if has_after {
                self.halfedge_mut(after).previous = HalfEdgeId::invalid();
            }
        }

        self.halfedge_mut(he).next = HalfEdgeId::invalid();
        if self.try_halfedge(opposite).is_some() {
            self.halfedge_mut(opposite).previous = HalfEdgeId::invalid();
        }
    }

    /// `from.next = to`, `to.previous = from`.
    pub(crate) fn link(&mut self, from: HalfEdgeId<I>, to: HalfEdgeId<I>) {
        self.halfedge_mut(from).next = to;
        self.halfedge_mut(to).previous = from;
    }

    fn require_opposite(&self, he: HalfEdgeId<I>) -> Result<HalfEdgeId<I>> {
        let opposite = self.opposite(he);
        if self.try_halfedge(opposite).is_some() {
            Ok(opposite)
        } else {
            Err(MeshError::topology(format!(
                "{:?} has no opposite to splice into a rotation",
                he
            )))
        }
    }

    pub(crate) fn check_vertex(&self, v: VertexId<I>) -> Result<usize> {
        if !v.is_valid() {
            return Err(MeshError::topology("null vertex handle"));
        }
        MeshError::check_index("vertex", v.index(), self.num_vertices())
    }

    pub(crate) fn check_halfedge(&self, he: HalfEdgeId<I>) -> Result<usize> {
        if !he.is_valid() {
            return Err(MeshError::topology("null half-edge handle"));
        }
        MeshError::check_index("half-edge", he.index(), self.num_halfedges())
    }
}

impl<I: MeshIndex> HalfEdgeMesh<Point2<f64>, I> {
    /// Add `he` to the rotation of `v`, ordered by direction.
    ///
    /// Angles are measured counter-clockwise from the anchor spoke's direction
    /// (`angle_360`, degrees in `[0, 360)`). The new spoke goes right before
    /// the first spoke after the anchor whose angle is not smaller than its
    /// own, or last when there is none, so a rotation built only through this
    /// method stays sorted by angle. Equal angles keep insertion order.
    ///
    /// Every spoke involved needs an opposite with a vertex, since that is
    /// where its direction comes from.
    pub fn insert_edge_by_angle(&mut self, v: VertexId<I>, he: HalfEdgeId<I>) -> Result<()> {
        self.check_vertex(v)?;
        self.check_halfedge(he)?;

        let anchor = self.vertex(v).edge;
        if !anchor.is_valid() {
            self.halfedge_mut(he).vertex = v;
            self.vertex_mut(v).edge = he;
            return Ok(());
        }

        let opposite = self.require_opposite(he)?;
        let anchor_opposite = self.require_opposite(anchor)?;

        let origin = self.vertex(v).data;
        let reference = self.spoke_direction(anchor, &origin)?;
        let angle = angle_360(&reference, &self.spoke_direction(he, &origin)?);

        // Spoke whose opposite the new spoke links to, and the spoke before it.
        let spokes: Vec<_> = self.vertex_edges(v, true).collect();
        let mut previous = anchor;
        let mut following = anchor_opposite;
        for &spoke in spokes.iter().skip(1) {
            let spoke_angle = angle_360(&reference, &self.spoke_direction(spoke, &origin)?);
            if angle <= spoke_angle {
                following = self.require_opposite(spoke)?;
                break;
            }
            previous = spoke;
        }

        self.halfedge_mut(he).vertex = v;
        self.link(he, following);
        self.link(previous, opposite);
        Ok(())
    }

    /// Direction from `origin` towards the far end of a spoke.
    fn spoke_direction(&self, spoke: HalfEdgeId<I>, origin: &Point2<f64>) -> Result<Vector2<f64>> {
        let far = self.edge_vertex(self.require_opposite(spoke)?);
        let index = self.vertex_index(far).ok_or_else(|| {
            MeshError::topology(format!("opposite of {:?} has no vertex", spoke))
        })?;
        Ok(self.vertices[index].data - *origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{face_indices, fixtures};

    /// One vertex and `pairs` unconnected opposite pairs (2k, 2k + 1).
    fn loose_pairs(pairs: usize) -> HalfEdgeMesh {
        let mut mesh = HalfEdgeMesh::new();
        mesh.add_vertex(());
        for _ in 0..pairs {
            mesh.add_edge_pair();
        }
        mesh
    }

    fn he(i: usize) -> HalfEdgeId {
        HalfEdgeId::new(i)
    }

    #[test]
    fn test_insert_edge_appends_to_rotation() {
        let mut mesh = loose_pairs(3);
        let v = VertexId::new(0);
        mesh.insert_edge(v, he(0)).unwrap();
        mesh.insert_edge(v, he(2)).unwrap();
        mesh.insert_edge(v, he(4)).unwrap();

        let ccw: Vec<_> = mesh.vertex_edges(v, true).collect();
        assert_eq!(ccw, vec![he(0), he(2), he(4)]);

        let cw: Vec<_> = mesh.vertex_edges(v, false).collect();
        assert_eq!(cw, vec![he(0), he(4), he(2)]);

        assert_eq!(mesh.vertex(v).edge, he(0));
        assert!(mesh.halfedge_ids().step_by(2).all(|e| mesh.edge_vertex(e) == v));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_insert_second_spoke_closes_rotation() {
        let mut mesh = loose_pairs(2);
        let v = VertexId::new(0);
        mesh.insert_edge(v, he(0)).unwrap();
        assert_eq!(mesh.vertex_edge_count(v), 1);
        assert!(!mesh.next(he(0)).is_valid());

        mesh.insert_edge(v, he(2)).unwrap();
        assert_eq!(mesh.next(he(0)), he(3));
        assert_eq!(mesh.previous(he(3)), he(0));
        assert_eq!(mesh.next(he(2)), he(1));
        assert_eq!(mesh.previous(he(1)), he(2));
        assert_eq!(mesh.vertex_edge_count(v), 2);
    }

    #[test]
    fn test_insert_edge_without_opposite_fails() {
        let mut mesh = loose_pairs(1);
        let lone = mesh.add_halfedge();
        let v = VertexId::new(0);
        mesh.insert_edge(v, he(0)).unwrap();
        assert!(matches!(
            mesh.insert_edge(v, lone),
            Err(MeshError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_insert_edge_rejects_bad_handles() {
        let mut mesh = loose_pairs(1);
        assert!(matches!(
            mesh.insert_edge(VertexId::new(3), he(0)),
            Err(MeshError::InvalidIndex { kind: "vertex", .. })
        ));
        assert!(matches!(
            mesh.insert_edge(VertexId::new(0), HalfEdgeId::invalid()),
            Err(MeshError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_remove_edge_ignores_non_anchor() {
        let mut mesh = fixtures::cross();
        let before = mesh.clone();
        mesh.remove_edge(VertexId::new(4), he(6));
        assert_eq!(mesh.vertex(VertexId::new(4)).edge, he(0));
        assert_eq!(
            mesh.halfedges().map(|(_, e)| *e).collect::<Vec<_>>(),
            before.halfedges().map(|(_, e)| *e).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_remove_edge_reanchors_and_excises() {
        let mut mesh = fixtures::cross();
        let center = VertexId::new(4);
        mesh.remove_edge(center, he(0));

        assert_eq!(mesh.vertex(center).edge, he(6));
        let ccw: Vec<_> = mesh.vertex_edges(center, true).collect();
        assert_eq!(ccw, vec![he(6), he(4), he(2)]);
        let cw: Vec<_> = mesh.vertex_edges(center, false).collect();
        assert_eq!(cw, vec![he(6), he(2), he(4)]);

        // The removed spoke is no longer reachable from its neighbours.
        assert!(mesh.halfedges().all(|(_, e)| e.next != he(1) && e.previous != he(0)));
        assert!(!mesh.next(he(0)).is_valid());
        assert!(!mesh.previous(he(1)).is_valid());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_remove_edge_keeps_faces_closed() {
        let mut mesh = fixtures::square_with_center();
        let center = VertexId::new(4);
        let before: Vec<_> = mesh.halfedges().map(|(_, e)| *e).collect();

        mesh.remove_edge(center, he(0));

        assert_eq!(mesh.vertex(center).edge, he(6));
        assert_eq!(mesh.halfedges().map(|(_, e)| *e).collect::<Vec<_>>(), before);
        for (fid, f) in mesh.faces() {
            assert!(mesh.is_closed(f.edge));
            assert!(mesh.edges_around(f.edge, true).all(|e| mesh.edge_face(e) == fid));
        }
        assert_eq!(face_indices(&mesh, 3).map(|i| i.len()), Ok(12));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_remove_edges_down_to_isolated() {
        let mut mesh = loose_pairs(2);
        let v = VertexId::new(0);
        mesh.insert_edge(v, he(0)).unwrap();
        mesh.insert_edge(v, he(2)).unwrap();

        mesh.remove_edge(v, he(0));
        assert_eq!(mesh.vertex(v).edge, he(2));
        assert_eq!(mesh.vertex_edge_count(v), 1);
        assert!(!mesh.next(he(2)).is_valid());
        assert!(!mesh.previous(he(1)).is_valid());

        mesh.remove_edge(v, he(2));
        assert!(!mesh.vertex(v).edge.is_valid());
        assert_eq!(mesh.vertex_edge_count(v), 0);
        assert!(mesh.is_valid());
    }

    /// Center vertex at the origin of `offset`, one outer vertex per
    /// direction. Returns the mesh and the center-side half-edge of each arm.
    fn star(
        offset: Vector2<f64>,
        dirs: &[Vector2<f64>],
    ) -> (HalfEdgeMesh<Point2<f64>>, Vec<HalfEdgeId>) {
        let mut mesh = HalfEdgeMesh::<Point2<f64>>::new();
        mesh.add_vertex(Point2::from(offset));
        let mut spokes = Vec::new();
        for d in dirs {
            let outer = mesh.add_vertex(Point2::from(offset + d));
            let (inward, outward) = mesh.add_edge_pair();
            mesh.insert_edge_by_angle(outer, outward).unwrap();
            spokes.push(inward);
        }
        (mesh, spokes)
    }

    #[test]
    fn test_insert_edge_by_angle_links() {
        let offset = Vector2::new(-4.0, 6.0);
        let dirs = [
            Vector2::new(0.0, -1.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(-1.0, 0.0),
        ];
        let (mut mesh, spokes) = star(offset, &dirs);
        let center = VertexId::new(0);
        // Spoke k is half-edge 2k, its opposite 2k + 1.
        let [e0, e1, e2, e3, e4, e5, e6, e7] = [0, 1, 2, 3, 4, 5, 6, 7].map(he);
        assert_eq!(spokes, vec![e0, e2, e4, e6]);

        mesh.insert_edge_by_angle(center, e0).unwrap();
        assert_eq!(mesh.vertex(center).edge, e0);
        assert_eq!(mesh.edge_vertex(e0), center);
        assert_eq!(mesh.opposite(e0), e1);
        assert!(!mesh.next(e0).is_valid());
        assert!(!mesh.previous(e0).is_valid());

        mesh.insert_edge_by_angle(center, e2).unwrap();
        assert_eq!(mesh.next(e0), e3);
        assert_eq!(mesh.previous(e1), e2);
        assert_eq!(mesh.next(e2), e1);
        assert_eq!(mesh.previous(e3), e0);

        mesh.insert_edge_by_angle(center, e4).unwrap();
        assert_eq!(mesh.next(e0), e5);
        assert_eq!(mesh.previous(e1), e2);
        assert_eq!(mesh.next(e4), e3);
        assert_eq!(mesh.previous(e5), e0);
        assert_eq!(mesh.next(e2), e1);
        assert_eq!(mesh.previous(e3), e4);

        mesh.insert_edge_by_angle(center, e6).unwrap();
        assert_eq!(mesh.next(e0), e5);
        assert_eq!(mesh.previous(e1), e6);
        assert_eq!(mesh.next(e2), e7);
        assert_eq!(mesh.previous(e3), e4);
        assert_eq!(mesh.next(e6), e1);
        assert_eq!(mesh.previous(e7), e2);

        assert_eq!(mesh.vertex_edge_count(center), 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_insert_edge_by_angle_sorts_rotation() {
        // Directions in scrambled order, including a duplicate angle.
        let dirs: Vec<Vector2<f64>> = [10.0_f64, 200.0, 95.0, 330.0, 45.0, 95.0, 270.0, 150.0]
            .iter()
            .map(|deg| Vector2::new(deg.to_radians().cos(), deg.to_radians().sin()) * 2.0)
            .collect();
        let (mut mesh, spokes) = star(Vector2::new(1.0, 1.0), &dirs);
        let center = VertexId::new(0);
        for &spoke in &spokes {
            mesh.insert_edge_by_angle(center, spoke).unwrap();
        }

        let origin = *mesh.position(center);
        let direction = |e: HalfEdgeId| *mesh.position(mesh.edge_vertex(mesh.opposite(e))) - origin;
        let reference = direction(spokes[0]);
        let angles: Vec<f64> = mesh
            .vertex_edges(center, true)
            .map(|e| angle_360(&reference, &direction(e)))
            .collect();

        assert_eq!(angles.len(), dirs.len());
        assert!(angles.windows(2).all(|w| w[0] <= w[1] + 1e-9), "{:?}", angles);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_insert_edge_by_angle_equal_to_anchor() {
        // A second spoke pointing the same way as the anchor lands right after it.
        let dirs = [
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(2.0, 0.0),
        ];
        let (mut mesh, spokes) = star(Vector2::zeros(), &dirs);
        let center = VertexId::new(0);
        for &spoke in &spokes {
            mesh.insert_edge_by_angle(center, spoke).unwrap();
        }
        let ccw: Vec<_> = mesh.vertex_edges(center, true).collect();
        assert_eq!(ccw, vec![spokes[0], spokes[2], spokes[1]]);
    }

    #[test]
    fn test_insert_edge_by_angle_needs_far_vertex() {
        let mut mesh = HalfEdgeMesh::<Point2<f64>>::new();
        let center = mesh.add_vertex(Point2::origin());
        let outer = mesh.add_vertex(Point2::new(1.0, 0.0));
        let (a, a_out) = mesh.add_edge_pair();
        let (b, _) = mesh.add_edge_pair();
        mesh.insert_edge_by_angle(outer, a_out).unwrap();
        mesh.insert_edge_by_angle(center, a).unwrap();

        // `b`'s opposite was never attached to a vertex.
        assert!(matches!(
            mesh.insert_edge_by_angle(center, b),
            Err(MeshError::InvalidTopology(_))
        ));
    }
}
