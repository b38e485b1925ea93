//! Vertex payloads.
//!
//! A mesh carries one payload type for all of its vertices, selected by the
//! `P` parameter of [`Mesh`](super::Mesh):
//!
//! | Payload | Meaning |
//! |---------|---------|
//! | `()` | topology only |
//! | [`Point2<f64>`] | planar position, supports angle-ordered rotation edits |
//! | [`Point3<f64>`] | spatial position |
//!
//! Payload-specific behaviour lives on the [`VertexPayload`] and [`Position`]
//! traits, so operations that need a position simply require `P: Position`.

use std::fmt::Debug;

use nalgebra::{Affine2, Affine3, Point2, Point3, Vector2};

/// Data stored on every vertex of a mesh.
pub trait VertexPayload: Clone + Debug + Default + Send + Sync + 'static {
    /// Set the payload from a planar position emitted by a producer.
    fn initialize(&mut self, _pos: Point2<f64>) {}

    /// Set the payload from a spatial position.
    fn initialize_3d(&mut self, _pos: Point3<f64>) {}
}

impl VertexPayload for () {}

/// Payloads that have a position in space.
pub trait Position: VertexPayload {
    /// Affine transform that can be applied to the position.
    type Transform: Sync;

    /// Apply `m` to the position in place.
    fn transform(&mut self, m: &Self::Transform);

    /// Squared Euclidean distance to another position.
    fn distance_squared(&self, other: &Self) -> f64;
}

impl VertexPayload for Point2<f64> {
    fn initialize(&mut self, pos: Point2<f64>) {
        *self = pos;
    }

    fn initialize_3d(&mut self, pos: Point3<f64>) {
        *self = pos.xy();
    }
}

impl Position for Point2<f64> {
    type Transform = Affine2<f64>;

    #[inline]
    fn transform(&mut self, m: &Affine2<f64>) {
        *self = m.transform_point(self);
    }

    #[inline]
    fn distance_squared(&self, other: &Self) -> f64 {
        nalgebra::distance_squared(self, other)
    }
}

impl VertexPayload for Point3<f64> {
    // Planar producers place their output on z = 0.
    fn initialize(&mut self, pos: Point2<f64>) {
        *self = Point3::new(pos.x, pos.y, 0.0);
    }

    fn initialize_3d(&mut self, pos: Point3<f64>) {
        *self = pos;
    }
}

impl Position for Point3<f64> {
    type Transform = Affine3<f64>;

    #[inline]
    fn transform(&mut self, m: &Affine3<f64>) {
        *self = m.transform_point(self);
    }

    #[inline]
    fn distance_squared(&self, other: &Self) -> f64 {
        nalgebra::distance_squared(self, other)
    }
}

/// Counter-clockwise angle in degrees from direction `from` to direction `to`.
///
/// The result lies in `[0, 360)`. Zero-length inputs give 0.
pub fn angle_360(from: &Vector2<f64>, to: &Vector2<f64>) -> f64 {
    let cross = from.x * to.y - from.y * to.x;
    let dot = from.dot(to);
    let degrees = cross.atan2(dot).to_degrees();
    let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Matrix4, Vector3};

    #[test]
    fn test_angle_360_quadrants() {
        let down = Vector2::new(0.0, -1.0);
        assert!(angle_360(&down, &down).abs() < 1e-10);
        assert!((angle_360(&down, &Vector2::new(1.0, 0.0)) - 90.0).abs() < 1e-10);
        assert!((angle_360(&down, &Vector2::new(0.0, 1.0)) - 180.0).abs() < 1e-10);
        assert!((angle_360(&down, &Vector2::new(-1.0, 0.0)) - 270.0).abs() < 1e-10);
    }

    #[test]
    fn test_angle_360_is_not_symmetric() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(1.0, 1.0);
        assert!((angle_360(&a, &b) - 45.0).abs() < 1e-10);
        assert!((angle_360(&b, &a) - 315.0).abs() < 1e-10);
    }

    #[test]
    fn test_initialize() {
        let mut p2 = Point2::origin();
        p2.initialize(Point2::new(1.0, 2.0));
        assert_eq!(p2, Point2::new(1.0, 2.0));

        let mut p3 = Point3::origin();
        p3.initialize(Point2::new(1.0, 2.0));
        assert_eq!(p3, Point3::new(1.0, 2.0, 0.0));
        p3.initialize_3d(Point3::new(4.0, 5.0, 6.0));
        assert_eq!(p3, Point3::new(4.0, 5.0, 6.0));

        <() as VertexPayload>::initialize(&mut (), Point2::new(1.0, 2.0));
    }

    #[test]
    fn test_transform_2d() {
        let translate = Affine2::from_matrix_unchecked(Matrix3::new(
            1.0, 0.0, 2.0, //
            0.0, 1.0, -1.0, //
            0.0, 0.0, 1.0,
        ));
        let mut p = Point2::new(1.0, 1.0);
        p.transform(&translate);
        assert!((p - Point2::new(3.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_transform_3d() {
        let scale = Affine3::from_matrix_unchecked(Matrix4::new_nonuniform_scaling(
            &Vector3::new(2.0, 3.0, 4.0),
        ));
        let mut p = Point3::new(1.0, 1.0, 1.0);
        p.transform(&scale);
        assert!((p - Point3::new(2.0, 3.0, 4.0)).norm() < 1e-12);
        assert!((p.distance_squared(&Point3::new(2.0, 3.0, 5.0)) - 1.0).abs() < 1e-12);
    }
}
