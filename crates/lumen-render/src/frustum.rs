//! View frustum extracted from a view-projection matrix.

use glam::{Mat4, Vec3, Vec4};

/// Plane indices into the frustum planes array.
const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// Six inward-pointing planes: left, right, bottom, top, near, far.
///
/// Each `Vec4(a, b, c, d)` has a unit normal `(a, b, c)`; a point `p` is on
/// the inner side when `n·p + d >= 0`.
#[derive(Clone, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Griggs-Hartmann extraction for a `[0, 1]` depth range.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        planes[NEAR] = rows[2];
        planes[FAR] = rows[3] - rows[2];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Conservative sphere test: true if any part may be inside.
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(center) + plane.w >= -radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frustum() -> Frustum {
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, 1.0, 1_000.0);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_point_in_front_is_inside() {
        assert!(frustum().contains_point(Vec3::new(0.0, 0.0, -100.0)));
    }

    #[test]
    fn test_point_behind_is_outside() {
        assert!(!frustum().contains_point(Vec3::new(0.0, 0.0, 100.0)));
    }

    #[test]
    fn test_near_and_far_planes() {
        let f = frustum();
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -0.5)));
        assert!(f.contains_point(Vec3::new(0.0, 0.0, -999.0)));
        assert!(!f.contains_point(Vec3::new(0.0, 0.0, -1_001.0)));
    }

    /// At 60° vertical FOV the half-angle is 30°, so x = 0.6·depth is outside.
    #[test]
    fn test_side_planes() {
        let f = frustum();
        assert!(f.contains_point(Vec3::new(50.0, 0.0, -100.0)));
        assert!(!f.contains_point(Vec3::new(60.0, 0.0, -100.0)));
        assert!(!f.contains_point(Vec3::new(0.0, -60.0, -100.0)));
    }

    #[test]
    fn test_sphere_straddling_plane_intersects() {
        let f = frustum();
        assert!(f.intersects_sphere(Vec3::new(60.0, 0.0, -100.0), 10.0));
        assert!(!f.intersects_sphere(Vec3::new(200.0, 0.0, -100.0), 10.0));
    }

    #[test]
    fn test_planes_are_normalized() {
        for plane in frustum().planes() {
            assert!((plane.truncate().length() - 1.0).abs() < 1e-5);
        }
    }
}
