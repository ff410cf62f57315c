//! View frustum culling.
//!
//! Planes are extracted from the combined view-projection matrix (Gribb and Hartmann),
//! using WGPU's `[0, 1]` depth range for the near plane.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector3, Vector4};

/// A plane `normal . p + distance = 0` whose normal points into the frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Plane {
    normal: Vector3<f32>,
    distance: f32,
}

impl Plane {
    fn from_row(row: Vector4<f32>) -> Self {
        let normal = row.truncate();
        let length = normal.magnitude();
        Self {
            normal: normal / length,
            distance: row.w / length,
        }
    }

    fn signed_distance(&self, point: Vector3<f32>) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// The six planes bounding what a camera can see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the frustum of a view-projection matrix.
    pub fn from_view_proj(view_proj: &Matrix4<f32>) -> Self {
        let row = |i| view_proj.row(i);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }

    /// `true` unless the box lies entirely outside one of the planes.
    ///
    /// Boxes near a frustum corner may be reported visible without being so.
    pub fn intersects_aabb(&self, min: Point3<f32>, max: Point3<f32>) -> bool {
        self.planes.iter().all(|plane| {
            let farthest_inside = Vector3::new(
                if plane.normal.x >= 0.0 { max.x } else { min.x },
                if plane.normal.y >= 0.0 { max.y } else { min.y },
                if plane.normal.z >= 0.0 { max.z } else { min.z },
            );
            plane.signed_distance(farthest_inside) >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;
    use crate::engine_state::camera_state::camera::{Camera, CameraUniform, Projection};

    /// Camera at the origin looking down +X.
    fn frustum() -> Frustum {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        let projection = Projection::new(100, 100, Deg(90.0), 0.1, 100.0);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj_and_pos(&camera, &projection);
        Frustum::from_view_proj(&uniform.view_proj())
    }

    fn aabb(min: [f32; 3], max: [f32; 3]) -> (Point3<f32>, Point3<f32>) {
        (Point3::from(min), Point3::from(max))
    }

    #[test]
    fn box_in_front_is_visible() {
        let (min, max) = aabb([10.0, -1.0, -1.0], [12.0, 1.0, 1.0]);
        assert!(frustum().intersects_aabb(min, max));
    }

    #[test]
    fn box_behind_is_culled() {
        let (min, max) = aabb([-12.0, -1.0, -1.0], [-10.0, 1.0, 1.0]);
        assert!(!frustum().intersects_aabb(min, max));
    }

    #[test]
    fn box_outside_the_side_planes_is_culled() {
        let (min, max) = aabb([10.0, -1.0, 30.0], [12.0, 1.0, 32.0]);
        assert!(!frustum().intersects_aabb(min, max));
        let (min, max) = aabb([10.0, 30.0, -1.0], [12.0, 32.0, 1.0]);
        assert!(!frustum().intersects_aabb(min, max));
    }

    #[test]
    fn box_beyond_far_plane_is_culled() {
        let (min, max) = aabb([150.0, -1.0, -1.0], [160.0, 1.0, 1.0]);
        assert!(!frustum().intersects_aabb(min, max));
    }

    #[test]
    fn box_containing_the_camera_is_visible() {
        let (min, max) = aabb([-8.0, -8.0, -8.0], [8.0, 8.0, 8.0]);
        assert!(frustum().intersects_aabb(min, max));
    }

    #[test]
    fn box_straddling_a_side_plane_is_visible() {
        // The 90 degree frustum edge passes through z = x.
        let (min, max) = aabb([10.0, -1.0, 9.0], [11.0, 1.0, 12.0]);
        assert!(frustum().intersects_aabb(min, max));
    }
}
