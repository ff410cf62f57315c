//! # Block Side Module
//!
//! This module defines the six faces of a voxel block along with the geometry each
//! face needs for meshing: its outward normal, its corner layout and its texture axes.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminant is used to index per-side arrays.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The top face (facing positive Y)
    Top = 0,

    /// The bottom face (facing negative Y)
    Bottom = 1,

    /// The front face (facing positive Z)
    Front = 2,

    /// The back face (facing negative Z)
    Back = 3,

    /// The right face (facing positive X)
    Right = 4,

    /// The left face (facing negative X)
    Left = 5,
}

/// Corner positions of a unit face, counter-clockwise when seen from outside the block.
///
/// Indexed by `BlockSide as usize`. Each face is emitted as the triangles
/// `(0, 1, 2)` and `(0, 2, 3)` over these corners.
#[rustfmt::skip]
const UNIT_FACE_CORNERS: [[[i32; 3]; 4]; 6] = [
    [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]], // Top
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]], // Bottom
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]], // Front
    [[1, 0, 0], [0, 0, 0], [0, 1, 0], [1, 1, 0]], // Back
    [[1, 0, 1], [1, 0, 0], [1, 1, 0], [1, 1, 1]], // Right
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]], // Left
];

impl BlockSide {
    /// Returns an array containing all six block faces in discriminant order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::Top,
            BlockSide::Bottom,
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Right,
            BlockSide::Left,
        ]
    }

    /// The outward unit normal of this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::Top => Vector3::new(0, 1, 0),
            BlockSide::Bottom => Vector3::new(0, -1, 0),
            BlockSide::Front => Vector3::new(0, 0, 1),
            BlockSide::Back => Vector3::new(0, 0, -1),
            BlockSide::Right => Vector3::new(1, 0, 0),
            BlockSide::Left => Vector3::new(-1, 0, 0),
        }
    }

    /// The face pointing the other way.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::Top => BlockSide::Bottom,
            BlockSide::Bottom => BlockSide::Top,
            BlockSide::Front => BlockSide::Back,
            BlockSide::Back => BlockSide::Front,
            BlockSide::Right => BlockSide::Left,
            BlockSide::Left => BlockSide::Right,
        }
    }

    /// Axis (0 = x, 1 = y, 2 = z) the face is perpendicular to.
    pub fn normal_axis(self) -> usize {
        match self {
            BlockSide::Right | BlockSide::Left => 0,
            BlockSide::Top | BlockSide::Bottom => 1,
            BlockSide::Front | BlockSide::Back => 2,
        }
    }

    /// The in-plane axes `(u, v)` along which texture coordinates grow.
    ///
    /// `u` runs from the first to the second corner of [`BlockSide::unit_corners`],
    /// `v` from the second to the third. Side faces always have `v` along y so the
    /// texture stays upright.
    pub fn texture_axes(self) -> (usize, usize) {
        match self {
            BlockSide::Top => (2, 0),
            BlockSide::Bottom => (0, 2),
            BlockSide::Front | BlockSide::Back => (0, 1),
            BlockSide::Right | BlockSide::Left => (2, 1),
        }
    }

    /// Corners of the unit face on this side of a block at the origin.
    pub fn unit_corners(self) -> [[i32; 3]; 4] {
        UNIT_FACE_CORNERS[self as usize]
    }

    /// Constant light factor applied to the face so the block shape reads without
    /// real lighting.
    pub fn shade(self) -> f32 {
        match self {
            BlockSide::Top => 1.0,
            BlockSide::Bottom => 0.5,
            BlockSide::Front | BlockSide::Back => 0.8,
            BlockSide::Right | BlockSide::Left => 0.65,
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    fn corner(c: [i32; 3]) -> Vector3<i32> {
        Vector3::new(c[0], c[1], c[2])
    }

    #[test]
    fn corners_wind_counter_clockwise_around_the_normal() {
        for side in BlockSide::all() {
            let [a, b, c, d] = side.unit_corners().map(corner);
            let first = (b - a).cross(c - a);
            let second = (c - a).cross(d - a);
            assert_eq!(first, side.normal(), "{side:?} first triangle");
            assert_eq!(second, side.normal(), "{side:?} second triangle");
        }
    }

    #[test]
    fn corners_lie_on_the_face_plane() {
        for side in BlockSide::all() {
            let axis = side.normal_axis();
            let plane = if side.normal()[axis] > 0 { 1 } else { 0 };
            for c in side.unit_corners() {
                assert_eq!(c[axis], plane, "{side:?}");
            }
        }
    }

    #[test]
    fn texture_axes_follow_corner_order() {
        for side in BlockSide::all() {
            let (u, v) = side.texture_axes();
            let [a, b, c, _] = side.unit_corners().map(corner);
            let along_u = b - a;
            let along_v = c - b;
            assert_eq!(along_u[u].abs(), 1, "{side:?} u axis");
            assert_eq!(along_v[v].abs(), 1, "{side:?} v axis");
        }
    }

    #[test]
    fn opposite_sides_have_opposite_normals() {
        for side in BlockSide::all() {
            assert_eq!(side.opposite().normal(), -side.normal());
            assert_eq!(side.opposite().opposite(), side);
        }
    }
}
