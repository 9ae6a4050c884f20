//! Math primitives shared by every crate in the workspace.
//!
//! Vectors and matrices are glam types. This module adds the zero-snapping
//! rule (components with magnitude below [`ZERO_TOLERANCE`] become exactly
//! zero) and the matrix builders used by the camera and the gizmo.

pub use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// Magnitudes strictly below this value are snapped to zero.
pub const ZERO_TOLERANCE: f32 = 1e-7;

/// Zero-snapping for scalars and vectors.
pub trait Snap {
    fn snap(self) -> Self;
}

impl Snap for f32 {
    #[inline]
    fn snap(self) -> Self {
        if self.abs() < ZERO_TOLERANCE { 0.0 } else { self }
    }
}

impl Snap for Vec2 {
    #[inline]
    fn snap(self) -> Self {
        Vec2::new(self.x.snap(), self.y.snap())
    }
}

impl Snap for Vec3 {
    #[inline]
    fn snap(self) -> Self {
        Vec3::new(self.x.snap(), self.y.snap(), self.z.snap())
    }
}

impl Snap for Vec4 {
    #[inline]
    fn snap(self) -> Self {
        Vec4::new(self.x.snap(), self.y.snap(), self.z.snap(), self.w.snap())
    }
}

/// Snapping constructor for [`Vec2`].
#[inline]
pub fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y).snap()
}

/// Snapping constructor for [`Vec3`].
#[inline]
pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x, y, z).snap()
}

/// Snapping constructor for [`Vec4`].
#[inline]
pub fn vec4(x: f32, y: f32, z: f32, w: f32) -> Vec4 {
    Vec4::new(x, y, z, w).snap()
}

/// Dot product with the result snapped.
#[inline]
pub fn dot2(a: Vec2, b: Vec2) -> f32 {
    a.dot(b).snap()
}

/// Dot product with the result snapped.
#[inline]
pub fn dot3(a: Vec3, b: Vec3) -> f32 {
    a.dot(b).snap()
}

// Rotations are right-handed: a positive angle turns counter-clockwise when
// looking down the axis towards the origin.

pub fn rot_x(theta: f32) -> Mat4 {
    Mat4::from_rotation_x(theta)
}

pub fn rot_y(theta: f32) -> Mat4 {
    Mat4::from_rotation_y(theta)
}

pub fn rot_z(theta: f32) -> Mat4 {
    Mat4::from_rotation_z(theta)
}

pub fn rx3(theta: f32) -> Mat3 {
    Mat3::from_rotation_x(theta)
}

pub fn ry3(theta: f32) -> Mat3 {
    Mat3::from_rotation_y(theta)
}

pub fn rz3(theta: f32) -> Mat3 {
    Mat3::from_rotation_z(theta)
}

/// Translation by `offset` (stored in the last column).
pub fn translate(offset: Vec3) -> Mat4 {
    Mat4::from_translation(offset)
}

/// Uniform scale.
pub fn scale(a: f32) -> Mat4 {
    Mat4::from_scale(Vec3::splat(a))
}

pub fn scale_x(a: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(a, 1.0, 1.0))
}

pub fn scale_y(a: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(1.0, a, 1.0))
}

pub fn scale_z(a: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(1.0, 1.0, a))
}

pub fn scale3(a: f32, b: f32, c: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(a, b, c))
}

/// Applies `m` to a point (w = 1) and snaps the result.
#[inline]
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    m.transform_point3(p).snap()
}

/// Wraps an angle into the open interval (-2π, 2π).
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    if angle >= TAU {
        angle - TAU
    } else if angle <= -TAU {
        angle + TAU
    } else {
        angle
    }
}
