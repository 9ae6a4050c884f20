//! Axis-aligned bounding boxes for loaded meshes.

use crate::math::Vec3;

/// Padding added on every side when the box is displayed.
pub const DISPLAY_MARGIN: f32 = 0.05;

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl BoundingBox {
    /// Create a new box from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self { min, max })
    }

    /// Grows the box by `margin` on every side.
    pub fn padded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Check if a point is inside the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// The 12 edges as 24 line-list points.
    pub fn edge_points(&self) -> [Vec3; 24] {
        let (a, b) = (self.min, self.max);
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        [
            // bottom
            corner(a.x, a.y, a.z), corner(b.x, a.y, a.z),
            corner(b.x, a.y, a.z), corner(b.x, a.y, b.z),
            corner(b.x, a.y, b.z), corner(a.x, a.y, b.z),
            corner(a.x, a.y, b.z), corner(a.x, a.y, a.z),
            // top
            corner(a.x, b.y, a.z), corner(b.x, b.y, a.z),
            corner(b.x, b.y, a.z), corner(b.x, b.y, b.z),
            corner(b.x, b.y, b.z), corner(a.x, b.y, b.z),
            corner(a.x, b.y, b.z), corner(a.x, b.y, a.z),
            // verticals
            corner(a.x, a.y, a.z), corner(a.x, b.y, a.z),
            corner(b.x, a.y, a.z), corner(b.x, b.y, a.z),
            corner(b.x, a.y, b.z), corner(b.x, b.y, b.z),
            corner(a.x, a.y, b.z), corner(a.x, b.y, b.z),
        ]
    }
}
