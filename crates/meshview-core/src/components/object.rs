use std::path::Path;

use serde::Serialize;

use super::Name;
use crate::bounds::BoundingBox;
use crate::error::LoadError;
use crate::loader::{self, LoadedMesh, Triangle};
use crate::math::{translate, Mat4, Vec3};

/// Which auxiliary overlays are drawn for an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DisplayFlags {
    pub vertex_normals: bool,
    pub face_normals: bool,
    pub bounding_box: bool,
}

/// A loaded mesh placed in the scene.
///
/// `centroid` is the object-local mean of the vertices and never changes.
/// `pivot` is the world-space anchor used by the gizmo; only translation
/// moves it, so it always equals `transform * centroid`.
#[derive(Debug, Clone)]
pub struct MeshObject {
    name: Name,
    faces: Vec<Triangle>,
    vertex_count: usize,
    bounds: BoundingBox,
    centroid: Vec3,
    pivot: Vec3,
    transform: Mat4,
    pub active: bool,
    pub display: DisplayFlags,
}

impl MeshObject {
    /// Create an object with an identity transform
    pub fn new(name: Name, mesh: LoadedMesh) -> Self {
        let bounds = BoundingBox::from_points(&mesh.vertices)
            .unwrap_or(BoundingBox::new(mesh.pivot, mesh.pivot));
        Self {
            name,
            faces: mesh.faces,
            vertex_count: mesh.vertices.len(),
            bounds,
            centroid: mesh.pivot,
            pivot: mesh.pivot,
            transform: Mat4::IDENTITY,
            active: true,
            display: DisplayFlags::default(),
        }
    }

    /// Parse OBJ text into a new object
    pub fn from_source(name: impl Into<String>, source: &str) -> Result<Self, LoadError> {
        let mesh = loader::parse_obj(source)?;
        Ok(Self::new(Name::new(name), mesh))
    }

    /// Load an OBJ file into a new object named after the file stem
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let mesh = loader::load(path)?;
        Ok(Self::new(Name::from_path(path), mesh))
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn faces(&self) -> &[Triangle] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Tight object-local bounds (no display margin)
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// World-space translation. Moves the pivot by the same amount.
    pub fn translate(&mut self, delta: Vec3) {
        self.transform = translate(delta) * self.transform;
        self.pivot += delta;
    }

    /// Applies `raw` about the world pivot, composed on the left.
    pub fn rotate(&mut self, raw: Mat4) {
        let anchored = translate(self.pivot) * raw * translate(-self.pivot);
        self.transform = anchored * self.transform;
    }

    /// Applies `raw` about the centroid in the object's own frame, composed
    /// on the right.
    pub fn scale_local(&mut self, raw: Mat4) {
        let anchored = translate(self.centroid) * raw * translate(-self.centroid);
        self.transform *= anchored;
    }

    pub fn toggle_vertex_normals(&mut self) {
        self.display.vertex_normals = !self.display.vertex_normals;
    }

    pub fn toggle_face_normals(&mut self) {
        self.display.face_normals = !self.display.face_normals;
    }

    pub fn toggle_bounding_box(&mut self) {
        self.display.bounding_box = !self.display.bounding_box;
    }

    /// Summary for front ends
    pub fn info(&self) -> ObjectInfo {
        ObjectInfo {
            name: self.name.clone(),
            pivot: self.pivot.to_array(),
            transform: self.transform.to_cols_array(),
            active: self.active,
            display: self.display,
            vertex_count: self.vertex_count,
            face_count: self.faces.len(),
        }
    }
}

/// Serializable snapshot of a [`MeshObject`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInfo {
    pub name: Name,
    pub pivot: [f32; 3],
    /// Column-major
    pub transform: [f32; 16],
    pub active: bool,
    pub display: DisplayFlags,
    pub vertex_count: usize,
    pub face_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{rot_z, scale, scale_x};
    use std::f32::consts::FRAC_PI_2;

    const OFFSET_TRIANGLE: &str = "v 1 0 0\nv 3 0 0\nv 2 3 0\nf 1 2 3\n";

    fn object() -> MeshObject {
        MeshObject::from_source("tri", OFFSET_TRIANGLE).unwrap()
    }

    fn world_centroid(o: &MeshObject) -> Vec3 {
        o.transform().transform_point3(o.centroid())
    }

    #[test]
    fn test_new_object() {
        let o = object();
        assert_eq!(o.name().as_str(), "tri");
        assert_eq!(o.transform(), Mat4::IDENTITY);
        assert!(o.active);
        assert_eq!(o.display, DisplayFlags::default());
        assert!((o.pivot() - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-6);
        assert_eq!(o.bounds().min, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(o.bounds().max, Vec3::new(3.0, 3.0, 0.0));
    }

    #[test]
    fn test_translate_moves_pivot() {
        let mut o = object();
        o.translate(Vec3::new(0.5, -1.0, 2.0));
        assert!((o.pivot() - Vec3::new(2.5, 0.0, 2.0)).length() < 1e-6);
        assert!((world_centroid(&o) - o.pivot()).length() < 1e-5);
    }

    #[test]
    fn test_rotate_keeps_pivot_fixed() {
        let mut o = object();
        o.translate(Vec3::new(1.0, 1.0, 0.0));
        let before = o.pivot();
        o.rotate(rot_z(FRAC_PI_2));
        assert_eq!(o.pivot(), before);
        assert!((world_centroid(&o) - before).length() < 1e-5);
    }

    #[test]
    fn test_scale_local_keeps_centroid_in_place() {
        let mut o = object();
        o.translate(Vec3::new(-4.0, 0.0, 1.0));
        o.rotate(rot_z(0.7));
        let before = o.pivot();
        o.scale_local(scale(1.5));
        o.scale_local(scale_x(0.5));
        assert_eq!(o.pivot(), before);
        assert!((world_centroid(&o) - before).length() < 1e-5);
    }

    #[test]
    fn test_scale_after_translation_anchors_at_local_centroid() {
        let mut o = object();
        o.translate(Vec3::new(2.0, 0.0, 0.0));
        o.scale_local(scale_x(2.0));

        let c = o.centroid();
        let expected = translate(Vec3::new(2.0, 0.0, 0.0)) * translate(c) * scale_x(2.0) * translate(-c);
        assert!(o.transform().abs_diff_eq(expected, 1e-6));

        // x offset from the centroid doubles from 1 to 2, then the translation adds 2
        let vertex = o.transform().transform_point3(Vec3::new(3.0, 0.0, 0.0));
        assert!((vertex - Vec3::new(6.0, 0.0, 0.0)).length() < 1e-5);

        // Anchoring at the world pivot would give a different matrix
        let p = Vec3::new(4.0, 1.0, 0.0);
        let about_pivot = translate(Vec3::new(2.0, 0.0, 0.0)) * translate(p) * scale_x(2.0) * translate(-p);
        assert!(!o.transform().abs_diff_eq(about_pivot, 1e-3));
        assert!((o.pivot() - p).length() < 1e-6);
    }

    #[test]
    fn test_toggles() {
        let mut o = object();
        o.toggle_vertex_normals();
        o.toggle_bounding_box();
        o.toggle_bounding_box();
        o.toggle_face_normals();
        assert!(o.display.vertex_normals);
        assert!(o.display.face_normals);
        assert!(!o.display.bounding_box);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = object();
        let mut copy = original.clone();
        copy.translate(Vec3::X);
        assert_eq!(original.transform(), Mat4::IDENTITY);
        assert_ne!(copy.transform(), Mat4::IDENTITY);
    }

    #[test]
    fn test_info() {
        let info = object().info();
        assert_eq!(info.face_count, 1);
        assert_eq!(info.vertex_count, 3);
        assert_eq!(info.transform, Mat4::IDENTITY.to_cols_array());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["name"], "tri");
    }
}
