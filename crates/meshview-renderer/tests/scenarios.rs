//! End-to-end gizmo sessions on the unit cube fixture

use meshview_renderer::glam::{Mat4, Vec3};
use meshview_renderer::{GizmoAxis, RecordingBackend, Scene, TransformMode};

const CUBE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../meshview-core/tests/fixtures/cube.obj"
);

fn cube_scene() -> Scene {
    let mut scene = Scene::default();
    assert!(scene.add_from_path(CUBE_PATH), "cube fixture failed to load");
    scene
}

/// Camera at (0, 0, 5) looking down -Z
fn front_camera(scene: &mut Scene) {
    scene.add_camera(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
}

#[test]
fn test_cube_loads_centred() {
    let scene = cube_scene();
    let cube = scene.active_object().unwrap();
    assert_eq!(cube.name().as_str(), "cube");
    assert_eq!(cube.vertex_count(), 8);
    assert_eq!(cube.faces().len(), 12);
    assert!(cube.pivot().length() < 1e-6);
    assert_eq!(cube.transform(), Mat4::IDENTITY);
}

#[test]
fn test_translation_drag_along_x() {
    let mut scene = cube_scene();
    front_camera(&mut scene);
    scene.activate_translation();

    let mut axis = None;
    let mut last_x = 0.0;
    for _ in 0..3 {
        axis = scene.local_transform(axis, 0.1, 0.0, 0.15, 0.0);
        assert_eq!(axis, Some(GizmoAxis::X));

        let cube = scene.active_object().unwrap();
        let x = cube.transform().w_axis.x;
        assert!(x > last_x);
        assert!((cube.pivot().x - x).abs() < 1e-6);
        last_x = x;
    }
    assert!((last_x - 0.3).abs() < 1e-5);

    let cube = scene.active_object().unwrap();
    assert_eq!(cube.pivot().y, 0.0);
    assert_eq!(cube.pivot().z, 0.0);
}

#[test]
fn test_end_on_axis_is_never_locked() {
    let mut scene = cube_scene();
    // Looking down -X: the X handle collapses to the pivot
    scene.add_camera(
        Vec3::new(5.0, 0.0, 0.0),
        Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
    );
    scene.activate_translation();

    let mut axis = None;
    for _ in 0..3 {
        axis = scene.local_transform(axis, 0.0, 0.1, 0.01, 0.01);
        assert_eq!(axis, Some(GizmoAxis::Y));
    }

    let cube = scene.active_object().unwrap();
    assert!((cube.pivot().y - 0.3).abs() < 1e-5);
    assert_eq!(cube.pivot().x, 0.0);
    assert_eq!(cube.pivot().z, 0.0);
}

#[test]
fn test_pick_far_from_handles_misses() {
    let mut scene = cube_scene();
    // Oblique view so that no handle collapses to a point
    scene.add_camera(Vec3::new(3.0, 3.0, 3.0), Vec3::new(-0.6155, 0.7854, 0.0));
    scene.activate_translation();

    assert_eq!(scene.local_transform(None, 0.1, 0.1, 0.8, -0.7), None);
    assert_eq!(scene.active_object().unwrap().transform(), Mat4::IDENTITY);
    assert_eq!(scene.transform_mode(), TransformMode::Translation);
}

#[test]
fn test_scaling_at_pivot_switches_to_uniform() {
    let mut scene = cube_scene();
    front_camera(&mut scene);
    scene.activate_scaling();

    let axis = scene.local_transform(None, 0.1, 0.0, 0.01, 0.01);
    assert!(axis.is_some());
    assert_eq!(scene.transform_mode(), TransformMode::UniformScaling);

    let m = scene.active_object().unwrap().transform();
    assert!((m.x_axis.x - 1.1).abs() < 1e-6);
    assert_eq!(m.x_axis.x, m.y_axis.y);
    assert_eq!(m.y_axis.y, m.z_axis.z);
    assert!(scene.active_object().unwrap().pivot().length() < 1e-6);

    // Arming scaling again starts a fresh single-axis session
    scene.activate_scaling();
    assert_eq!(scene.transform_mode(), TransformMode::Scaling);
}

#[test]
fn test_axis_along_view_leaves_object_untouched() {
    let mut scene = cube_scene();
    front_camera(&mut scene);
    scene.activate_translation();
    scene.local_transform(Some(GizmoAxis::X), 0.2, 0.0, 0.0, 0.0);
    let before = scene.active_object().unwrap().clone();

    for mode in [TransformMode::Translation, TransformMode::Scaling] {
        match mode {
            TransformMode::Translation => scene.activate_translation(),
            _ => scene.activate_scaling(),
        }
        assert!(!scene.axis_transform(GizmoAxis::Z, 0.3, -0.2));
        let cube = scene.active_object().unwrap();
        assert_eq!(cube.transform(), before.transform());
        assert_eq!(cube.pivot(), before.pivot());
    }
}

#[test]
fn test_session_renders_through_backend() {
    let mut scene = cube_scene();
    front_camera(&mut scene);
    scene.activate_rotation();
    let mut backend = RecordingBackend::new();
    scene.sync(&mut backend);
    scene.draw(&mut backend);

    // cube edges, grid, one stored camera, three rings
    assert_eq!(backend.draws().count(), 6);
}
