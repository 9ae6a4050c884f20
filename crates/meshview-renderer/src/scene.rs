// crates/meshview-renderer/src/scene.rs
//! シーン管理
//! オブジェクト一覧、カメラ一覧、変換モードを保持し、入力による状態変更と描画を行う。
//!
//! スレッドセーフではない。1つのスレッド（ブラウザのメインスレッド）からのみ操作すること。

use std::path::Path;

use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, info, warn};

use meshview_core::math::translate;
use meshview_core::MeshObject;

use crate::backend::{BufferHandle, Primitive, RenderBackend};
use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::gizmo::{GizmoAxis, GizmoGeometry, GizmoHandles, Increment, TransformMode};
use crate::mesh::{camera_glyph_points, grid_points, ObjectGeometry};
use crate::palette;

/// グリッドの点数
const GRID_POINTS: u32 = 36;
/// カメラモデルの点数
const CAMERA_GLYPH_POINTS: u32 = 48;

/// シーン内のオブジェクトと、その描画用バッファ
#[derive(Debug)]
struct SceneObject {
    object: MeshObject,
    geometry: ObjectGeometry,
    buffer: Option<BufferHandle>,
}

/// 保存済みカメラと、そのカメラモデルのバッファ
#[derive(Debug)]
struct StoredCamera {
    camera: Camera,
    buffer: Option<BufferHandle>,
}

/// シーン
#[derive(Debug)]
pub struct Scene {
    config: ViewerConfig,
    handles: GizmoHandles,
    gizmo: GizmoGeometry,

    objects: Vec<SceneObject>,
    /// オブジェクトが1つ以上あれば常に有効
    object_index: usize,

    cameras: Vec<StoredCamera>,
    /// None のときアクティブカメラは未保存の自由な姿勢
    camera_index: Option<usize>,
    active_camera: Camera,

    mode: TransformMode,

    grid_buffer: Option<BufferHandle>,
    gizmo_buffer: Option<BufferHandle>,
    gizmo_dirty: bool,
    /// 次の sync で解放するバッファ
    released: Vec<BufferHandle>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl Scene {
    /// 新しいシーンを作成
    pub fn new(config: ViewerConfig) -> Self {
        let handles = GizmoHandles::new(&config.gizmo);
        let gizmo = handles.geometry();
        Self {
            active_camera: config.initial_camera,
            config,
            handles,
            gizmo,
            objects: Vec::new(),
            object_index: 0,
            cameras: Vec::new(),
            camera_index: None,
            mode: TransformMode::Disabled,
            grid_buffer: None,
            gizmo_buffer: None,
            gizmo_dirty: false,
            released: Vec::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// 設定を差し替える。Gizmoの形状は次の sync で再アップロードされる
    pub fn set_config(&mut self, config: ViewerConfig) {
        self.handles = GizmoHandles::new(&config.gizmo);
        self.gizmo = self.handles.geometry();
        self.gizmo_dirty = true;
        self.config = config;
    }

    // ========================================================================
    // オブジェクト
    // ========================================================================

    /// オブジェクトを追加してアクティブにする（直前のアクティブは非アクティブになる）
    pub fn add_object(&mut self, mut object: MeshObject) -> usize {
        if let Some(current) = self.objects.get_mut(self.object_index) {
            current.object.active = false;
        }
        object.active = true;
        info!(
            name = %object.name(),
            faces = object.faces().len(),
            "Object added"
        );
        let geometry = ObjectGeometry::build(&object);
        self.objects.push(SceneObject {
            object,
            geometry,
            buffer: None,
        });
        self.object_index = self.objects.len() - 1;
        self.object_index
    }

    /// OBJテキストを読み込んで追加する。失敗時は一覧を変更しない
    pub fn add_from_source(&mut self, name: &str, source: &str) -> bool {
        match MeshObject::from_source(name, source) {
            Ok(object) => {
                self.add_object(object);
                true
            }
            Err(err) => {
                warn!(name, error = %err, "Failed to load mesh");
                false
            }
        }
    }

    /// OBJファイルを読み込んで追加する。失敗時は一覧を変更しない
    pub fn add_from_path(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match MeshObject::from_path(path) {
            Ok(object) => {
                self.add_object(object);
                true
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed to load mesh");
                false
            }
        }
    }

    /// オブジェクトを削除する。アクティブなものを消した場合は同じ位置（末尾なら1つ前）がアクティブになる
    pub fn remove_object(&mut self, index: usize) -> Option<MeshObject> {
        if index >= self.objects.len() {
            return None;
        }
        let removed = self.objects.remove(index);
        if let Some(buffer) = removed.buffer {
            self.released.push(buffer);
        }

        if self.objects.is_empty() {
            self.object_index = 0;
        } else if index < self.object_index {
            self.object_index -= 1;
        } else if index == self.object_index {
            self.object_index = self.object_index.min(self.objects.len() - 1);
            self.objects[self.object_index].object.active = true;
        }
        Some(removed.object)
    }

    pub fn objects(&self) -> impl Iterator<Item = &MeshObject> + '_ {
        self.objects.iter().map(|entry| &entry.object)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// アクティブなオブジェクトのインデックス（空なら None）
    pub fn object_index(&self) -> Option<usize> {
        (!self.objects.is_empty()).then_some(self.object_index)
    }

    pub fn active_object(&self) -> Option<&MeshObject> {
        self.objects.get(self.object_index).map(|entry| &entry.object)
    }

    fn active_object_mut(&mut self) -> Option<&mut MeshObject> {
        self.objects
            .get_mut(self.object_index)
            .map(|entry| &mut entry.object)
    }

    fn select_object(&mut self, index: usize) {
        if let Some(current) = self.active_object_mut() {
            current.active = false;
        }
        self.object_index = index;
        if let Some(next) = self.active_object_mut() {
            next.active = true;
        }
    }

    pub fn previous_object(&mut self) {
        let len = self.objects.len();
        if len == 0 {
            return;
        }
        self.select_object((self.object_index + len - 1) % len);
    }

    pub fn next_object(&mut self) {
        let len = self.objects.len();
        if len == 0 {
            return;
        }
        self.select_object((self.object_index + 1) % len);
    }

    pub fn toggle_vertex_normals(&mut self) {
        if let Some(object) = self.active_object_mut() {
            object.toggle_vertex_normals();
        }
    }

    pub fn toggle_face_normals(&mut self) {
        if let Some(object) = self.active_object_mut() {
            object.toggle_face_normals();
        }
    }

    pub fn toggle_bounding_box(&mut self) {
        if let Some(object) = self.active_object_mut() {
            object.toggle_bounding_box();
        }
    }

    // ========================================================================
    // カメラ
    // ========================================================================

    /// カメラを保存してアクティブにする
    pub fn add_camera(&mut self, position: Vec3, rotation: Vec3) -> usize {
        let camera = Camera::new(position, rotation);
        self.cameras.push(StoredCamera {
            camera,
            buffer: None,
        });
        let index = self.cameras.len() - 1;
        self.camera_index = Some(index);
        self.active_camera = camera;
        index
    }

    /// 現在の姿勢をカメラ一覧に保存する
    pub fn commit_camera(&mut self) -> usize {
        let Camera { position, rotation } = self.active_camera;
        let index = self.add_camera(position, rotation);
        info!(index, ?position, ?rotation, "Camera committed");
        index
    }

    /// 保存済みカメラを使う
    pub fn use_camera(&mut self, index: usize) -> bool {
        match self.cameras.get(index) {
            Some(stored) => {
                self.active_camera = stored.camera;
                self.camera_index = Some(index);
                true
            }
            None => false,
        }
    }

    /// アクティブな保存済みカメラを削除する。自由な姿勢のときは何もしない。
    /// 削除後もアクティブカメラの姿勢は変わらない
    pub fn delete_active_camera(&mut self) {
        let Some(index) = self.camera_index.take() else {
            debug!("No stored camera is active, nothing to delete");
            return;
        };
        let removed = self.cameras.remove(index);
        if let Some(buffer) = removed.buffer {
            self.released.push(buffer);
        }
    }

    pub fn previous_camera(&mut self) {
        let len = self.cameras.len();
        if len == 0 {
            return;
        }
        let index = match self.camera_index {
            None => 0,
            Some(i) => (i + len - 1) % len,
        };
        self.use_camera(index);
    }

    pub fn next_camera(&mut self) {
        let len = self.cameras.len();
        if len == 0 {
            return;
        }
        let index = match self.camera_index {
            None => 0,
            Some(i) => (i + 1) % len,
        };
        self.use_camera(index);
    }

    pub fn active_camera(&self) -> &Camera {
        &self.active_camera
    }

    pub fn cameras(&self) -> impl Iterator<Item = &Camera> + '_ {
        self.cameras.iter().map(|stored| &stored.camera)
    }

    pub fn camera_index(&self) -> Option<usize> {
        self.camera_index
    }

    /// 原点まわりに周回
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let speed = self.config.sensitivity.rotate_speed;
        self.active_camera.orbit(dx, dy, speed);
        self.camera_index = None;
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let speed = self.config.sensitivity.move_speed;
        self.active_camera.pan(dx, dy, speed);
        self.camera_index = None;
    }

    pub fn roll(&mut self, delta: f32) {
        let speed = self.config.sensitivity.rotate_speed;
        self.active_camera.roll_by(delta, speed);
        self.camera_index = None;
    }

    pub fn zoom(&mut self, delta: f32) {
        let speed = self.config.sensitivity.zoom_speed;
        self.active_camera.zoom(delta, speed);
        self.camera_index = None;
    }

    // ========================================================================
    // 変換
    // ========================================================================

    fn set_mode(&mut self, mode: TransformMode) {
        if self.objects.is_empty() {
            debug!(%mode, "No object to transform");
            return;
        }
        debug!(from = %self.mode, to = %mode, "Transform mode changed");
        self.mode = mode;
    }

    pub fn activate_translation(&mut self) {
        self.set_mode(TransformMode::Translation);
    }

    pub fn activate_scaling(&mut self) {
        self.set_mode(TransformMode::Scaling);
    }

    pub fn activate_rotation(&mut self) {
        self.set_mode(TransformMode::Rotation);
    }

    pub fn deactivate_transformation(&mut self) {
        if self.mode.is_active() {
            debug!(from = %self.mode, "Transform mode cleared");
        }
        self.mode = TransformMode::Disabled;
    }

    pub fn transform_mode(&self) -> TransformMode {
        self.mode
    }

    pub fn transformation_is_active(&self) -> bool {
        self.mode.is_active()
    }

    pub fn gizmo_handles(&self) -> &GizmoHandles {
        &self.handles
    }

    /// アクティブカメラの平面へ正射影
    pub fn camera_plane_projection(&self, point: Vec3) -> Vec2 {
        self.active_camera.project(point)
    }

    /// 確定した軸に1イベント分の変換を適用する。変換できなかった場合は false
    pub fn axis_transform(&mut self, axis: GizmoAxis, dx: f32, dy: f32) -> bool {
        let mode = self.mode;
        let camera = self.active_camera;
        let Some(pivot) = self.active_object().map(MeshObject::pivot) else {
            return false;
        };
        let Some(increment) = self.handles.increment(mode, axis, &camera, pivot, dx, dy) else {
            debug!(%mode, axis = axis.as_str(), dx, dy, "Axis transform skipped");
            return false;
        };
        let Some(object) = self.active_object_mut() else {
            return false;
        };
        match increment {
            Increment::Translate(delta) => object.translate(delta),
            Increment::Rotate(raw) => object.rotate(raw),
            Increment::Scale(raw) => object.scale_local(raw),
        }
        true
    }

    /// Gizmoドラッグ1イベント分の処理。
    /// `axis` が None ならポインタ位置 (x, y) でヒットテストを行い、ヒットしなければ None を返す。
    /// 返された軸をドラッグ終了まで渡し続けること
    pub fn local_transform(
        &mut self,
        axis: Option<GizmoAxis>,
        dx: f32,
        dy: f32,
        x: f32,
        y: f32,
    ) -> Option<GizmoAxis> {
        if !self.mode.is_active() {
            return None;
        }
        let pivot = self.active_object()?.pivot();

        let axis = match axis {
            Some(axis) => axis,
            None => {
                let pick = self
                    .handles
                    .pick(self.mode, &self.active_camera, pivot, Vec2::new(x, y))?;
                debug!(axis = pick.axis.as_str(), mode = %pick.mode, "Gizmo axis picked");
                self.mode = pick.mode;
                pick.axis
            }
        };

        self.axis_transform(axis, dx, dy);
        Some(axis)
    }

    // ========================================================================
    // 描画
    // ========================================================================

    /// 未アップロードのジオメトリを転送し、削除済みのバッファを解放する
    pub fn sync(&mut self, backend: &mut impl RenderBackend) {
        for buffer in self.released.drain(..) {
            backend.release(buffer);
        }

        if self.grid_buffer.is_none() {
            self.grid_buffer = Some(backend.upload(&grid_points()));
        }

        match self.gizmo_buffer {
            None => self.gizmo_buffer = Some(backend.upload(&self.gizmo.points)),
            Some(buffer) if self.gizmo_dirty => backend.reupload(buffer, &self.gizmo.points),
            Some(_) => {}
        }
        self.gizmo_dirty = false;

        for entry in self.objects.iter_mut().filter(|entry| entry.buffer.is_none()) {
            entry.buffer = Some(backend.upload(&entry.geometry.points));
        }

        for stored in self.cameras.iter_mut().filter(|stored| stored.buffer.is_none()) {
            stored.buffer = Some(backend.upload(&camera_glyph_points(&stored.camera)));
        }
    }

    /// シーンを描画する（状態は変更しない）。先に sync を呼ぶこと
    pub fn draw(&self, backend: &mut impl RenderBackend) {
        backend.set_view(self.active_camera.view_matrix());

        self.draw_objects(backend);

        backend.set_model(Mat4::IDENTITY);
        if let Some(grid) = self.grid_buffer {
            backend.set_color(palette::GRID);
            backend.draw(grid, Primitive::Lines, 0..GRID_POINTS);
        }

        backend.set_color(palette::CAMERA);
        for buffer in self.cameras.iter().filter_map(|stored| stored.buffer) {
            backend.draw(buffer, Primitive::Lines, 0..CAMERA_GLYPH_POINTS);
        }

        self.draw_gizmo(backend);
    }

    fn draw_objects(&self, backend: &mut impl RenderBackend) {
        for entry in &self.objects {
            let Some(buffer) = entry.buffer else {
                continue;
            };
            let object = &entry.object;
            let segments = &entry.geometry.segments;
            backend.set_model(object.transform());

            let color = if object.active {
                palette::MESH
            } else {
                palette::MESH_INACTIVE
            };
            backend.set_color(color);
            backend.draw(buffer, Primitive::Lines, segments.edges.clone());

            let overlays = [
                (object.display.bounding_box, palette::BOUNDING_BOX, &segments.bounding_box),
                (object.display.vertex_normals, palette::VERTEX_NORMAL, &segments.vertex_normals),
                (object.display.face_normals, palette::FACE_NORMAL, &segments.face_normals),
            ];
            for (shown, color, range) in overlays {
                if shown && !range.is_empty() {
                    backend.set_color(color);
                    backend.draw(buffer, Primitive::Lines, range.clone());
                }
            }
        }
    }

    fn draw_gizmo(&self, backend: &mut impl RenderBackend) {
        if !self.mode.is_active() {
            return;
        }
        let (Some(buffer), Some(object)) = (self.gizmo_buffer, self.active_object()) else {
            return;
        };
        let gizmo = &self.gizmo;
        backend.set_model(translate(object.pivot()));

        for axis in GizmoAxis::ALL {
            let i = axis.index();
            backend.set_color(axis.color());
            match self.mode {
                TransformMode::Translation => {
                    backend.draw(buffer, Primitive::Lines, gizmo.axes[i].clone());
                    backend.draw(buffer, Primitive::Triangles, gizmo.arrows[i].clone());
                }
                TransformMode::Scaling | TransformMode::UniformScaling => {
                    backend.draw(buffer, Primitive::Lines, gizmo.axes[i].clone());
                    backend.draw(buffer, Primitive::Points, gizmo.ends[i].clone());
                }
                TransformMode::Rotation => {
                    backend.draw(buffer, Primitive::Lines, gizmo.rings[i].clone());
                }
                TransformMode::Disabled => {}
            }
        }

        if matches!(
            self.mode,
            TransformMode::Scaling | TransformMode::UniformScaling
        ) {
            backend.set_color(palette::COLOR_CENTER);
            backend.draw(buffer, Primitive::Points, gizmo.center.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Recorded, RecordingBackend};
    use proptest::prelude::*;

    const TRIANGLE: &str = "v -1 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn scene_with_objects(n: usize) -> Scene {
        let mut scene = Scene::default();
        for i in 0..n {
            assert!(scene.add_from_source(&format!("tri{}", i), TRIANGLE));
        }
        scene
    }

    fn active_flags(scene: &Scene) -> Vec<bool> {
        scene.objects().map(|o| o.active).collect()
    }

    #[test]
    fn test_add_object_activates_newest() {
        let scene = scene_with_objects(3);
        assert_eq!(scene.object_index(), Some(2));
        assert_eq!(active_flags(&scene), vec![false, false, true]);
    }

    #[test]
    fn test_failed_load_leaves_list_unchanged() {
        let mut scene = scene_with_objects(1);
        assert!(!scene.add_from_source("broken", "v 0 0 0\nf 1 2 3 4\n"));
        assert!(!scene.add_from_path("/nonexistent/mesh.obj"));
        assert_eq!(scene.object_count(), 1);
        assert_eq!(scene.object_index(), Some(0));
    }

    #[test]
    fn test_object_cycling_wraps() {
        let mut scene = scene_with_objects(3);
        scene.next_object();
        assert_eq!(scene.object_index(), Some(0));
        assert_eq!(active_flags(&scene), vec![true, false, false]);
        scene.previous_object();
        assert_eq!(scene.object_index(), Some(2));
        assert_eq!(active_flags(&scene), vec![false, false, true]);
    }

    #[test]
    fn test_remove_object_keeps_index_valid() {
        let mut scene = scene_with_objects(3);
        scene.remove_object(2).unwrap();
        assert_eq!(scene.object_index(), Some(1));
        assert_eq!(active_flags(&scene), vec![false, true]);

        scene.previous_object();
        scene.remove_object(1).unwrap();
        assert_eq!(scene.object_index(), Some(0));

        scene.remove_object(0).unwrap();
        assert_eq!(scene.object_index(), None);
        assert!(scene.remove_object(0).is_none());
    }

    #[test]
    fn test_empty_scene_operations_are_noops() {
        let mut scene = Scene::default();
        scene.next_object();
        scene.previous_object();
        scene.toggle_bounding_box();
        scene.next_camera();
        scene.previous_camera();
        scene.delete_active_camera();
        scene.activate_translation();
        assert_eq!(scene.transform_mode(), TransformMode::Disabled);
        assert_eq!(scene.local_transform(None, 0.1, 0.0, 0.0, 0.0), None);
        assert_eq!(scene.camera_index(), None);
        assert_eq!(*scene.active_camera(), Camera::default());
    }

    #[test]
    fn test_add_camera_round_trip() {
        let mut scene = Scene::default();
        let position = Vec3::new(1.0, 2.0, 3.0);
        let rotation = Vec3::new(0.1, -0.4, 0.2);
        scene.add_camera(position, rotation);
        assert_eq!(scene.camera_index(), Some(0));
        assert_eq!(
            scene.active_camera().view_matrix(),
            Camera::new(position, rotation).view_matrix()
        );

        scene.orbit(10.0, 5.0);
        assert!(scene.use_camera(0));
        assert_eq!(
            scene.active_camera().view_matrix(),
            Camera::new(position, rotation).view_matrix()
        );
    }

    #[test]
    fn test_camera_cycling() {
        let mut scene = Scene::default();
        scene.add_camera(Vec3::X, Vec3::ZERO);
        scene.add_camera(Vec3::Y, Vec3::ZERO);
        scene.add_camera(Vec3::Z, Vec3::ZERO);

        // 自由な姿勢からは常に先頭へ
        scene.zoom(1.0);
        assert_eq!(scene.camera_index(), None);
        scene.previous_camera();
        assert_eq!(scene.camera_index(), Some(0));
        scene.previous_camera();
        assert_eq!(scene.camera_index(), Some(2));
        assert_eq!(scene.active_camera().position, Vec3::Z);
        scene.next_camera();
        assert_eq!(scene.camera_index(), Some(0));
    }

    #[test]
    fn test_delete_active_camera() {
        let mut scene = Scene::default();
        scene.add_camera(Vec3::X, Vec3::ZERO);
        scene.add_camera(Vec3::Y, Vec3::ZERO);

        scene.delete_active_camera();
        assert_eq!(scene.cameras().count(), 1);
        assert_eq!(scene.camera_index(), None);
        // 姿勢はそのまま残る
        assert_eq!(scene.active_camera().position, Vec3::Y);

        // 自由な姿勢では何もしない
        scene.delete_active_camera();
        assert_eq!(scene.cameras().count(), 1);
    }

    #[test]
    fn test_navigation_detaches_camera() {
        let mut scene = Scene::default();
        scene.commit_camera();
        assert_eq!(scene.camera_index(), Some(0));
        scene.pan(1.0, 0.0);
        assert_eq!(scene.camera_index(), None);
        scene.next_camera();
        scene.roll(1.0);
        assert_eq!(scene.camera_index(), None);
    }

    #[test]
    fn test_toggles_apply_to_active_object() {
        let mut scene = scene_with_objects(2);
        scene.toggle_vertex_normals();
        scene.toggle_face_normals();
        let flags: Vec<_> = scene.objects().map(|o| o.display).collect();
        assert!(!flags[0].vertex_normals);
        assert!(flags[1].vertex_normals && flags[1].face_normals);
        assert!(!flags[1].bounding_box);
    }

    #[test]
    fn test_pick_miss_returns_none_and_keeps_transform() {
        let mut scene = scene_with_objects(1);
        scene.activate_translation();
        let before = scene.active_object().unwrap().transform();
        // 既定カメラからは Z 軸が点に潰れるので、斜めのカメラで試す
        scene.add_camera(Vec3::new(2.0, 2.0, 2.0), Vec3::new(-0.6, 0.785, 0.0));
        assert_eq!(scene.local_transform(None, 0.1, 0.0, 0.9, -0.9), None);
        assert_eq!(scene.active_object().unwrap().transform(), before);
    }

    #[test]
    fn test_rotation_keeps_pivot() {
        let mut scene = scene_with_objects(1);
        scene.activate_rotation();
        let pivot = scene.active_object().unwrap().pivot();
        assert!(scene.axis_transform(GizmoAxis::Z, 0.3, 0.2));
        assert_eq!(scene.active_object().unwrap().pivot(), pivot);
    }

    #[test]
    fn test_sync_uploads_once_and_releases() {
        let mut scene = scene_with_objects(2);
        scene.add_camera(Vec3::X, Vec3::ZERO);
        let mut backend = RecordingBackend::new();

        scene.sync(&mut backend);
        // グリッド、Gizmo、オブジェクト2つ、カメラ1つ
        assert_eq!(backend.live_buffers(), 5);
        scene.sync(&mut backend);
        assert_eq!(backend.live_buffers(), 5);

        scene.remove_object(0);
        scene.delete_active_camera();
        scene.sync(&mut backend);
        assert_eq!(backend.live_buffers(), 3);
    }

    #[test]
    fn test_set_config_reuploads_gizmo() {
        let mut scene = Scene::default();
        let mut backend = RecordingBackend::new();
        scene.sync(&mut backend);
        backend.clear_calls();

        let mut config = ViewerConfig::default();
        config.gizmo.ring_samples = 10;
        scene.set_config(config);
        scene.sync(&mut backend);
        assert!(matches!(
            backend.calls.as_slice(),
            [Recorded::Reupload { len, .. }] if *len == 6 + 36 + 3 + 1 + 60
        ));
    }

    #[test]
    fn test_draw_is_pure() {
        let mut scene = scene_with_objects(2);
        scene.activate_rotation();
        let mut backend = RecordingBackend::new();
        scene.sync(&mut backend);

        let before: Vec<_> = scene.objects().map(|o| o.info()).collect();
        let camera = *scene.active_camera();
        backend.clear_calls();
        scene.draw(&mut backend);
        let first = backend.calls.clone();
        backend.clear_calls();
        scene.draw(&mut backend);

        assert_eq!(first, backend.calls);
        assert_eq!(scene.objects().map(|o| o.info()).collect::<Vec<_>>(), before);
        assert_eq!(*scene.active_camera(), camera);
    }

    #[test]
    fn test_draw_stream() {
        let mut scene = scene_with_objects(2);
        scene.toggle_bounding_box();
        scene.commit_camera();
        scene.activate_translation();
        let mut backend = RecordingBackend::new();
        scene.sync(&mut backend);
        backend.clear_calls();
        scene.draw(&mut backend);

        assert_eq!(
            backend.calls.first(),
            Some(&Recorded::View(scene.active_camera().view_matrix()))
        );
        // 非アクティブなオブジェクトは薄い色
        assert!(backend.calls.contains(&Recorded::Color(palette::MESH_INACTIVE)));

        let primitives: Vec<_> = backend.draws().map(|(_, p, _)| p).collect();
        // 辺2 + バウンディングボックス1 + グリッド1 + カメラ1 + 軸3 + 矢印3
        assert_eq!(primitives.len(), 11);
        assert_eq!(
            primitives.iter().filter(|&&p| p == Primitive::Triangles).count(),
            3
        );

        // Gizmoはピボット位置に描かれる
        let pivot = scene.active_object().unwrap().pivot();
        assert!(backend.calls.contains(&Recorded::Model(translate(pivot))));
    }

    #[test]
    fn test_draw_without_mode_skips_gizmo() {
        let mut scene = scene_with_objects(1);
        let mut backend = RecordingBackend::new();
        scene.sync(&mut backend);
        backend.clear_calls();
        scene.draw(&mut backend);
        // 辺 + グリッド
        assert_eq!(backend.draws().count(), 2);
    }

    proptest! {
        #[test]
        fn prop_rotation_undo_restores_transform(
            axis_index in 0usize..3,
            dx in -1.0f32..1.0,
            dy in -1.0f32..1.0,
        ) {
            let mut scene = scene_with_objects(1);
            scene.activate_rotation();
            let axis = GizmoAxis::ALL[axis_index];
            let before = scene.active_object().unwrap().transform();
            let pivot = scene.active_object().unwrap().pivot();

            scene.axis_transform(axis, dx, dy);
            scene.axis_transform(axis, -dx, -dy);

            let object = scene.active_object().unwrap();
            prop_assert!(object.transform().abs_diff_eq(before, 1e-5));
            prop_assert_eq!(object.pivot(), pivot);
        }

        #[test]
        fn prop_uniform_scaling_keeps_pivot(factor in -0.5f32..0.5) {
            let mut scene = scene_with_objects(1);
            scene.activate_scaling();
            scene.mode = TransformMode::UniformScaling;
            let pivot = scene.active_object().unwrap().pivot();
            scene.axis_transform(GizmoAxis::X, factor, 0.0);
            prop_assert_eq!(scene.active_object().unwrap().pivot(), pivot);
        }
    }
}
