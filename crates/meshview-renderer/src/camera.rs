use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use meshview_core::math::{rot_x, rot_y, rot_z, rx3, ry3, rz3, translate, wrap_angle, Snap};

/// GPU用カメラUniform
/// View-Projection行列を列優先形式で格納
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Mat4からCameraUniformを作成
    pub fn from_mat4(mat: Mat4) -> Self {
        Self {
            view_proj: mat.to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::from_mat4(Mat4::IDENTITY)
    }
}

/// 正射影の設定
/// 可視範囲は常に[-1, 1]²なので、カメラ平面座標とNDCが一致する
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            near: 0.01,
            far: 100.0,
        }
    }
}

impl Projection {
    /// 射影行列を構築
    pub fn matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, self.near, self.far)
    }
}

/// 3Dカメラ
/// 位置とオイラー角（pitch, yaw, roll）で姿勢を表す。
/// ローカル座標系では -Z 方向を向く
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// x = pitch, y = yaw, z = roll（ラジアン）
    pub rotation: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO)
    }
}

impl Camera {
    /// 位置と回転から新しいカメラを作成
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    pub fn pitch(&self) -> f32 {
        self.rotation.x
    }

    pub fn yaw(&self) -> f32 {
        self.rotation.y
    }

    pub fn roll(&self) -> f32 {
        self.rotation.z
    }

    /// ワールド空間でのカメラの回転 Ry(yaw)·Rx(pitch)·Rz(roll)
    pub fn world_rotation(&self) -> Mat4 {
        rot_y(self.yaw()) * rot_x(self.pitch()) * rot_z(self.roll())
    }

    /// ビュー行列 Rz(−roll)·Rx(−pitch)·Ry(−yaw)·T(−position)
    pub fn view_matrix(&self) -> Mat4 {
        rot_z(-self.roll()) * rot_x(-self.pitch()) * rot_y(-self.yaw()) * translate(-self.position)
    }

    /// View-Projection行列を構築
    pub fn build_view_projection_matrix(&self, projection: &Projection) -> Mat4 {
        projection.matrix() * self.view_matrix()
    }

    /// GPU用のCameraUniformを取得
    pub fn uniform(&self, projection: &Projection) -> CameraUniform {
        CameraUniform::from_mat4(self.build_view_projection_matrix(projection))
    }

    /// 視線方向（単位ベクトル）
    pub fn forward(&self) -> Vec3 {
        self.world_rotation().transform_vector3(Vec3::NEG_Z).snap()
    }

    /// 点をカメラ平面へ正射影する（深度は捨てる）
    pub fn project(&self, point: Vec3) -> Vec2 {
        let q = point - self.position;
        let rotated = rz3(-self.roll()) * rx3(-self.pitch()) * ry3(-self.yaw()) * q;
        Vec2::new(rotated.x, rotated.y).snap()
    }

    /// 原点を中心に周回する
    pub fn orbit(&mut self, dx: f32, dy: f32, speed: f32) {
        let yaw = self.yaw();
        let turn = rot_y(yaw + speed * dx) * rot_x(speed * dy) * rot_y(-yaw);
        self.position = turn.transform_point3(self.position).snap();
        self.rotation.x = wrap_angle(self.rotation.x + speed * dy);
        self.rotation.y = wrap_angle(self.rotation.y + speed * dx);
    }

    /// カメラ自身の平面内で平行移動する
    pub fn pan(&mut self, dx: f32, dy: f32, speed: f32) {
        let rotation = self.world_rotation();
        let mut local = rotation.inverse().transform_point3(self.position);
        local.x += speed * dx;
        local.y -= speed * dy;
        self.position = rotation.transform_point3(local).snap();
    }

    /// 視線軸まわりに回転する
    pub fn roll_by(&mut self, delta: f32, speed: f32) {
        self.rotation.z = wrap_angle(self.rotation.z + speed * delta);
    }

    /// カメラの+Z方向（視線の逆）へ前後移動する。正のdeltaで遠ざかる
    pub fn zoom(&mut self, delta: f32, speed: f32) {
        let back = ry3(self.yaw()) * rx3(self.pitch()) * Vec3::Z;
        self.position = (self.position + back * (speed * delta)).snap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, TAU};

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_camera_default() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.rotation, Vec3::ZERO);
    }

    #[test]
    fn test_camera_uniform_size() {
        // 4x4 floats * 4 bytes = 64 bytes
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
    }

    #[test]
    fn test_view_matrix_moves_world_opposite() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(close(p, Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn test_origin_is_visible_from_default_camera() {
        let camera = Camera::default();
        let clip = camera
            .build_view_projection_matrix(&Projection::default())
            .project_point3(Vec3::ZERO);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn test_project_matches_view_xy() {
        let camera = Camera::new(Vec3::new(1.0, -2.0, 4.0), Vec3::new(0.3, -0.8, 0.2));
        let p = Vec3::new(0.4, 0.1, -0.6);
        let projected = camera.project(p);
        let viewed = camera.view_matrix().transform_point3(p);
        assert!((projected.x - viewed.x).abs() < 1e-5);
        assert!((projected.y - viewed.y).abs() < 1e-5);
    }

    #[test]
    fn test_forward_default_is_neg_z() {
        assert_eq!(Camera::default().forward(), Vec3::NEG_Z);
    }

    #[test]
    fn test_orbit_keeps_distance_and_looks_at_origin() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        camera.orbit(40.0, -25.0, 0.01);
        assert!((camera.position.length() - 5.0).abs() < 1e-4);
        // 原点は画面中央に投影される
        assert!(camera.project(Vec3::ZERO).length() < 1e-4);
        assert!(close(camera.forward(), -camera.position.normalize()));
    }

    #[test]
    fn test_orbit_quarter_turn() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        camera.orbit(FRAC_PI_2, 0.0, 1.0);
        assert!(close(camera.position, Vec3::new(5.0, 0.0, 0.0)));
        assert!((camera.yaw() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_pan_moves_in_camera_plane() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        camera.pan(100.0, 100.0, 0.005);
        assert!(close(camera.position, Vec3::new(0.5, -0.5, 5.0)));
    }

    #[test]
    fn test_zoom_moves_against_forward() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        camera.zoom(100.0, 0.01);
        assert!(close(camera.position, Vec3::new(0.0, 0.0, 6.0)));
        camera.zoom(-200.0, 0.01);
        assert!(close(camera.position, Vec3::new(0.0, 0.0, 4.0)));
    }

    #[test]
    fn test_zoom_follows_yaw_and_pitch() {
        let mut camera = Camera::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, FRAC_PI_2, 0.0));
        camera.zoom(1.0, 1.0);
        assert!(close(camera.position, Vec3::new(6.0, 0.0, 0.0)));
        assert!(close(camera.position + camera.forward(), Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_roll_wraps() {
        let mut camera = Camera::default();
        camera.roll_by(TAU + 0.25, 1.0);
        assert!((camera.roll() - 0.25).abs() < 1e-5);
        camera.roll_by(-(TAU + 0.5), 1.0);
        assert!((camera.roll() + 0.25).abs() < 1e-4);
    }
}
