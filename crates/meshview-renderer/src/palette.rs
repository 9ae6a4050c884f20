//! 描画色の定義（Solarizedベース）

use glam::Vec4;

const fn rgb(r: f32, g: f32, b: f32, a: f32) -> Vec4 {
    Vec4::new(r / 255.0, g / 255.0, b / 255.0, a)
}

pub const BASE: Vec4 = rgb(0.0, 43.0, 54.0, 1.0);
pub const YELLOW: Vec4 = rgb(181.0, 137.0, 0.0, 1.0);
pub const ORANGE: Vec4 = rgb(203.0, 75.0, 22.0, 1.0);
pub const RED: Vec4 = rgb(220.0, 50.0, 47.0, 1.0);
pub const MAGENTA: Vec4 = rgb(211.0, 54.0, 130.0, 1.0);
pub const BLUE: Vec4 = rgb(38.0, 139.0, 210.0, 1.0);
pub const CYAN: Vec4 = rgb(42.0, 161.0, 152.0, 1.0);
pub const GREEN: Vec4 = rgb(133.0, 153.0, 0.0, 1.0);

/// 8色のカラースキーム
pub const SOLARIZED: [Vec4; 8] = [BASE, YELLOW, ORANGE, RED, MAGENTA, BLUE, CYAN, GREEN];

/// 背景色
pub const CLEAR: Vec4 = BASE;

/// アクティブなメッシュ
pub const MESH: Vec4 = RED;
/// 非アクティブなメッシュ（半透明）
pub const MESH_INACTIVE: Vec4 = rgb(220.0, 50.0, 47.0, 0.3);
pub const VERTEX_NORMAL: Vec4 = YELLOW;
pub const FACE_NORMAL: Vec4 = MAGENTA;
pub const BOUNDING_BOX: Vec4 = GREEN;

pub const GRID: Vec4 = rgb(42.0, 161.0, 152.0, 0.5);
pub const CAMERA: Vec4 = GREEN;

/// 軸の色定数
pub const COLOR_X: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0); // 赤
pub const COLOR_Y: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0); // 緑
pub const COLOR_Z: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0); // 青
pub const COLOR_CENTER: Vec4 = Vec4::ONE; // 白
