// crates/meshview-renderer/src/gizmo.rs
//! Gizmoシステム
//! ハンドル形状の生成、カメラ平面でのヒットテスト、ドラッグ量から変換行列への変換

use std::ops::Range;

use glam::{Mat4, Vec2, Vec3, Vec4};
use thiserror::Error;

use meshview_core::math::{
    dot2, dot3, rot_x, rot_y, rot_z, scale, scale_x, scale_y, scale_z, vec2, Snap,
};

use crate::camera::Camera;
use crate::config::GizmoConfig;
use crate::palette::{COLOR_X, COLOR_Y, COLOR_Z};
use crate::picking::{belongs_to_segment, within_radius};

/// 変換モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformMode {
    #[default]
    Disabled,
    Translation,
    Scaling,
    UniformScaling,
    Rotation,
}

impl TransformMode {
    pub fn is_active(self) -> bool {
        self != TransformMode::Disabled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransformMode::Disabled => "disabled",
            TransformMode::Translation => "translation",
            TransformMode::Scaling => "scaling",
            TransformMode::UniformScaling => "uniform_scaling",
            TransformMode::Rotation => "rotation",
        }
    }
}

impl std::fmt::Display for TransformMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gizmo軸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown gizmo axis: {0:?}")]
pub struct ParseAxisError(String);

impl std::str::FromStr for GizmoAxis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x" => Ok(GizmoAxis::X),
            "y" => Ok(GizmoAxis::Y),
            "z" => Ok(GizmoAxis::Z),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

impl GizmoAxis {
    /// ヒットテストの順序
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    pub fn index(self) -> usize {
        match self {
            GizmoAxis::X => 0,
            GizmoAxis::Y => 1,
            GizmoAxis::Z => 2,
        }
    }

    /// ワールド座標の単位ベクトル
    pub fn unit(self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
        }
    }

    pub fn color(self) -> Vec4 {
        match self {
            GizmoAxis::X => COLOR_X,
            GizmoAxis::Y => COLOR_Y,
            GizmoAxis::Z => COLOR_Z,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GizmoAxis::X => "x",
            GizmoAxis::Y => "y",
            GizmoAxis::Z => "z",
        }
    }

    /// 軸まわりの回転行列
    pub fn rotation(self, angle: f32) -> Mat4 {
        match self {
            GizmoAxis::X => rot_x(angle),
            GizmoAxis::Y => rot_y(angle),
            GizmoAxis::Z => rot_z(angle),
        }
    }

    /// 軸方向のみのスケール行列
    pub fn scaling(self, factor: f32) -> Mat4 {
        match self {
            GizmoAxis::X => scale_x(factor),
            GizmoAxis::Y => scale_y(factor),
            GizmoAxis::Z => scale_z(factor),
        }
    }
}

/// 1イベント分の変換
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Increment {
    /// ワールド空間での平行移動（ピボットも移動）
    Translate(Vec3),
    /// ピボットまわりの回転（左から合成）
    Rotate(Mat4),
    /// 重心まわりのスケール（ローカル空間、右から合成）
    Scale(Mat4),
}

/// ヒットテストの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    pub axis: GizmoAxis,
    /// 確定したモード（スケール時は全軸ヒットで一様スケールになる）
    pub mode: TransformMode,
}

// ========================================================================
// Gizmoハンドル
// ========================================================================

/// Gizmoのハンドル形状（ピボット原点のローカル座標）
#[derive(Debug, Clone)]
pub struct GizmoHandles {
    tolerance: f32,
    handle_length: f32,
    ring_samples: usize,
    /// X, Y, Z の順に ring_samples 個ずつ
    rings: Vec<Vec3>,
}

impl Default for GizmoHandles {
    fn default() -> Self {
        Self::new(&GizmoConfig::default())
    }
}

impl GizmoHandles {
    pub fn new(config: &GizmoConfig) -> Self {
        let samples = config.ring_samples.max(3) as usize;
        let radius = config.ring_radius;
        let mut rings = Vec::with_capacity(samples * 3);
        for axis in GizmoAxis::ALL {
            for j in 0..samples {
                let t = j as f32 * std::f32::consts::TAU / samples as f32;
                let (s, c) = t.sin_cos();
                let p = match axis {
                    GizmoAxis::X => Vec3::new(0.0, c, s),
                    GizmoAxis::Y => Vec3::new(c, 0.0, s),
                    GizmoAxis::Z => Vec3::new(c, s, 0.0),
                };
                rings.push((p * radius).snap());
            }
        }

        Self {
            tolerance: config.pick_tolerance,
            handle_length: config.handle_length,
            ring_samples: samples,
            rings,
        }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// 軸ハンドルの先端
    pub fn axis_end(&self, axis: GizmoAxis) -> Vec3 {
        axis.unit() * self.handle_length
    }

    /// 回転リングのサンプル点
    pub fn ring(&self, axis: GizmoAxis) -> &[Vec3] {
        let start = axis.index() * self.ring_samples;
        &self.rings[start..start + self.ring_samples]
    }

    /// ピボットと軸先端をカメラ平面へ投影
    fn projected_axis(&self, camera: &Camera, pivot: Vec3, axis: GizmoAxis) -> (Vec2, Vec2) {
        let p = camera.project(pivot);
        let end_p = camera.project(pivot + self.axis_end(axis));
        (p, end_p)
    }

    /// 移動・スケール用の軸ヒットテスト
    /// X, Y, Z の順で最初にヒットした軸を返す。
    /// Z軸が点に潰れている（視線とほぼ平行）場合は、X/Yがヒットしなければ Z とする。
    /// 点に潰れたX/Yはドラッグで動かせないので候補にしない
    pub fn pick_axis(&self, camera: &Camera, pivot: Vec3, pointer: Vec2) -> Option<GizmoAxis> {
        let mut picked = None;
        for axis in GizmoAxis::ALL {
            let (p, end_p) = self.projected_axis(camera, pivot, axis);
            let screen_length = (end_p - p).snap().length();
            if axis == GizmoAxis::Z && screen_length <= self.tolerance {
                picked = Some(GizmoAxis::Z);
                continue;
            }
            if screen_length == 0.0 {
                continue;
            }
            if belongs_to_segment(pointer, p, end_p, self.tolerance) {
                picked = Some(axis);
                break;
            }
        }
        picked
    }

    /// 3軸すべてにヒットしているか（一様スケールの判定）
    pub fn hits_all_axes(&self, camera: &Camera, pivot: Vec3, pointer: Vec2) -> bool {
        GizmoAxis::ALL.iter().all(|&axis| {
            let (p, end_p) = self.projected_axis(camera, pivot, axis);
            belongs_to_segment(pointer, p, end_p, self.tolerance)
        })
    }

    /// 回転リングのヒットテスト（ユークリッド距離）
    pub fn pick_ring(&self, camera: &Camera, pivot: Vec3, pointer: Vec2) -> Option<GizmoAxis> {
        GizmoAxis::ALL.into_iter().find(|&axis| {
            self.ring(axis)
                .iter()
                .any(|&sample| within_radius(pointer, camera.project(pivot + sample), self.tolerance))
        })
    }

    /// モードに応じたヒットテスト
    pub fn pick(
        &self,
        mode: TransformMode,
        camera: &Camera,
        pivot: Vec3,
        pointer: Vec2,
    ) -> Option<Pick> {
        match mode {
            TransformMode::Disabled => None,
            TransformMode::Translation => self
                .pick_axis(camera, pivot, pointer)
                .map(|axis| Pick { axis, mode }),
            TransformMode::Scaling | TransformMode::UniformScaling => {
                let axis = self.pick_axis(camera, pivot, pointer)?;
                let mode = if self.hits_all_axes(camera, pivot, pointer) {
                    TransformMode::UniformScaling
                } else {
                    TransformMode::Scaling
                };
                Some(Pick { axis, mode })
            }
            TransformMode::Rotation => self
                .pick_ring(camera, pivot, pointer)
                .map(|axis| Pick { axis, mode }),
        }
    }

    /// 画面上のドラッグ量を軸方向の移動量に変換する。
    /// 投影された軸の方向成分を取り出し、視線との角度による縮みを補正する。
    /// 軸が潰れている・視線と平行な場合は None
    pub fn axis_drag(
        &self,
        camera: &Camera,
        pivot: Vec3,
        axis: GizmoAxis,
        dx: f32,
        dy: f32,
    ) -> Option<f32> {
        let (p, end_p) = self.projected_axis(camera, pivot, axis);
        let on_screen = (end_p - p).snap();
        let screen_length = on_screen.length();
        if screen_length == 0.0 {
            return None;
        }
        let delta_plane = dot2(on_screen, vec2(dx, dy)) / screen_length;

        let end = self.axis_end(axis);
        let c = dot3(camera.forward(), end) / end.length();
        if !(c.abs() < 1.0) {
            return None;
        }

        let d_axis = delta_plane / (1.0 - c * c).sqrt();
        d_axis.is_finite().then_some(d_axis)
    }

    /// 1イベント分の変換を計算する。変換できない場合は None
    pub fn increment(
        &self,
        mode: TransformMode,
        axis: GizmoAxis,
        camera: &Camera,
        pivot: Vec3,
        dx: f32,
        dy: f32,
    ) -> Option<Increment> {
        match mode {
            TransformMode::Disabled => None,
            TransformMode::UniformScaling => {
                positive_factor(1.0 + dx + dy).map(|f| Increment::Scale(scale(f)))
            }
            TransformMode::Rotation => {
                let angle = dx + dy;
                angle.is_finite().then(|| Increment::Rotate(axis.rotation(angle)))
            }
            TransformMode::Translation => {
                let d = self.axis_drag(camera, pivot, axis, dx, dy)?;
                Some(Increment::Translate(axis.unit() * d))
            }
            TransformMode::Scaling => {
                let d = self.axis_drag(camera, pivot, axis, dx, dy)?;
                positive_factor(1.0 + d).map(|f| Increment::Scale(axis.scaling(f)))
            }
        }
    }

    /// 描画用ジオメトリを生成
    pub fn geometry(&self) -> GizmoGeometry {
        GizmoGeometry::build(self)
    }
}

/// スケール係数が0以下になると形状が潰れて戻せなくなるので捨てる
fn positive_factor(factor: f32) -> Option<f32> {
    (factor.is_finite() && factor > 0.0).then_some(factor)
}

// ========================================================================
// メッシュ生成
// ========================================================================

/// 矢印の根元の位置（軸長に対する比率）と太さ
const ARROW_BASE: f32 = 0.25 / 0.3;
const ARROW_RADIUS: f32 = 0.02;

/// Gizmo描画用の点列と各パーツの範囲
#[derive(Debug, Clone)]
pub struct GizmoGeometry {
    pub points: Vec<Vec3>,
    /// 軸ごとの線分（Lines）
    pub axes: [Range<u32>; 3],
    /// 軸ごとの矢印（Triangles）
    pub arrows: [Range<u32>; 3],
    /// 軸ごとの先端（Points）
    pub ends: [Range<u32>; 3],
    /// 中心（Points）
    pub center: Range<u32>,
    /// 軸ごとのリング（Lines）
    pub rings: [Range<u32>; 3],
}

impl GizmoGeometry {
    fn build(handles: &GizmoHandles) -> Self {
        let mut points = Vec::new();

        let axes = GizmoAxis::ALL.map(|axis| {
            let start = points.len();
            points.push(Vec3::ZERO);
            points.push(handles.axis_end(axis));
            span(start, points.len())
        });

        let arrows = GizmoAxis::ALL.map(|axis| {
            let start = points.len();
            points.extend(create_arrow_points(handles.axis_end(axis), axis));
            span(start, points.len())
        });

        let ends = GizmoAxis::ALL.map(|axis| {
            let start = points.len();
            points.push(handles.axis_end(axis));
            span(start, points.len())
        });

        let start = points.len();
        points.push(Vec3::ZERO);
        let center = span(start, points.len());

        let rings = GizmoAxis::ALL.map(|axis| {
            let start = points.len();
            points.extend(create_ring_lines(handles.ring(axis)));
            span(start, points.len())
        });

        Self {
            points,
            axes,
            arrows,
            ends,
            center,
            rings,
        }
    }
}

fn span(start: usize, end: usize) -> Range<u32> {
    start as u32..end as u32
}

/// 矢印の先端（四角錐の側面4枚 = 12点）
pub fn create_arrow_points(tip: Vec3, axis: GizmoAxis) -> Vec<Vec3> {
    let base = tip * ARROW_BASE;
    let (u, v) = match axis {
        GizmoAxis::X => (Vec3::Z, Vec3::Y),
        GizmoAxis::Y => (Vec3::Z, Vec3::X),
        GizmoAxis::Z => (Vec3::Y, Vec3::X),
    };
    let corners = [
        base + u * ARROW_RADIUS,
        base + v * ARROW_RADIUS,
        base - u * ARROW_RADIUS,
        base - v * ARROW_RADIUS,
    ];

    let mut points = Vec::with_capacity(12);
    for i in 0..4 {
        points.push(tip);
        points.push(corners[i]);
        points.push(corners[(i + 1) % 4]);
    }
    points
}

/// リングのサンプル点を閉じた線分列に変換
pub fn create_ring_lines(samples: &[Vec3]) -> Vec<Vec3> {
    let n = samples.len();
    (0..n)
        .flat_map(|i| [samples[i], samples[(i + 1) % n]])
        .collect()
}
