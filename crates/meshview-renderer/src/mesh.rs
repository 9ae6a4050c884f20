//! 線描画用ジオメトリ
//! メッシュのワイヤーフレーム、法線、バウンディングボックス、グリッド、カメラモデルを生成

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use meshview_core::bounds::DISPLAY_MARGIN;
use meshview_core::math::{rot_y, Snap};
use meshview_core::MeshObject;

use crate::camera::Camera;

/// 法線の表示長さ（単位法線に対する倍率）
pub const NORMAL_LENGTH: f32 = 1.0 / 20.0;

/// 頂点構造体
/// 位置のみ（色はUniformで指定）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
        }
    }

    /// 頂点バッファレイアウトを取得
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &[VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x3,
            }],
        }
    }
}

/// 点列をGPU用の頂点列に変換
pub fn to_vertices(points: &[Vec3]) -> Vec<LineVertex> {
    points.iter().copied().map(LineVertex::new).collect()
}

/// オブジェクト用バッファ内の各区間（点のインデックス範囲）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments {
    pub edges: Range<u32>,
    pub bounding_box: Range<u32>,
    pub vertex_normals: Range<u32>,
    pub face_normals: Range<u32>,
}

/// オブジェクトの全描画要素を1本のバッファにまとめる
#[derive(Debug, Clone, Default)]
pub struct ObjectGeometry {
    pub points: Vec<Vec3>,
    pub segments: Segments,
}

impl ObjectGeometry {
    /// オブジェクトローカル座標でジオメトリを構築
    pub fn build(object: &MeshObject) -> Self {
        let faces = object.faces();
        let mut points = Vec::with_capacity(faces.len() * 12 + 24);

        // ワイヤーフレーム（三角形ごとに3辺）
        let start = points.len();
        for face in faces {
            let [a, b, c] = face.positions;
            points.extend_from_slice(&[a, b, b, c, c, a]);
        }
        let edges = span(start, points.len());

        // バウンディングボックス
        let start = points.len();
        points.extend_from_slice(&object.bounds().padded(DISPLAY_MARGIN).edge_points());
        let bounding_box = span(start, points.len());

        // 頂点法線
        let start = points.len();
        for face in faces {
            if let Some(normals) = face.normals {
                for (p, n) in face.positions.iter().zip(normals.iter()) {
                    points.push(*p);
                    points.push((*p + *n * NORMAL_LENGTH).snap());
                }
            }
        }
        let vertex_normals = span(start, points.len());

        // 面法線（重心から）
        let start = points.len();
        for face in faces {
            let centroid = face.centroid();
            points.push(centroid);
            points.push((centroid + face.face_normal() * NORMAL_LENGTH).snap());
        }
        let face_normals = span(start, points.len());

        Self {
            points,
            segments: Segments {
                edges,
                bounding_box,
                vertex_normals,
                face_normals,
            },
        }
    }
}

fn span(start: usize, end: usize) -> Range<u32> {
    start as u32..end as u32
}

/// XZ平面のグリッド（-1..1、0.25間隔、36点）
pub fn grid_points() -> Vec<Vec3> {
    let mut points = Vec::with_capacity(36);
    for i in 0..9 {
        let t = -1.0 + i as f32 * 0.25;
        points.push(Vec3::new(t, 0.0, -1.0));
        points.push(Vec3::new(t, 0.0, 1.0));
    }
    for i in 0..9 {
        let t = -1.0 + i as f32 * 0.25;
        points.push(Vec3::new(-1.0, 0.0, t));
        points.push(Vec3::new(1.0, 0.0, t));
    }
    points
}

/// カメラモデル（48点のライン）
/// 本体の箱、レンズ、前面の枠、レンズと前面をつなぐ線
const CAMERA_MODEL: [[f32; 3]; 48] = [
    // 本体（背面）
    [-0.20, -0.15, -0.05], [0.20, -0.15, -0.05],
    [-0.20, 0.15, -0.05], [0.20, 0.15, -0.05],
    [-0.20, -0.15, -0.05], [-0.20, 0.15, -0.05],
    [0.20, -0.15, -0.05], [0.20, 0.15, -0.05],
    // 本体（前面）
    [-0.20, -0.15, 0.05], [0.20, -0.15, 0.05],
    [-0.20, 0.15, 0.05], [0.20, 0.15, 0.05],
    [-0.20, -0.15, 0.05], [-0.20, 0.15, 0.05],
    [0.20, -0.15, 0.05], [0.20, 0.15, 0.05],
    // 本体（側面）
    [-0.20, -0.15, -0.05], [-0.20, -0.15, 0.05],
    [-0.20, 0.15, -0.05], [-0.20, 0.15, 0.05],
    [0.20, -0.15, -0.05], [0.20, -0.15, 0.05],
    [0.20, 0.15, -0.05], [0.20, 0.15, 0.05],
    // レンズ
    [-0.07, -0.05, 0.05], [0.07, -0.05, 0.05],
    [-0.07, 0.05, 0.05], [0.07, 0.05, 0.05],
    [-0.07, -0.05, 0.05], [-0.07, 0.05, 0.05],
    [0.07, -0.05, 0.05], [0.07, 0.05, 0.05],
    // 前面の枠
    [-0.10, -0.08, 0.20], [0.10, -0.08, 0.20],
    [-0.10, 0.08, 0.20], [0.10, 0.08, 0.20],
    [-0.10, -0.08, 0.20], [-0.10, 0.08, 0.20],
    [0.10, -0.08, 0.20], [0.10, 0.08, 0.20],
    // レンズと前面の接続
    [-0.07, -0.05, 0.05], [-0.10, -0.08, 0.20],
    [0.07, -0.05, 0.05], [0.10, -0.08, 0.20],
    [-0.07, 0.05, 0.05], [-0.10, 0.08, 0.20],
    [0.07, 0.05, 0.05], [0.10, 0.08, 0.20],
];

/// カメラの姿勢に合わせてカメラモデルを配置（ワールド座標）
/// モデルは+Z側にレンズがあるので、視線方向(-Z)へ向けるためにY軸で半回転させる
pub fn camera_glyph_points(camera: &Camera) -> Vec<Vec3> {
    let placement = camera.world_rotation() * rot_y(std::f32::consts::PI);
    CAMERA_MODEL
        .iter()
        .map(|&[x, y, z]| {
            // XYは半分の大きさ、Zはそのまま
            let local = Vec3::new(x * 0.5, y * 0.5, z);
            (placement.transform_point3(local) + camera.position).snap()
        })
        .collect()
}
