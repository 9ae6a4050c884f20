//! シェーダーモジュール
//!
//! WGSLシェーダーを外部ファイルから読み込む

/// 線・点・三角形の共通シェーダー（単色）
pub const LINE_SHADER: &str = include_str!("line.wgsl");
