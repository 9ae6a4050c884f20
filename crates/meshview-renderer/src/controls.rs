// crates/meshview-renderer/src/controls.rs
//! 入力処理
//! ポインタとキー入力をシーンの操作に振り分ける

use thiserror::Error;
use tracing::debug;

use crate::config::InputConfig;
use crate::gizmo::GizmoAxis;
use crate::scene::Scene;

/// ポインタのボタン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

impl PointerButton {
    /// DOMの `MouseEvent.button` から変換
    pub fn from_index(index: i16) -> Option<Self> {
        match index {
            0 => Some(PointerButton::Left),
            1 => Some(PointerButton::Middle),
            2 => Some(PointerButton::Right),
            _ => None,
        }
    }
}

/// 修飾キー（ボタンを押した時点の状態）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unbound key: {0:?}")]
pub struct UnboundKey(String);

/// キーバインドされたコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cancel,
    ToggleVertexNormals,
    ToggleFaceNormals,
    ToggleBoundingBox,
    PreviousCamera,
    NextCamera,
    CommitCamera,
    DeleteCamera,
    PreviousObject,
    NextObject,
    Translate,
    Scale,
    Rotate,
}

impl std::str::FromStr for Command {
    type Err = UnboundKey;

    /// `KeyboardEvent.key` の値から変換
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let command = match key {
            "Escape" | "Esc" => Command::Cancel,
            "v" => Command::ToggleVertexNormals,
            "f" => Command::ToggleFaceNormals,
            "b" => Command::ToggleBoundingBox,
            "[" => Command::PreviousCamera,
            "]" => Command::NextCamera,
            "c" => Command::CommitCamera,
            "d" => Command::DeleteCamera,
            "9" => Command::PreviousObject,
            "0" => Command::NextObject,
            "w" => Command::Translate,
            "r" => Command::Scale,
            "e" => Command::Rotate,
            _ => return Err(UnboundKey(key.to_string())),
        };
        Ok(command)
    }
}

/// 操作一覧
pub const HELP: [&str; 16] = [
    "Quit / cancel transform (Esc)",
    "Vertex normals (v)",
    "Face normals (f)",
    "Bounding box (b)",
    "Previous / next camera ([, ])",
    "Save camera (c)",
    "Delete camera (d)",
    "Previous / next object (9, 0)",
    "Move (w)",
    "Scale (r)",
    "Rotate (e)",
    "Orbit camera (Alt + LMB)",
    "Pan camera (Alt + MMB)",
    "Zoom camera (Alt + RMB)",
    "Roll camera (Ctrl + LMB)",
    "Drag gizmo (LMB)",
];

/// キー入力の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    /// 変換モードが無い状態で Esc が押された
    Quit,
}

/// 正方形のビューポート
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// 正規化に使う一辺の長さ（ピクセル）
    pub size: f32,
    /// キャンバスの大きさ
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            width: size,
            height: size,
        }
    }

    /// ピクセル座標（左上原点、下向きY）を中心原点の [-1, 1] 座標へ
    pub fn normalize(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (2.0 * x - self.width) / self.size,
            (self.height - 2.0 * y) / self.size,
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Buttons {
    left: bool,
    middle: bool,
    right: bool,
}

/// ポインタとキーの入力状態
#[derive(Debug, Clone)]
pub struct Controls {
    buttons: Buttons,
    modifiers: Modifiers,
    last: (f32, f32),
    /// ドラッグ中に確定した Gizmo 軸
    axis: Option<GizmoAxis>,
    viewport: Viewport,
    pointer_scale: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(&InputConfig::default())
    }
}

impl Controls {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            buttons: Buttons::default(),
            modifiers: Modifiers::default(),
            last: (0.0, 0.0),
            axis: None,
            viewport: Viewport::new(config.viewport_size),
            pointer_scale: config.pointer_scale,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// キャンバスのリサイズ。描画領域は中央に置いた短辺の正方形
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport {
            size: width.min(height),
            width,
            height,
        };
    }

    pub fn axis(&self) -> Option<GizmoAxis> {
        self.axis
    }

    pub fn pointer_down(&mut self, button: PointerButton, x: f32, y: f32, modifiers: Modifiers) {
        self.modifiers = modifiers;
        self.last = (x, y);
        match button {
            PointerButton::Left => self.buttons.left = true,
            PointerButton::Middle => self.buttons.middle = true,
            PointerButton::Right => self.buttons.right = true,
        }
    }

    /// どのボタンを離しても全ボタンを解放し、ドラッグを終える
    pub fn pointer_up(&mut self) {
        self.buttons = Buttons::default();
        self.axis = None;
    }

    pub fn pointer_move(&mut self, scene: &mut Scene, x: f32, y: f32) {
        let dx = self.last.0 - x;
        let dy = self.last.1 - y;
        self.last = (x, y);

        let Modifiers { alt, ctrl } = self.modifiers;
        let Buttons {
            left,
            middle,
            right,
        } = self.buttons;

        if alt && left {
            scene.orbit(dx, dy);
        } else if ctrl && left {
            scene.roll(dx);
        } else if alt && right {
            scene.zoom(-dx - dy);
        } else if alt && middle {
            scene.pan(dx, dy);
        } else if left && scene.transformation_is_active() {
            let (nx, ny) = self.viewport.normalize(x, y);
            self.axis = scene.local_transform(
                self.axis,
                -dx / self.pointer_scale,
                dy / self.pointer_scale,
                nx,
                ny,
            );
        }
    }

    /// キー入力を処理する
    pub fn key_press(&mut self, scene: &mut Scene, key: &str) -> KeyOutcome {
        let Ok(command) = key.parse::<Command>() else {
            return KeyOutcome::Ignored;
        };
        debug!(?command, "Key command");
        self.run(scene, command)
    }

    pub fn run(&mut self, scene: &mut Scene, command: Command) -> KeyOutcome {
        match command {
            Command::Cancel => {
                if !scene.transformation_is_active() {
                    return KeyOutcome::Quit;
                }
                scene.deactivate_transformation();
                self.axis = None;
            }
            Command::ToggleVertexNormals => scene.toggle_vertex_normals(),
            Command::ToggleFaceNormals => scene.toggle_face_normals(),
            Command::ToggleBoundingBox => scene.toggle_bounding_box(),
            Command::PreviousCamera => scene.previous_camera(),
            Command::NextCamera => scene.next_camera(),
            Command::CommitCamera => {
                scene.commit_camera();
            }
            Command::DeleteCamera => scene.delete_active_camera(),
            Command::PreviousObject => scene.previous_object(),
            Command::NextObject => scene.next_object(),
            Command::Translate => {
                scene.activate_translation();
                self.axis = None;
            }
            Command::Scale => {
                scene.activate_scaling();
                self.axis = None;
            }
            Command::Rotate => {
                scene.activate_rotation();
                self.axis = None;
            }
        }
        KeyOutcome::Handled
    }
}
