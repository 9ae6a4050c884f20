// crates/meshview-wasm/src/lib.rs

mod renderer;
mod shaders;
mod utils;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use meshview_core::ObjectInfo;
use meshview_renderer::{
    Controls, KeyOutcome, Modifiers, PointerButton, Scene, ViewerConfig, HELP,
};

use renderer::WgpuBackend;
use utils::console_log;

// パニック時のスタックトレース表示とログ出力の初期化
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    utils::init_tracing();
}

/// フロントエンド向けの状態
#[derive(Debug, Serialize)]
struct ViewerStatus<'a> {
    transform_mode: &'a str,
    object_index: Option<usize>,
    object_count: usize,
    camera_index: Option<usize>,
    camera_count: usize,
    gizmo_axis: Option<&'a str>,
}

/// Viewer構造体
/// Scene、入力、wgpuバックエンドを統合し、JSから操作可能なAPIを提供
#[wasm_bindgen]
pub struct Viewer {
    scene: Scene,
    controls: Controls,
    backend: WgpuBackend,
}

#[wasm_bindgen]
impl Viewer {
    /// 新しいViewerを作成（非同期）
    /// config_json を省略するとすべて既定値
    pub async fn create(
        canvas: HtmlCanvasElement,
        config_json: Option<String>,
    ) -> Result<Viewer, JsValue> {
        console_log!("Creating Viewer...");
        let config = match config_json {
            Some(json) => ViewerConfig::from_json(&json)
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => ViewerConfig::default(),
        };

        let backend = WgpuBackend::create(canvas, config.projection).await?;
        let mut controls = Controls::new(&config.input);
        controls.resize(backend.width() as f32, backend.height() as f32);
        let scene = Scene::new(config);

        tracing::info!("Viewer created");
        Ok(Self {
            scene,
            controls,
            backend,
        })
    }

    /// OBJテキストを読み込む。失敗時は false（一覧は変わらない）
    pub fn load_obj(&mut self, name: &str, source: &str) -> bool {
        self.scene.add_from_source(name, source)
    }

    /// オブジェクトを削除
    pub fn remove_object(&mut self, index: usize) -> bool {
        self.scene.remove_object(index).is_some()
    }

    /// `MouseEvent.button` とピクセル座標
    pub fn pointer_down(&mut self, button: i16, x: f32, y: f32, alt: bool, ctrl: bool) {
        let Some(button) = PointerButton::from_index(button) else {
            return;
        };
        self.controls
            .pointer_down(button, x, y, Modifiers { alt, ctrl });
    }

    pub fn pointer_up(&mut self, _button: i16) {
        self.controls.pointer_up();
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.controls.pointer_move(&mut self.scene, x, y);
    }

    /// `KeyboardEvent.key` を処理する。終了が要求されたら false
    pub fn key_press(&mut self, key: &str) -> bool {
        self.controls.key_press(&mut self.scene, key) != KeyOutcome::Quit
    }

    /// フレーム描画
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.scene.sync(&mut self.backend);
        self.scene.draw(&mut self.backend);
        self.backend.render()
    }

    /// Canvasリサイズ
    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
        self.controls
            .resize(self.backend.width() as f32, self.backend.height() as f32);
    }

    pub fn width(&self) -> u32 {
        self.backend.width()
    }

    pub fn height(&self) -> u32 {
        self.backend.height()
    }

    /// オブジェクト一覧（ObjectInfo の配列）
    pub fn objects(&self) -> Result<JsValue, JsValue> {
        let infos: Vec<ObjectInfo> = self.scene.objects().map(|o| o.info()).collect();
        serde_wasm_bindgen::to_value(&infos)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize objects: {}", e)))
    }

    /// 現在の変換モード
    pub fn transform_mode(&self) -> String {
        self.scene.transform_mode().to_string()
    }

    /// モード、選択中のオブジェクトとカメラなど
    pub fn status(&self) -> Result<JsValue, JsValue> {
        let status = ViewerStatus {
            transform_mode: self.scene.transform_mode().as_str(),
            object_index: self.scene.object_index(),
            object_count: self.scene.object_count(),
            camera_index: self.scene.camera_index(),
            camera_count: self.scene.cameras().count(),
            gizmo_axis: self.controls.axis().map(|axis| axis.as_str()),
        };
        serde_wasm_bindgen::to_value(&status)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize status: {}", e)))
    }

    /// 操作一覧
    pub fn help() -> js_sys::Array {
        HELP.iter().map(|line| JsValue::from_str(line)).collect()
    }
}
