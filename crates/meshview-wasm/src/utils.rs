//! ユーティリティモジュール
//!
//! console_log マクロと、tracing の出力先をブラウザのコンソールにするライター

use std::io;

use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);
}

/// コンソールにログ出力するマクロ
macro_rules! console_log {
    ($($t:tt)*) => (crate::utils::log(&format_args!($($t)*).to_string()))
}
pub(crate) use console_log;

/// tracing の1イベント分をためて、破棄時に console.log へ流す
pub struct ConsoleLine(Vec<u8>);

impl io::Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.0);
        let line = text.trim_end();
        if !line.is_empty() {
            log(line);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine(Vec::new())
    }
}

/// tracing のサブスクライバを登録（2回目以降は何もしない）
pub fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_writer(ConsoleWriter)
        .with_max_level(tracing::Level::DEBUG)
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .try_init();
    if result.is_err() {
        console_log!("tracing subscriber already installed");
    }
}
