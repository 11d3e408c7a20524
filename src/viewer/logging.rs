//! Opt-in `tracing` output for the browser.
//!
//! The library only emits events. Pages that want them call `initLogging`
//! once; each formatted event becomes one `console.log` line.

use std::io;

use tracing_subscriber::EnvFilter;
use wasm_bindgen::prelude::*;

/// Buffers one formatted event and hands it to the console when dropped.
#[derive(Default)]
struct ConsoleWriter {
    line: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.line.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.line);
        let text = text.trim_end();
        if !text.is_empty() {
            web_sys::console::log_1(&JsValue::from_str(text));
        }
    }
}

/// Route grid events to the browser console. `filter` uses `RUST_LOG`
/// directive syntax (`"debug"`, `"gridcanvas::controller=trace"`) and
/// defaults to `"info"`. Calls after the first are ignored.
#[wasm_bindgen(js_name = "initLogging")]
pub fn init_logging(filter: Option<String>) -> Result<(), JsValue> {
    let filter = EnvFilter::try_new(filter.as_deref().unwrap_or("info"))
        .map_err(|e| JsValue::from_str(&format!("invalid log filter: {e}")))?;
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .without_time()
        .with_writer(ConsoleWriter::default)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
