//! Structured error types for gridcanvas.
//!
//! Nothing in the grid is fatal to the host: these errors are surfaced by
//! lookups and drawers, and callers degrade them to a visual no-op.

use crate::types::CellKind;

/// All errors that can occur in gridcanvas geometry, rendering, and host glue.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Cell content is missing a field its kind requires.
    #[error("Malformed {kind:?} cell: {reason}")]
    MalformedCell { kind: CellKind, reason: String },

    /// An address outside the current row/column extents.
    #[error("Address out of bounds: column {col}, row {row}")]
    OutOfBounds { col: u32, row: u32 },

    /// Configuration object could not be applied.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Rendering error.
    #[error("Render error: {0}")]
    Render(String),

    /// A JavaScript call or conversion failed.
    #[error("JavaScript error: {0}")]
    Js(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl GridError {
    pub(crate) fn malformed(kind: CellKind, reason: impl Into<String>) -> Self {
        Self::MalformedCell {
            kind,
            reason: reason.into(),
        }
    }
}

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
