use serde::{Deserialize, Serialize};

use super::ColumnTheme;

/// Host-owned column metadata. The grid reads width and flags for layout and
/// reports resize/reorder through callbacks; it never edits these itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Stable across reorders.
    pub id: String,
    pub name: String,
    pub width: f32,
    #[serde(default)]
    pub is_primary: bool,
    /// Whether the freeze divider may be dragged to the right of this column.
    #[serde(default = "default_true")]
    pub can_freeze: bool,
    #[serde(default)]
    pub has_menu: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub custom_theme: Option<ColumnTheme>,
}

fn default_true() -> bool {
    true
}

impl ColumnDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            width,
            is_primary: false,
            can_freeze: true,
            has_menu: false,
            icon: None,
            description: None,
            custom_theme: None,
        }
    }

    pub fn with_menu(mut self) -> Self {
        self.has_menu = true;
        self
    }
}
