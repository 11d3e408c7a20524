use serde::{Deserialize, Serialize};

use super::CellAddress;

/// Which selection gestures are honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectableType {
    #[default]
    All,
    None,
    Cell,
    Row,
    Column,
}

impl SelectableType {
    pub fn allows_cells(self) -> bool {
        matches!(self, SelectableType::All | SelectableType::Cell)
    }

    pub fn allows_rows(self) -> bool {
        matches!(self, SelectableType::All | SelectableType::Row)
    }

    pub fn allows_columns(self) -> bool {
        matches!(self, SelectableType::All | SelectableType::Column)
    }
}

/// Which headers may be dragged to reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraggableType {
    #[default]
    All,
    None,
    Row,
    Column,
}

impl DraggableType {
    pub fn allows_rows(self) -> bool {
        matches!(self, DraggableType::All | DraggableType::Row)
    }

    pub fn allows_columns(self) -> bool {
        matches!(self, DraggableType::All | DraggableType::Column)
    }
}

/// Colors and fonts used by the render pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridTheme {
    pub cell_background: String,
    pub cell_text_color: String,
    pub cell_secondary_text_color: String,
    pub grid_line_color: String,
    pub header_background: String,
    pub header_text_color: String,
    pub header_selected_background: String,
    pub frozen_divider_color: String,
    pub active_cell_border_color: String,
    pub selection_fill_color: String,
    pub selection_border_color: String,
    pub group_header_background: String,
    pub search_hit_color: String,
    pub search_cursor_color: String,
    pub statistics_background: String,
    pub link_color: String,
    pub rating_color: String,
    pub chip_background: String,
    pub font_family: String,
    pub font_size: f32,
}

impl Default for GridTheme {
    fn default() -> Self {
        Self {
            cell_background: "#FFFFFF".to_string(),
            cell_text_color: "#1F2328".to_string(),
            cell_secondary_text_color: "#6B7280".to_string(),
            grid_line_color: "#E5E7EB".to_string(),
            header_background: "#F9FAFB".to_string(),
            header_text_color: "#374151".to_string(),
            header_selected_background: "#DBEAFE".to_string(),
            frozen_divider_color: "#BABABA".to_string(),
            active_cell_border_color: "#3B82F6".to_string(),
            selection_fill_color: "#3B82F6".to_string(),
            selection_border_color: "#3B82F6".to_string(),
            group_header_background: "#F3F4F6".to_string(),
            search_hit_color: "#FBBF24".to_string(),
            search_cursor_color: "#F97316".to_string(),
            statistics_background: "#F9FAFB".to_string(),
            link_color: "#2563EB".to_string(),
            rating_color: "#F59E0B".to_string(),
            chip_background: "#E5E7EB".to_string(),
            font_family: "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif"
                .to_string(),
            font_size: 13.0,
        }
    }
}

/// Per-column overrides layered on top of [`GridTheme`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnTheme {
    pub cell_background: Option<String>,
    pub cell_text_color: Option<String>,
    pub header_background: Option<String>,
}

/// Another user's active cell, drawn as a labelled border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    /// Record-row address of the collaborator's active cell.
    pub active_cell: CellAddress,
    pub border_color: String,
    /// Milliseconds; the most recent collaborator wins a shared cell.
    pub timestamp: f64,
}

/// Layout and interaction configuration supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub row_height: f32,
    pub column_header_height: f32,
    /// Width of the row-number/drag-handle band at the left; 0 hides it.
    pub row_header_width: f32,
    pub group_header_height: f32,
    /// Height of the pinned statistics band; 0 hides it.
    pub statistics_height: f32,
    pub show_append_row: bool,
    pub show_append_column: bool,
    pub frozen_column_count: u32,
    pub selectable: SelectableType,
    pub draggable: DraggableType,
    /// Extra rows/columns drawn beyond the viewport edge.
    pub overscan: u32,
    pub theme: GridTheme,
}

pub const DEFAULT_ROW_HEIGHT: f32 = 32.0;
pub const DEFAULT_HEADER_HEIGHT: f32 = 40.0;
pub const DEFAULT_GROUP_HEADER_HEIGHT: f32 = 40.0;
pub const DEFAULT_APPEND_COLUMN_WIDTH: f32 = 40.0;

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            column_header_height: DEFAULT_HEADER_HEIGHT,
            row_header_width: 0.0,
            group_header_height: DEFAULT_GROUP_HEADER_HEIGHT,
            statistics_height: 0.0,
            show_append_row: false,
            show_append_column: false,
            frozen_column_count: 0,
            selectable: SelectableType::All,
            draggable: DraggableType::All,
            overscan: 1,
            theme: GridTheme::default(),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: GridConfig =
            serde_json::from_str(r#"{"frozenColumnCount":2,"selectable":"row"}"#).unwrap();
        assert_eq!(config.frozen_column_count, 2);
        assert_eq!(config.selectable, SelectableType::Row);
        assert_eq!(config.row_height, DEFAULT_ROW_HEIGHT);
        assert_eq!(config.theme, GridTheme::default());
    }
}
