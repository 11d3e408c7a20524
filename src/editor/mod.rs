//! Cell editing: which editor a kind gets, where the overlay sits, and
//! what a commit hands back to the host.
//!
//! Every commit is a full [`CellContent`] (the original with its value
//! replaced), never a bare value.

#[cfg(target_arch = "wasm32")]
pub(crate) mod input;

use serde::Serialize;

use crate::layout::{GridLayout, Viewport};
use crate::render::cells::{checkbox_rect, rating_icon_rect};
use crate::types::{CellAddress, CellContent, CellKind, CellValue, Rect, SelectOption};

/// Editor implementation for a cell kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorKind {
    /// Single-line text input.
    Text,
    /// Text input that only accepts numbers.
    Number,
    /// Text input holding a date string.
    Date,
    /// Whitespace separated URLs.
    Link,
    /// Comma separated option titles.
    Select,
    /// Host-driven picker; the overlay only reserves the space.
    Picker,
    /// Toggled in place by a click or Space.
    Toggle,
    /// Set in place by clicking an icon or typing a digit.
    RatingPicker,
    /// Nothing to edit.
    None,
}

impl EditorKind {
    /// Whether this editor opens an overlay.
    pub fn opens_overlay(self) -> bool {
        !matches!(self, Self::Toggle | Self::RatingPicker | Self::None)
    }

    /// Whether the overlay is a free-text input that type-to-edit can seed.
    pub fn accepts_typing(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Number | Self::Date | Self::Link | Self::Select
        )
    }
}

/// The kind-to-editor table.
pub fn editor_for(kind: CellKind) -> EditorKind {
    match kind {
        CellKind::Text => EditorKind::Text,
        CellKind::Number => EditorKind::Number,
        CellKind::Date => EditorKind::Date,
        CellKind::Link => EditorKind::Link,
        CellKind::Select => EditorKind::Select,
        CellKind::User | CellKind::Attachment => EditorKind::Picker,
        CellKind::Boolean => EditorKind::Toggle,
        CellKind::Rating => EditorKind::RatingPicker,
        CellKind::Chart | CellKind::Loading => EditorKind::None,
    }
}

/// Editor a piece of content gets, accounting for readonly.
pub fn editor_for_content(content: &CellContent) -> EditorKind {
    if content.readonly {
        EditorKind::None
    } else {
        editor_for(content.kind())
    }
}

/// Text the overlay starts with.
pub fn initial_draft(value: &CellValue) -> String {
    match value {
        CellValue::Text { data, .. } | CellValue::Date { data, .. } => data.clone().unwrap_or_default(),
        CellValue::Number { data, .. } => data.map(|n| n.to_string()).unwrap_or_default(),
        CellValue::Link { data, .. } => data.join(" "),
        CellValue::Select { data, .. } => data
            .iter()
            .filter_map(|o| o.title.as_deref())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// Parse a draft back into a value of the original's kind. `None` means
/// the draft is not a valid value for this kind.
pub fn parse_draft(original: &CellValue, draft: &str) -> Option<CellValue> {
    let trimmed = draft.trim();
    match original {
        CellValue::Text { .. } => Some(CellValue::Text {
            data: Some(draft.to_string()),
            display_data: Some(draft.to_string()),
        }),
        CellValue::Number { .. } => {
            let data = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse::<f64>().ok().filter(|n| n.is_finite())?)
            };
            Some(CellValue::Number {
                data,
                display_data: None,
            })
        }
        CellValue::Date { .. } => Some(CellValue::Date {
            data: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            display_data: None,
        }),
        CellValue::Link { .. } => Some(CellValue::Link {
            data: trimmed.split_whitespace().map(str::to_string).collect(),
            display_data: None,
        }),
        CellValue::Select {
            data: options,
            is_multiple,
            ..
        } => {
            let titles: Vec<&str> = trimmed
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect();
            if !is_multiple && titles.len() > 1 {
                return None;
            }
            let data = titles
                .iter()
                .map(|title| {
                    options
                        .iter()
                        .find(|o| o.title.as_deref() == Some(*title))
                        .cloned()
                        .unwrap_or_else(|| SelectOption {
                            id: None,
                            title: Some((*title).to_string()),
                            color: None,
                        })
                })
                .collect();
            Some(CellValue::Select {
                data,
                display_data: titles.iter().map(|t| (*t).to_string()).collect(),
                is_multiple: *is_multiple,
            })
        }
        _ => None,
    }
}

/// In-place commit for a pointer press at (x, y) inside `cell`.
///
/// Booleans toggle when the checkbox is hit. Ratings set the clicked icon's
/// value, and clicking the current value clears it.
pub fn direct_commit_at(content: &CellContent, cell: Rect, x: f32, y: f32) -> Option<CellContent> {
    if content.readonly {
        return None;
    }
    match &content.value {
        CellValue::Boolean { .. } => {
            checkbox_rect(cell).contains(x, y).then(|| toggle(content))?
        }
        CellValue::Rating { data, max, .. } => {
            let max = (*max)?;
            let index = (0..max).find(|i| rating_icon_rect(cell, *i).contains(x, y))?;
            let clicked = f64::from(index + 1);
            let current = data.unwrap_or(0.0);
            let next = if (current - clicked).abs() < f64::EPSILON {
                0.0
            } else {
                clicked
            };
            Some(content.with_value(with_rating(&content.value, next)))
        }
        _ => None,
    }
}

/// In-place commit from the keyboard: Space/Enter toggles a Boolean, a
/// digit sets a Rating (clamped to its max).
pub fn direct_commit_key(content: &CellContent, key: &str) -> Option<CellContent> {
    if content.readonly {
        return None;
    }
    match &content.value {
        CellValue::Boolean { .. } if key == " " || key == "Enter" => toggle(content),
        CellValue::Rating { max, .. } => {
            let digit = key.parse::<u32>().ok().filter(|_| key.len() == 1)?;
            let value = digit.min(max.unwrap_or(digit));
            Some(content.with_value(with_rating(&content.value, f64::from(value))))
        }
        _ => None,
    }
}

fn toggle(content: &CellContent) -> Option<CellContent> {
    let CellValue::Boolean { data } = content.value else {
        return None;
    };
    Some(content.with_value(CellValue::Boolean {
        data: Some(!data.unwrap_or(false)),
    }))
}

fn with_rating(value: &CellValue, next: f64) -> CellValue {
    let mut value = value.clone();
    if let CellValue::Rating { data, .. } = &mut value {
        *data = Some(next);
    }
    value
}

/// Screen placement of the editor overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOverlay {
    pub rect: Rect,
    /// False while the cell is scrolled fully out of view. The overlay is
    /// kept (zero size) so the input keeps its state.
    pub visible: bool,
}

impl EditorOverlay {
    pub const HIDDEN: EditorOverlay = EditorOverlay {
        rect: Rect::ZERO,
        visible: false,
    };

    /// Place the overlay for `address` (display row).
    ///
    /// The overlay starts on the unclipped cell rect, takes `width_override`
    /// if set, and is clamped inside the viewport: top to the header, left
    /// to the frozen band (or the row header for frozen columns), bottom and
    /// right to the viewport extent minus the overlay size. Top and left win
    /// when the overlay is larger than the space available.
    pub fn position(
        layout: &GridLayout,
        viewport: &Viewport,
        address: CellAddress,
        width_override: Option<f32>,
    ) -> Self {
        let (Some(cell), Some(_)) = (
            layout.cell_rect(address, viewport),
            layout.visible_cell_rect(address, viewport),
        ) else {
            return Self::HIDDEN;
        };
        let width = width_override.filter(|w| *w > 0.0).unwrap_or(cell.width);
        let height = cell.height;

        let min_left = if layout.is_frozen(address.col) {
            layout.row_header_width
        } else {
            layout.frozen_divider_x()
        };
        let min_top = layout.header_height;

        let x = cell.x.min(viewport.width - width).max(min_left);
        let y = cell.y.min(viewport.height - height).max(min_top);
        Self {
            rect: Rect::new(x, y, width, height),
            visible: true,
        }
    }
}

/// One in-progress edit. Addresses are display rows; `record` is what the
/// host sees.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub address: CellAddress,
    pub record: CellAddress,
    pub editor: EditorKind,
    pub original: CellContent,
    pub draft: String,
}

impl EditSession {
    /// Start editing `original`, or `None` when it has no overlay editor.
    pub fn begin(address: CellAddress, record: CellAddress, original: CellContent) -> Option<Self> {
        let editor = editor_for_content(&original);
        if !editor.opens_overlay() {
            return None;
        }
        let draft = initial_draft(&original.value);
        Some(Self {
            address,
            record,
            editor,
            original,
            draft,
        })
    }

    /// Start editing by typing: the draft is replaced by `typed`.
    pub fn begin_typing(
        address: CellAddress,
        record: CellAddress,
        original: CellContent,
        typed: &str,
    ) -> Option<Self> {
        let mut session = Self::begin(address, record, original)?;
        if !session.editor.accepts_typing() {
            return None;
        }
        session.draft = typed.to_string();
        Some(session)
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// Content to hand to the host, or `None` when the draft does not
    /// parse or changes nothing.
    pub fn commit(&self) -> Option<CellContent> {
        let value = parse_draft(&self.original.value, &self.draft)?;
        let content = self.original.with_value(value);
        (content != self.original).then_some(content)
    }

    /// Commit with a value supplied by a host-driven picker.
    pub fn commit_value(&self, value: CellValue) -> Option<CellContent> {
        if value.kind() != self.original.kind() {
            return None;
        }
        let content = self.original.with_value(value);
        (content != self.original).then_some(content)
    }

    /// Overlay placement for the current layout and scroll position.
    pub fn overlay(&self, layout: &GridLayout, viewport: &Viewport) -> EditorOverlay {
        EditorOverlay::position(layout, viewport, self.address, self.original.editor_width)
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
    use crate::layout::LinearRows;
    use crate::types::{ColumnDescriptor, GridConfig};
    use test_case::test_case;

    fn layout(frozen: u32) -> GridLayout {
        let columns: Vec<_> = (0..10)
            .map(|i| ColumnDescriptor::new(format!("c{i}"), format!("C{i}"), 100.0))
            .collect();
        let config = GridConfig {
            frozen_column_count: frozen,
            row_header_width: 60.0,
            ..GridConfig::default()
        };
        GridLayout::new(&columns, LinearRows::ungrouped(100), &config)
    }

    #[test_case(CellKind::Text, EditorKind::Text)]
    #[test_case(CellKind::Number, EditorKind::Number)]
    #[test_case(CellKind::Boolean, EditorKind::Toggle)]
    #[test_case(CellKind::Rating, EditorKind::RatingPicker)]
    #[test_case(CellKind::User, EditorKind::Picker)]
    #[test_case(CellKind::Loading, EditorKind::None)]
    fn kind_dispatch(kind: CellKind, expected: EditorKind) {
        assert_eq!(editor_for(kind), expected);
    }

    #[test]
    fn direct_commit_kinds_never_open_overlay() {
        for kind in [CellKind::Boolean, CellKind::Rating] {
            assert!(kind.commits_directly());
            assert!(!editor_for(kind).opens_overlay());
        }
    }

    #[test]
    fn readonly_has_no_editor() {
        let content = CellContent::text("x").readonly();
        assert_eq!(editor_for_content(&content), EditorKind::None);
        let cell = Rect::new(0.0, 0.0, 100.0, 32.0);
        let checked = CellContent::boolean(true).readonly();
        assert!(direct_commit_at(&checked, cell, 50.0, 16.0).is_none());
    }

    #[test]
    fn checkbox_click_toggles() {
        let cell = Rect::new(0.0, 0.0, 100.0, 32.0);
        let committed = direct_commit_at(&CellContent::boolean(false), cell, 50.0, 16.0).unwrap();
        assert_eq!(committed, CellContent::boolean(true));
        // Outside the checkbox square
        assert!(direct_commit_at(&CellContent::boolean(false), cell, 5.0, 16.0).is_none());
    }

    #[test]
    fn rating_click_sets_and_clears() {
        let cell = Rect::new(0.0, 0.0, 200.0, 32.0);
        let third = rating_icon_rect(cell, 2);
        let (x, y) = (third.x + 2.0, third.y + 2.0);
        let set = direct_commit_at(&CellContent::rating(1.0, 5), cell, x, y).unwrap();
        assert_eq!(set, CellContent::rating(3.0, 5));
        let cleared = direct_commit_at(&CellContent::rating(3.0, 5), cell, x, y).unwrap();
        assert_eq!(cleared, CellContent::rating(0.0, 5));
    }

    #[test]
    fn rating_digit_is_clamped() {
        let committed = direct_commit_key(&CellContent::rating(1.0, 5), "9").unwrap();
        assert_eq!(committed, CellContent::rating(5.0, 5));
        assert!(direct_commit_key(&CellContent::rating(1.0, 5), "x").is_none());
    }

    #[test]
    fn commit_wraps_original_content() {
        let mut original = CellContent::number(1.0);
        original.editor_width = Some(240.0);
        let mut session =
            EditSession::begin(CellAddress::new(0, 0), CellAddress::new(0, 0), original).unwrap();
        assert_eq!(session.draft, "1");
        session.set_draft("2.5");
        let committed = session.commit().unwrap();
        assert_eq!(committed.editor_width, Some(240.0));
        assert_eq!(
            committed.value,
            CellValue::Number {
                data: Some(2.5),
                display_data: None
            }
        );
    }

    #[test]
    fn bad_number_and_unchanged_drafts_do_not_commit() {
        let mut session = EditSession::begin(
            CellAddress::new(0, 0),
            CellAddress::new(0, 0),
            CellContent::text("same"),
        )
        .unwrap();
        assert!(session.commit().is_none());

        session = EditSession::begin(
            CellAddress::new(0, 0),
            CellAddress::new(0, 0),
            CellContent::number(1.0),
        )
        .unwrap();
        session.set_draft("abc");
        assert!(session.commit().is_none());
    }

    #[test]
    fn single_select_rejects_two_titles() {
        let original = CellValue::Select {
            data: Vec::new(),
            display_data: Vec::new(),
            is_multiple: false,
        };
        assert!(parse_draft(&original, "a, b").is_none());
        assert!(parse_draft(&original, "a").is_some());
    }

    #[test]
    fn overlay_follows_visible_cell() {
        let layout = layout(0);
        let viewport = Viewport::new(400.0, 300.0);
        let overlay = EditorOverlay::position(&layout, &viewport, CellAddress::new(1, 2), None);
        assert!(overlay.visible);
        assert_eq!(overlay.rect, Rect::new(160.0, 40.0 + 64.0, 100.0, 32.0));
    }

    #[test]
    fn overlay_is_clamped_to_frozen_band_and_header() {
        let layout = layout(1);
        let mut viewport = Viewport::new(400.0, 300.0);
        // Column 1 is half under the frozen band, row 0 half under the header.
        viewport.scroll_left = 50.0;
        viewport.scroll_top = 16.0;
        let overlay = EditorOverlay::position(&layout, &viewport, CellAddress::new(1, 0), None);
        assert!(overlay.visible);
        assert_eq!(overlay.rect.x, 160.0);
        assert_eq!(overlay.rect.y, 40.0);

        let frozen = EditorOverlay::position(&layout, &viewport, CellAddress::new(0, 0), None);
        assert_eq!(frozen.rect.x, 60.0);
    }

    #[test]
    fn wide_overlay_is_clamped_to_right_edge() {
        let layout = layout(0);
        let viewport = Viewport::new(400.0, 300.0);
        let overlay =
            EditorOverlay::position(&layout, &viewport, CellAddress::new(2, 0), Some(250.0));
        assert_eq!(overlay.rect.x, 150.0);
        assert_eq!(overlay.rect.width, 250.0);
    }

    #[test]
    fn overlay_hides_when_scrolled_out() {
        let layout = layout(0);
        let mut viewport = Viewport::new(400.0, 300.0);
        viewport.scroll_top = 32.0 * 50.0;
        let overlay = EditorOverlay::position(&layout, &viewport, CellAddress::new(0, 0), None);
        assert_eq!(overlay, EditorOverlay::HIDDEN);
    }
}
