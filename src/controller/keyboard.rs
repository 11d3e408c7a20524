//! Key classification and active-cell stepping.

use serde::Deserialize;

use crate::layout::LinearRows;
use crate::types::CellAddress;

/// A keydown as the browser reports it (`KeyboardEvent.key` plus modifiers).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyInput {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// A single character typed without a command modifier.
    pub fn is_printable(&self) -> bool {
        !self.command() && self.key.chars().count() == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// What a key means to the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Move { direction: Direction, extend: bool },
    Tab { back: bool },
    Enter,
    Escape,
    Delete,
    Copy,
    Paste,
    Undo,
    Redo,
    SelectAll,
    /// Printable input, e.g. for type-to-edit.
    Type(String),
    Other,
}

pub fn classify(input: &KeyInput) -> KeyAction {
    let direction = match input.key.as_str() {
        "ArrowUp" => Some(Direction::Up),
        "ArrowDown" => Some(Direction::Down),
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        _ => None,
    };
    if let Some(direction) = direction {
        return KeyAction::Move {
            direction,
            extend: input.shift,
        };
    }
    if input.command() {
        return match input.key.to_ascii_lowercase().as_str() {
            "c" => KeyAction::Copy,
            "v" => KeyAction::Paste,
            "z" if input.shift => KeyAction::Redo,
            "z" => KeyAction::Undo,
            "y" => KeyAction::Redo,
            "a" => KeyAction::SelectAll,
            _ => KeyAction::Other,
        };
    }
    match input.key.as_str() {
        "Tab" => KeyAction::Tab { back: input.shift },
        "Enter" => KeyAction::Enter,
        "Escape" => KeyAction::Escape,
        "Delete" | "Backspace" => KeyAction::Delete,
        _ if input.is_printable() => KeyAction::Type(input.key.clone()),
        _ => KeyAction::Other,
    }
}

/// One step from `from` in `direction`, clamped to the grid.
///
/// Vertical steps skip group header rows; with no record row in that
/// direction the address is returned unchanged.
pub fn step(from: CellAddress, direction: Direction, col_count: u32, rows: &LinearRows) -> CellAddress {
    let last_col = col_count.saturating_sub(1);
    match direction {
        Direction::Left => CellAddress::new(from.col.saturating_sub(1), from.row),
        Direction::Right => CellAddress::new((from.col + 1).min(last_col), from.row),
        Direction::Up => (0..from.row)
            .rev()
            .find(|&r| rows.record_index(r).is_some())
            .map_or(from, |row| CellAddress::new(from.col, row)),
        Direction::Down => (from.row.saturating_add(1)..rows.len())
            .find(|&r| rows.record_index(r).is_some())
            .map_or(from, |row| CellAddress::new(from.col, row)),
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
    use std::collections::BTreeSet;

    use super::*;
    use crate::types::GroupPoint;
    use test_case::test_case;

    #[test_case(KeyInput::new("ArrowDown"), KeyAction::Move { direction: Direction::Down, extend: false })]
    #[test_case(KeyInput::new("ArrowLeft").with_shift(), KeyAction::Move { direction: Direction::Left, extend: true })]
    #[test_case(KeyInput::new("Tab").with_shift(), KeyAction::Tab { back: true })]
    #[test_case(KeyInput::new("c").with_ctrl(), KeyAction::Copy)]
    #[test_case(KeyInput::new("Z").with_ctrl().with_shift(), KeyAction::Redo)]
    #[test_case(KeyInput::new("y").with_ctrl(), KeyAction::Redo)]
    #[test_case(KeyInput::new("Backspace"), KeyAction::Delete)]
    #[test_case(KeyInput::new("x"), KeyAction::Type("x".to_string()))]
    #[test_case(KeyInput::new("F2"), KeyAction::Other)]
    fn classifies(input: KeyInput, expected: KeyAction) {
        assert_eq!(classify(&input), expected);
    }

    #[test]
    fn steps_clamp_at_edges() {
        let rows = LinearRows::ungrouped(10);
        let last = CellAddress::new(2, 9);
        assert_eq!(step(last, Direction::Down, 3, &rows), last);
        assert_eq!(step(last, Direction::Right, 3, &rows), last);
        let origin = CellAddress::new(0, 0);
        assert_eq!(step(origin, Direction::Up, 3, &rows), origin);
        assert_eq!(step(origin, Direction::Left, 3, &rows), origin);
    }

    #[test]
    fn vertical_steps_skip_group_headers() {
        let points = vec![
            GroupPoint::group("a", 0, "A"),
            GroupPoint::rows(1),
            GroupPoint::group("b", 0, "B"),
            GroupPoint::rows(1),
        ];
        let rows = LinearRows::grouped(&points, &BTreeSet::new());
        assert_eq!(step(CellAddress::new(0, 1), Direction::Down, 1, &rows), CellAddress::new(0, 3));
        assert_eq!(step(CellAddress::new(0, 1), Direction::Up, 1, &rows), CellAddress::new(0, 1));
    }
}
