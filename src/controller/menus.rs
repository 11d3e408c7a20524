//! Context menu state owned by the controller.
//!
//! The grid does not draw menus. It records which one is open and where,
//! and the host reads that back to render its own menu UI.

use serde::Serialize;

/// Where a menu was requested, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MenuPosition {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMenu {
    pub column: u32,
    pub position: MenuPosition,
}

/// Menu for a record row. `row` is a record index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMenu {
    pub row: u32,
    pub column: Option<u32>,
    pub position: MenuPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticMenu {
    pub column: u32,
    pub position: MenuPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMenu {
    pub group_id: String,
    pub position: MenuPosition,
}

/// At most one menu is open at a time.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MenuState {
    #[default]
    Closed,
    Header(HeaderMenu),
    Record(RecordMenu),
    Statistic(StatisticMenu),
    Group(GroupMenu),
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        !matches!(self, MenuState::Closed)
    }

    /// Close whatever is open. Returns true if something was.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        *self = MenuState::Closed;
        was_open
    }

    pub fn open_header(&mut self, column: u32, x: f32, y: f32) {
        *self = MenuState::Header(HeaderMenu {
            column,
            position: MenuPosition { x, y },
        });
    }

    pub fn open_record(&mut self, row: u32, column: Option<u32>, x: f32, y: f32) {
        *self = MenuState::Record(RecordMenu {
            row,
            column,
            position: MenuPosition { x, y },
        });
    }

    pub fn open_statistic(&mut self, column: u32, x: f32, y: f32) {
        *self = MenuState::Statistic(StatisticMenu {
            column,
            position: MenuPosition { x, y },
        });
    }

    pub fn open_group(&mut self, group_id: impl Into<String>, x: f32, y: f32) {
        *self = MenuState::Group(GroupMenu {
            group_id: group_id.into(),
            position: MenuPosition { x, y },
        });
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
    fn opening_replaces_previous_menu() {
        let mut menus = MenuState::default();
        menus.open_header(2, 10.0, 20.0);
        menus.open_statistic(1, 0.0, 0.0);
        assert!(matches!(menus, MenuState::Statistic(StatisticMenu { column: 1, .. })));
        assert!(menus.close());
        assert!(!menus.close());
    }

    #[test]
    fn serializes_with_type_tag() {
        let mut menus = MenuState::default();
        menus.open_group("g1", 5.0, 6.0);
        let json = serde_json::to_value(&menus).unwrap();
        assert_eq!(json["type"], "group");
        assert_eq!(json["groupId"], "g1");
    }
}
