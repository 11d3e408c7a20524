use serde::{Deserialize, Serialize};

/// One entry of the host's linearized grouping.
///
/// A `Group` introduces a header at `depth`; a `Row` entry is a run of
/// `count` consecutive records belonging to the innermost open group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GroupPoint {
    #[serde(rename_all = "camelCase")]
    Group {
        id: String,
        depth: u32,
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        is_collapsed: bool,
    },
    Row { count: u32 },
}

impl GroupPoint {
    pub fn group(id: impl Into<String>, depth: u32, value: impl Into<String>) -> Self {
        GroupPoint::Group {
            id: id.into(),
            depth,
            value: Some(value.into()),
            is_collapsed: false,
        }
    }

    pub fn rows(count: u32) -> Self {
        GroupPoint::Row { count }
    }
}
