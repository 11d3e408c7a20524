//! Cell content contract between the grid and its host.
//!
//! The host produces a [`CellContent`] on demand for every visible address;
//! the grid never stores it beyond a single frame or edit session.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Discriminant of a cell's content, used for drawer/editor dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    Text,
    Number,
    Boolean,
    Select,
    Rating,
    Link,
    User,
    Date,
    Attachment,
    Chart,
    Loading,
}

impl CellKind {
    /// Kinds that commit from a single interaction instead of an overlay editor.
    pub fn commits_directly(self) -> bool {
        matches!(self, CellKind::Boolean | CellKind::Rating)
    }
}

/// One choice of a Select cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A user reference in a User cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// An attachment in an Attachment cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Kind-specific payload. Required fields are `Option` so that malformed
/// host content still deserializes and is rejected by [`CellValue::validate`]
/// at draw time instead of failing the whole frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CellValue {
    Text {
        #[serde(default)]
        data: Option<String>,
        #[serde(default)]
        display_data: Option<String>,
    },
    Number {
        #[serde(default)]
        data: Option<f64>,
        #[serde(default)]
        display_data: Option<String>,
    },
    Boolean {
        #[serde(default)]
        data: Option<bool>,
    },
    Select {
        #[serde(default)]
        data: Vec<SelectOption>,
        #[serde(default)]
        display_data: Vec<String>,
        #[serde(default)]
        is_multiple: bool,
    },
    Rating {
        #[serde(default)]
        data: Option<f64>,
        #[serde(default)]
        max: Option<u32>,
        #[serde(default)]
        icon: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
    Link {
        #[serde(default)]
        data: Vec<String>,
        #[serde(default)]
        display_data: Option<String>,
    },
    User {
        #[serde(default)]
        data: Vec<UserRef>,
    },
    Date {
        #[serde(default)]
        data: Option<String>,
        #[serde(default)]
        display_data: Option<String>,
    },
    Attachment {
        #[serde(default)]
        data: Vec<AttachmentRef>,
    },
    Chart {
        #[serde(default)]
        data: Option<Vec<f64>>,
        #[serde(default)]
        color: Option<String>,
    },
    Loading,
}

impl CellValue {
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Text { .. } => CellKind::Text,
            CellValue::Number { .. } => CellKind::Number,
            CellValue::Boolean { .. } => CellKind::Boolean,
            CellValue::Select { .. } => CellKind::Select,
            CellValue::Rating { .. } => CellKind::Rating,
            CellValue::Link { .. } => CellKind::Link,
            CellValue::User { .. } => CellKind::User,
            CellValue::Date { .. } => CellKind::Date,
            CellValue::Attachment { .. } => CellKind::Attachment,
            CellValue::Chart { .. } => CellKind::Chart,
            CellValue::Loading => CellKind::Loading,
        }
    }

    /// Check that every field the kind's drawer needs is present.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        match self {
            CellValue::Rating { max, data, .. } => {
                match max {
                    None | Some(0) => return Err(GridError::malformed(kind, "missing max")),
                    Some(_) => {}
                }
                if data.is_some_and(|v| !v.is_finite()) {
                    return Err(GridError::malformed(kind, "non-finite rating"));
                }
            }
            CellValue::Number { data, .. } => {
                if data.is_some_and(|v| !v.is_finite()) {
                    return Err(GridError::malformed(kind, "non-finite number"));
                }
            }
            CellValue::Select { data, .. } => {
                if data.iter().any(|opt| opt.title.is_none()) {
                    return Err(GridError::malformed(kind, "option without title"));
                }
            }
            CellValue::User { data } => {
                if data.iter().any(|u| u.name.is_none()) {
                    return Err(GridError::malformed(kind, "user without name"));
                }
            }
            CellValue::Chart { data, .. } => {
                if data.is_none() {
                    return Err(GridError::malformed(kind, "missing series"));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Plain-text rendering used for clipboard payloads and search.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text { data, display_data } | CellValue::Date { data, display_data } => {
                display_data.clone().or_else(|| data.clone()).unwrap_or_default()
            }
            CellValue::Number { data, display_data } => display_data
                .clone()
                .or_else(|| data.map(|v| v.to_string()))
                .unwrap_or_default(),
            CellValue::Boolean { data } => data.unwrap_or(false).to_string(),
            CellValue::Select {
                data, display_data, ..
            } => {
                if display_data.is_empty() {
                    data.iter()
                        .filter_map(|o| o.title.as_deref())
                        .collect::<Vec<_>>()
                        .join(", ")
                } else {
                    display_data.join(", ")
                }
            }
            CellValue::Rating { data, .. } => data.map(|v| v.to_string()).unwrap_or_default(),
            CellValue::Link { data, display_data } => {
                display_data.clone().unwrap_or_else(|| data.join(", "))
            }
            CellValue::User { data } => data
                .iter()
                .filter_map(|u| u.name.as_deref())
                .collect::<Vec<_>>()
                .join(", "),
            CellValue::Attachment { data } => data
                .iter()
                .filter_map(|a| a.name.as_deref())
                .collect::<Vec<_>>()
                .join(", "),
            CellValue::Chart { .. } | CellValue::Loading => String::new(),
        }
    }
}

/// Everything the host says about one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellContent {
    #[serde(flatten)]
    pub value: CellValue,
    /// Readonly cells never open an editor and never direct-commit.
    #[serde(default)]
    pub readonly: bool,
    /// Overrides the overlay editor width (defaults to the column width).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_width: Option<f32>,
}

impl CellContent {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            readonly: false,
            editor_width: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(CellValue::Text {
            data: Some(text.clone()),
            display_data: Some(text),
        })
    }

    pub fn number(value: f64) -> Self {
        Self::new(CellValue::Number {
            data: Some(value),
            display_data: None,
        })
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(CellValue::Boolean { data: Some(value) })
    }

    pub fn rating(value: f64, max: u32) -> Self {
        Self::new(CellValue::Rating {
            data: Some(value),
            max: Some(max),
            icon: None,
            color: None,
        })
    }

    pub fn loading() -> Self {
        Self::new(CellValue::Loading)
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn kind(&self) -> CellKind {
        self.value.kind()
    }

    /// Same content with a different value, keeping flags. This is the
    /// wrapped shape every edit commit hands back to the host.
    pub fn with_value(&self, value: CellValue) -> Self {
        Self {
            value,
            readonly: self.readonly,
            editor_width: self.editor_width,
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
    fn deserializes_tagged_content() {
        let json = r#"{"type":"rating","data":3,"max":5,"icon":"star","readonly":true}"#;
        let content: CellContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.kind(), CellKind::Rating);
        assert!(content.readonly);
        assert!(content.value.validate().is_ok());
    }

    #[test]
    fn missing_required_field_is_malformed_not_a_parse_error() {
        let content: CellContent = serde_json::from_str(r#"{"type":"rating","data":3}"#).unwrap();
        let err = content.value.validate().unwrap_err();
        assert!(matches!(
            err,
            GridError::MalformedCell {
                kind: CellKind::Rating,
                ..
            }
        ));
    }

    #[test]
    fn empty_number_is_a_blank_cell() {
        let blank = CellValue::Number {
            data: None,
            display_data: None,
        };
        assert!(blank.validate().is_ok());
        assert_eq!(blank.display_text(), "");

        let nan = CellValue::Number {
            data: Some(f64::NAN),
            display_data: None,
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn select_display_text_prefers_display_data() {
        let value = CellValue::Select {
            data: vec![SelectOption {
                id: Some("a".into()),
                title: Some("Alpha".into()),
                color: None,
            }],
            display_data: vec!["ALPHA".into()],
            is_multiple: false,
        };
        assert_eq!(value.display_text(), "ALPHA");
    }

    #[test]
    fn with_value_keeps_flags() {
        let content = CellContent::text("a").readonly();
        let edited = content.with_value(CellValue::Text {
            data: Some("b".into()),
            display_data: None,
        });
        assert!(edited.readonly);
        assert_eq!(edited.value.display_text(), "b");
    }
}
