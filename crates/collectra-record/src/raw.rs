//! Stored record shape
//!
//! Mirrors the on-disk YAML exactly, including the single-vs-many
//! ambiguity: a collection or parent list may be a bare value or a
//! sequence. [`crate::normalize`] erases the ambiguity.

use crate::node::Orientation;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

/// Bare value or sequence of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Sequence form
    Many(Vec<T>),
    /// Bare form
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten to a sequence
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }

    /// Compact form for serialization: `None` when empty, bare when single
    #[must_use]
    pub fn from_vec(mut items: Vec<T>) -> Option<Self> {
        match items.len() {
            0 => None,
            1 => items.pop().map(Self::One),
            _ => Some(Self::Many(items)),
        }
    }
}

/// `collectra_results_metadata` block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultsMetadata {
    /// Workflow that produced the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,

    /// Production time, kept as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,

    /// Any other metadata
    #[serde(flatten)]
    pub extra: Mapping,
}

/// One node as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Node id
    pub id: String,

    /// Absent, bare id, or sequence of ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parents: Option<OneOrMany<String>>,

    /// Image path or text content
    ///
    /// Unquoted scalars (`data: 12.50`, `data: true`) are read as their
    /// string form.
    #[serde(default, deserialize_with = "scalar_string")]
    pub data: String,

    /// Display rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,

    /// Horizontal center
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_center: Option<f64>,

    /// Vertical center
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_center: Option<f64>,

    /// Relative width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_relative: Option<f64>,

    /// Relative height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_relative: Option<f64>,

    /// Uninterpreted fields (`type`, `label`, ...)
    #[serde(flatten)]
    pub extra: Mapping,
}

impl RawNode {
    /// Node with only an id and data
    #[must_use]
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parents: None,
            data: data.into(),
            orientation: None,
            x_center: None,
            y_center: None,
            width_relative: None,
            height_relative: None,
            extra: Mapping::new(),
        }
    }
}

/// Read any YAML scalar as text; null reads as empty
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Tagged(tagged) => match tagged.value {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(serde::de::Error::custom("node data must be a scalar")),
        },
        _ => Err(serde::de::Error::custom("node data must be a scalar")),
    }
}

/// Whole record as stored
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    /// Provenance metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collectra_results_metadata: Option<ResultsMetadata>,

    /// The full image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_image_label: Option<OneOrMany<RawNode>>,

    /// Crops of the root image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cropped_image_inside_root_image: Option<OneOrMany<RawNode>>,

    /// Crops of crops
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_cropped_image: Option<OneOrMany<RawNode>>,

    /// Intermediate text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_draft: Option<OneOrMany<RawNode>>,

    /// Final text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<OneOrMany<RawNode>>,

    /// Top-level keys the core does not interpret
    #[serde(flatten)]
    pub extra: Mapping,
}
