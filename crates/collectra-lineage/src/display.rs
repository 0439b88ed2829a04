//! Display-value resolution
//!
//! Decides what text a crop row shows and whether it may be edited:
//! root and container crops show blank, a leaf crop with text shows the
//! deepest text below it, a leaf crop without text shows blank.

use crate::index::LineageIndex;
use collectra_geometry::Geometry;
use collectra_record::{NodeId, NodeKind, Record};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

/// Which display rule produced a [`DisplayValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayReason {
    /// Id is not in the record
    NotFound,
    /// Root image node
    RootImage,
    /// Crop with at least one crop child
    ContainerCrop,
    /// Leaf crop resolved to its deepest text
    DeepestText,
    /// Leaf crop without text children
    LeafCrop,
    /// Text or text-draft node showing its own data
    TextNode,
}

impl Display for DisplayReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotFound => "element not found",
            Self::RootImage => "root image: display blank",
            Self::ContainerCrop => "container crop: display blank",
            Self::DeepestText => "leaf crop with text: display deepest text",
            Self::LeafCrop => "leaf crop without text",
            Self::TextNode => "text element: display data",
        };
        f.write_str(text)
    }
}

/// Resolved display of one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayValue {
    /// Text to show; empty for blank
    pub value: String,
    /// Node whose data is shown
    pub source_id: Option<NodeId>,
    /// Region of the resolved node, for crops
    pub geometry: Option<Geometry>,
    /// Whether the shown text may be edited through this row
    pub editable: bool,
    /// Rule that applied
    pub reason: DisplayReason,
}

impl DisplayValue {
    fn blank(reason: DisplayReason, geometry: Option<Geometry>) -> Self {
        Self {
            value: String::new(),
            source_id: None,
            geometry,
            editable: false,
            reason,
        }
    }

    /// Whether nothing is shown
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.value.is_empty()
    }
}

/// Follow the text chain below `start` to its terminal node
///
/// At each step the next node is an unvisited text-like child of the
/// current one, preferring a child that itself has an unvisited text-like
/// child; ties go to record order. Returns `None` when `start` has no
/// text-like child.
#[must_use]
pub fn deepest_text<'a>(index: &'a LineageIndex, start: &str) -> Option<&'a NodeId> {
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut current: Option<&'a NodeId> = None;

    loop {
        let from = current.map_or(start, NodeId::as_str);
        let candidates: Vec<&'a NodeId> = index
            .children_of_kind(from, NodeKind::is_text_like)
            .filter(|c| !visited.contains(c.as_str()))
            .collect();

        let has_text_child = |id: &NodeId| {
            index
                .children_of_kind(id.as_str(), NodeKind::is_text_like)
                .any(|c| c.as_str() != id.as_str() && !visited.contains(c.as_str()))
        };
        let next = candidates
            .iter()
            .copied()
            .find(|c| has_text_child(c))
            .or_else(|| candidates.first().copied());

        match next {
            Some(id) => {
                visited.insert(id.as_str());
                current = Some(id);
            }
            None => return current,
        }
    }
}

/// Resolve the display value of `id`
///
/// Never fails: an unknown id resolves to blank with
/// [`DisplayReason::NotFound`].
#[must_use]
pub fn resolve_display(record: &Record, index: &LineageIndex, id: &str) -> DisplayValue {
    let Some((_, node)) = record.find(id) else {
        return DisplayValue::blank(DisplayReason::NotFound, None);
    };

    match node.kind {
        NodeKind::Image => DisplayValue::blank(DisplayReason::RootImage, None),
        NodeKind::Text | NodeKind::TextDraft => DisplayValue {
            value: node.data.clone(),
            source_id: Some(node.id.clone()),
            geometry: None,
            editable: false,
            reason: DisplayReason::TextNode,
        },
        NodeKind::ImageCrop => {
            if index.children_of_kind(id, NodeKind::is_crop).next().is_some() {
                return DisplayValue::blank(DisplayReason::ContainerCrop, node.geometry);
            }
            match deepest_text(index, id).and_then(|t| record.find(t.as_str())) {
                Some((_, text)) => DisplayValue {
                    value: text.data.clone(),
                    source_id: Some(text.id.clone()),
                    geometry: node.geometry,
                    editable: true,
                    reason: DisplayReason::DeepestText,
                },
                None => DisplayValue::blank(DisplayReason::LeafCrop, node.geometry),
            }
        }
    }
}

/// Displayed text of `id`, empty for blank
#[must_use]
pub fn resolve_display_text(record: &Record, index: &LineageIndex, id: &str) -> String {
    resolve_display(record, index, id).value
}

#[cfg(test)]
mod tests {
    use super::*;
    use collectra_record::Collection;
    use collectra_test_utils::{
        cascade_record, complex_record, geometry, sample_record, RecordBuilder,
    };

    fn resolve(record: &Record, id: &str) -> DisplayValue {
        resolve_display(record, &LineageIndex::build(record), id)
    }

    #[test]
    fn root_is_blank() {
        let value = resolve(&sample_record(), "img_001");
        assert!(value.is_blank());
        assert!(!value.editable);
        assert_eq!(value.reason, DisplayReason::RootImage);
    }

    #[test]
    fn container_crop_is_blank_with_geometry() {
        let value = resolve(&complex_record(), "container_crop_001");
        assert!(value.is_blank());
        assert!(!value.editable);
        assert_eq!(value.reason, DisplayReason::ContainerCrop);
        assert!(value.geometry.is_some());
    }

    #[test]
    fn leaf_crop_shows_deepest_text() {
        let value = resolve(&complex_record(), "leaf_crop_001");
        assert_eq!(value.value, "Deepest text");
        assert_eq!(value.source_id, Some(NodeId::from("text_002")));
        assert!(value.editable);
        assert_eq!(value.reason, DisplayReason::DeepestText);
    }

    #[test]
    fn leaf_crop_without_text() {
        let value = resolve(&complex_record(), "leaf_crop_no_text");
        assert!(value.is_blank());
        assert!(!value.editable);
        assert_eq!(value.reason, DisplayReason::LeafCrop);
    }

    #[test]
    fn text_node_shows_own_data() {
        let value = resolve(&complex_record(), "text_001");
        assert_eq!(value.value, "First text");
        assert!(!value.editable);
        assert_eq!(value.reason, DisplayReason::TextNode);
    }

    #[test]
    fn unknown_id_not_found() {
        let value = resolve(&sample_record(), "ghost");
        assert!(value.is_blank());
        assert_eq!(value.reason, DisplayReason::NotFound);
    }

    #[test]
    fn deepest_prefers_continuing_chain() {
        // sub_cropped_image-1 has both text_draft-1 and text_1 as children
        let record = cascade_record();
        let index = LineageIndex::build(&record);
        assert_eq!(deepest_text(&index, "sub_cropped_image-1").map(NodeId::as_str), Some("text_1"));
        assert_eq!(resolve_display_text(&record, &index, "sub_cropped_image-1"), "TOTAL");
    }

    #[test]
    fn deepest_survives_text_cycle() {
        let record = RecordBuilder::new()
            .root("root", "scan.jpg")
            .crop(
                Collection::CroppedImageInsideRootImage,
                "box",
                &["root"],
                geometry(0.5, 0.5, 0.2, 0.2),
            )
            .text(Collection::TextDraft, "t1", &["box", "t2"], "one")
            .text(Collection::Text, "t2", &["t1"], "two")
            .build();
        let index = LineageIndex::build(&record);
        assert_eq!(deepest_text(&index, "box").map(NodeId::as_str), Some("t2"));
    }

    #[test]
    fn reason_messages() {
        assert_eq!(DisplayReason::NotFound.to_string(), "element not found");
        assert_eq!(DisplayReason::ContainerCrop.to_string(), "container crop: display blank");
    }
}
