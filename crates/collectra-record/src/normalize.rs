//! Record normalizer
//!
//! [`normalize`] turns the stored shape into the sequences-only
//! [`Record`]; [`denormalize`] restores the compact stored shape:
//!
//! | sequence length | collection      | parents     |
//! |-----------------|-----------------|-------------|
//! | 0               | key omitted     | key omitted |
//! | 1               | bare node       | bare id     |
//! | 2+              | sequence        | sequence    |
//!
//! `denormalize(normalize(x)) == x` for records in this compact shape,
//! modulo key order.

use crate::node::{AnnotationNode, Collection, NodeId};
use crate::raw::{OneOrMany, RawNode, RawRecord};
use crate::record::Record;
use collectra_geometry::{Geometry, GeometryField};
use serde_yaml::Value;

/// Normalize a parents field: absent -> `[]`, bare -> `[id]`
#[must_use]
pub fn normalize_parents(parents: Option<OneOrMany<String>>) -> Vec<NodeId> {
    parents
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .map(NodeId::from)
        .collect()
}

/// Compact a parents sequence for storage
#[must_use]
pub fn denormalize_parents(parents: &[NodeId]) -> Option<OneOrMany<String>> {
    OneOrMany::from_vec(parents.iter().map(|p| p.as_str().to_string()).collect())
}

/// Stored shape -> normalized record
#[must_use]
pub fn normalize(raw: RawRecord) -> Record {
    let RawRecord {
        collectra_results_metadata,
        root_image_label,
        cropped_image_inside_root_image,
        sub_cropped_image,
        text_draft,
        text,
        extra,
    } = raw;

    let mut record = Record {
        metadata: collectra_results_metadata,
        extra,
        ..Record::default()
    };

    let stored = [
        (Collection::RootImageLabel, root_image_label),
        (Collection::CroppedImageInsideRootImage, cropped_image_inside_root_image),
        (Collection::SubCroppedImage, sub_cropped_image),
        (Collection::TextDraft, text_draft),
        (Collection::Text, text),
    ];

    for (collection, nodes) in stored {
        let nodes = nodes.map(OneOrMany::into_vec).unwrap_or_default();
        *record.collection_mut(collection) = nodes
            .into_iter()
            .map(|raw| normalize_node(collection, raw))
            .collect();
    }

    record
}

/// Normalized record -> stored shape
#[must_use]
pub fn denormalize(record: &Record) -> RawRecord {
    let compact = |collection: Collection| {
        OneOrMany::from_vec(record.collection(collection).iter().map(denormalize_node).collect())
    };

    RawRecord {
        collectra_results_metadata: record.metadata.clone(),
        root_image_label: compact(Collection::RootImageLabel),
        cropped_image_inside_root_image: compact(Collection::CroppedImageInsideRootImage),
        sub_cropped_image: compact(Collection::SubCroppedImage),
        text_draft: compact(Collection::TextDraft),
        text: compact(Collection::Text),
        extra: record.extra.clone(),
    }
}

fn normalize_node(collection: Collection, raw: RawNode) -> AnnotationNode {
    let RawNode {
        id,
        parents,
        data,
        orientation,
        x_center,
        y_center,
        width_relative,
        height_relative,
        mut extra,
    } = raw;

    let geometry = match (x_center, y_center, width_relative, height_relative) {
        (Some(x), Some(y), Some(w), Some(h)) => Some(Geometry::new(x, y, w, h)),
        (None, None, None, None) => None,
        partial => {
            // Incomplete region: keep what is there so it is written back untouched
            tracing::warn!("Node {} has incomplete geometry, leaving it uninterpreted", id);
            let (x, y, w, h) = partial;
            for (field, value) in GeometryField::ALL.into_iter().zip([x, y, w, h]) {
                if let Some(value) = value {
                    extra.insert(Value::String(field.key().to_string()), Value::from(value));
                }
            }
            None
        }
    };

    AnnotationNode {
        id: NodeId::from(id),
        kind: collection.kind(),
        data,
        parents: normalize_parents(parents),
        geometry,
        orientation,
        extra,
    }
}

fn denormalize_node(node: &AnnotationNode) -> RawNode {
    let geometry = node.geometry.as_ref();
    RawNode {
        id: node.id.as_str().to_string(),
        parents: denormalize_parents(&node.parents),
        data: node.data.clone(),
        orientation: node.orientation,
        x_center: geometry.map(|g| g.x_center),
        y_center: geometry.map(|g| g.y_center),
        width_relative: geometry.map(|g| g.width_relative),
        height_relative: geometry.map(|g| g.height_relative),
        extra: node.extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use pretty_assertions::assert_eq;

    const RECORD: &str = r"
collectra_results_metadata:
  workflow: ocr
  timestamp: '2024-05-01T10:00:00'
root_image_label:
  id: root
  data: page.jpg
cropped_image_inside_root_image:
- id: crop-1
  parents: root
  data: page.jpg
  orientation: north
  x_center: 0.5
  y_center: 0.5
  width_relative: 0.4
  height_relative: 0.3
- id: crop-2
  parents: root
  data: page.jpg
  orientation: west
  x_center: 0.2
  y_center: 0.2
  width_relative: 0.1
  height_relative: 0.1
text:
  id: text_1
  parents:
  - crop-1
  - crop-2
  data: hello
";

    fn raw() -> RawRecord {
        serde_yaml::from_str(RECORD).unwrap()
    }

    #[test]
    fn every_parents_field_becomes_sequence() {
        let record = normalize(raw());
        let root = record.root_image().unwrap();
        assert!(root.parents.is_empty());

        let (_, crop) = record.find("crop-1").unwrap();
        assert_eq!(crop.parents, vec![NodeId::from("root")]);

        let (_, text) = record.find("text_1").unwrap();
        assert_eq!(text.parents.len(), 2);
        assert_eq!(text.kind, NodeKind::Text);
    }

    #[test]
    fn missing_collections_become_empty() {
        let record = normalize(raw());
        assert!(record.collection(Collection::SubCroppedImage).is_empty());
        assert!(record.collection(Collection::TextDraft).is_empty());
        assert_eq!(record.collection(Collection::CroppedImageInsideRootImage).len(), 2);
    }

    #[test]
    fn geometry_is_assembled() {
        let record = normalize(raw());
        let (_, crop) = record.find("crop-1").unwrap();
        assert_eq!(crop.geometry, Some(Geometry::new(0.5, 0.5, 0.4, 0.3)));
    }

    #[test]
    fn round_trip_is_identity() {
        let original = raw();
        assert_eq!(denormalize(&normalize(original.clone())), original);
    }

    #[test]
    fn single_element_sequence_collapses() {
        let mut original = raw();
        original.root_image_label = original
            .root_image_label
            .map(|r| OneOrMany::Many(r.into_vec()));
        let back = denormalize(&normalize(original));
        assert!(matches!(back.root_image_label, Some(OneOrMany::One(_))));
    }

    #[test]
    fn partial_geometry_is_preserved_verbatim() {
        let mut original = raw();
        let mut node = RawNode::new("odd", "page.jpg");
        node.parents = Some(OneOrMany::One("root".to_string()));
        node.x_center = Some(0.25);
        original.sub_cropped_image = Some(OneOrMany::One(node));

        let record = normalize(original.clone());
        let (_, odd) = record.find("odd").unwrap();
        assert!(odd.geometry.is_none());

        let text = serde_yaml::to_string(&denormalize(&record)).unwrap();
        let reparsed: RawRecord = serde_yaml::from_str(&text).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn empty_parents_are_omitted() {
        assert!(denormalize_parents(&[]).is_none());
        assert_eq!(
            denormalize_parents(&[NodeId::from("a")]),
            Some(OneOrMany::One("a".to_string()))
        );
    }
}
