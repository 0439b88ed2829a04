//! Testing utilities for Collectra workspace
//!
//! Shared record fixtures and builders.

#![allow(missing_docs)]

use collectra_geometry::Geometry;
use collectra_record::{AnnotationNode, Collection, Orientation, Record};

/// Minimal record text: one image, one crop, one text
pub const SAMPLE_YAML: &str = r"collectra_results_metadata:
  workflow: test
  timestamp: '2024-01-01T00:00:00'
root_image_label:
  id: img_001
  data: test_image.jpg
cropped_image_inside_root_image:
  id: crop_001
  parents: img_001
  data: test_image.jpg
  orientation: north
  x_center: 0.5
  y_center: 0.5
  width_relative: 0.2
  height_relative: 0.1
text:
  id: text_001
  parents: crop_001
  data: Hello World
";

/// Builder for hand-written fixture records
#[derive(Debug, Default)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root image node
    pub fn root(self, id: &str, data: &str) -> Self {
        self.node(Collection::RootImageLabel, id, data, &[], None)
    }

    /// Crop with a region
    pub fn crop(
        self,
        collection: Collection,
        id: &str,
        parents: &[&str],
        geometry: Geometry,
    ) -> Self {
        self.node(collection, id, "test_image.jpg", parents, Some(geometry))
    }

    /// Text-like node
    pub fn text(self, collection: Collection, id: &str, parents: &[&str], data: &str) -> Self {
        self.node(collection, id, data, parents, None)
    }

    pub fn node(
        mut self,
        collection: Collection,
        id: &str,
        data: &str,
        parents: &[&str],
        geometry: Option<Geometry>,
    ) -> Self {
        let mut node = AnnotationNode::new(id, collection.kind(), data)
            .with_parents(parents.iter().copied());
        if let Some(g) = geometry {
            node = node.with_geometry(g).with_orientation(Orientation::North);
        }
        self.record.insert(collection, node).unwrap();
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}

pub fn geometry(x_center: f64, y_center: f64, width: f64, height: f64) -> Geometry {
    Geometry::new(x_center, y_center, width, height)
}

/// img_001 -> crop_001 -> text_001
pub fn sample_record() -> Record {
    RecordBuilder::new()
        .root("img_001", "test_image.jpg")
        .crop(
            Collection::CroppedImageInsideRootImage,
            "crop_001",
            &["img_001"],
            geometry(0.5, 0.5, 0.2, 0.1),
        )
        .text(Collection::Text, "text_001", &["crop_001"], "Hello World")
        .build()
}

/// Container crop with two leaf crops, one of them carrying a two-step text chain
pub fn complex_record() -> Record {
    RecordBuilder::new()
        .root("img_001", "test_image.jpg")
        .crop(
            Collection::CroppedImageInsideRootImage,
            "container_crop_001",
            &["img_001"],
            geometry(0.5, 0.5, 0.8, 0.8),
        )
        .crop(
            Collection::SubCroppedImage,
            "leaf_crop_001",
            &["container_crop_001"],
            geometry(0.3, 0.3, 0.2, 0.1),
        )
        .crop(
            Collection::SubCroppedImage,
            "leaf_crop_no_text",
            &["container_crop_001"],
            geometry(0.7, 0.7, 0.2, 0.1),
        )
        .text(Collection::TextDraft, "text_001", &["leaf_crop_001"], "First text")
        .text(Collection::Text, "text_002", &["text_001"], "Deepest text")
        .build()
}

/// Two-level crop tree with draft and final text under each leaf, plus an unrelated branch
///
/// `cropped_image_inside_root_image-1` has seven nodes beneath it (itself included).
pub fn cascade_record() -> Record {
    RecordBuilder::new()
        .root("root_image_label-1", "scan.jpg")
        .crop(
            Collection::CroppedImageInsideRootImage,
            "cropped_image_inside_root_image-1",
            &["root_image_label-1"],
            geometry(0.5, 0.3, 0.8, 0.4),
        )
        .crop(
            Collection::CroppedImageInsideRootImage,
            "cropped_image_inside_root_image-2",
            &["root_image_label-1"],
            geometry(0.5, 0.8, 0.8, 0.2),
        )
        .crop(
            Collection::SubCroppedImage,
            "sub_cropped_image-1",
            &["cropped_image_inside_root_image-1"],
            geometry(0.3, 0.3, 0.2, 0.1),
        )
        .crop(
            Collection::SubCroppedImage,
            "sub_cropped_image-2",
            &["cropped_image_inside_root_image-1"],
            geometry(0.7, 0.3, 0.2, 0.1),
        )
        .text(Collection::TextDraft, "text_draft-1", &["sub_cropped_image-1"], "T0TAL")
        .text(Collection::TextDraft, "text_draft-2", &["sub_cropped_image-2"], "12.5O")
        .text(
            Collection::TextDraft,
            "text_draft-3",
            &["cropped_image_inside_root_image-2"],
            "thank you",
        )
        .text(Collection::Text, "text_1", &["text_draft-1", "sub_cropped_image-1"], "TOTAL")
        .text(Collection::Text, "text_2", &["text_draft-2", "sub_cropped_image-2"], "12.50")
        .text(
            Collection::Text,
            "text_3",
            &["text_draft-3", "cropped_image_inside_root_image-2"],
            "Thank you",
        )
        .build()
}

/// Crops A and B listing each other as parent
pub fn cyclic_record() -> Record {
    RecordBuilder::new()
        .root("root", "scan.jpg")
        .crop(Collection::SubCroppedImage, "A", &["B"], geometry(0.5, 0.5, 0.1, 0.1))
        .crop(Collection::SubCroppedImage, "B", &["A"], geometry(0.5, 0.5, 0.1, 0.1))
        .build()
}

/// Ids of every node in record order
pub fn node_ids(record: &Record) -> Vec<String> {
    record.nodes().map(|(_, n)| n.id.as_str().to_string()).collect()
}

