//! Annotation nodes
//!
//! A node is one unit of the record: the root image, a crop, a text draft
//! or a text. Its kind follows from the collection it is stored in.

use collectra_geometry::Geometry;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

/// Node identifier, unique within a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an id string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Node classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The full image the record describes
    Image,
    /// Rectangular region of the image (or of another crop)
    ImageCrop,
    /// Final extracted text
    Text,
    /// Intermediate extracted text
    TextDraft,
}

impl NodeKind {
    /// Whether the node carries an image path and geometry
    #[inline]
    #[must_use]
    pub const fn is_image_like(self) -> bool {
        matches!(self, Self::Image | Self::ImageCrop)
    }

    /// Whether the node is a crop
    #[inline]
    #[must_use]
    pub const fn is_crop(self) -> bool {
        matches!(self, Self::ImageCrop)
    }

    /// Whether the node carries text content
    #[inline]
    #[must_use]
    pub const fn is_text_like(self) -> bool {
        matches!(self, Self::Text | Self::TextDraft)
    }

    /// Type name used in the record format
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "collectra.Image",
            Self::ImageCrop => "collectra.ImageCrop",
            Self::Text => "collectra.Text",
            Self::TextDraft => "collectra.TextDraft",
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named node collection of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// `root_image_label`
    RootImageLabel,
    /// `cropped_image_inside_root_image`
    CroppedImageInsideRootImage,
    /// `sub_cropped_image`
    SubCroppedImage,
    /// `text_draft`
    TextDraft,
    /// `text`
    Text,
}

impl Collection {
    /// All collections in record order
    pub const ALL: [Collection; 5] = [
        Self::RootImageLabel,
        Self::CroppedImageInsideRootImage,
        Self::SubCroppedImage,
        Self::TextDraft,
        Self::Text,
    ];

    /// Key of this collection in the stored record
    #[inline]
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::RootImageLabel => "root_image_label",
            Self::CroppedImageInsideRootImage => "cropped_image_inside_root_image",
            Self::SubCroppedImage => "sub_cropped_image",
            Self::TextDraft => "text_draft",
            Self::Text => "text",
        }
    }

    /// Kind of every node stored in this collection
    #[inline]
    #[must_use]
    pub const fn kind(self) -> NodeKind {
        match self {
            Self::RootImageLabel => NodeKind::Image,
            Self::CroppedImageInsideRootImage | Self::SubCroppedImage => NodeKind::ImageCrop,
            Self::TextDraft => NodeKind::TextDraft,
            Self::Text => NodeKind::Text,
        }
    }

    /// Collection for a stored key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Display rotation applied after positioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Upright
    #[default]
    North,
    /// Rotated a quarter turn
    West,
    /// Upside down
    South,
    /// Rotated three quarter turns
    East,
}

/// One annotation node in normalized form
///
/// `parents` is always a sequence. Its last entry is the structural
/// container; earlier entries are lineage links only.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationNode {
    /// Unique id
    pub id: NodeId,
    /// Kind, derived from the owning collection
    pub kind: NodeKind,
    /// Image path (image-like) or text content (text-like)
    pub data: String,
    /// Parent ids, container last
    pub parents: Vec<NodeId>,
    /// Region, image-like nodes only
    pub geometry: Option<Geometry>,
    /// Display rotation, image-like nodes only
    pub orientation: Option<Orientation>,
    /// Fields the core does not interpret, preserved for serialization
    pub extra: Mapping,
}

impl AnnotationNode {
    /// Create a parentless node
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            data: data.into(),
            parents: Vec::new(),
            geometry: None,
            orientation: None,
            extra: Mapping::new(),
        }
    }

    /// With parent ids (container last)
    #[must_use]
    pub fn with_parents<I, P>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<NodeId>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// With region
    #[inline]
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// With display rotation
    #[inline]
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Structural container (last parent)
    #[inline]
    #[must_use]
    pub fn container(&self) -> Option<&NodeId> {
        self.parents.last()
    }

    /// Provenance-only parents (all but the last)
    #[must_use]
    pub fn lineage_parents(&self) -> &[NodeId] {
        match self.parents.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Whether `id` appears anywhere in the parent list
    #[inline]
    #[must_use]
    pub fn has_parent(&self, id: &str) -> bool {
        self.parents.iter().any(|p| p == id)
    }

    /// Whether the node has no parents
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Replace data
    #[inline]
    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    /// Replace region
    #[inline]
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = Some(geometry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_is_last_parent() {
        let node = AnnotationNode::new("text_1", NodeKind::Text, "hello")
            .with_parents(["text_draft-1", "sub_cropped_image-1"]);
        assert_eq!(node.container().map(NodeId::as_str), Some("sub_cropped_image-1"));
        assert_eq!(node.lineage_parents(), &[NodeId::from("text_draft-1")]);
        assert!(node.has_parent("text_draft-1"));
        assert!(!node.has_parent("root"));
    }

    #[test]
    fn root_has_no_lineage() {
        let node = AnnotationNode::new("root", NodeKind::Image, "page.jpg");
        assert!(node.is_root());
        assert!(node.container().is_none());
        assert!(node.lineage_parents().is_empty());
    }

    #[test]
    fn collection_kinds() {
        assert_eq!(Collection::RootImageLabel.kind(), NodeKind::Image);
        assert!(Collection::SubCroppedImage.kind().is_crop());
        assert!(Collection::TextDraft.kind().is_text_like());
        assert_eq!(Collection::from_key("text"), Some(Collection::Text));
        assert_eq!(Collection::from_key("collectra_results_metadata"), None);
    }

    #[test]
    fn collection_index_matches_order() {
        for (i, c) in Collection::ALL.into_iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }

    #[test]
    fn orientation_serde_lowercase() {
        let o: Orientation = serde_yaml::from_str("west").unwrap();
        assert_eq!(o, Orientation::West);
        assert_eq!(serde_yaml::to_string(&Orientation::East).unwrap().trim(), "east");
    }
}
