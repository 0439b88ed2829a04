//! Normalized record
//!
//! Every collection is a sequence here, possibly empty. The bare/sequence
//! choice only comes back at serialization.

use crate::error::RecordError;
use crate::node::{AnnotationNode, Collection, NodeId};
use crate::raw::ResultsMetadata;
use serde_yaml::Mapping;

/// In-memory annotation record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// `collectra_results_metadata`, if present
    pub metadata: Option<ResultsMetadata>,
    pub(crate) collections: [Vec<AnnotationNode>; 5],
    /// Top-level keys the core does not interpret
    pub extra: Mapping,
}

impl Record {
    /// Empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes of one collection, in stored order
    #[inline]
    #[must_use]
    pub fn collection(&self, collection: Collection) -> &[AnnotationNode] {
        &self.collections[collection.index()]
    }

    /// Every node with its collection, in record order
    pub fn nodes(&self) -> impl Iterator<Item = (Collection, &AnnotationNode)> + '_ {
        Collection::ALL
            .into_iter()
            .flat_map(move |c| self.collection(c).iter().map(move |n| (c, n)))
    }

    /// Number of nodes over all collections
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.iter().map(Vec::len).sum()
    }

    /// Whether the record holds no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.iter().all(Vec::is_empty)
    }

    /// Whether a node with `id` exists
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Look up a node and its collection
    #[must_use]
    pub fn find(&self, id: &str) -> Option<(Collection, &AnnotationNode)> {
        self.nodes().find(|(_, n)| n.id == id)
    }

    /// Mutable node lookup
    pub fn find_mut(&mut self, id: &str) -> Option<&mut AnnotationNode> {
        self.collections
            .iter_mut()
            .flat_map(|nodes| nodes.iter_mut())
            .find(|n| n.id == id)
    }

    /// The root image node (first node of `root_image_label`)
    #[must_use]
    pub fn root_image(&self) -> Option<&AnnotationNode> {
        self.collection(Collection::RootImageLabel).first()
    }

    /// Append a node to a collection
    ///
    /// The node's kind is set from the collection.
    ///
    /// # Errors
    /// Returns [`RecordError::DuplicateId`] if the id is already used.
    pub fn insert(
        &mut self,
        collection: Collection,
        mut node: AnnotationNode,
    ) -> Result<&AnnotationNode, RecordError> {
        if self.contains(node.id.as_str()) {
            return Err(RecordError::DuplicateId(node.id));
        }
        node.kind = collection.kind();
        let nodes = &mut self.collections[collection.index()];
        nodes.push(node);
        Ok(&nodes[nodes.len() - 1])
    }

    /// Update a node in place
    ///
    /// # Errors
    /// Returns [`RecordError::NodeNotFound`] if no node has `id`.
    pub fn update<F>(&mut self, id: &str, f: F) -> Result<(), RecordError>
    where
        F: FnOnce(&mut AnnotationNode),
    {
        let node = self
            .find_mut(id)
            .ok_or_else(|| RecordError::NodeNotFound(NodeId::from(id)))?;
        f(node);
        Ok(())
    }

    /// Keep only nodes matching `keep`
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&AnnotationNode) -> bool,
    {
        for nodes in &mut self.collections {
            nodes.retain(|n| keep(n));
        }
    }

    pub(crate) fn collection_mut(&mut self, collection: Collection) -> &mut Vec<AnnotationNode> {
        &mut self.collections[collection.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn sample() -> Record {
        let mut record = Record::new();
        record
            .insert(
                Collection::RootImageLabel,
                AnnotationNode::new("root", NodeKind::Image, "page.jpg"),
            )
            .unwrap();
        record
            .insert(
                Collection::CroppedImageInsideRootImage,
                AnnotationNode::new("crop", NodeKind::Image, "page.jpg").with_parents(["root"]),
            )
            .unwrap();
        record
    }

    #[test]
    fn insert_sets_kind_from_collection() {
        let record = sample();
        let (collection, crop) = record.find("crop").unwrap();
        assert_eq!(collection, Collection::CroppedImageInsideRootImage);
        assert_eq!(crop.kind, NodeKind::ImageCrop);
    }

    #[test]
    fn insert_rejects_duplicate() {
        let mut record = sample();
        let err = record
            .insert(Collection::Text, AnnotationNode::new("crop", NodeKind::Text, "x"))
            .unwrap_err();
        assert_eq!(err, RecordError::DuplicateId(NodeId::from("crop")));
    }

    #[test]
    fn update_missing_node() {
        let mut record = sample();
        assert!(record.update("nope", |n| n.set_data("x")).is_err());
        record.update("crop", |n| n.set_data("other.jpg")).unwrap();
        assert_eq!(record.find("crop").unwrap().1.data, "other.jpg");
    }

    #[test]
    fn nodes_iterate_in_collection_order() {
        let record = sample();
        let ids: Vec<_> = record.nodes().map(|(_, n)| n.id.as_str()).collect();
        assert_eq!(ids, ["root", "crop"]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.root_image().map(|n| n.id.as_str()), Some("root"));
    }

    #[test]
    fn retain_filters_all_collections() {
        let mut record = sample();
        record.retain(|n| n.id != "crop");
        assert_eq!(record.len(), 1);
        assert!(record.collection(Collection::CroppedImageInsideRootImage).is_empty());
    }
}
