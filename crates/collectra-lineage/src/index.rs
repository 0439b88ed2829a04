//! Lineage index
//!
//! Provides [`LineageIndex`], the parent/child lookup maps derived from a
//! [`Record`]. The index is never patched: it is rebuilt from the record
//! after every mutation, so both maps always describe the same edges.

use collectra_record::{NodeId, NodeKind, Record};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::{self, Display, Formatter};

/// Relationship index over one record
///
/// Queries are total: an id the index does not know has no parents, no
/// children and no kind.
#[derive(Debug, Clone, Default)]
pub struct LineageIndex {
    /// child -> ordered parents (container last)
    parent_of: HashMap<NodeId, Vec<NodeId>>,

    /// parent -> children, in record order
    children_of: HashMap<NodeId, IndexSet<NodeId>>,

    /// node -> kind, in record order
    kinds: IndexMap<NodeId, NodeKind>,

    edge_count: usize,
}

impl LineageIndex {
    /// Build the index in one pass over every node of `record`
    #[must_use]
    pub fn build(record: &Record) -> Self {
        let mut index = Self::default();

        for (collection, node) in record.nodes() {
            // first occurrence wins; a repeat contributes no edges
            if index.kinds.contains_key(&node.id) {
                tracing::warn!("Duplicate node id {} in {}, ignored", node.id, collection);
                continue;
            }
            index.kinds.insert(node.id.clone(), collection.kind());
            index.children_of.entry(node.id.clone()).or_default();

            for parent in &node.parents {
                if index
                    .children_of
                    .entry(parent.clone())
                    .or_default()
                    .insert(node.id.clone())
                {
                    index.edge_count += 1;
                }
            }
            index.parent_of.insert(node.id.clone(), node.parents.clone());
        }

        tracing::debug!(
            "Built lineage index: {} nodes, {} edges",
            index.kinds.len(),
            index.edge_count
        );
        index
    }

    /// Number of indexed nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.kinds.len()
    }

    /// Number of distinct parent -> child edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether `id` is a node of the record
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.kinds.contains_key(id)
    }

    /// Kind of `id`, if known
    #[inline]
    #[must_use]
    pub fn kind(&self, id: &str) -> Option<NodeKind> {
        self.kinds.get(id).copied()
    }

    /// Every node id in record order
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.kinds.keys()
    }

    /// Node ids of one kind, in record order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &NodeId> + '_ {
        self.kinds
            .iter()
            .filter(move |(_, k)| **k == kind)
            .map(|(id, _)| id)
    }

    /// Immediate parents of `id`, container last
    #[must_use]
    pub fn parents(&self, id: &str) -> &[NodeId] {
        self.parent_of.get(id).map_or(&[], Vec::as_slice)
    }

    /// Immediate children of `id`
    pub fn children(&self, id: &str) -> impl Iterator<Item = &NodeId> + '_ {
        self.children_of.get(id).into_iter().flatten()
    }

    /// Immediate children of `id` whose kind satisfies `filter`
    pub fn children_of_kind<'a, F>(
        &'a self,
        id: &str,
        filter: F,
    ) -> impl Iterator<Item = &'a NodeId> + 'a
    where
        F: Fn(NodeKind) -> bool + 'a,
    {
        self.children(id)
            .filter(move |child| self.kind(child.as_str()).is_some_and(&filter))
    }

    /// Every node reachable through child edges, excluding `id` itself
    ///
    /// Breadth-first. A node already visited is not expanded again, so a
    /// parent cycle ends the walk instead of looping.
    #[must_use]
    pub fn descendants(&self, id: &str) -> Vec<NodeId> {
        self.walk(id, |current| self.children(current).collect())
    }

    /// Every node reachable through parent edges, excluding `id` itself
    ///
    /// Same cycle guard as [`Self::descendants`].
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        self.walk(id, |current| self.parents(current).iter().collect())
    }

    fn walk<'a, F>(&'a self, start: &'a str, next: F) -> Vec<NodeId>
    where
        F: Fn(&str) -> Vec<&'a NodeId>,
    {
        let mut visited: HashSet<&str> = HashSet::from([start]);
        let mut queue: VecDeque<&str> = VecDeque::from([start]);
        let mut found = Vec::new();

        while let Some(current) = queue.pop_front() {
            for neighbour in next(current) {
                if visited.insert(neighbour.as_str()) {
                    found.push(neighbour.clone());
                    queue.push_back(neighbour.as_str());
                }
            }
        }

        found
    }

    /// Text and text-draft nodes that list `box_id` among their parents
    pub fn linked_text_entries(&self, box_id: &str) -> Vec<&NodeId> {
        self.children_of_kind(box_id, NodeKind::is_text_like).collect()
    }

    /// Crop nodes listed among the parents of `text_id`
    pub fn linked_bounding_boxes(&self, text_id: &str) -> Vec<&NodeId> {
        self.parents(text_id)
            .iter()
            .filter(|p| self.kind(p.as_str()).is_some_and(NodeKind::is_crop))
            .collect()
    }

    /// Printable parent -> children / child -> parents listing
    #[inline]
    #[must_use]
    pub fn report(&self) -> LineageReport<'_> {
        LineageReport { index: self }
    }
}

/// Text listing of an index, see [`LineageIndex::report`]
#[derive(Debug, Clone, Copy)]
pub struct LineageReport<'a> {
    index: &'a LineageIndex,
}

impl Display for LineageReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let index = self.index;
        let kind = |id: &str| index.kind(id).map_or("unknown", NodeKind::as_str);

        let mut parents: Vec<_> = index
            .children_of
            .iter()
            .filter(|(_, children)| !children.is_empty())
            .collect();
        parents.sort_by(|a, b| a.0.cmp(b.0));

        writeln!(f, "Parent -> Children:")?;
        for (parent, children) in parents {
            writeln!(f, "  {} ({})", parent, kind(parent.as_str()))?;
            for child in children {
                writeln!(f, "    -> {} ({})", child, kind(child.as_str()))?;
            }
        }

        let mut ids: Vec<_> = index.node_ids().collect();
        ids.sort();

        writeln!(f, "Child -> Parents:")?;
        for id in ids {
            let parents = index.parents(id.as_str());
            if parents.is_empty() {
                continue;
            }
            writeln!(f, "  {} ({})", id, kind(id.as_str()))?;
            for parent in parents {
                writeln!(f, "    <- {} ({})", parent, kind(parent.as_str()))?;
            }
        }
        Ok(())
    }
}
