//! Cascade delete
//!
//! Removing a node removes every node that lists it, or any other removed
//! node, as a parent. Container and lineage-only parent references are
//! treated the same.

use collectra_record::{NodeId, Record};
use indexmap::IndexSet;

/// Ids that [`cascade_delete`] would remove, in removal order
///
/// Empty when `id` is not in the record. Each pass adds at least one node
/// or stops, so the loop runs at most once per node even with parent
/// cycles.
#[must_use]
pub fn cascade_removal_set(record: &Record, id: &str) -> IndexSet<NodeId> {
    let mut removed: IndexSet<NodeId> = IndexSet::new();
    let Some((_, start)) = record.find(id) else {
        return removed;
    };
    removed.insert(start.id.clone());

    for _ in 0..record.len() {
        let before = removed.len();
        for (_, node) in record.nodes() {
            if removed.contains(&node.id) {
                continue;
            }
            if node.parents.iter().any(|p| removed.contains(p)) {
                removed.insert(node.id.clone());
            }
        }
        if removed.len() == before {
            break;
        }
    }

    removed
}

/// Copy of `record` without `id` and everything that depends on it
///
/// Deleting an absent id returns an equal record.
#[must_use]
pub fn cascade_delete(record: &Record, id: &str) -> Record {
    let removed = cascade_removal_set(record, id);
    let mut next = record.clone();
    if removed.is_empty() {
        return next;
    }

    tracing::debug!("Cascade delete of {} removes {} nodes", id, removed.len());
    next.retain(|node| !removed.contains(&node.id));
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use collectra_test_utils::{cascade_record, cyclic_record, node_ids, sample_record};

    #[test]
    fn removes_whole_subtree() {
        let record = cascade_record();
        let removed = cascade_removal_set(&record, "cropped_image_inside_root_image-1");
        assert_eq!(removed.len(), 7);

        let next = cascade_delete(&record, "cropped_image_inside_root_image-1");
        assert_eq!(
            node_ids(&next),
            ["root_image_label-1", "cropped_image_inside_root_image-2", "text_draft-3", "text_3"]
        );
    }

    #[test]
    fn lineage_only_parent_triggers_removal() {
        // text_1 lists text_draft-1 first, sub_cropped_image-1 last
        let next = cascade_delete(&cascade_record(), "text_draft-1");
        assert!(!next.contains("text_draft-1"));
        assert!(!next.contains("text_1"));
        assert!(next.contains("sub_cropped_image-1"));
    }

    #[test]
    fn absent_id_is_noop() {
        let record = sample_record();
        assert!(cascade_removal_set(&record, "ghost").is_empty());
        assert_eq!(cascade_delete(&record, "ghost"), record);
    }

    #[test]
    fn leaf_removes_only_itself() {
        let next = cascade_delete(&sample_record(), "text_001");
        assert_eq!(node_ids(&next), ["img_001", "crop_001"]);
    }

    #[test]
    fn cycle_terminates() {
        let record = cyclic_record();
        let removed = cascade_removal_set(&record, "A");
        assert_eq!(removed.len(), 2);
        assert_eq!(node_ids(&cascade_delete(&record, "A")), ["root"]);
    }
}
