//! Annotation session
//!
//! [`AnnotationSession`] owns the record, its lineage index and the
//! selection state. Every mutation runs in the same order: change the
//! record, rebuild the index, then notify selection listeners. The index
//! is never stale when a query or a notification sees it.

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::selection::{
    ListenerHandle, SelectionEvent, SelectionListener, SelectionState, SelectionSync,
};
use collectra_geometry::{to_editing_surface, to_storage, Geometry, SurfaceAnnotation};
use collectra_lineage::{
    cascade_delete, cascade_removal_set, resolve_display, DisplayReason, DisplayValue, LineageIndex,
    LineageReport,
};
use collectra_record::{
    AnnotationNode, Collection, NodeId, NodeKind, Orientation, Record, RecordError, RecordStore,
};
use serde::{Deserialize, Serialize};

/// One table row per node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// Node id
    pub id: NodeId,
    /// Collection key the node is stored under
    pub collection: &'static str,
    /// Type name, e.g. `collectra.ImageCrop`
    pub kind: &'static str,
    /// Raw node data
    pub data: String,
    /// Text shown in the display column
    pub display: String,
    /// Node whose data fills the display column
    pub display_source: Option<NodeId>,
    /// Display rule that applied
    pub reason: DisplayReason,
    /// Whether the display column may be edited
    pub editable: bool,
    /// Ordered parents, container last
    pub parents: Vec<NodeId>,
    /// Immediate children
    pub children: Vec<NodeId>,
    /// Region, for image-like nodes
    pub geometry: Option<Geometry>,
}

/// Event emitted by the interactive editing surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurfaceEvent {
    /// A region was drawn
    Created {
        /// Surface annotation of the new region
        annotation: SurfaceAnnotation,
        /// Region to nest the new one under; the root image when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<NodeId>,
    },
    /// A region was moved or resized
    Updated {
        /// Surface annotation with the new region
        annotation: SurfaceAnnotation,
    },
    /// A region was removed
    Deleted {
        /// Surface annotation of the removed region
        annotation: SurfaceAnnotation,
    },
}

/// Effect of an applied [`SurfaceEvent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceChange {
    /// New crop node
    Created(NodeId),
    /// Geometry rewritten
    Updated(NodeId),
    /// Nodes removed by the cascade, in removal order
    Deleted(Vec<NodeId>),
}

/// Owned record, index, selection and configuration
#[derive(Debug)]
pub struct AnnotationSession {
    record: Record,
    index: LineageIndex,
    selection: SelectionSync,
    config: SessionConfig,
}

impl AnnotationSession {
    /// Start a session over `record`
    #[must_use]
    pub fn new(record: Record, config: SessionConfig) -> Self {
        let index = LineageIndex::build(&record);
        tracing::info!("Session opened: {} nodes", record.len());
        Self {
            record,
            index,
            selection: SelectionSync::new(),
            config,
        }
    }

    /// Start a session over the record in `store`
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the record cannot be loaded.
    pub fn load(store: &impl RecordStore, config: SessionConfig) -> SessionResult<Self> {
        Ok(Self::new(store.load()?, config))
    }

    /// Write the current record to `store`
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the record cannot be saved.
    pub fn save(&self, store: &impl RecordStore) -> SessionResult<()> {
        store.save(&self.record)?;
        tracing::info!("Session saved: {} nodes", self.record.len());
        Ok(())
    }

    /// Current record
    #[inline]
    #[must_use]
    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Index over the current record
    #[inline]
    #[must_use]
    pub fn index(&self) -> &LineageIndex {
        &self.index
    }

    /// Session configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Consume the session, returning its record
    #[must_use]
    pub fn into_record(self) -> Record {
        self.record
    }

    /// Parent/child listing of the current record
    #[must_use]
    pub fn report(&self) -> LineageReport<'_> {
        self.index.report()
    }

    // ---- queries ----

    /// Display value of `id`
    #[must_use]
    pub fn display(&self, id: &str) -> DisplayValue {
        resolve_display(&self.record, &self.index, id)
    }

    /// Table row of `id`, if the node exists
    #[must_use]
    pub fn row(&self, id: &str) -> Option<TableRow> {
        let (collection, node) = self.record.find(id)?;
        Some(self.build_row(collection, node))
    }

    /// Table rows for every node, in record order
    #[must_use]
    pub fn rows(&self) -> Vec<TableRow> {
        self.record
            .nodes()
            .map(|(collection, node)| self.build_row(collection, node))
            .collect()
    }

    fn build_row(&self, collection: Collection, node: &AnnotationNode) -> TableRow {
        let display = self.display(node.id.as_str());
        TableRow {
            id: node.id.clone(),
            collection: collection.key(),
            kind: node.kind.as_str(),
            data: node.data.clone(),
            display: display.value,
            display_source: display.source_id,
            reason: display.reason,
            editable: display.editable,
            parents: node.parents.clone(),
            children: self.index.children(node.id.as_str()).cloned().collect(),
            geometry: node.geometry,
        }
    }

    /// Editing-surface annotations for every crop with a region
    ///
    /// A crop whose stored geometry is out of range is logged and left out;
    /// the others are still converted.
    #[must_use]
    pub fn surface_annotations(&self) -> Vec<SurfaceAnnotation> {
        self.record
            .nodes()
            .filter(|(_, node)| node.kind.is_crop())
            .filter_map(|(_, node)| {
                let geometry = node.geometry?;
                match to_editing_surface(&geometry) {
                    Ok(region) => Some(SurfaceAnnotation::from_region(
                        node.id.as_str(),
                        node.data.clone(),
                        &region,
                    )),
                    Err(e) => {
                        tracing::warn!("Skipping region {}: {}", node.id, e);
                        None
                    }
                }
            })
            .collect()
    }

    // ---- mutations ----

    /// Apply an event from the editing surface
    ///
    /// # Errors
    /// Fails for malformed selectors, out-of-range regions, unknown or
    /// wrongly-typed nodes. The record is unchanged on error.
    pub fn apply_surface_event(&mut self, event: &SurfaceEvent) -> SessionResult<SurfaceChange> {
        match event {
            SurfaceEvent::Created { annotation, parent } => {
                let geometry = to_storage(&annotation.region()?);
                let requested = Some(annotation.node_id()).filter(|id| !id.is_empty());
                let parent = parent.as_ref().map(NodeId::as_str);
                let id = self.create_region(parent, requested, geometry)?;
                Ok(SurfaceChange::Created(id))
            }
            SurfaceEvent::Updated { annotation } => {
                let geometry = to_storage(&annotation.region()?);
                let id = annotation.node_id();
                self.set_geometry(id, geometry)?;
                Ok(SurfaceChange::Updated(NodeId::from(id)))
            }
            SurfaceEvent::Deleted { annotation } => {
                Ok(SurfaceChange::Deleted(self.delete(annotation.node_id())?))
            }
        }
    }

    /// Add a crop under `parent` (the root image when `None`)
    ///
    /// The crop goes to `sub_cropped_image` when nested in another crop and
    /// to `cropped_image_inside_root_image` otherwise. `requested_id` is
    /// used when free; otherwise an id is generated.
    ///
    /// # Errors
    /// Returns [`SessionError::NoRootImage`], [`RecordError::NodeNotFound`]
    /// for an unknown parent, [`SessionError::NotRegionNode`] for a text
    /// parent, or [`collectra_geometry::GeometryError`] for an out-of-range
    /// region.
    pub fn create_region(
        &mut self,
        parent: Option<&str>,
        requested_id: Option<&str>,
        geometry: Geometry,
    ) -> SessionResult<NodeId> {
        geometry.validate()?;
        let root = self.record.root_image().ok_or(SessionError::NoRootImage)?;
        let image = root.data.clone();
        let parent_id = match parent {
            Some(p) => NodeId::from(p),
            None => root.id.clone(),
        };

        let collection = match self.index.kind(parent_id.as_str()) {
            None => return Err(RecordError::NodeNotFound(parent_id).into()),
            Some(NodeKind::ImageCrop) => Collection::SubCroppedImage,
            Some(NodeKind::Image) => Collection::CroppedImageInsideRootImage,
            Some(NodeKind::Text | NodeKind::TextDraft) => {
                return Err(SessionError::NotRegionNode(parent_id));
            }
        };

        let id = match requested_id {
            Some(id) if !self.record.contains(id) => NodeId::from(id),
            _ => self.generate_id(collection),
        };

        let node = AnnotationNode::new(id.clone(), collection.kind(), image)
            .with_parents([parent_id.clone()])
            .with_geometry(geometry)
            .with_orientation(Orientation::North);
        self.record.insert(collection, node)?;
        tracing::info!("Created region {} under {}", id, parent_id);
        self.commit()?;
        Ok(id)
    }

    /// Replace the region of a crop
    ///
    /// # Errors
    /// Returns [`collectra_geometry::GeometryError`] for out-of-range
    /// values, [`RecordError::NodeNotFound`] or
    /// [`SessionError::NotRegionNode`].
    pub fn set_geometry(&mut self, id: &str, geometry: Geometry) -> SessionResult<()> {
        geometry.validate()?;
        self.require_kind(id, NodeKind::is_crop, SessionError::NotRegionNode)?;
        self.record.update(id, |node| node.set_geometry(geometry))?;
        tracing::info!("Updated region {}", id);
        self.commit()
    }

    /// Replace the content of a text or text-draft node
    ///
    /// # Errors
    /// Returns [`RecordError::NodeNotFound`] or [`SessionError::NotTextNode`].
    pub fn update_text(&mut self, id: &str, text: impl Into<String>) -> SessionResult<()> {
        self.require_kind(id, NodeKind::is_text_like, SessionError::NotTextNode)?;
        let text = text.into();
        self.record.update(id, |node| node.set_data(text))?;
        tracing::info!("Updated text {}", id);
        self.commit()
    }

    /// Edit the display column of a row
    ///
    /// A text row edits its own node. A crop row edits the deepest text it
    /// displays, and only when that display is editable. Returns the id of
    /// the node that changed.
    ///
    /// # Errors
    /// Returns [`SessionError::NotTextNode`] when the row has no editable
    /// text, or [`RecordError::NodeNotFound`].
    pub fn edit_row(&mut self, id: &str, text: impl Into<String>) -> SessionResult<NodeId> {
        let target = match self.index.kind(id) {
            None => return Err(RecordError::NodeNotFound(NodeId::from(id)).into()),
            Some(kind) if kind.is_text_like() => NodeId::from(id),
            Some(_) => {
                let display = self.display(id);
                match display.source_id {
                    Some(source) if display.editable => source,
                    _ => return Err(SessionError::NotTextNode(NodeId::from(id))),
                }
            }
        };
        self.update_text(target.as_str(), text)?;
        Ok(target)
    }

    /// Cascade-delete `id`, returning the removed ids
    ///
    /// Deleting an absent id removes nothing.
    ///
    /// # Errors
    /// Only fails if clearing a stale selection is rejected.
    pub fn delete(&mut self, id: &str) -> SessionResult<Vec<NodeId>> {
        let removed: Vec<NodeId> = cascade_removal_set(&self.record, id).into_iter().collect();
        if removed.is_empty() {
            return Ok(removed);
        }
        self.record = cascade_delete(&self.record, id);
        tracing::info!("Deleted {} and {} dependent nodes", id, removed.len() - 1);
        self.commit()?;
        Ok(removed)
    }

    fn require_kind(
        &self,
        id: &str,
        accept: fn(NodeKind) -> bool,
        reject: fn(NodeId) -> SessionError,
    ) -> SessionResult<()> {
        match self.index.kind(id) {
            None => Err(RecordError::NodeNotFound(NodeId::from(id)).into()),
            Some(kind) if accept(kind) => Ok(()),
            Some(_) => Err(reject(NodeId::from(id))),
        }
    }

    fn generate_id(&self, collection: Collection) -> NodeId {
        loop {
            let hex = uuid::Uuid::new_v4().simple().to_string();
            let suffix: String = hex.chars().take(self.config.id_suffix_len()).collect();
            let id = format!("{}-{}", collection.key(), suffix);
            if !self.record.contains(&id) {
                return NodeId::from(id);
            }
        }
    }

    /// Rebuild the index, then drop a selection whose node is gone
    fn commit(&mut self) -> SessionResult<()> {
        self.index = LineageIndex::build(&self.record);
        let stale = self
            .selection
            .state()
            .node_id()
            .is_some_and(|id| !self.record.contains(id.as_str()));
        if stale {
            self.selection.clear()?;
        }
        Ok(())
    }

    // ---- selection ----

    /// Select a crop region
    ///
    /// # Errors
    /// Returns [`RecordError::NodeNotFound`] or [`SessionError::NotRegionNode`].
    pub fn select_region(&self, id: &str) -> SessionResult<SelectionEvent> {
        self.require_kind(id, NodeKind::is_crop, SessionError::NotRegionNode)?;
        Ok(self.selection.select_region(&self.index, id)?)
    }

    /// Select a text row
    ///
    /// # Errors
    /// Returns [`RecordError::NodeNotFound`] or [`SessionError::NotTextNode`].
    pub fn select_text_row(&self, id: &str) -> SessionResult<SelectionEvent> {
        self.require_kind(id, NodeKind::is_text_like, SessionError::NotTextNode)?;
        Ok(self.selection.select_text_row(&self.index, id)?)
    }

    /// Drop the selection
    ///
    /// # Errors
    /// Returns [`SessionError::Selection`] when called from a listener.
    pub fn clear_selection(&self) -> SessionResult<SelectionEvent> {
        Ok(self.selection.clear()?)
    }

    /// Current selection
    #[must_use]
    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    /// Register a selection listener
    pub fn subscribe<L>(&self, listener: L) -> ListenerHandle
    where
        L: SelectionListener + 'static,
    {
        self.selection.subscribe(listener)
    }

    /// Remove a selection listener
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        self.selection.unsubscribe(handle)
    }
}
