//! Selection synchronizer
//!
//! Keeps the selected region and the selected text row mutually exclusive
//! and tells listeners which counterpart nodes to highlight. Single
//! threaded: the synchronizer uses interior mutability so that listeners
//! sharing it (through `Rc`) can be detected when they try to change the
//! selection from inside a notification.

use crate::error::SelectionError;
use collectra_lineage::LineageIndex;
use collectra_record::NodeId;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;

/// Current selection; exactly one variant holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SelectionState {
    /// Nothing selected
    #[default]
    None,
    /// A region on the editing surface
    Region(NodeId),
    /// A text row of the table
    TextRow(NodeId),
}

impl SelectionState {
    /// Selected node id, if any
    #[must_use]
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::None => None,
            Self::Region(id) | Self::TextRow(id) => Some(id),
        }
    }
}

/// Notification sent after every selection change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEvent {
    /// Selection after the change
    pub state: SelectionState,
    /// Counterpart nodes to highlight: text entries for a region, regions
    /// for a text row, nothing after a clear
    pub highlighted: Vec<NodeId>,
}

/// Receiver of selection events
pub trait SelectionListener {
    /// Called once per selection change
    fn on_selection(&mut self, event: &SelectionEvent);
}

impl<F> SelectionListener for F
where
    F: FnMut(&SelectionEvent),
{
    fn on_selection(&mut self, event: &SelectionEvent) {
        self(event);
    }
}

/// Token returned by [`SelectionSync::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type Listeners = Vec<(ListenerHandle, Box<dyn SelectionListener>)>;

/// Selection state machine with listener fan-out
#[derive(Default)]
pub struct SelectionSync {
    state: RefCell<SelectionState>,
    listeners: RefCell<Listeners>,
    registered: RefCell<HashSet<ListenerHandle>>,
    next_handle: Cell<u64>,
    notifying: Cell<bool>,
}

impl SelectionSync {
    /// Empty synchronizer with nothing selected
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current selection
    #[must_use]
    pub fn state(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    /// Select a region and highlight its linked text entries
    ///
    /// # Errors
    /// Returns [`SelectionError::Reentrant`] when called from a listener.
    pub fn select_region(
        &self,
        index: &LineageIndex,
        id: &str,
    ) -> Result<SelectionEvent, SelectionError> {
        let highlighted = index.linked_text_entries(id).into_iter().cloned().collect();
        self.transition(SelectionState::Region(NodeId::from(id)), highlighted)
    }

    /// Select a text row and highlight its linked regions
    ///
    /// # Errors
    /// Returns [`SelectionError::Reentrant`] when called from a listener.
    pub fn select_text_row(
        &self,
        index: &LineageIndex,
        id: &str,
    ) -> Result<SelectionEvent, SelectionError> {
        let highlighted = index.linked_bounding_boxes(id).into_iter().cloned().collect();
        self.transition(SelectionState::TextRow(NodeId::from(id)), highlighted)
    }

    /// Drop any selection
    ///
    /// # Errors
    /// Returns [`SelectionError::Reentrant`] when called from a listener.
    pub fn clear(&self) -> Result<SelectionEvent, SelectionError> {
        self.transition(SelectionState::None, Vec::new())
    }

    /// Register a listener
    pub fn subscribe<L>(&self, listener: L) -> ListenerHandle
    where
        L: SelectionListener + 'static,
    {
        let handle = ListenerHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.registered.borrow_mut().insert(handle);
        self.listeners.borrow_mut().push((handle, Box::new(listener)));
        handle
    }

    /// Remove a listener; returns whether it was registered
    ///
    /// Safe to call from inside a notification: the listener is dropped
    /// once the notification round ends and receives no further events.
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        if !self.registered.borrow_mut().remove(&handle) {
            return false;
        }
        if !self.notifying.get() {
            self.listeners.borrow_mut().retain(|(h, _)| *h != handle);
        }
        true
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.registered.borrow().len()
    }

    /// Whether a listener is currently being notified
    #[inline]
    #[must_use]
    pub fn is_notifying(&self) -> bool {
        self.notifying.get()
    }

    fn transition(
        &self,
        state: SelectionState,
        highlighted: Vec<NodeId>,
    ) -> Result<SelectionEvent, SelectionError> {
        if self.notifying.get() {
            tracing::warn!("Rejected selection change to {:?} from inside a listener", state);
            return Err(SelectionError::Reentrant);
        }

        self.state.replace(state.clone());
        let event = SelectionEvent { state, highlighted };
        tracing::debug!("Selection now {:?}, {} highlighted", event.state, event.highlighted.len());
        self.notify(&event);
        Ok(event)
    }

    fn notify(&self, event: &SelectionEvent) {
        self.notifying.set(true);
        // Listeners may subscribe while being called, so the list is taken
        // out of the cell for the round.
        let mut current = std::mem::take(&mut *self.listeners.borrow_mut());
        for (handle, listener) in &mut current {
            if self.registered.borrow().contains(handle) {
                listener.on_selection(event);
            }
        }
        self.notifying.set(false);

        let registered = self.registered.borrow();
        let mut listeners = self.listeners.borrow_mut();
        let added = std::mem::take(&mut *listeners);
        current.retain(|(h, _)| registered.contains(h));
        current.extend(added.into_iter().filter(|(h, _)| registered.contains(h)));
        *listeners = current;
    }
}

impl fmt::Debug for SelectionSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionSync")
            .field("state", &*self.state.borrow())
            .field("listeners", &self.listener_count())
            .field("notifying", &self.notifying.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collectra_test_utils::{cascade_record, sample_record};
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<SelectionEvent>>>, impl FnMut(&SelectionEvent)) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        (events, move |e: &SelectionEvent| sink.borrow_mut().push(e.clone()))
    }

    #[test]
    fn region_and_text_row_are_exclusive() {
        let index = LineageIndex::build(&sample_record());
        let sync = SelectionSync::new();

        sync.select_region(&index, "crop_001").unwrap();
        assert_eq!(sync.state(), SelectionState::Region(NodeId::from("crop_001")));

        sync.select_text_row(&index, "text_001").unwrap();
        assert_eq!(sync.state(), SelectionState::TextRow(NodeId::from("text_001")));

        sync.clear().unwrap();
        assert_eq!(sync.state(), SelectionState::None);
    }

    #[test]
    fn highlights_counterparts() {
        let index = LineageIndex::build(&cascade_record());
        let sync = SelectionSync::new();

        let event = sync.select_region(&index, "sub_cropped_image-1").unwrap();
        assert_eq!(event.highlighted, [NodeId::from("text_draft-1"), NodeId::from("text_1")]);

        let event = sync.select_text_row(&index, "text_1").unwrap();
        assert_eq!(event.highlighted, [NodeId::from("sub_cropped_image-1")]);

        assert!(sync.clear().unwrap().highlighted.is_empty());
    }

    #[test]
    fn listeners_receive_events_until_unsubscribed() {
        let index = LineageIndex::build(&sample_record());
        let sync = SelectionSync::new();
        let (events, listener) = recorder();
        let handle = sync.subscribe(listener);

        sync.select_region(&index, "crop_001").unwrap();
        assert!(sync.unsubscribe(handle));
        assert!(!sync.unsubscribe(handle));
        sync.clear().unwrap();

        assert_eq!(events.borrow().len(), 1);
        assert_eq!(sync.listener_count(), 0);
    }

    #[test]
    fn reentrant_selection_is_rejected() {
        let index = Rc::new(LineageIndex::build(&sample_record()));
        let sync = Rc::new(SelectionSync::new());
        let outcome = Rc::new(RefCell::new(None));

        let inner_sync = Rc::clone(&sync);
        let inner_index = Rc::clone(&index);
        let inner_outcome = Rc::clone(&outcome);
        sync.subscribe(move |_: &SelectionEvent| {
            let nested = inner_sync.select_text_row(&inner_index, "text_001");
            *inner_outcome.borrow_mut() = Some(nested);
        });

        sync.select_region(&index, "crop_001").unwrap();
        assert_eq!(*outcome.borrow(), Some(Err(SelectionError::Reentrant)));
        assert_eq!(sync.state(), SelectionState::Region(NodeId::from("crop_001")));
        assert!(!sync.is_notifying());
    }

    #[test]
    fn unsubscribe_from_inside_listener() {
        let index = LineageIndex::build(&sample_record());
        let sync = Rc::new(SelectionSync::new());
        let calls = Rc::new(Cell::new(0));

        let handle_slot: Rc<Cell<Option<ListenerHandle>>> = Rc::new(Cell::new(None));
        let inner_sync = Rc::clone(&sync);
        let inner_slot = Rc::clone(&handle_slot);
        let inner_calls = Rc::clone(&calls);
        let handle = sync.subscribe(move |_: &SelectionEvent| {
            inner_calls.set(inner_calls.get() + 1);
            if let Some(h) = inner_slot.get() {
                inner_sync.unsubscribe(h);
            }
        });
        handle_slot.set(Some(handle));

        sync.select_region(&index, "crop_001").unwrap();
        sync.clear().unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(sync.listener_count(), 0);
    }

    #[test]
    fn subscribe_from_inside_listener_takes_effect_next_round() {
        let index = LineageIndex::build(&sample_record());
        let sync = Rc::new(SelectionSync::new());
        let late_calls = Rc::new(Cell::new(0));

        let (inner_sync, inner_calls) = (Rc::clone(&sync), Rc::clone(&late_calls));
        let once = Cell::new(false);
        sync.subscribe(move |_: &SelectionEvent| {
            if !once.replace(true) {
                let calls = Rc::clone(&inner_calls);
                inner_sync.subscribe(move |_: &SelectionEvent| calls.set(calls.get() + 1));
            }
        });

        sync.select_region(&index, "crop_001").unwrap();
        assert_eq!(late_calls.get(), 0);
        sync.clear().unwrap();
        assert_eq!(late_calls.get(), 1);
        assert_eq!(sync.listener_count(), 2);
    }
}
