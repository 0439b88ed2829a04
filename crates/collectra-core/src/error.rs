//! Error types for Collectra Core
//!
//! Every session error is local to the call that raised it; the session
//! state is left as it was before the failing call.

use collectra_geometry::{GeometryError, SelectorFormatError};
use collectra_record::{NodeId, RecordError, StorageError};
use std::path::PathBuf;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Geometry out of range
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// Editing-surface selector could not be parsed
    #[error("selector error: {0}")]
    Selector(#[from] SelectorFormatError),

    /// Record mutation rejected
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Load or save failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Selection change rejected
    #[error("selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Text edit on a node that does not carry text
    #[error("node '{0}' is not a text node")]
    NotTextNode(NodeId),

    /// Region edit on a node that is not a crop
    #[error("node '{0}' is not a region node")]
    NotRegionNode(NodeId),

    /// Record has no root image to attach a region to
    #[error("record has no root image")]
    NoRootImage,

    /// Configuration could not be read
    #[error("configuration error in {path}: {message}")]
    Config {
        /// Configuration file
        path: PathBuf,
        /// Reader or parser message
        message: String,
    },
}

impl SessionError {
    /// Whether the caller can continue with the same session
    ///
    /// Only configuration and storage IO problems point at the environment;
    /// everything else concerns a single call.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Config { .. } => false,
            Self::Storage(e) => !e.is_io(),
            _ => true,
        }
    }
}

/// Selection synchronizer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// A listener tried to change the selection while being notified
    #[error("selection changed from inside a selection listener")]
    Reentrant,
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
