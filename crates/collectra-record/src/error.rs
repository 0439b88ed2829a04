//! Error types for the record layer
//!
//! - [`StorageError`]: reading/writing/scanning record files
//! - [`RecordError`]: in-memory record edits

use crate::node::NodeId;
use std::path::PathBuf;

/// Errors from the storage collaborator
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error on a record file or folder
    #[error("io error on {path}: {source}")]
    Io {
        /// File or folder being accessed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Record text is not valid YAML for the record format
    #[error("failed to parse record: {message}")]
    Parse {
        /// Parser message
        message: String,
    },

    /// Record could not be serialized
    #[error("failed to serialize record: {message}")]
    Serialize {
        /// Serializer message
        message: String,
    },

    /// A record folder lacks one of its files
    #[error("no {what} file found in {folder}")]
    MissingFile {
        /// Record folder that was scanned
        folder: PathBuf,
        /// Kind of file missing (`record` or `image`)
        what: &'static str,
    },
}

impl StorageError {
    /// Wrap an IO error with the path it occurred on
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from the filesystem rather than the content
    #[inline]
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::MissingFile { .. })
    }
}

/// Errors from editing a record in memory
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// No node has this id
    #[error("node '{0}' not found")]
    NodeNotFound(NodeId),

    /// Id already used by another node
    #[error("node id '{0}' already exists")]
    DuplicateId(NodeId),
}
