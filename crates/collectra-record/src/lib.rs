//! Collectra Record
//!
//! In-memory model of a folder-based annotation record and its YAML form.
//!
//! # Overview
//!
//! - **AnnotationNode**: image, crop, text draft or text, with ordered parents
//! - **Record**: the five node collections, sequences only
//! - **normalize / denormalize**: erase and restore the stored
//!   single-vs-many ambiguity
//! - **RecordStore**: load/save seam, with a YAML file implementation
//!
//! # Example
//!
//! ```rust
//! use collectra_record::{parse_record, render_record, Collection};
//!
//! let text = "root_image_label:\n  id: root\n  data: page.jpg\n";
//! let record = parse_record(text).unwrap();
//! assert_eq!(record.collection(Collection::RootImageLabel).len(), 1);
//! assert_eq!(render_record(&record).unwrap(), text);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod node;
pub mod normalize;
pub mod raw;
pub mod record;
pub mod store;

// Re-exports
pub use error::{RecordError, StorageError};
pub use node::{AnnotationNode, Collection, NodeId, NodeKind, Orientation};
pub use normalize::{denormalize, denormalize_parents, normalize, normalize_parents};
pub use raw::{OneOrMany, RawNode, RawRecord, ResultsMetadata};
pub use record::Record;
pub use store::{
    parse_record, render_record, scan_parent, FolderScanOptions, RecordFolder, RecordStore,
    YamlFileStore,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for record operations
    pub use crate::{
        AnnotationNode, Collection, NodeId, NodeKind, Record, RecordError, RecordStore,
        StorageError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
