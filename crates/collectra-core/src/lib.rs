//! Collectra Core
//!
//! Session layer over an annotation record: it ties the record, the
//! lineage index, the selection synchronizer and the editing-surface
//! conversion together.
//!
//! # Overview
//!
//! - **AnnotationSession**: owns the record and sequences
//!   mutate, rebuild index, notify
//! - **SelectionSync**: mutually exclusive region / text-row selection
//!   with listener fan-out
//! - **SessionConfig**: TOML configuration
//!
//! # Example
//!
//! ```rust
//! use collectra_core::{AnnotationSession, SessionConfig};
//! use collectra_geometry::Geometry;
//! use collectra_record::parse_record;
//!
//! let record = parse_record("root_image_label:\n  id: root\n  data: page.jpg\n").unwrap();
//! let mut session = AnnotationSession::new(record, SessionConfig::default());
//!
//! let id = session
//!     .create_region(None, Some("header"), Geometry::new(0.5, 0.1, 0.8, 0.1))
//!     .unwrap();
//! assert_eq!(id.as_str(), "header");
//! assert_eq!(session.surface_annotations().len(), 1);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod selection;
pub mod session;

// Re-exports
pub use config::SessionConfig;
pub use error::{SelectionError, SessionError, SessionResult};
pub use selection::{
    ListenerHandle, SelectionEvent, SelectionListener, SelectionState, SelectionSync,
};
pub use session::{AnnotationSession, SurfaceChange, SurfaceEvent, TableRow};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for session use
    pub use crate::{AnnotationSession, SessionConfig, SessionError, SessionResult, SurfaceEvent};
    pub use collectra_lineage::prelude::*;
    pub use collectra_record::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
