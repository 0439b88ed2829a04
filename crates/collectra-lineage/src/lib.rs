//! Collectra Lineage
//!
//! Relationship queries over an annotation record.
//!
//! # Overview
//!
//! - **LineageIndex**: parent/child maps rebuilt from a record, with
//!   cycle-safe ancestor and descendant walks
//! - **resolve_display**: what text a crop row shows, and whether it is
//!   editable
//! - **cascade_delete**: remove a node and everything that references it
//!
//! Every query is total: unknown ids have no relationships and display
//! blank.
//!
//! # Example
//!
//! ```rust
//! use collectra_lineage::{cascade_delete, LineageIndex};
//! use collectra_record::parse_record;
//!
//! let record = parse_record(
//!     "root_image_label:\n  id: root\n  data: page.jpg\n\
//!      cropped_image_inside_root_image:\n  id: box\n  parents: root\n  data: page.jpg\n",
//! )
//! .unwrap();
//!
//! let index = LineageIndex::build(&record);
//! assert_eq!(index.descendants("root").len(), 1);
//! assert_eq!(cascade_delete(&record, "root").len(), 0);
//! ```

#![warn(missing_docs)]

pub mod cascade;
pub mod display;
pub mod index;

// Re-exports
pub use cascade::{cascade_delete, cascade_removal_set};
pub use display::{deepest_text, resolve_display, resolve_display_text, DisplayReason, DisplayValue};
pub use index::{LineageIndex, LineageReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for lineage queries
    pub use crate::{cascade_delete, resolve_display, DisplayValue, LineageIndex};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
