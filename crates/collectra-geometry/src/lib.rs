//! Collectra Geometry
//!
//! Bidirectional conversion between the two region conventions used by the
//! annotation editor.
//!
//! # Overview
//!
//! - **Geometry**: stored convention, center point + size as fractions of
//!   the image dimensions, every component in `[0, 1]`
//! - **SurfaceBox**: editing-surface convention, top-left corner + size as
//!   percentages of the image dimensions, every component in `[0, 100]`
//! - **SurfaceAnnotation**: the annotation object exchanged with the
//!   editing surface, carrying a `xywh=percent:` fragment selector
//!
//! # Example
//!
//! ```rust
//! use collectra_geometry::{to_editing_surface, to_storage, Geometry};
//!
//! let stored = Geometry::new(0.5, 0.5, 0.4, 0.3);
//! let region = to_editing_surface(&stored).unwrap();
//! assert!((region.x - 30.0).abs() < 1e-9);
//! assert!((region.y - 35.0).abs() < 1e-9);
//!
//! let back = to_storage(&region);
//! assert!(back.approx_eq(&stored, 1e-9));
//! ```

#![warn(missing_docs)]

pub mod convert;
pub mod error;
pub mod selector;

// Re-exports
pub use convert::{to_editing_surface, to_storage, Geometry, GeometryField, SurfaceBox};
pub use error::{GeometryError, SelectorFormatError};
pub use selector::{
    regions_from_annotations, FragmentSelector, SurfaceAnnotation, SurfaceTarget,
    MEDIA_FRAGMENT_SPEC,
};

/// Tolerance used when comparing converted coordinates
pub const ROUND_TRIP_TOLERANCE: f64 = 1e-9;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
