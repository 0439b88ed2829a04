//! Error types for coordinate conversion
//!
//! Both errors are local to a single conversion: callers converting many
//! regions skip the failing one and keep going.

use crate::convert::GeometryField;

/// Stored geometry that cannot be converted
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Component outside `[0, 1]` or not a finite number
    #[error("invalid geometry: {field} = {value} is outside [0, 1]")]
    InvalidGeometry {
        /// Offending component
        field: GeometryField,
        /// Value found in the record
        value: f64,
    },
}

impl GeometryError {
    /// Field that failed validation
    #[inline]
    #[must_use]
    pub fn field(&self) -> GeometryField {
        match self {
            Self::InvalidGeometry { field, .. } => *field,
        }
    }
}

/// Editing-surface selector that is not of the form `xywh=percent:<x>,<y>,<w>,<h>`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed fragment selector: '{selector}'")]
pub struct SelectorFormatError {
    /// Selector value as received
    pub selector: String,
}

impl SelectorFormatError {
    /// Create error for a rejected selector value
    #[inline]
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_geometry_names_field() {
        let err = GeometryError::InvalidGeometry {
            field: GeometryField::WidthRelative,
            value: 1.5,
        };
        assert_eq!(err.field(), GeometryField::WidthRelative);
        assert!(err.to_string().contains("width_relative"));
    }

    #[test]
    fn selector_error_quotes_input() {
        let err = SelectorFormatError::new("xywh=pixel:1,2,3,4");
        assert!(err.to_string().contains("xywh=pixel:1,2,3,4"));
    }
}
