//! Stored geometry <-> editing-surface box
//!
//! The conversion is orientation-independent: rotation is applied by the
//! display after positioning and never enters the math here.

use crate::error::GeometryError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Region in the stored convention
///
/// Center point and size, as fractions of the image width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Horizontal center, fraction of image width
    pub x_center: f64,
    /// Vertical center, fraction of image height
    pub y_center: f64,
    /// Width, fraction of image width
    pub width_relative: f64,
    /// Height, fraction of image height
    pub height_relative: f64,
}

/// Component of a [`Geometry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryField {
    /// `x_center`
    XCenter,
    /// `y_center`
    YCenter,
    /// `width_relative`
    WidthRelative,
    /// `height_relative`
    HeightRelative,
}

impl GeometryField {
    /// All components in stored order
    pub const ALL: [GeometryField; 4] = [
        Self::XCenter,
        Self::YCenter,
        Self::WidthRelative,
        Self::HeightRelative,
    ];

    /// Key used for this component in the stored record
    #[inline]
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::XCenter => "x_center",
            Self::YCenter => "y_center",
            Self::WidthRelative => "width_relative",
            Self::HeightRelative => "height_relative",
        }
    }
}

impl Display for GeometryField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Geometry {
    /// Create geometry from its four components (not validated)
    #[inline]
    #[must_use]
    pub const fn new(
        x_center: f64,
        y_center: f64,
        width_relative: f64,
        height_relative: f64,
    ) -> Self {
        Self {
            x_center,
            y_center,
            width_relative,
            height_relative,
        }
    }

    /// Value of a single component
    #[inline]
    #[must_use]
    pub const fn get(&self, field: GeometryField) -> f64 {
        match field {
            GeometryField::XCenter => self.x_center,
            GeometryField::YCenter => self.y_center,
            GeometryField::WidthRelative => self.width_relative,
            GeometryField::HeightRelative => self.height_relative,
        }
    }

    /// Check every component is a finite number in `[0, 1]`
    ///
    /// # Errors
    /// Returns [`GeometryError::InvalidGeometry`] naming the first offending field.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for field in GeometryField::ALL {
            let value = self.get(field);
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(GeometryError::InvalidGeometry { field, value });
            }
        }
        Ok(())
    }

    /// Component-wise comparison within `tolerance`
    #[must_use]
    pub fn approx_eq(&self, other: &Geometry, tolerance: f64) -> bool {
        GeometryField::ALL
            .iter()
            .all(|&field| (self.get(field) - other.get(field)).abs() <= tolerance)
    }
}

/// Region in the editing-surface convention
///
/// Top-left corner and size, as percentages of the image width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceBox {
    /// Left edge, percent of image width
    pub x: f64,
    /// Top edge, percent of image height
    pub y: f64,
    /// Width, percent of image width
    pub w: f64,
    /// Height, percent of image height
    pub h: f64,
}

impl SurfaceBox {
    /// Create box from corner and size
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Component-wise comparison within `tolerance`
    #[must_use]
    pub fn approx_eq(&self, other: &SurfaceBox, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.w - other.w).abs() <= tolerance
            && (self.h - other.h).abs() <= tolerance
    }
}

/// Convert stored geometry to an editing-surface box
///
/// The result is clamped so the box stays inside the image: `x`/`y` into
/// `[0, 100]`, `w <= 100 - x`, `h <= 100 - y`. Overshoot from float
/// arithmetic is corrected silently.
///
/// # Errors
/// Returns [`GeometryError::InvalidGeometry`] if any component is outside `[0, 1]`.
pub fn to_editing_surface(geometry: &Geometry) -> Result<SurfaceBox, GeometryError> {
    geometry.validate()?;

    let x = ((geometry.x_center - geometry.width_relative / 2.0) * 100.0).clamp(0.0, 100.0);
    let y = ((geometry.y_center - geometry.height_relative / 2.0) * 100.0).clamp(0.0, 100.0);
    let w = (geometry.width_relative * 100.0).clamp(0.0, 100.0 - x);
    let h = (geometry.height_relative * 100.0).clamp(0.0, 100.0 - y);

    Ok(SurfaceBox { x, y, w, h })
}

/// Convert an editing-surface box back to stored geometry
///
/// Algebraic inverse of [`to_editing_surface`] for boxes that needed no clamping.
#[must_use]
pub fn to_storage(region: &SurfaceBox) -> Geometry {
    let width_relative = region.w / 100.0;
    let height_relative = region.h / 100.0;

    Geometry {
        x_center: region.x / 100.0 + width_relative / 2.0,
        y_center: region.y / 100.0 + height_relative / 2.0,
        width_relative,
        height_relative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ROUND_TRIP_TOLERANCE;

    #[test]
    fn converts_centered_region() {
        let region = to_editing_surface(&Geometry::new(0.5, 0.5, 0.4, 0.3)).unwrap();
        assert!(region.approx_eq(&SurfaceBox::new(30.0, 35.0, 40.0, 30.0), ROUND_TRIP_TOLERANCE));
    }

    #[test]
    fn rejects_out_of_range_component() {
        let err = to_editing_surface(&Geometry::new(0.5, 1.2, 0.1, 0.1)).unwrap_err();
        assert_eq!(
            err,
            GeometryError::InvalidGeometry {
                field: GeometryField::YCenter,
                value: 1.2
            }
        );
    }

    #[test]
    fn rejects_nan() {
        let err = to_editing_surface(&Geometry::new(0.5, 0.5, f64::NAN, 0.1)).unwrap_err();
        assert_eq!(err.field(), GeometryField::WidthRelative);
    }

    #[test]
    fn clamps_box_overhanging_right_edge() {
        // center 0.9, width 0.4 -> spans 70%..110%
        let region = to_editing_surface(&Geometry::new(0.9, 0.5, 0.4, 0.2)).unwrap();
        assert!((region.x - 70.0).abs() < ROUND_TRIP_TOLERANCE);
        assert!((region.w - 30.0).abs() < ROUND_TRIP_TOLERANCE);
    }

    #[test]
    fn clamps_box_overhanging_top_edge() {
        let region = to_editing_surface(&Geometry::new(0.5, 0.05, 0.2, 0.2)).unwrap();
        assert_eq!(region.y, 0.0);
        assert!((region.h - 20.0).abs() < ROUND_TRIP_TOLERANCE);
    }

    #[test]
    fn full_image_region() {
        let region = to_editing_surface(&Geometry::new(0.5, 0.5, 1.0, 1.0)).unwrap();
        assert_eq!(region, SurfaceBox::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn to_storage_inverts_example() {
        let stored = to_storage(&SurfaceBox::new(30.0, 35.0, 40.0, 30.0));
        assert!(stored.approx_eq(&Geometry::new(0.5, 0.5, 0.4, 0.3), ROUND_TRIP_TOLERANCE));
    }

    #[test]
    fn field_keys_match_record_format() {
        let keys: Vec<_> = GeometryField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys, ["x_center", "y_center", "width_relative", "height_relative"]);
    }
}
