//! Editing-surface annotation objects
//!
//! The editing surface exchanges Web Annotation style objects whose target
//! carries a media-fragment selector `xywh=percent:<x>,<y>,<w>,<h>`. Ids on
//! the surface side are prefixed with `#`; node ids in the record are not.

use crate::convert::{to_storage, Geometry, SurfaceBox};
use crate::error::SelectorFormatError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Media fragments standard the selector conforms to
pub const MEDIA_FRAGMENT_SPEC: &str = "http://www.w3.org/TR/media-frags/";

const SELECTOR_KIND: &str = "FragmentSelector";
const ANNOTATION_KIND: &str = "Annotation";

static SELECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    let num = r"([+-]?\d+(?:\.\d+)?)";
    Regex::new(&format!(r"^xywh=percent:{num},{num},{num},{num}$"))
        .unwrap_or_else(|e| unreachable!("selector pattern is static: {e}"))
});

/// Fragment selector attached to an annotation target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentSelector {
    /// Selector type, always `FragmentSelector` when produced here
    #[serde(rename = "type", default = "default_selector_kind")]
    pub kind: String,

    /// Standard the value conforms to
    #[serde(rename = "conformsTo", default, skip_serializing_if = "Option::is_none")]
    pub conforms_to: Option<String>,

    /// Raw selector value, e.g. `xywh=percent:30,35,40,30`
    pub value: String,
}

impl FragmentSelector {
    /// Selector describing `region`
    #[must_use]
    pub fn from_region(region: &SurfaceBox) -> Self {
        Self {
            kind: SELECTOR_KIND.to_string(),
            conforms_to: Some(MEDIA_FRAGMENT_SPEC.to_string()),
            value: format!(
                "xywh=percent:{},{},{},{}",
                region.x, region.y, region.w, region.h
            ),
        }
    }

    /// Parse the selector value into a box
    ///
    /// # Errors
    /// Returns [`SelectorFormatError`] unless the value is exactly
    /// `xywh=percent:` followed by four comma-separated decimal numbers.
    pub fn region(&self) -> Result<SurfaceBox, SelectorFormatError> {
        parse_selector(&self.value)
    }
}

fn default_selector_kind() -> String {
    SELECTOR_KIND.to_string()
}

fn default_annotation_kind() -> String {
    ANNOTATION_KIND.to_string()
}

/// Parse `xywh=percent:<x>,<y>,<w>,<h>`
fn parse_selector(value: &str) -> Result<SurfaceBox, SelectorFormatError> {
    let caps = SELECTOR_RE
        .captures(value.trim())
        .ok_or_else(|| SelectorFormatError::new(value))?;

    let mut parts = [0.0_f64; 4];
    for (slot, idx) in parts.iter_mut().zip(1..=4usize) {
        *slot = caps[idx]
            .parse()
            .map_err(|_| SelectorFormatError::new(value))?;
    }

    let [x, y, w, h] = parts;
    Ok(SurfaceBox { x, y, w, h })
}

/// Target of an annotation: the image and the region on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTarget {
    /// Image reference
    pub source: String,

    /// Region selector
    pub selector: FragmentSelector,
}

/// Annotation object as produced/consumed by the editing surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceAnnotation {
    /// Surface-side id (`#` + node id)
    pub id: String,

    /// Annotation type
    #[serde(rename = "type", default = "default_annotation_kind")]
    pub kind: String,

    /// Annotation bodies; the core does not interpret them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<serde_json::Value>,

    /// Image and region
    pub target: SurfaceTarget,
}

impl SurfaceAnnotation {
    /// Build the surface annotation for a node region
    #[must_use]
    pub fn from_region(node_id: &str, source: impl Into<String>, region: &SurfaceBox) -> Self {
        Self {
            id: format!("#{node_id}"),
            kind: ANNOTATION_KIND.to_string(),
            body: Vec::new(),
            target: SurfaceTarget {
                source: source.into(),
                selector: FragmentSelector::from_region(region),
            },
        }
    }

    /// Node id with the surface `#` prefix stripped
    #[inline]
    #[must_use]
    pub fn node_id(&self) -> &str {
        self.id.strip_prefix('#').unwrap_or(&self.id)
    }

    /// Region in surface coordinates
    ///
    /// # Errors
    /// Returns [`SelectorFormatError`] for malformed selectors.
    #[inline]
    pub fn region(&self) -> Result<SurfaceBox, SelectorFormatError> {
        self.target.selector.region()
    }

    /// Region in stored coordinates
    ///
    /// # Errors
    /// Returns [`SelectorFormatError`] for malformed selectors.
    #[inline]
    pub fn geometry(&self) -> Result<Geometry, SelectorFormatError> {
        self.region().map(|region| to_storage(&region))
    }
}

/// Convert many surface annotations to `(node id, geometry)` pairs
///
/// Annotations with a malformed selector are logged and skipped; the rest
/// are still converted.
pub fn regions_from_annotations<'a, I>(annotations: I) -> Vec<(String, Geometry)>
where
    I: IntoIterator<Item = &'a SurfaceAnnotation>,
{
    annotations
        .into_iter()
        .filter_map(|annotation| match annotation.geometry() {
            Ok(geometry) => Some((annotation.node_id().to_string(), geometry)),
            Err(e) => {
                tracing::warn!("Skipping annotation {}: {}", annotation.id, e);
                None
            }
        })
        .collect()
}
