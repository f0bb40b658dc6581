//! Geochem Assistant Response Protocol (v1 wire format)
//!
//! This crate defines the JSON shapes a caller receives from the assistant.
//! A response is either text or a renderable grid:
//!
//! ```text
//! {"kind": "text", "content": "..."}
//! {"kind": "kriging_map" | "idw_map",
//!  "grid": {"x": [...], "y": [...], "z": [[...]]},
//!  "points": [{"lon", "lat", "value"}],
//!  "annotations": {"max": {"value", "lat", "lon"}, "min": {...}},
//!  "title": "..."}
//! ```
//!
//! # NaN contract
//!
//! A raw NaN never crosses this boundary. Grid nodes without data are
//! `null` in `z`; every float is checked through [`finite`] on the way in.
//!
//! # Usage
//!
//! ```ignore
//! use geochem_protocol::{WireResponse, WireResult};
//!
//! let json = serde_json::to_string(&response)?;
//! let back: WireResponse = serde_json::from_str(&json)?;
//! ```

use serde::{Deserialize, Serialize};

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// =============================================================================
// Envelope
// =============================================================================

/// One answer to one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse {
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u32,
    pub result_type: ResultType,
    pub result: WireResult,
    /// Pipeline trace, present only when asked for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<Explain>,
}

fn default_protocol_version() -> u32 {
    1
}

/// Response-level tag derived from the surfaced results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Text,
    KrigingMap,
    IdwMap,
}

impl std::fmt::Display for ResultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::KrigingMap => write!(f, "kriging_map"),
            Self::IdwMap => write!(f, "idw_map"),
        }
    }
}

// =============================================================================
// Results
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WireResult {
    Text { content: String },
    KrigingMap(WireMap),
    IdwMap(WireMap),
    /// Several results in sub-query order (both-maps requests, or every
    /// sub-query when the assistant surfaces all of them).
    Multi { results: Vec<WireResult> },
}

impl WireResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { content: content.into() }
    }
}

/// A renderable map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMap {
    pub grid: WireGrid,
    pub points: Vec<WirePoint>,
    pub annotations: Annotations,
    pub title: String,
    pub sheet: String,
    pub element: String,
    /// Anomalous samples as (lon, lat); IDW maps only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<WireLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// `z[j][i]` is the value at `(x[i], y[j])`; `None` is "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<Option<f64>>>,
}

impl WireGrid {
    /// Build from an internal row-major array, mapping non-finite values to `None`.
    pub fn from_rows(x: Vec<f64>, y: Vec<f64>, z: &[Vec<f64>]) -> Self {
        Self {
            x,
            y,
            z: z.iter().map(|row| row.iter().copied().map(finite).collect()).collect(),
        }
    }

    /// (rows, cols) of `z`.
    pub fn shape(&self) -> (usize, usize) {
        (self.z.len(), self.z.first().map_or(0, Vec::len))
    }

    pub fn null_count(&self) -> usize {
        self.z.iter().flatten().filter(|v| v.is_none()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub lon: f64,
    pub lat: f64,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireLocation {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub max: WireExtremum,
    pub min: WireExtremum,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireExtremum {
    pub value: f64,
    pub lat: f64,
    pub lon: f64,
}

// =============================================================================
// Explain
// =============================================================================

/// How the query was understood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explain {
    pub original: String,
    pub corrected: String,
    pub subqueries: Vec<SubQueryTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQueryTrace {
    pub text: String,
    pub intent: String,
    pub elements: Vec<String>,
    pub sheet_ids: Vec<String>,
    /// Short outcome label: the result kind, or the failure class.
    pub outcome: String,
}

/// `Some(v)` for finite `v`, `None` for NaN and infinities.
pub fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}
