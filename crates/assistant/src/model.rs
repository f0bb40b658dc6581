use std::fmt;

use serde::Serialize;

use geochem_engine::{AnalysisError, AnomalyMap, Extremes, Extremum, InterpolationGrid, KrigingMap};
use geochem_protocol::{
    finite, Annotations, Explain, ResultType, WireExtremum, WireGrid, WireLocation, WireMap,
    WirePoint, WireResponse, WireResult, PROTOCOL_VERSION,
};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A raw question plus the optional topic label the transport attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Query {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), topic: None }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    Kriging,
    Idw,
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kriging => write!(f, "kriging"),
            Self::Idw => write!(f, "idw"),
        }
    }
}

/// A grid plus everything a renderer draws on top of it.
#[derive(Debug, Clone)]
pub struct MapResult {
    pub kind: MapKind,
    pub sheet: String,
    pub element: String,
    pub title: String,
    pub grid: InterpolationGrid,
    pub extremes: Extremes,
    /// (lon, lat) overlay; empty for kriging maps.
    pub anomalies: Vec<(f64, f64)>,
    pub baseline: Option<f64>,
    pub threshold: Option<f64>,
}

impl From<KrigingMap> for MapResult {
    fn from(map: KrigingMap) -> Self {
        Self {
            kind: MapKind::Kriging,
            title: format!("Stream Sediment samples showing {} Values(ppm)", map.element),
            sheet: map.sheet,
            element: map.element,
            grid: map.grid,
            extremes: map.extremes,
            anomalies: Vec::new(),
            baseline: None,
            threshold: None,
        }
    }
}

impl From<AnomalyMap> for MapResult {
    fn from(map: AnomalyMap) -> Self {
        Self {
            kind: MapKind::Idw,
            title: format!("Geochemical IDW Map for {} (Toposheet {})", map.element, map.sheet),
            sheet: map.sheet,
            element: map.element,
            grid: map.grid,
            extremes: map.extremes,
            anomalies: map.anomalies,
            baseline: Some(map.baseline),
            threshold: Some(map.threshold),
        }
    }
}

/// What one sub-query produced. Every sub-query yields exactly one of these.
#[derive(Debug, Clone)]
pub enum AnalysisResult {
    Text(String),
    Grid(MapResult),
    /// Results in order, e.g. an IDW map followed by a kriging map.
    Multi(Vec<AnalysisResult>),
}

impl AnalysisResult {
    /// True if this result is, or contains, a grid of `kind`.
    pub fn contains_map(&self, kind: MapKind) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Grid(map) => map.kind == kind,
            Self::Multi(results) => results.iter().any(|r| r.contains_map(kind)),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_wire(&self) -> WireResult {
        match self {
            Self::Text(content) => WireResult::text(content.clone()),
            Self::Grid(map) => match map.kind {
                MapKind::Kriging => WireResult::KrigingMap(map.to_wire()),
                MapKind::Idw => WireResult::IdwMap(map.to_wire()),
            },
            Self::Multi(results) => WireResult::Multi {
                results: results.iter().map(Self::to_wire).collect(),
            },
        }
    }
}

impl MapResult {
    fn to_wire(&self) -> WireMap {
        let extremum = |e: &Extremum| WireExtremum { value: e.value, lat: e.lat, lon: e.lon };
        WireMap {
            grid: WireGrid::from_rows(self.grid.x_coords.clone(), self.grid.y_coords.clone(), &self.grid.z),
            points: self
                .grid
                .sample_points
                .iter()
                .map(|p| WirePoint { lon: p.lon, lat: p.lat, value: finite(p.value) })
                .collect(),
            annotations: Annotations {
                max: extremum(&self.extremes.max),
                min: extremum(&self.extremes.min),
            },
            title: self.title.clone(),
            sheet: self.sheet.clone(),
            element: self.element.clone(),
            anomalies: self
                .anomalies
                .iter()
                .map(|&(lon, lat)| WireLocation { lon, lat })
                .collect(),
            baseline: self.baseline.and_then(finite),
            threshold: self.threshold.and_then(finite),
        }
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Why a sub-query could not be answered. Never escapes the dispatcher:
/// every failure becomes apology text for that sub-query alone.
#[derive(Debug)]
pub enum QueryFailure {
    /// Unsupported intent, or no sheet id / element in the text.
    Unrecognized(String),
    Analysis(AnalysisError),
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized(why) => write!(f, "unrecognized query: {why}"),
            Self::Analysis(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for QueryFailure {}

impl From<AnalysisError> for QueryFailure {
    fn from(e: AnalysisError) -> Self {
        Self::Analysis(e)
    }
}

impl QueryFailure {
    /// Short class label for traces.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Unrecognized(_) => "unrecognized",
            Self::Analysis(AnalysisError::EmptyDataSubset { .. }) => "empty_data_subset",
            Self::Analysis(AnalysisError::InsufficientData { .. }) => "insufficient_data",
            Self::Analysis(AnalysisError::DegenerateVariogram(_)) => "degenerate_variogram",
            Self::Analysis(AnalysisError::InterpolationFailure(_)) => "interpolation_failure",
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Response {
    pub result: AnalysisResult,
    pub result_type: ResultType,
    pub explain: Explain,
}

impl Response {
    /// Wire form; the trace is attached only when `explain` is set.
    pub fn to_wire(&self, explain: bool) -> WireResponse {
        WireResponse {
            protocol_version: PROTOCOL_VERSION,
            result_type: self.result_type,
            result: self.result.to_wire(),
            explain: explain.then(|| self.explain.clone()),
        }
    }
}
