//! `geochem-engine`: spatial analysis over a static geochemical sample set.
//!
//! Pure engine crate: receives a loaded [`Dataset`], returns typed results.
//! No query parsing, no IO, no rendering.

pub mod anomaly;
pub mod clough_tocher;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod kriging;
pub mod stats;
pub mod triangulation;
pub mod variogram;

pub use anomaly::{idw_anomalies, AnomalyMap, AnomalyParams};
pub use dataset::{Dataset, Observation, Sample};
pub use error::AnalysisError;
pub use grid::{GridPoint, InterpolationGrid};
pub use kriging::{krige, KrigingMap, KrigingParams};
pub use stats::{extremes, Extremes, Extremum};
pub use variogram::VariogramModel;
