//! Deviation-from-baseline anomaly maps (the "IDW" map).
//!
//! Key invariants:
//! - The grid carries deviation (value − median), never raw concentration
//! - A sample is anomalous iff its deviation is strictly above the threshold,
//!   so every flagged deviation is >= every unflagged one
//! - At `percentile = 100` the threshold is the maximum deviation and nothing
//!   is flagged
//! - Nodes outside the samples' convex hull are NaN ("no data")
//!
//! The surface is a cubic Clough–Tocher interpolant, not inverse-distance
//! weighting; the map keeps its historical name.

use crate::clough_tocher::CloughTocher;
use crate::dataset::{Dataset, Observation};
use crate::error::AnalysisError;
use crate::grid::{bounding_axes, require_spread, GridPoint, InterpolationGrid};
use crate::stats::{median, percentile, Extremes};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyParams {
    pub grid_size: usize,
    /// Percentile of the deviations used as the anomaly threshold, in `[0, 100]`.
    pub percentile: f64,
}

impl Default for AnomalyParams {
    fn default() -> Self {
        Self { grid_size: 100, percentile: 100.0 }
    }
}

#[derive(Debug, Clone)]
pub struct AnomalyMap {
    pub sheet: String,
    pub element: String,
    /// Interpolated deviation field; `sample_points` carry per-sample deviations.
    pub grid: InterpolationGrid,
    /// Median concentration of the sheet.
    pub baseline: f64,
    pub threshold: f64,
    /// (lon, lat) of every sample whose deviation exceeds the threshold.
    pub anomalies: Vec<(f64, f64)>,
    /// Raw-concentration extremes for annotation.
    pub extremes: Extremes,
}

pub fn idw_anomalies(
    dataset: &Dataset,
    sheet_id: &str,
    element: &str,
    params: &AnomalyParams,
) -> Result<AnomalyMap, AnalysisError> {
    let element = element.to_ascii_lowercase();
    let observations = dataset.subset(sheet_id, &element)?;
    require_spread(&observations, sheet_id, &element)?;

    let values: Vec<f64> = observations.iter().map(|o| o.value).collect();
    let empty = || AnalysisError::EmptyDataSubset {
        sheet: sheet_id.to_string(),
        element: element.clone(),
    };
    let baseline = median(&values).ok_or_else(empty)?;
    let deviations: Vec<f64> = values.iter().map(|v| v - baseline).collect();
    let threshold = percentile(&deviations, params.percentile).ok_or_else(empty)?;

    let anomalies: Vec<(f64, f64)> = observations
        .iter()
        .zip(&deviations)
        .filter(|(_, &d)| d > threshold)
        .map(|(o, _)| (o.lon, o.lat))
        .collect();

    let (points, field) = unique_locations(&observations, &deviations);
    let surface = CloughTocher::new(points, field)?;

    let (xs, ys) = bounding_axes(&observations, params.grid_size);
    let mut grid = InterpolationGrid::evaluate(xs, ys, |x, y| surface.eval(x, y));
    grid.sample_points = observations
        .iter()
        .zip(&deviations)
        .map(|(o, &d)| GridPoint { lon: o.lon, lat: o.lat, value: d })
        .collect();

    let extremes = Extremes::of(&observations).ok_or_else(empty)?;
    let (lo, hi) = grid.value_range().unwrap_or((f64::NAN, f64::NAN));
    log::info!(
        "anomaly map {element} on {sheet_id}: baseline={baseline}, threshold={threshold}, {} flagged, deviation surface {lo}..{hi}, {} no-data nodes",
        anomalies.len(),
        grid.nan_count()
    );

    Ok(AnomalyMap {
        sheet: sheet_id.to_string(),
        element,
        grid,
        baseline,
        threshold,
        anomalies,
        extremes,
    })
}

/// First occurrence of each distinct location with its deviation.
fn unique_locations(observations: &[Observation], deviations: &[f64]) -> (Vec<(f64, f64)>, Vec<f64>) {
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(observations.len());
    let mut field = Vec::with_capacity(observations.len());
    for (o, &d) in observations.iter().zip(deviations) {
        if points.iter().any(|&(x, y)| x == o.lon && y == o.lat) {
            continue;
        }
        points.push((o.lon, o.lat));
        field.push(d);
    }
    (points, field)
}
