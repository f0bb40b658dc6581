// Per-(sheet, element) statistics: extremes, median, percentile

use serde::Serialize;

use crate::dataset::{Dataset, Observation};
use crate::error::AnalysisError;

/// A value and where it was first observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremum {
    pub value: f64,
    pub lat: f64,
    pub lon: f64,
    /// Dataset row the value came from.
    #[serde(skip)]
    pub index: usize,
}

impl From<&Observation> for Extremum {
    fn from(o: &Observation) -> Self {
        Self { value: o.value, lat: o.lat, lon: o.lon, index: o.index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremes {
    pub max: Extremum,
    pub min: Extremum,
}

impl Extremes {
    /// Max and min over `observations`; ties keep the first occurrence.
    /// Returns `None` for an empty slice.
    pub fn of(observations: &[Observation]) -> Option<Self> {
        let first = observations.first()?;
        let mut max = first;
        let mut min = first;
        for o in &observations[1..] {
            if o.value > max.value {
                max = o;
            }
            if o.value < min.value {
                min = o;
            }
        }
        Some(Self { max: max.into(), min: min.into() })
    }
}

/// Max/min concentration of `element` on `sheet_id`, with coordinates.
pub fn extremes(dataset: &Dataset, sheet_id: &str, element: &str) -> Result<Extremes, AnalysisError> {
    let observations = dataset.subset(sheet_id, element)?;
    Extremes::of(&observations).ok_or_else(|| AnalysisError::EmptyDataSubset {
        sheet: sheet_id.to_string(),
        element: element.to_string(),
    })
}

/// Median with midpoint averaging for even counts. `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is clamped to `[0, 100]`; `q = 100` is the maximum.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
