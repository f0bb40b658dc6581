//! Regular output grids and the point-set checks every interpolator shares.
//!
//! Key invariants:
//! - `z.len() == y_coords.len()` and every row has `x_coords.len()` entries
//! - `z[j][i]` is the value at `(x_coords[i], y_coords[j])`
//! - NaN in `z` means "no data" and only ever appears for nodes the method
//!   cannot reach (outside the convex hull for cubic interpolation)

use crate::dataset::Observation;
use crate::error::AnalysisError;

/// A sample carried alongside a grid for overlay: (lon, lat, value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationGrid {
    pub x_coords: Vec<f64>,
    pub y_coords: Vec<f64>,
    pub z: Vec<Vec<f64>>,
    pub sample_points: Vec<GridPoint>,
}

impl InterpolationGrid {
    /// Evaluate `f(x, y)` at every node of the `x × y` lattice.
    pub fn evaluate<F>(x_coords: Vec<f64>, y_coords: Vec<f64>, mut f: F) -> Self
    where
        F: FnMut(f64, f64) -> f64,
    {
        let z = y_coords
            .iter()
            .map(|&y| x_coords.iter().map(|&x| f(x, y)).collect())
            .collect();
        Self {
            x_coords,
            y_coords,
            z,
            sample_points: Vec::new(),
        }
    }

    /// (rows, cols) of the value array.
    pub fn shape(&self) -> (usize, usize) {
        (self.z.len(), self.z.first().map_or(0, Vec::len))
    }

    /// Number of "no data" nodes.
    pub fn nan_count(&self) -> usize {
        self.z.iter().flatten().filter(|v| v.is_nan()).count()
    }

    /// Finite extrema of `z`, ignoring no-data nodes.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.z
            .iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Longitude/latitude axes spanning the observations' bounding box.
pub fn bounding_axes(observations: &[Observation], n: usize) -> (Vec<f64>, Vec<f64>) {
    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    for o in observations {
        min_lon = min_lon.min(o.lon);
        max_lon = max_lon.max(o.lon);
        min_lat = min_lat.min(o.lat);
        max_lat = max_lat.max(o.lat);
    }
    (linspace(min_lon, max_lon, n), linspace(min_lat, max_lat, n))
}

/// Fail with `InsufficientData` unless the observations contain at least three
/// distinct locations that are not all on one line.
pub fn require_spread(
    observations: &[Observation],
    sheet: &str,
    element: &str,
) -> Result<(), AnalysisError> {
    let insufficient = || AnalysisError::InsufficientData {
        sheet: sheet.to_string(),
        element: element.to_string(),
        found: distinct_locations(observations),
    };

    let Some(first) = observations.first() else {
        return Err(insufficient());
    };

    // Farthest point from the first one fixes the reference direction
    let (far, far_d2) = observations
        .iter()
        .map(|o| (o, (o.lon - first.lon).powi(2) + (o.lat - first.lat).powi(2)))
        .fold((first, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    if far_d2 == 0.0 {
        return Err(insufficient());
    }

    let (dx, dy) = (far.lon - first.lon, far.lat - first.lat);
    let off_line = observations.iter().any(|o| {
        let cross = dx * (o.lat - first.lat) - dy * (o.lon - first.lon);
        cross.abs() > 1e-12 * far_d2
    });
    if off_line {
        Ok(())
    } else {
        Err(insufficient())
    }
}

fn distinct_locations(observations: &[Observation]) -> usize {
    let mut seen: Vec<(f64, f64)> = Vec::with_capacity(observations.len());
    for o in observations {
        if !seen.iter().any(|&(x, y)| x == o.lon && y == o.lat) {
            seen.push((o.lon, o.lat));
        }
    }
    seen.len()
}
