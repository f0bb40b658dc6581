//! Ordinary kriging over one sheet's samples for one element.
//!
//! The kriging system is assembled and inverted once, then every grid node
//! is a matrix-vector product. Nodes that coincide with a sample reproduce
//! the sample value exactly.

use nalgebra::{DMatrix, DVector};

use crate::dataset::{Dataset, Observation};
use crate::error::AnalysisError;
use crate::grid::{bounding_axes, require_spread, GridPoint, InterpolationGrid};
use crate::stats::Extremes;
use crate::variogram::{experimental, fit, FittedVariogram, VariogramModel};

/// Distances at or below this count as "on a sample".
const COINCIDENT: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KrigingParams {
    pub grid_size: usize,
    pub variogram_model: VariogramModel,
    pub nlags: usize,
}

impl Default for KrigingParams {
    fn default() -> Self {
        Self {
            grid_size: 100,
            variogram_model: VariogramModel::Spherical,
            nlags: 6,
        }
    }
}

/// Kriged surface plus everything a renderer annotates it with.
#[derive(Debug, Clone)]
pub struct KrigingMap {
    pub sheet: String,
    pub element: String,
    pub grid: InterpolationGrid,
    /// Estimation variance per node, same shape as `grid.z`.
    pub variance: Vec<Vec<f64>>,
    pub extremes: Extremes,
    pub variogram: FittedVariogram,
}

pub fn krige(
    dataset: &Dataset,
    sheet_id: &str,
    element: &str,
    params: &KrigingParams,
) -> Result<KrigingMap, AnalysisError> {
    let element = element.to_ascii_lowercase();
    let observations = dataset.subset(sheet_id, &element)?;
    require_spread(&observations, sheet_id, &element)?;

    let (lags, semivariance) = experimental(&observations, params.nlags);
    let variogram = fit(params.variogram_model, &lags, &semivariance)?;
    let system = KrigingSystem::new(&observations, &variogram)?;

    let (xs, ys) = bounding_axes(&observations, params.grid_size);
    let mut variance = Vec::with_capacity(ys.len());
    let mut z = Vec::with_capacity(ys.len());
    for &y in &ys {
        let mut z_row = Vec::with_capacity(xs.len());
        let mut v_row = Vec::with_capacity(xs.len());
        for &x in &xs {
            let (value, sigma_sq) = system.estimate(x, y);
            if !value.is_finite() {
                return Err(AnalysisError::InterpolationFailure(format!(
                    "kriging produced a non-finite estimate at ({x}, {y})"
                )));
            }
            z_row.push(value);
            v_row.push(sigma_sq);
        }
        z.push(z_row);
        variance.push(v_row);
    }

    let extremes = Extremes::of(&observations).ok_or_else(|| AnalysisError::EmptyDataSubset {
        sheet: sheet_id.to_string(),
        element: element.clone(),
    })?;
    log::info!(
        "kriged {element} on {sheet_id}: {} samples, {}x{} grid, {} model",
        observations.len(),
        ys.len(),
        xs.len(),
        variogram.model
    );

    Ok(KrigingMap {
        sheet: sheet_id.to_string(),
        element,
        grid: InterpolationGrid {
            x_coords: xs,
            y_coords: ys,
            z,
            sample_points: observations
                .iter()
                .map(|o| GridPoint { lon: o.lon, lat: o.lat, value: o.value })
                .collect(),
        },
        variance,
        extremes,
        variogram,
    })
}

/// Inverted ordinary-kriging matrix with the Lagrange row/column appended.
struct KrigingSystem<'a> {
    observations: &'a [Observation],
    variogram: &'a FittedVariogram,
    inverse: DMatrix<f64>,
}

impl<'a> KrigingSystem<'a> {
    fn new(observations: &'a [Observation], variogram: &'a FittedVariogram) -> Result<Self, AnalysisError> {
        let n = observations.len();
        let mut a = DMatrix::<f64>::zeros(n + 1, n + 1);
        for i in 0..n {
            for j in (i + 1)..n {
                let h = distance(&observations[i], observations[j].lon, observations[j].lat);
                let gamma = -variogram.eval(h);
                a[(i, j)] = gamma;
                a[(j, i)] = gamma;
            }
            a[(i, n)] = 1.0;
            a[(n, i)] = 1.0;
        }

        let inverse = a.try_inverse().ok_or_else(|| {
            AnalysisError::InterpolationFailure("kriging system is singular".to_string())
        })?;
        if inverse.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::InterpolationFailure(
                "kriging system is ill-conditioned".to_string(),
            ));
        }
        Ok(Self { observations, variogram, inverse })
    }

    /// (estimate, estimation variance) at `(x, y)`.
    fn estimate(&self, x: f64, y: f64) -> (f64, f64) {
        let n = self.observations.len();
        let mut b = DVector::<f64>::zeros(n + 1);
        for (i, o) in self.observations.iter().enumerate() {
            let h = distance(o, x, y);
            b[i] = if h <= COINCIDENT { 0.0 } else { -self.variogram.eval(h) };
        }
        b[n] = 1.0;

        let weights = &self.inverse * &b;
        let value = self
            .observations
            .iter()
            .zip(weights.iter())
            .map(|(o, w)| o.value * w)
            .sum();
        let sigma_sq = weights.iter().zip(b.iter()).map(|(w, bi)| w * -bi).sum();
        (value, sigma_sq)
    }
}

fn distance(o: &Observation, x: f64, y: f64) -> f64 {
    ((o.lon - x).powi(2) + (o.lat - y).powi(2)).sqrt()
}
