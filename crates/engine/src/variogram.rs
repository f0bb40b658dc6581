//! Semivariogram models, the experimental semivariogram, and model fitting.
//!
//! Fitting minimizes a soft-L1 robust loss over the binned experimental
//! semivariance with a bounded Levenberg–Marquardt iteration. Parameter order
//! is `[psill, range, nugget]` for the bounded-sill models and
//! `[slope, nugget]` for the linear model.

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::dataset::Observation;
use crate::error::AnalysisError;

const MAX_ITERATIONS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariogramModel {
    #[default]
    Spherical,
    Exponential,
    Gaussian,
    Linear,
}

impl fmt::Display for VariogramModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spherical => write!(f, "spherical"),
            Self::Exponential => write!(f, "exponential"),
            Self::Gaussian => write!(f, "gaussian"),
            Self::Linear => write!(f, "linear"),
        }
    }
}

impl FromStr for VariogramModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spherical" => Ok(Self::Spherical),
            "exponential" => Ok(Self::Exponential),
            "gaussian" => Ok(Self::Gaussian),
            "linear" => Ok(Self::Linear),
            other => Err(format!(
                "unknown variogram model '{other}' (expected spherical, exponential, gaussian or linear)"
            )),
        }
    }
}

impl VariogramModel {
    /// Semivariance at lag `h` for parameters `p`.
    pub fn eval(&self, p: &[f64], h: f64) -> f64 {
        match self {
            Self::Linear => p[0] * h + p[1],
            Self::Spherical => with_sill(p, h, |h, range| {
                if h <= range {
                    let r = h / range;
                    1.5 * r - 0.5 * r * r * r
                } else {
                    1.0
                }
            }),
            Self::Exponential => with_sill(p, h, |h, range| 1.0 - (-h / (range / 3.0)).exp()),
            Self::Gaussian => with_sill(p, h, |h, range| {
                let a = range * 4.0 / 7.0;
                1.0 - (-(h * h) / (a * a)).exp()
            }),
        }
    }

    /// Initial guess and box bounds derived from the experimental semivariogram.
    fn start(&self, lags: &[f64], semivariance: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let max_s = semivariance.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_s = semivariance.iter().copied().fold(f64::INFINITY, f64::min);
        let max_lag = lags.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_lag = lags.iter().copied().fold(f64::INFINITY, f64::min);

        match self {
            Self::Linear => {
                let slope = if max_lag > min_lag {
                    (max_s - min_s) / (max_lag - min_lag)
                } else {
                    0.0
                };
                (vec![slope, min_s], vec![0.0, 0.0], vec![f64::INFINITY, max_s])
            }
            _ => (
                vec![max_s - min_s, 0.25 * max_lag, min_s],
                vec![0.0, 0.0, 0.0],
                vec![10.0 * max_s, max_lag, max_s],
            ),
        }
    }
}

/// Bounded models: `p` is (partial sill, range, nugget), `shape` the sill
/// fraction reached at lag `h`.
fn with_sill(p: &[f64], h: f64, shape: impl Fn(f64, f64) -> f64) -> f64 {
    let (psill, range, nugget) = (p[0], p[1], p[2]);
    if h <= 0.0 {
        nugget
    } else if range <= 0.0 {
        psill + nugget
    } else {
        psill * shape(h, range) + nugget
    }
}

/// A model with fitted parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedVariogram {
    pub model: VariogramModel,
    pub params: Vec<f64>,
}

impl FittedVariogram {
    pub fn eval(&self, h: f64) -> f64 {
        self.model.eval(&self.params, h)
    }
}

/// Binned experimental semivariogram: `(mean lag, mean semivariance)` per
/// non-empty bin of `nlags` equal-width bins over the pair distances.
pub fn experimental(observations: &[Observation], nlags: usize) -> (Vec<f64>, Vec<f64>) {
    let n = observations.len();
    let mut d = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    let mut g = Vec::with_capacity(d.capacity());
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&observations[i], &observations[j]);
            d.push(((a.lon - b.lon).powi(2) + (a.lat - b.lat).powi(2)).sqrt());
            g.push(0.5 * (a.value - b.value).powi(2));
        }
    }
    if d.is_empty() || nlags == 0 {
        return (Vec::new(), Vec::new());
    }

    let dmin = d.iter().copied().fold(f64::INFINITY, f64::min);
    let dmax = d.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (dmax - dmin) / nlags as f64;
    let mut edges: Vec<f64> = (0..nlags).map(|k| dmin + k as f64 * width).collect();
    edges.push(dmax + 0.001);

    let mut lags = Vec::new();
    let mut semivariance = Vec::new();
    for k in 0..nlags {
        let (lo, hi) = (edges[k], edges[k + 1]);
        let (mut sum_d, mut sum_g, mut count) = (0.0, 0.0, 0usize);
        for (dist, gamma) in d.iter().zip(&g) {
            if *dist >= lo && *dist < hi {
                sum_d += dist;
                sum_g += gamma;
                count += 1;
            }
        }
        if count > 0 {
            lags.push(sum_d / count as f64);
            semivariance.push(sum_g / count as f64);
        }
    }
    (lags, semivariance)
}

/// Fit `model` to the experimental semivariogram.
pub fn fit(
    model: VariogramModel,
    lags: &[f64],
    semivariance: &[f64],
) -> Result<FittedVariogram, AnalysisError> {
    if lags.is_empty() || lags.len() != semivariance.len() {
        return Err(AnalysisError::DegenerateVariogram(
            "no lag bins to fit".to_string(),
        ));
    }

    let (x0, lb, ub) = model.start(lags, semivariance);
    if lb.iter().zip(&ub).any(|(l, u)| !(u > l)) {
        return Err(AnalysisError::DegenerateVariogram(format!(
            "{model} model bounds collapse (semivariance is constant)"
        )));
    }

    let residuals = |p: &[f64]| -> DVector<f64> {
        DVector::from_iterator(
            lags.len(),
            lags.iter().zip(semivariance).map(|(&h, &s)| model.eval(p, h) - s),
        )
    };
    let cost = |r: &DVector<f64>| -> f64 { r.iter().map(|ri| 2.0 * ((1.0 + ri * ri).sqrt() - 1.0)).sum() };
    let clamp = |p: &mut [f64]| {
        for ((v, l), u) in p.iter_mut().zip(&lb).zip(&ub) {
            *v = v.clamp(*l, *u);
        }
    };

    let k = x0.len();
    let mut p = x0;
    clamp(&mut p);
    let mut r = residuals(&p);
    let mut current = cost(&r);
    let mut lambda = 1e-3;

    for _ in 0..MAX_ITERATIONS {
        // IRLS weights for soft-L1: rho'(z) = 1 / sqrt(1 + z)
        let w = DVector::from_iterator(r.len(), r.iter().map(|ri| 1.0 / (1.0 + ri * ri).sqrt()));
        let jac = jacobian(model, &p, lags);
        let jw = DMatrix::from_fn(jac.nrows(), k, |i, j| jac[(i, j)] * w[i]);
        let normal = jac.transpose() * &jw;
        let gradient = jw.transpose() * &r;

        let mut improved = false;
        for _ in 0..30 {
            let mut damped = normal.clone();
            for d in 0..k {
                damped[(d, d)] += lambda * normal[(d, d)].max(1e-12);
            }
            let Some(step) = damped.lu().solve(&(-&gradient)) else {
                lambda *= 10.0;
                continue;
            };
            let mut candidate: Vec<f64> = p.iter().zip(step.iter()).map(|(a, b)| a + b).collect();
            clamp(&mut candidate);
            let r_new = residuals(&candidate);
            let c_new = cost(&r_new);
            if c_new.is_finite() && c_new < current {
                let moved = p
                    .iter()
                    .zip(&candidate)
                    .map(|(a, b)| (a - b).abs())
                    .fold(0.0, f64::max);
                let gain = current - c_new;
                p = candidate;
                r = r_new;
                current = c_new;
                lambda = (lambda / 10.0).max(1e-12);
                improved = gain > 1e-14 * (1.0 + current) && moved > 1e-14;
                break;
            }
            lambda *= 10.0;
        }
        if !improved {
            break;
        }
    }

    if p.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::DegenerateVariogram(format!(
            "{model} fit produced non-finite parameters"
        )));
    }
    log::debug!("fitted {model} variogram: params={p:?} cost={current:.6e}");
    Ok(FittedVariogram { model, params: p })
}

/// Forward-difference Jacobian of the model at every lag.
fn jacobian(model: VariogramModel, p: &[f64], lags: &[f64]) -> DMatrix<f64> {
    let base: Vec<f64> = lags.iter().map(|&h| model.eval(p, h)).collect();
    let mut jac = DMatrix::zeros(lags.len(), p.len());
    for j in 0..p.len() {
        let step = f64::EPSILON.sqrt() * p[j].abs().max(1e-8);
        let mut shifted = p.to_vec();
        shifted[j] += step;
        for (i, &h) in lags.iter().enumerate() {
            jac[(i, j)] = (model.eval(&shifted, h) - base[i]) / step;
        }
    }
    jac
}
