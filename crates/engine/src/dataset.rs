//! Static sample set.
//!
//! Key invariants:
//! - The dataset is built once and never mutated; every analysis takes `&Dataset`
//! - Sample order is the load order and is the tie-break for extremum lookups
//! - A missing concentration is `None`, never a NaN stand-in

use std::collections::HashMap;

use crate::error::AnalysisError;

/// One survey location: sheet, position, and per-element concentrations.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub sheet_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub concentrations: HashMap<String, f64>,
}

impl Sample {
    pub fn new(sheet_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            latitude,
            longitude,
            concentrations: HashMap::new(),
        }
    }

    /// Builder-style setter, mostly for fixtures.
    pub fn with(mut self, element: &str, value: f64) -> Self {
        self.concentrations.insert(element.to_ascii_lowercase(), value);
        self
    }

    /// Concentration for `element`, skipping absent and non-finite values.
    pub fn value(&self, element: &str) -> Option<f64> {
        self.concentrations
            .get(element)
            .copied()
            .filter(|v| v.is_finite())
    }
}

/// A (lon, lat, value) triple drawn from one sample, with its dataset index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub index: usize,
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

/// The full read-only sample set plus the element columns it carries.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    elements: Vec<String>,
    samples: Vec<Sample>,
}

impl Dataset {
    /// Build a dataset. `elements` is the column schema; codes are lower-cased.
    pub fn new(elements: Vec<String>, samples: Vec<Sample>) -> Self {
        let elements = elements
            .into_iter()
            .map(|e| e.to_ascii_lowercase())
            .collect();
        Self { elements, samples }
    }

    /// Build a dataset whose schema is the union of every sample's element codes,
    /// in first-seen order.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let mut elements: Vec<String> = Vec::new();
        for sample in &samples {
            let mut codes: Vec<&String> = sample.concentrations.keys().collect();
            codes.sort();
            for code in codes {
                if !elements.contains(code) {
                    elements.push(code.clone());
                }
            }
        }
        Self { elements, samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// True when `element` is a column of this dataset.
    pub fn has_element(&self, element: &str) -> bool {
        self.elements.iter().any(|e| e.eq_ignore_ascii_case(element))
    }

    /// Distinct sheet ids in load order.
    pub fn sheet_ids(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for s in &self.samples {
            if !seen.contains(&s.sheet_id.as_str()) {
                seen.push(&s.sheet_id);
            }
        }
        seen
    }

    /// Observations of `element` on `sheet_id`, in dataset order.
    ///
    /// Sheet ids compare case-insensitively. An unknown element column and an
    /// empty filter result are both reported as `EmptyDataSubset`.
    pub fn subset(&self, sheet_id: &str, element: &str) -> Result<Vec<Observation>, AnalysisError> {
        let element = element.to_ascii_lowercase();
        let empty = || AnalysisError::EmptyDataSubset {
            sheet: sheet_id.to_string(),
            element: element.clone(),
        };

        if !self.has_element(&element) {
            return Err(empty());
        }

        let observations: Vec<Observation> = self
            .samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.sheet_id.eq_ignore_ascii_case(sheet_id))
            .filter_map(|(index, s)| {
                s.value(&element).map(|value| Observation {
                    index,
                    lon: s.longitude,
                    lat: s.latitude,
                    value,
                })
            })
            .collect();

        if observations.is_empty() {
            return Err(empty());
        }
        Ok(observations)
    }
}
