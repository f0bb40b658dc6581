use std::path::Path;

use geochem_engine::{AnomalyParams, KrigingParams, VariogramModel};
use geochem_query::TypoCorrector;
use serde::Deserialize;

use crate::error::AssistantError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Assistant tuning. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Survey region named in apology texts.
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub typo: TypoConfig,
    #[serde(default)]
    pub kriging: KrigingConfig,
    #[serde(default)]
    pub anomaly: AnomalyConfig,
    #[serde(default)]
    pub response: ResponseConfig,
}

fn default_region() -> String {
    "Nagpur".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            typo: TypoConfig::default(),
            kriging: KrigingConfig::default(),
            anomaly: AnomalyConfig::default(),
            response: ResponseConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Typo correction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TypoConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Appended to the built-in word list.
    #[serde(default)]
    pub extra_words: Vec<String>,
}

fn default_threshold() -> f64 {
    geochem_query::typo::DEFAULT_THRESHOLD
}

impl Default for TypoConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            extra_words: Vec::new(),
        }
    }
}

impl TypoConfig {
    pub fn corrector(&self) -> TypoCorrector {
        TypoCorrector::new(self.threshold).with_words(self.extra_words.iter().cloned())
    }
}

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct KrigingConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default)]
    pub variogram_model: VariogramModel,
    #[serde(default = "default_nlags")]
    pub nlags: usize,
}

fn default_grid_size() -> usize {
    100
}

fn default_nlags() -> usize {
    6
}

impl Default for KrigingConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            variogram_model: VariogramModel::default(),
            nlags: default_nlags(),
        }
    }
}

impl KrigingConfig {
    pub fn params(&self) -> KrigingParams {
        KrigingParams {
            grid_size: self.grid_size,
            variogram_model: self.variogram_model,
            nlags: self.nlags,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default = "default_percentile")]
    pub percentile: f64,
}

fn default_percentile() -> f64 {
    100.0
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            percentile: default_percentile(),
        }
    }
}

impl AnomalyConfig {
    pub fn params(&self) -> AnomalyParams {
        AnomalyParams {
            grid_size: self.grid_size,
            percentile: self.percentile,
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseConfig {
    #[serde(default)]
    pub surface: Surface,
}

/// Which sub-query results reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Only the first sub-query's result.
    #[default]
    First,
    /// Every sub-query's result, combined.
    All,
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::All => write!(f, "all"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl AssistantConfig {
    pub fn from_toml(input: &str) -> Result<Self, AssistantError> {
        let config: AssistantConfig =
            toml::from_str(input).map_err(|e| AssistantError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AssistantError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| AssistantError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), AssistantError> {
        if self.region.trim().is_empty() {
            return Err(AssistantError::ConfigValidation("region must not be empty".into()));
        }

        // Threshold 0 would rewrite every word
        let t = self.typo.threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(AssistantError::ConfigValidation(format!(
                "typo.threshold must be in (0, 1], got {t}"
            )));
        }

        for (section, size) in [("kriging", self.kriging.grid_size), ("anomaly", self.anomaly.grid_size)] {
            if size < 2 {
                return Err(AssistantError::ConfigValidation(format!(
                    "{section}.grid_size must be at least 2, got {size}"
                )));
            }
        }

        if self.kriging.nlags == 0 {
            return Err(AssistantError::ConfigValidation("kriging.nlags must be at least 1".into()));
        }

        let p = self.anomaly.percentile;
        if !(0.0..=100.0).contains(&p) {
            return Err(AssistantError::ConfigValidation(format!(
                "anomaly.percentile must be in [0, 100], got {p}"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
