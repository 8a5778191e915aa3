//! Application configuration.
//!
//! Loaded from an optional TOML file, then overridden from the environment:
//!
//! ```toml
//! [dataset]
//! path = "data/accidents.json"
//!
//! [classifier]
//! endpoint = "http://localhost:8000/predict"
//!
//! [analysis.thresholds]
//! severe_fatal = 0.30
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::locale::Locale;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "accident_advisor.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetConfig,
    pub classifier: ClassifierConfig,
    pub analysis: AnalysisConfig,
    pub metrics: ModelMetrics,
}

impl AppConfig {
    /// Loads the config from `path`, or from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, falling back to defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Applies `ACCIDENTS_PATH`, `CLASSIFIER_URL` and `CLASSIFIER_API_KEY`
    /// as resolved by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ACCIDENTS_PATH") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(url) = lookup("CLASSIFIER_URL") {
            self.classifier.endpoint = Some(url);
        }
        if let Some(key) = lookup("CLASSIFIER_API_KEY") {
            self.classifier.api_key = Some(key);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/accidents.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Prediction endpoint of the model server.
    pub endpoint: Option<String>,
    /// Header the API key is sent in, if one is configured.
    pub api_key_header: String,
    /// Only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_header: "Authorization".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

/// Everything the analytics pipeline needs besides the data itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub thresholds: Thresholds,
    pub bounds: GeoBounds,
    /// Region values treated as "no region"; such records are not aggregated.
    pub unknown_regions: Vec<String>,
    pub locale: Locale,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            bounds: GeoBounds::default(),
            unknown_regions: vec!["לא ידוע".to_string(), "unknown".to_string()],
            locale: Locale::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn is_unknown_region(&self, region: &str) -> bool {
        self.unknown_regions.iter().any(|r| r == region)
    }
}

/// Ratio thresholds above which a region is flagged. Comparison is strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub severe_fatal: f64,
    pub infrastructure: f64,
    pub signage: f64,
    pub lighting: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            severe_fatal: 0.30,
            infrastructure: 0.25,
            signage: 0.20,
            lighting: 0.15,
        }
    }
}

/// Inclusive latitude/longitude box a record must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Default for GeoBounds {
    // Israel
    fn default() -> Self {
        Self {
            min_lat: 29.0,
            max_lat: 34.0,
            min_lng: 34.0,
            max_lng: 36.0,
        }
    }
}

impl GeoBounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

/// Model quality figures reported alongside each prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: [[u32; 3]; 3],
}

impl Default for ModelMetrics {
    fn default() -> Self {
        Self {
            accuracy: 0.85,
            precision: 0.82,
            recall: 0.79,
            f1_score: 0.80,
            confusion_matrix: [[85, 10, 5], [15, 70, 15], [5, 20, 75]],
        }
    }
}
