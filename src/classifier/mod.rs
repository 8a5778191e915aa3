//! Severity classifier interface.
//!
//! The trained model lives outside this crate. [`HttpClassifier`] talks to a
//! model server; [`FixedClassifier`] returns a preset answer.

mod api_key;
mod basic;
mod client;
mod http;

pub use api_key::ApiKey;
pub use basic::BasicClient;
pub use client::HttpClient;
pub use http::HttpClassifier;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::severity::PredictionClass;

/// Number of scalars the classifier expects.
pub const FEATURE_COUNT: usize = 11;

/// Ordered classifier input.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Coded attributes of the incident being assessed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentFeatures {
    #[serde(rename = "sug_dereh")]
    pub road_type: i64,
    #[serde(rename = "hodesh_teuna")]
    pub month: i64,
    #[serde(rename = "yom_layla")]
    pub day_night: i64,
    #[serde(rename = "yom_bashavua")]
    pub day_of_week: i64,
    #[serde(rename = "sug_teuna")]
    pub accident_type: i64,
    #[serde(rename = "mehirut_muteret")]
    pub speed_limit: i64,
    #[serde(rename = "tkinut")]
    pub road_condition: i64,
    #[serde(rename = "simun_timrur")]
    pub signage: i64,
    #[serde(rename = "teura")]
    pub lighting: i64,
    #[serde(rename = "mezeg_avir")]
    pub weather: i64,
    #[serde(rename = "pne_kvish")]
    pub road_surface: i64,
    /// Reporting district. Not a model input.
    #[serde(rename = "mahoz", default)]
    pub district: String,
}

impl IncidentFeatures {
    /// Features in the order the model was trained on.
    pub fn to_vector(&self) -> FeatureVector {
        [
            self.road_type,
            self.month,
            self.day_night,
            self.day_of_week,
            self.accident_type,
            self.speed_limit,
            self.road_condition,
            self.signage,
            self.lighting,
            self.weather,
            self.road_surface,
        ]
        .map(|v| v as f64)
    }
}

/// A classifier reply that does not describe a valid prediction.
#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("unknown class id {0}")]
    UnknownClass(i64),

    #[error("expected 3 probabilities, got {0}")]
    ProbabilityCount(usize),

    #[error("invalid probability {0}")]
    InvalidProbability(f64),

    #[error("probabilities sum to {0}, expected 1")]
    ProbabilitySum(f64),
}

/// Classifier output: the predicted class and a probability per class, in
/// [`PredictionClass::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub class: PredictionClass,
    pub probabilities: [f64; 3],
}

impl Prediction {
    const SUM_TOLERANCE: f64 = 1e-6;

    /// Validates a raw reply.
    pub fn new(class_id: i64, probabilities: &[f64]) -> Result<Self, ClassifierError> {
        let class = PredictionClass::from_id(class_id).ok_or(ClassifierError::UnknownClass(class_id))?;
        let probabilities: [f64; 3] = probabilities
            .try_into()
            .map_err(|_| ClassifierError::ProbabilityCount(probabilities.len()))?;

        if let Some(&p) = probabilities
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0)
        {
            return Err(ClassifierError::InvalidProbability(p));
        }

        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(ClassifierError::ProbabilitySum(sum));
        }

        Ok(Self {
            class,
            probabilities,
        })
    }

    /// A prediction with all probability mass on `class`.
    pub fn certain(class: PredictionClass) -> Self {
        let mut probabilities = [0.0; 3];
        probabilities[class.id()] = 1.0;
        Self {
            class,
            probabilities,
        }
    }

    pub fn probability(&self, class: PredictionClass) -> f64 {
        self.probabilities[class.id()]
    }
}

/// Predicts incident severity from a feature vector.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(&self, features: &FeatureVector) -> Result<Prediction>;
}

/// Always returns the same prediction.
pub struct FixedClassifier(pub Prediction);

#[async_trait]
impl Classifier for FixedClassifier {
    async fn predict(&self, _features: &FeatureVector) -> Result<Prediction> {
        Ok(self.0)
    }
}
