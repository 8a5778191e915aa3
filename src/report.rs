//! The result handed to the presentation layer for one assessed incident.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::types::Recommendation;
use crate::analyzers::utility::pct;
use crate::classifier::Prediction;
use crate::config::ModelMetrics;
use crate::locale::Locale;
use crate::severity::PredictionClass;

/// Class probabilities as percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityBreakdown {
    pub fatal: f64,
    pub severe: f64,
    pub light: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub generated_at: DateTime<Utc>,
    /// Severity on the public scale (3 = fatal, 1 = light).
    pub prediction: u8,
    pub prediction_text: String,
    pub prediction_type: &'static str,
    pub probabilities: ProbabilityBreakdown,
    pub district: String,
    pub metrics: ModelMetrics,
    pub recommendations: Vec<Recommendation>,
}

impl PredictionReport {
    pub fn new(
        prediction: &Prediction,
        district: &str,
        metrics: &ModelMetrics,
        locale: Locale,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            prediction: prediction.class.public_code(),
            prediction_text: locale.severity_label(prediction.class).to_string(),
            prediction_type: prediction.class.type_name(),
            probabilities: ProbabilityBreakdown {
                fatal: pct(prediction.probability(PredictionClass::Fatal)),
                severe: pct(prediction.probability(PredictionClass::Severe)),
                light: pct(prediction.probability(PredictionClass::Light)),
            },
            district: district.to_string(),
            metrics: metrics.clone(),
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::RecommendationKind;

    #[test]
    fn test_report_fields() {
        let prediction = Prediction::new(0, &[0.5, 0.25, 0.25]).unwrap();
        let report = PredictionReport::new(
            &prediction,
            "צפון",
            &ModelMetrics::default(),
            Locale::He,
            vec![Recommendation::prediction_based("x")],
        );

        assert_eq!(report.prediction, 3);
        assert_eq!(report.prediction_text, "קטלנית");
        assert_eq!(report.prediction_type, "fatal");
        assert_eq!(report.probabilities.fatal, 50.0);
        assert_eq!(report.probabilities.light, 25.0);
        assert_eq!(report.district, "צפון");
        assert_eq!(
            report.recommendations[0].kind,
            RecommendationKind::PredictionBased
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = PredictionReport::new(
            &Prediction::certain(PredictionClass::Light),
            "",
            &ModelMetrics::default(),
            Locale::En,
            Vec::new(),
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["prediction"], 1);
        assert_eq!(json["prediction_text"], "Light");
        assert_eq!(json["metrics"]["confusion_matrix"][0][0], 85);
        assert!(json["generated_at"].is_string());
    }
}
