use crate::analyzers::types::{PipelineError, Recommendation, RegionAggregates, RegionRatios, Rule};
use crate::config::Thresholds;
use crate::locale::Locale;
use crate::severity::PredictionClass;

/// Ratio and threshold a rule compares.
fn rule_inputs(rule: Rule, ratios: &RegionRatios, thresholds: &Thresholds) -> (f64, f64) {
    match rule {
        Rule::HighSeverity => (ratios.severe_fatal, thresholds.severe_fatal),
        Rule::Infrastructure => (ratios.infrastructure, thresholds.infrastructure),
        Rule::Signage => (ratios.signage, thresholds.signage),
        Rule::Lighting => (ratios.lighting, thresholds.lighting),
    }
}

/// Builds the ordered recommendation list for a predicted class.
///
/// A prediction-based warning comes first for fatal or severe predictions,
/// followed by one entry per crossed threshold per region, in region order.
/// Empty regions contribute nothing.
///
/// # Errors
///
/// Fails if any aggregate is internally inconsistent. No partial list is
/// returned in that case.
pub fn recommend(
    aggregates: &RegionAggregates,
    predicted: PredictionClass,
    thresholds: &Thresholds,
    locale: Locale,
) -> Result<Vec<Recommendation>, PipelineError> {
    let mut recommendations = Vec::new();

    if predicted.is_serious() {
        recommendations.push(Recommendation::prediction_based(
            locale.prediction_warning(),
        ));
    }

    for aggregate in aggregates.iter() {
        aggregate.validate()?;

        let Some(ratios) = aggregate.ratios() else {
            continue;
        };

        for rule in Rule::ALL {
            let (ratio, threshold) = rule_inputs(rule, &ratios, thresholds);
            // Strict: a region sitting exactly on a threshold is not flagged.
            if ratio > threshold {
                let text = locale.region_finding(rule, &aggregate.region);
                recommendations.push(Recommendation::for_region(rule, &aggregate.region, text));
            }
        }
    }

    Ok(recommendations)
}
