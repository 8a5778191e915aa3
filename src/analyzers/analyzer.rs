use std::sync::{Arc, OnceLock};

use tracing::{error, info, instrument, warn};

use crate::analyzers::aggregate::aggregate_regions;
use crate::analyzers::recommend::recommend;
use crate::analyzers::sanitize::CleanDataset;
use crate::analyzers::types::{AnalysisError, PipelineError, Recommendation, RegionAggregates};
use crate::config::AnalysisConfig;
use crate::dataset::{DatasetError, DatasetLoader};
use crate::record::CleanAccidentRecord;
use crate::severity::PredictionClass;

/// Aggregates clean records and evaluates the threshold rules against them.
pub fn analyze(
    records: &[CleanAccidentRecord],
    predicted: PredictionClass,
    settings: &AnalysisConfig,
) -> Result<Vec<Recommendation>, PipelineError> {
    let aggregates = aggregate_regions(records, settings);
    recommend(&aggregates, predicted, &settings.thresholds, settings.locale)
}

/// Runs the analytics pipeline over a historical dataset.
///
/// The cleaned dataset is built on first successful use and then shared
/// read-only by every later call. Load failures are not cached, so a dataset
/// that shows up later is picked up by the next call.
pub struct Pipeline<L> {
    loader: L,
    settings: AnalysisConfig,
    cache: OnceLock<Arc<CleanDataset>>,
}

impl<L: DatasetLoader> Pipeline<L> {
    pub fn new(loader: L, settings: AnalysisConfig) -> Self {
        Self {
            loader,
            settings,
            cache: OnceLock::new(),
        }
    }

    pub fn settings(&self) -> &AnalysisConfig {
        &self.settings
    }

    /// The cleaned historical dataset, loading and sanitizing it if needed.
    ///
    /// This is the listing surface used for map rendering.
    #[instrument(skip(self))]
    pub fn dataset(&self) -> Result<Arc<CleanDataset>, DatasetError> {
        if let Some(dataset) = self.cache.get() {
            return Ok(Arc::clone(dataset));
        }

        let raw = self.loader.load()?;
        let dataset = CleanDataset::build(&raw, &self.settings.bounds)?;

        if dataset.rejections.total() > 0 {
            warn!(
                rejected = dataset.rejections.total(),
                kept = dataset.len(),
                "Dropped invalid accident records"
            );
        }
        info!(records = dataset.len(), "Historical dataset ready");

        Ok(Arc::clone(self.cache.get_or_init(|| Arc::new(dataset))))
    }

    /// Per-region aggregates over the cleaned dataset.
    pub fn regions(&self) -> Result<RegionAggregates, AnalysisError> {
        let dataset = self.dataset()?;
        let aggregates = aggregate_regions(&dataset.records, &self.settings);
        for aggregate in aggregates.iter() {
            aggregate.validate()?;
        }
        Ok(aggregates)
    }

    /// Recommendations for a new incident of the given predicted class.
    ///
    /// Never fails: if the dataset is unavailable, or analysis fails, the
    /// result is a single error entry instead of the usual list.
    #[instrument(skip(self), fields(class = %predicted))]
    pub fn recommend(&self, predicted: PredictionClass) -> Vec<Recommendation> {
        self.recommend_with(predicted, analyze)
    }

    fn recommend_with<F>(&self, predicted: PredictionClass, analysis: F) -> Vec<Recommendation>
    where
        F: FnOnce(
            &[CleanAccidentRecord],
            PredictionClass,
            &AnalysisConfig,
        ) -> Result<Vec<Recommendation>, PipelineError>,
    {
        let locale = self.settings.locale;

        let dataset = match self.dataset() {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(error = %e, "Failed to load historical accident data");
                return vec![Recommendation::error(locale.dataset_unavailable())];
            }
        };

        match analysis(&dataset.records, predicted, &self.settings) {
            Ok(recommendations) => {
                info!(count = recommendations.len(), "Recommendations generated");
                recommendations
            }
            Err(e) => {
                error!(error = %e, "Failed to generate recommendations");
                vec![Recommendation::error(locale.generation_failed())]
            }
        }
    }
}
