//! Data types used by the analytics pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::analyzers::utility::ratio;
use crate::dataset::DatasetError;

/// Category of a recommendation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    PredictionBased,
    HighSeverity,
    Infrastructure,
    Signage,
    Lighting,
    Error,
}

/// A per-region threshold rule, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    HighSeverity,
    Infrastructure,
    Signage,
    Lighting,
}

impl Rule {
    pub const ALL: [Rule; 4] = [
        Rule::HighSeverity,
        Rule::Infrastructure,
        Rule::Signage,
        Rule::Lighting,
    ];

    pub fn kind(self) -> RecommendationKind {
        match self {
            Rule::HighSeverity => RecommendationKind::HighSeverity,
            Rule::Infrastructure => RecommendationKind::Infrastructure,
            Rule::Signage => RecommendationKind::Signage,
            Rule::Lighting => RecommendationKind::Lighting,
        }
    }
}

/// One entry of the recommendation list handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub text: String,
}

impl Recommendation {
    pub fn for_region(rule: Rule, region: &str, text: String) -> Self {
        Self {
            kind: rule.kind(),
            region: Some(region.to_string()),
            text,
        }
    }

    pub fn prediction_based(text: &str) -> Self {
        Self {
            kind: RecommendationKind::PredictionBased,
            region: None,
            text: text.to_string(),
        }
    }

    pub fn error(text: &str) -> Self {
        Self {
            kind: RecommendationKind::Error,
            region: None,
            text: text.to_string(),
        }
    }
}

/// Accident counts for a single region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionAggregate {
    pub region: String,
    pub total: usize,
    pub severe_fatal: usize,
    pub infrastructure_issues: usize,
    pub signage_issues: usize,
    pub lighting_issues: usize,
}

impl RegionAggregate {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    /// Sub-count ratios, or `None` for an empty region.
    pub fn ratios(&self) -> Option<RegionRatios> {
        Some(RegionRatios {
            severe_fatal: ratio(self.severe_fatal, self.total)?,
            infrastructure: ratio(self.infrastructure_issues, self.total)?,
            signage: ratio(self.signage_issues, self.total)?,
            lighting: ratio(self.lighting_issues, self.total)?,
        })
    }

    /// Checks that no sub-count exceeds the total.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let counters = [
            ("severe_fatal", self.severe_fatal),
            ("infrastructure_issues", self.infrastructure_issues),
            ("signage_issues", self.signage_issues),
            ("lighting_issues", self.lighting_issues),
        ];

        for (counter, count) in counters {
            if count > self.total {
                return Err(PipelineError::InconsistentAggregate {
                    region: self.region.clone(),
                    counter,
                    count,
                    total: self.total,
                });
            }
        }

        Ok(())
    }
}

/// Sub-count to total ratios for one region, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionRatios {
    pub severe_fatal: f64,
    pub infrastructure: f64,
    pub signage: f64,
    pub lighting: f64,
}

/// Per-region aggregates in the order regions were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionAggregates {
    entries: Vec<RegionAggregate>,
    index: HashMap<String, usize>,
}

impl RegionAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `region`, appending a fresh one on first sight.
    pub fn entry(&mut self, region: &str) -> &mut RegionAggregate {
        let idx = match self.index.get(region) {
            Some(&idx) => idx,
            None => {
                self.entries.push(RegionAggregate::new(region));
                self.index.insert(region.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    pub fn get(&self, region: &str) -> Option<&RegionAggregate> {
        self.index.get(region).map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionAggregate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<RegionAggregate> for RegionAggregates {
    /// Later duplicates of a region replace earlier ones in place.
    fn from_iter<I: IntoIterator<Item = RegionAggregate>>(iter: I) -> Self {
        let mut aggregates = Self::new();
        for aggregate in iter {
            let region = aggregate.region.clone();
            *aggregates.entry(&region) = aggregate;
        }
        aggregates
    }
}

impl Serialize for RegionAggregates {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Failures inside aggregation or rule evaluation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("region {region}: {counter} count {count} exceeds total {total}")]
    InconsistentAggregate {
        region: String,
        counter: &'static str,
        count: usize,
        total: usize,
    },
}

/// Anything that keeps the pipeline from producing real output.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
