//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing, JSON serialization, the accident listing
//! response, and CSV export of region aggregates.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, error};

use crate::analyzers::analyzer::Pipeline;
use crate::analyzers::types::{RegionAggregate, RegionAggregates};
use crate::analyzers::utility::ratio;
use crate::dataset::DatasetLoader;
use crate::record::CleanAccidentRecord;
use csv::WriterBuilder;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Writes a value as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write>(mut writer: W, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Body of the accident listing: the cleaned records, or `{"error": "..."}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ListingResponse<'a> {
    Records(&'a [CleanAccidentRecord]),
    Error { error: String },
}

/// Writes the accident listing for `pipeline`.
///
/// Returns `false` when the dataset could not be loaded, in which case the
/// error payload was written instead of the records.
pub fn write_listing<W: Write, L: DatasetLoader>(
    writer: W,
    pipeline: &Pipeline<L>,
) -> Result<bool> {
    match pipeline.dataset() {
        Ok(dataset) => {
            write_json(writer, &ListingResponse::Records(&dataset.records))?;
            Ok(true)
        }
        Err(e) => {
            error!(error = %e, "Failed to load accident data");
            write_json(
                writer,
                &ListingResponse::Error {
                    error: e.to_string(),
                },
            )?;
            Ok(false)
        }
    }
}

/// One CSV row: the raw counts plus their ratios.
#[derive(Serialize)]
struct RegionRow<'a> {
    region: &'a str,
    total: usize,
    severe_fatal: usize,
    infrastructure_issues: usize,
    signage_issues: usize,
    lighting_issues: usize,
    severe_fatal_ratio: Option<f64>,
    infrastructure_ratio: Option<f64>,
    signage_ratio: Option<f64>,
    lighting_ratio: Option<f64>,
}

impl<'a> From<&'a RegionAggregate> for RegionRow<'a> {
    fn from(a: &'a RegionAggregate) -> Self {
        Self {
            region: &a.region,
            total: a.total,
            severe_fatal: a.severe_fatal,
            infrastructure_issues: a.infrastructure_issues,
            signage_issues: a.signage_issues,
            lighting_issues: a.lighting_issues,
            severe_fatal_ratio: ratio(a.severe_fatal, a.total),
            infrastructure_ratio: ratio(a.infrastructure_issues, a.total),
            signage_ratio: ratio(a.signage_issues, a.total),
            lighting_ratio: ratio(a.lighting_issues, a.total),
        }
    }
}

/// Writes region aggregates as CSV with a header row, in region order.
pub fn write_regions_csv<W: Write>(writer: W, aggregates: &RegionAggregates) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for aggregate in aggregates.iter() {
        writer.serialize(RegionRow::from(aggregate))?;
    }
    writer.flush()?;

    debug!(regions = aggregates.len(), "Wrote region CSV");
    Ok(())
}
