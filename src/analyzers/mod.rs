//! Accident analytics pipeline.
//!
//! Raw records are sanitized, aggregated per region, and checked against
//! ratio thresholds to produce safety recommendations for a new incident.

pub mod aggregate;
pub mod analyzer;
pub mod recommend;
pub mod sanitize;
pub mod types;
pub mod utility;
