pub mod analyzers;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod locale;
pub mod output;
pub mod parser;
pub mod record;
pub mod report;
pub mod severity;
