//! CLI entry point for the accident advisor.
//!
//! Provides subcommands for assessing a new incident, listing the cleaned
//! historical dataset, and exporting per-region accident statistics.

use accident_advisor::analyzers::analyzer::Pipeline;
use accident_advisor::classifier::{
    ApiKey, BasicClient, Classifier, FixedClassifier, HttpClassifier, IncidentFeatures, Prediction,
};
use accident_advisor::config::AppConfig;
use accident_advisor::dataset::JsonFileLoader;
use accident_advisor::output::{print_pretty, write_json, write_listing, write_regions_csv};
use accident_advisor::report::PredictionReport;
use accident_advisor::severity::PredictionClass;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "accident_advisor")]
#[command(about = "Assess accident severity and derive regional safety recommendations", long_about = None)]
struct Cli {
    /// TOML config file (defaults to ./accident_advisor.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a new incident and print the report with recommendations
    Predict {
        #[command(flatten)]
        features: FeatureArgs,

        /// Skip the classifier and use this class id (0 = fatal, 1 = severe, 2 = light)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=2))]
        class: Option<i64>,
    },
    /// Print the cleaned historical dataset as JSON
    Accidents,
    /// Print per-region accident statistics
    Regions {
        /// Write the statistics to this CSV file instead of stdout
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FeatureArgs {
    /// Road type (sug_dereh)
    #[arg(long)]
    road_type: i64,
    /// Month of the year (hodesh_teuna)
    #[arg(long)]
    month: i64,
    /// Day/night flag (yom_layla)
    #[arg(long)]
    day_night: i64,
    /// Day of the week (yom_bashavua)
    #[arg(long)]
    day_of_week: i64,
    /// Accident type (sug_teuna)
    #[arg(long)]
    accident_type: i64,
    /// Speed limit (mehirut_muteret)
    #[arg(long)]
    speed_limit: i64,
    /// Road condition (tkinut)
    #[arg(long)]
    road_condition: i64,
    /// Signage (simun_timrur)
    #[arg(long)]
    signage: i64,
    /// Lighting (teura)
    #[arg(long)]
    lighting: i64,
    /// Weather (mezeg_avir)
    #[arg(long)]
    weather: i64,
    /// Road surface (pne_kvish)
    #[arg(long)]
    road_surface: i64,
    /// Reporting district (mahoz)
    #[arg(long, default_value = "")]
    district: String,
}

impl From<FeatureArgs> for IncidentFeatures {
    fn from(a: FeatureArgs) -> Self {
        Self {
            road_type: a.road_type,
            month: a.month,
            day_night: a.day_night,
            day_of_week: a.day_of_week,
            accident_type: a.accident_type,
            speed_limit: a.speed_limit,
            road_condition: a.road_condition,
            signage: a.signage,
            lighting: a.lighting,
            weather: a.weather,
            road_surface: a.road_surface,
            district: a.district,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/accident_advisor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("accident_advisor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("RUST_LOG")
                .from_env_lossy(),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .with_env_var("RUST_LOG_JSON")
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let pipeline = Pipeline::new(
        JsonFileLoader::new(config.dataset.path.clone()),
        config.analysis.clone(),
    );
    let stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Predict { features, class } => {
            let features = IncidentFeatures::from(features);
            let classifier = build_classifier(&config, class)?;

            let prediction = classifier.predict(&features.to_vector()).await?;
            info!(
                class = %prediction.class,
                probability = prediction.probability(prediction.class),
                "Incident classified"
            );

            let recommendations = pipeline.recommend(prediction.class);
            let report = PredictionReport::new(
                &prediction,
                &features.district,
                &config.metrics,
                config.analysis.locale,
                recommendations,
            );
            print_pretty(&report);
            write_json(stdout, &report)?;
        }
        Commands::Accidents => {
            if !write_listing(stdout, &pipeline)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Regions { csv } => {
            let aggregates = match pipeline.regions() {
                Ok(aggregates) => aggregates,
                Err(e) => {
                    error!(error = %e, "Failed to aggregate accident data");
                    return Ok(ExitCode::FAILURE);
                }
            };

            match csv {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    write_regions_csv(file, &aggregates)?;
                    info!(path = %path.display(), regions = aggregates.len(), "Region CSV written");
                }
                None => write_json(stdout, &aggregates)?,
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Picks the classifier: a fixed class when one is given on the command line,
/// otherwise the configured model server.
fn build_classifier(config: &AppConfig, class: Option<i64>) -> Result<Box<dyn Classifier>> {
    if let Some(id) = class.and_then(PredictionClass::from_id) {
        info!(class = %id, "Using class from command line");
        return Ok(Box::new(FixedClassifier(Prediction::certain(id))));
    }

    let endpoint = config
        .classifier
        .endpoint
        .as_deref()
        .context("no classifier endpoint configured; set CLASSIFIER_URL or pass --class")?;
    let client = BasicClient::with_timeout(Duration::from_secs(config.classifier.timeout_secs))?;

    match &config.classifier.api_key {
        Some(key) => {
            let client = ApiKey::for_header(client, &config.classifier.api_key_header, key)?;
            Ok(Box::new(HttpClassifier::new(client, endpoint)?))
        }
        None => Ok(Box::new(HttpClassifier::new(client, endpoint)?)),
    }
}
