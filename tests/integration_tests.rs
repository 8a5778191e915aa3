use accident_advisor::analyzers::analyzer::Pipeline;
use accident_advisor::analyzers::types::RecommendationKind;
use accident_advisor::classifier::{BasicClient, Classifier, HttpClassifier, IncidentFeatures};
use accident_advisor::config::AnalysisConfig;
use accident_advisor::dataset::JsonFileLoader;
use accident_advisor::output::write_listing;
use accident_advisor::severity::PredictionClass;
use std::io::Write;

fn accident(region: &str, severity: u8, lat: &str) -> String {
    format!(
        r#"{{"mahoz": "{region}", "humrat_teuna": {severity}, "shnat_teuna": 2021,
            "hodesh_teuna": 3, "yom_bashavua": 4, "yom_layla": 1, "tkinut": NaN,
            "simun_timrur": null, "teura": 1, "latitude": "{lat}", "longitude": 35.0}}"#
    )
}

fn dataset_file(entries: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[{}]", entries.join(",")).unwrap();
    file
}

#[test]
fn test_full_pipeline_from_file() {
    let mut entries: Vec<String> = (0..4).map(|_| accident("North", 2, "32.9")).collect();
    entries.extend((0..6).map(|_| accident("North", 1, "32.9")));
    // Rejected: outside the bounding box, so it must not dilute the ratio.
    entries.push(accident("North", 1, "40.0"));
    let file = dataset_file(&entries);

    let pipeline = Pipeline::new(JsonFileLoader::new(file.path()), AnalysisConfig::default());
    let out = pipeline.recommend(PredictionClass::Fatal);

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].kind, RecommendationKind::PredictionBased);
    assert_eq!(out[1].kind, RecommendationKind::HighSeverity);
    assert_eq!(out[1].region.as_deref(), Some("North"));

    let dataset = pipeline.dataset().unwrap();
    assert_eq!(dataset.len(), 10);
    assert_eq!(dataset.rejections.total(), 1);
}

#[test]
fn test_listing_replaces_nan_with_null() {
    let file = dataset_file(&[accident("South", 1, "30.5")]);
    let pipeline = Pipeline::new(JsonFileLoader::new(file.path()), AnalysisConfig::default());

    let dataset = pipeline.dataset().unwrap();
    let json = serde_json::to_value(&dataset.records).unwrap();

    assert_eq!(json[0]["tkinut"], serde_json::Value::Null);
    assert_eq!(json[0]["latitude"], 30.5);
    assert_eq!(json[0]["mahoz"], "South");
}

#[test]
fn test_missing_dataset_degrades() {
    let pipeline = Pipeline::new(
        JsonFileLoader::new("/nonexistent/accidents.json"),
        AnalysisConfig::default(),
    );

    let out = pipeline.recommend(PredictionClass::Severe);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].kind, RecommendationKind::Error);
    assert!(pipeline.dataset().is_err());
}

#[test]
fn test_empty_dataset_degrades() {
    let file = dataset_file(&[]);
    let pipeline = Pipeline::new(JsonFileLoader::new(file.path()), AnalysisConfig::default());

    let out = pipeline.recommend(PredictionClass::Fatal);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].kind, RecommendationKind::Error);
}

fn listing(path: &std::path::Path) -> (bool, serde_json::Value) {
    let pipeline = Pipeline::new(JsonFileLoader::new(path), AnalysisConfig::default());
    let mut buf = Vec::new();
    let ok = write_listing(&mut buf, &pipeline).unwrap();
    (ok, serde_json::from_slice(&buf).unwrap())
}

#[test]
fn test_listing_returns_cleaned_records() {
    let file = dataset_file(&[accident("North", 1, "32.9"), accident("North", 1, "40.0")]);
    let (ok, body) = listing(file.path());

    assert!(ok);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["mahoz"], "North");
}

#[test]
fn test_listing_reports_missing_dataset() {
    let (ok, body) = listing(std::path::Path::new("/nonexistent/accidents.json"));

    assert!(!ok);
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(object["error"].as_str().unwrap().contains("not found"));
}

#[test]
fn test_listing_reports_fully_rejected_dataset() {
    let file = dataset_file(&[accident("North", 1, "40.0"), accident("South", 2, "10.0")]);
    let (ok, body) = listing(file.path());

    assert!(!ok);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("no valid accident records"));
}

#[tokio::test]
async fn test_classifier_to_recommendations() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/predict")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"class_id": 2, "probabilities": [0.05, 0.15, 0.8]}"#)
        .create_async()
        .await;

    let classifier =
        HttpClassifier::new(BasicClient::new(), &format!("{}/predict", server.url())).unwrap();
    let features = IncidentFeatures {
        month: 6,
        speed_limit: 50,
        district: "North".into(),
        ..Default::default()
    };
    let prediction = classifier.predict(&features.to_vector()).await.unwrap();
    assert_eq!(prediction.class, PredictionClass::Light);

    let entries: Vec<String> = ["B", "A", "B", "C"]
        .iter()
        .map(|region| accident(region, 3, "31.7"))
        .collect();
    let file = dataset_file(&entries);
    let pipeline = Pipeline::new(JsonFileLoader::new(file.path()), AnalysisConfig::default());

    let out = pipeline.recommend(prediction.class);
    let regions: Vec<_> = out.iter().filter_map(|r| r.region.as_deref()).collect();
    assert_eq!(regions, ["B", "A", "C"]);
    assert!(out.iter().all(|r| r.kind == RecommendationKind::HighSeverity));
}
