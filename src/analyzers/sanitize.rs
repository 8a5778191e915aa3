//! Record validation and cleaning.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::GeoBounds;
use crate::dataset::DatasetError;
use crate::record::{AccidentRecord, CleanAccidentRecord, fields};

/// Why a single record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum RejectReason {
    #[error("coordinate `{0}` is missing")]
    MissingCoordinate(&'static str),

    #[error("coordinate `{0}` is not a number")]
    InvalidCoordinate(&'static str),

    #[error("coordinates are outside the bounding box")]
    OutOfBounds,

    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
}

/// Validates one raw record.
///
/// Coordinates given as strings are parsed; the record is rejected if either
/// coordinate is missing, unparsable, NaN, or outside `bounds`, or if any
/// field in [`fields::REQUIRED`] is null. Passthrough fields are kept as-is.
pub fn sanitize(
    raw: &AccidentRecord,
    bounds: &GeoBounds,
) -> Result<CleanAccidentRecord, RejectReason> {
    let latitude = coordinate(raw, fields::LATITUDE)?;
    let longitude = coordinate(raw, fields::LONGITUDE)?;

    if !bounds.contains(latitude, longitude) {
        return Err(RejectReason::OutOfBounds);
    }

    for name in fields::REQUIRED {
        if raw.get(name).is_none_or(Value::is_null) {
            return Err(RejectReason::MissingField(name));
        }
    }

    let mut values = raw.fields().clone();
    values.insert(fields::LATITUDE.to_string(), Value::from(latitude));
    values.insert(fields::LONGITUDE.to_string(), Value::from(longitude));

    Ok(CleanAccidentRecord {
        latitude,
        longitude,
        fields: values,
    })
}

fn coordinate(raw: &AccidentRecord, name: &'static str) -> Result<f64, RejectReason> {
    let value = match raw.get(name) {
        None | Some(Value::Null) => return Err(RejectReason::MissingCoordinate(name)),
        Some(Value::Number(n)) => n.as_f64().ok_or(RejectReason::InvalidCoordinate(name))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| RejectReason::InvalidCoordinate(name))?,
        Some(_) => return Err(RejectReason::InvalidCoordinate(name)),
    };

    if value.is_nan() {
        return Err(RejectReason::MissingCoordinate(name));
    }
    Ok(value)
}

/// Rejection counts per reason, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionTally {
    by_reason: BTreeMap<RejectReason, usize>,
}

impl RejectionTally {
    pub fn record(&mut self, reason: RejectReason) {
        *self.by_reason.entry(reason).or_default() += 1;
    }

    pub fn total(&self) -> usize {
        self.by_reason.values().sum()
    }

    pub fn count(&self, reason: RejectReason) -> usize {
        self.by_reason.get(&reason).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RejectReason, usize)> + '_ {
        self.by_reason.iter().map(|(reason, count)| (*reason, *count))
    }
}

/// The cleaned historical dataset, shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct CleanDataset {
    pub records: Vec<CleanAccidentRecord>,
    pub rejections: RejectionTally,
}

impl CleanDataset {
    /// Sanitizes every record, keeping the successes.
    pub fn sanitize_all<'a>(
        records: impl IntoIterator<Item = &'a AccidentRecord>,
        bounds: &GeoBounds,
    ) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut dataset, raw| {
                match sanitize(raw, bounds) {
                    Ok(clean) => dataset.records.push(clean),
                    Err(reason) => {
                        trace!(%reason, "Record rejected");
                        dataset.rejections.record(reason);
                    }
                }
                dataset
            })
    }

    /// Like [`CleanDataset::sanitize_all`], but fails when nothing survives.
    pub fn build(records: &[AccidentRecord], bounds: &GeoBounds) -> Result<Self, DatasetError> {
        let dataset = Self::sanitize_all(records, bounds);

        for (reason, count) in dataset.rejections.iter() {
            debug!(%reason, count, "Rejected records");
        }

        if dataset.records.is_empty() {
            return Err(DatasetError::NoValidRecords {
                rejected: dataset.rejections.total(),
            });
        }

        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> AccidentRecord {
        AccidentRecord::new()
            .with("mahoz", "North")
            .with("humrat_teuna", 2)
            .with("shnat_teuna", 2020)
            .with("hodesh_teuna", 5)
            .with("yom_bashavua", 3)
            .with("yom_layla", 1)
            .with("latitude", 32.1)
            .with("longitude", 34.8)
    }

    fn at(lat: f64, lng: f64) -> AccidentRecord {
        valid().with("latitude", lat).with("longitude", lng)
    }

    #[test]
    fn test_accepts_valid_record() {
        let clean = sanitize(&valid(), &GeoBounds::default()).unwrap();

        assert_eq!(clean.latitude(), 32.1);
        assert_eq!(clean.longitude(), 34.8);
        assert_eq!(clean.region().as_deref(), Some("North"));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let bounds = GeoBounds::default();
        let once = sanitize(&valid().with("latitude", "32.1"), &bounds).unwrap();
        let twice = sanitize(&AccidentRecord::from(once.clone()), &bounds).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_geo_boundaries_are_inclusive() {
        let bounds = GeoBounds::default();

        assert!(sanitize(&at(29.0, 35.0), &bounds).is_ok());
        assert!(sanitize(&at(34.0, 35.0), &bounds).is_ok());
        assert!(sanitize(&at(32.0, 34.0), &bounds).is_ok());
        assert!(sanitize(&at(32.0, 36.0), &bounds).is_ok());

        assert_eq!(
            sanitize(&at(28.999, 35.0), &bounds),
            Err(RejectReason::OutOfBounds)
        );
        assert_eq!(
            sanitize(&at(32.0, 36.001), &bounds),
            Err(RejectReason::OutOfBounds)
        );
    }

    #[test]
    fn test_coerces_string_coordinates() {
        let record = valid().with("latitude", " 31.5 ").with("longitude", "35");
        let clean = sanitize(&record, &GeoBounds::default()).unwrap();

        assert_eq!(clean.latitude(), 31.5);
        assert_eq!(clean.fields()["longitude"], json!(35.0));
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        let bounds = GeoBounds::default();

        assert_eq!(
            sanitize(&valid().with("latitude", "north-ish"), &bounds),
            Err(RejectReason::InvalidCoordinate("latitude"))
        );
        assert_eq!(
            sanitize(&valid().with("longitude", "NaN"), &bounds),
            Err(RejectReason::MissingCoordinate("longitude"))
        );
        assert_eq!(
            sanitize(&valid().with("latitude", json!(null)), &bounds),
            Err(RejectReason::MissingCoordinate("latitude"))
        );
        assert_eq!(
            sanitize(&valid().with("latitude", json!([32.0])), &bounds),
            Err(RejectReason::InvalidCoordinate("latitude"))
        );

        let mut missing = valid().into_fields();
        missing.remove("longitude");
        assert_eq!(
            sanitize(&AccidentRecord::from(missing), &bounds),
            Err(RejectReason::MissingCoordinate("longitude"))
        );
    }

    #[test]
    fn test_rejects_each_missing_required_field() {
        let bounds = GeoBounds::default();

        for name in fields::REQUIRED {
            let mut record = valid().into_fields();
            record.remove(name);
            assert_eq!(
                sanitize(&AccidentRecord::from(record), &bounds),
                Err(RejectReason::MissingField(name))
            );

            assert_eq!(
                sanitize(&valid().with(name, json!(null)), &bounds),
                Err(RejectReason::MissingField(name))
            );
        }
    }

    #[test]
    fn test_unrelated_missing_field_is_accepted() {
        let mut record = valid().into_fields();
        record.remove("mahoz");
        let record = AccidentRecord::from(record).with("teura", json!(null));

        assert!(sanitize(&record, &GeoBounds::default()).is_ok());
    }

    #[test]
    fn test_passthrough_fields_survive() {
        let record = valid().with("sug_dereh", 4).with("note", "kept");
        let clean = sanitize(&record, &GeoBounds::default()).unwrap();

        assert_eq!(clean.fields()["sug_dereh"], json!(4));
        assert_eq!(clean.fields()["note"], json!("kept"));
    }

    #[test]
    fn test_sanitize_all_tallies_rejections() {
        let records = vec![
            valid(),
            at(10.0, 10.0),
            at(10.0, 10.0),
            valid().with("yom_layla", json!(null)),
            valid(),
        ];
        let dataset = CleanDataset::sanitize_all(&records, &GeoBounds::default());

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rejections.total(), 3);
        assert_eq!(dataset.rejections.count(RejectReason::OutOfBounds), 2);
        assert_eq!(
            dataset
                .rejections
                .count(RejectReason::MissingField("yom_layla")),
            1
        );
    }

    #[test]
    fn test_build_fails_without_valid_records() {
        let records = vec![at(10.0, 10.0)];
        let err = CleanDataset::build(&records, &GeoBounds::default()).unwrap_err();

        assert!(matches!(err, DatasetError::NoValidRecords { rejected: 1 }));
        assert!(matches!(
            CleanDataset::build(&[], &GeoBounds::default()),
            Err(DatasetError::NoValidRecords { rejected: 0 })
        ));
    }
}
