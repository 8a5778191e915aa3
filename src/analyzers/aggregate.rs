use crate::analyzers::types::RegionAggregates;
use crate::config::AnalysisConfig;
use crate::record::{CleanAccidentRecord, fields};

/// Coded values that count toward each sub-counter.
static SEVERE_FATAL_CODES: &[i64] = &[2, 3];
static INFRASTRUCTURE_CODES: &[i64] = &[2, 3, 4];
static SIGNAGE_CODES: &[i64] = &[1, 2];
static LIGHTING_CODES: &[i64] = &[2, 5];

/// Aggregates clean records into per-region counts.
///
/// Records without a region, or whose region is one of the configured
/// unknown sentinels, are skipped. Sub-counters are independent: a single
/// record can increment several of them. Regions keep first-seen order.
pub fn aggregate_regions(
    records: &[CleanAccidentRecord],
    settings: &AnalysisConfig,
) -> RegionAggregates {
    let mut aggregates = RegionAggregates::new();

    for record in records {
        let Some(region) = record.region() else {
            continue;
        };
        if settings.is_unknown_region(&region) {
            continue;
        }

        let matches = |name: &str, codes: &[i64]| {
            record
                .code(name)
                .is_some_and(|code| codes.contains(&code))
        };

        let entry = aggregates.entry(&region);
        entry.total += 1;

        if matches(fields::SEVERITY, SEVERE_FATAL_CODES) {
            entry.severe_fatal += 1;
        }
        if matches(fields::ROAD_CONDITION, INFRASTRUCTURE_CODES) {
            entry.infrastructure_issues += 1;
        }
        if matches(fields::SIGNAGE, SIGNAGE_CODES) {
            entry.signage_issues += 1;
        }
        if matches(fields::LIGHTING, LIGHTING_CODES) {
            entry.lighting_issues += 1;
        }
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::sanitize::sanitize;
    use crate::config::GeoBounds;
    use crate::record::AccidentRecord;
    use serde_json::{Value, json};

    fn record(region: impl Into<Value>) -> AccidentRecord {
        AccidentRecord::new()
            .with("mahoz", region)
            .with("humrat_teuna", 1)
            .with("shnat_teuna", 2021)
            .with("hodesh_teuna", 1)
            .with("yom_bashavua", 1)
            .with("yom_layla", 1)
            .with("latitude", 31.0)
            .with("longitude", 35.0)
    }

    fn clean(records: Vec<AccidentRecord>) -> Vec<CleanAccidentRecord> {
        records
            .iter()
            .map(|r| sanitize(r, &GeoBounds::default()).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_input_yields_empty_mapping() {
        let aggregates = aggregate_regions(&[], &AnalysisConfig::default());
        assert!(aggregates.is_empty());
    }

    #[test]
    fn test_skips_unknown_and_empty_regions() {
        let records = clean(vec![
            record("לא ידוע"),
            record("unknown"),
            record(""),
            record(json!(null)),
            record("South"),
        ]);
        let aggregates = aggregate_regions(&records, &AnalysisConfig::default());

        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates.get("South").unwrap().total, 1);
    }

    #[test]
    fn test_numeric_regions_merge_integral_forms() {
        let records = clean(vec![
            record(json!(4)).with("humrat_teuna", 2),
            record(json!(4.0)).with("humrat_teuna", 3),
        ]);
        let aggregates = aggregate_regions(&records, &AnalysisConfig::default());

        assert_eq!(aggregates.len(), 1);
        let four = aggregates.get("4").unwrap();
        assert_eq!(four.total, 2);
        assert_eq!(four.severe_fatal, 2);
    }

    #[test]
    fn test_sub_counters_are_additive() {
        let records = clean(vec![
            record("North").with("humrat_teuna", 3).with("tkinut", 2),
            record("North").with("humrat_teuna", 2.0).with("simun_timrur", 1),
            record("North").with("teura", 5).with("tkinut", 4).with("simun_timrur", 2),
            record("North").with("teura", 2),
            record("North").with("tkinut", 1).with("teura", 1).with("simun_timrur", 3),
        ]);
        let aggregates = aggregate_regions(&records, &AnalysisConfig::default());
        let north = aggregates.get("North").unwrap();

        assert_eq!(north.total, 5);
        assert_eq!(north.severe_fatal, 2);
        assert_eq!(north.infrastructure_issues, 2);
        assert_eq!(north.signage_issues, 2);
        assert_eq!(north.lighting_issues, 2);
        assert!(north.validate().is_ok());
    }

    #[test]
    fn test_one_record_can_hit_every_counter() {
        let records = clean(vec![
            record("Center")
                .with("humrat_teuna", 3)
                .with("tkinut", 3)
                .with("simun_timrur", 1)
                .with("teura", 2),
        ]);
        let aggregates = aggregate_regions(&records, &AnalysisConfig::default());
        let center = aggregates.get("Center").unwrap();

        assert_eq!(
            (
                center.total,
                center.severe_fatal,
                center.infrastructure_issues,
                center.signage_issues,
                center.lighting_issues
            ),
            (1, 1, 1, 1, 1)
        );
    }

    #[test]
    fn test_preserves_first_seen_order() {
        let records = clean(vec![record("B"), record("A"), record("B"), record("C")]);
        let aggregates = aggregate_regions(&records, &AnalysisConfig::default());

        let order: Vec<_> = aggregates.iter().map(|a| a.region.as_str()).collect();
        assert_eq!(order, ["B", "A", "C"]);
    }
}
