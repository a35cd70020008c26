use serde_json::json;
use voltwise_common::ingest::DEGENERATE_SPAN;
use voltwise_common::{AnalyticsError, SampleSet};

#[test]
fn test_ingest_discards_invalid_json_entries() {
    let raw = json!([1, "bad", null, "Infinity", 3]);
    let set = SampleSet::from_json(&raw).unwrap();
    assert_eq!(set.values(), &[1.0, 3.0]);
    assert_eq!(set.min(), 1.0);
    assert_eq!(set.max(), 3.0);
    assert_eq!(set.raw_len(), 5);
    assert_eq!(set.discarded(), 3);
    assert!(!set.is_degenerate());
}

#[test]
fn test_ingest_discards_non_finite_floats() {
    let set = SampleSet::ingest(&[1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 3.0]).unwrap();
    assert_eq!(set.values(), &[1.0, 3.0]);
    assert_eq!((set.min(), set.max()), (1.0, 3.0));
}

#[test]
fn test_ingest_coerces_numeric_strings() {
    let set = SampleSet::from_json(&json!(["250000", 100000, " 175000.5 "])).unwrap();
    assert_eq!(set.values(), &[250_000.0, 100_000.0, 175_000.5]);
    assert_eq!(set.min(), 100_000.0);
    assert_eq!(set.max(), 250_000.0);
}

#[test]
fn test_ingest_preserves_order() {
    let set = SampleSet::ingest(&[3.0, 1.0, 2.0]).unwrap();
    assert_eq!(set.values(), &[3.0, 1.0, 2.0]);
}

#[test]
fn test_ingest_empty_is_empty_dataset() {
    let empty: [f64; 0] = [];
    assert_eq!(SampleSet::ingest(&empty), Err(AnalyticsError::EmptyDataset { discarded: 0 }));
}

#[test]
fn test_ingest_all_invalid_is_empty_dataset() {
    let err = SampleSet::from_json(&json!(["x", null, true, {"a": 1}])).unwrap_err();
    assert_eq!(err, AnalyticsError::EmptyDataset { discarded: 4 });
}

#[test]
fn test_ingest_non_array_is_invalid_input() {
    for raw in [json!(null), json!(42), json!("1,2,3"), json!({"costs": [1, 2]})] {
        let err = SampleSet::from_json(&raw).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput { .. }), "{raw} should be rejected");
    }
}

#[test]
fn test_ingest_degenerate_range_is_widened() {
    let set = SampleSet::ingest(&[500_000.0, 500_000.0, 500_000.0]).unwrap();
    assert!(set.is_degenerate());
    assert_eq!(set.min(), 500_000.0);
    assert_eq!(set.max(), 500_000.0 + DEGENERATE_SPAN);
    assert_eq!(set.len(), 3);
}

#[test]
fn test_ingest_single_value_is_degenerate() {
    let set = SampleSet::ingest(&[42.0]).unwrap();
    assert!(set.is_degenerate());
    assert!(set.max() > set.min());
}

#[test]
fn test_ingest_large_input_single_pass() {
    let raw: Vec<f64> = (0..100_000).map(|i| i as f64).collect();
    let set = SampleSet::ingest(&raw).unwrap();
    assert_eq!(set.len(), 100_000);
    assert_eq!(set.min(), 0.0);
    assert_eq!(set.max(), 99_999.0);
}

#[test]
fn test_mean_of_samples() {
    let set = SampleSet::ingest(&[100.0, 200.0, 300.0, f64::NAN]).unwrap();
    assert_eq!(set.mean(), 200.0);
}

#[test]
fn test_mean_does_not_overflow_near_f64_max() {
    let set = SampleSet::ingest(&[1e308, 1e308]).unwrap();
    assert_eq!(set.mean(), 1e308);

    let set = SampleSet::ingest(&[f64::MAX, f64::MAX / 2.0]).unwrap();
    assert!(set.mean().is_finite());
    assert!(set.mean() > f64::MAX / 2.0);
}
