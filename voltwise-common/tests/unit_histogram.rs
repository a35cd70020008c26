use proptest::prelude::*;
use voltwise_common::{AnalyticsError, Histogram, SampleSet, DEFAULT_BINS};

fn build(values: &[f64], bins: usize) -> Histogram {
    Histogram::build(&SampleSet::ingest(values).unwrap(), bins).unwrap()
}

fn counts(h: &Histogram) -> Vec<u64> {
    h.iter().map(|b| b.count).collect()
}

#[test]
fn test_degenerate_input_fills_one_bin() {
    let h = build(&[500_000.0, 500_000.0, 500_000.0], 3);
    assert_eq!(h.len(), 3);
    assert_eq!(counts(&h), vec![3, 0, 0]);
    assert_eq!(h.iter().filter(|b| b.count > 0).count(), 1);
}

#[test]
fn test_uniform_input_spreads_evenly() {
    let values: Vec<f64> = (1..=9).map(|i| i as f64 * 100_000.0).collect();
    let h = build(&values, 3);
    assert_eq!(counts(&h), vec![3, 3, 3]);
}

#[test]
fn test_maximum_lands_in_last_bin() {
    let h = build(&[0.0, 0.1, 0.7, 1.0], 10);
    assert_eq!(h.bins()[9].count, 1);
    assert_eq!(h.total_count(), 4);
}

#[test]
fn test_edges_cover_range() {
    let h = build(&[10.0, 20.0, 50.0], 4);
    assert_eq!(h.bins()[0].bin_start, 10.0);
    assert_eq!(h.bins()[3].bin_end, 50.0);
    for bin in &h {
        assert!((bin.width() - 10.0).abs() < 1e-12);
    }
}

#[test]
fn test_last_edge_equals_max() {
    let set = SampleSet::ingest(&[-995_787.893_297_778_6, 890_541.391_107_844_7, 0.0]).unwrap();
    let h = Histogram::build(&set, 18).unwrap();
    let last = h.bins().last().unwrap();
    assert_eq!(last.bin_end, set.max());
    assert!(last.bin_start <= set.max() && set.max() <= last.bin_end);
    assert_eq!(last.count, 1);
}

#[test]
fn test_subnormal_spread_keeps_positive_widths() {
    let set = SampleSet::ingest(&[0.0, 5e-324]).unwrap();
    assert!(set.is_degenerate());
    let h = Histogram::build(&set, 40).unwrap();
    assert!(h.iter().all(|b| b.width() > 0.0));
    assert_eq!(h.total_count(), 2);
}

#[test]
fn test_tiny_normal_spread_is_widened_for_many_bins() {
    let h = build(&[0.0, 1e-306], 1_000);
    assert!(h.iter().all(|b| b.width() > 0.0));
    assert_eq!(h.total_count(), 2);
    assert_eq!(h.bins()[0].count, 2);
}

#[test]
fn test_one_ulp_spread_keeps_distinct_edges() {
    let lo = 1_000_000.0_f64;
    let hi = f64::from_bits(lo.to_bits() + 1);
    let h = build(&[lo, hi], 40);
    assert!(h.iter().all(|b| b.width() > 0.0));
    assert_eq!(h.bins()[0].bin_start, lo);
    assert_eq!(h.bins()[0].count, 2);
}

#[test]
fn test_default_bin_count() {
    let values: Vec<f64> = (0..1_000).map(|i| i as f64).collect();
    let h = build(&values, DEFAULT_BINS);
    assert_eq!(h.len(), 40);
    assert!(h.iter().all(|b| b.count == 25));
}

#[test]
fn test_zero_bins_is_invalid_input() {
    let set = SampleSet::ingest(&[1.0, 2.0]).unwrap();
    assert!(matches!(Histogram::build(&set, 0), Err(AnalyticsError::InvalidInput { .. })));
}

#[test]
fn test_extreme_opposite_values_do_not_overflow() {
    let h = build(&[-f64::MAX, 0.0, f64::MAX], 4);
    assert_eq!(h.total_count(), 3);
    assert!(h.iter().all(|b| b.bin_start.is_finite() && b.bin_end.is_finite()));
    assert_eq!(h.bins()[0].count, 1);
    assert_eq!(h.bins()[3].count, 1);
}

#[test]
fn test_elevated_indices() {
    let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
    let h = build(&values, 10);
    // bins start at 0, 9.9, 19.8, ... 89.1
    assert_eq!(h.elevated_indices(85.0), vec![9]);
    assert_eq!(h.elevated_indices(0.0).len(), 10);
    assert!(h.elevated_indices(1_000.0).is_empty());
}

#[test]
fn test_bin_label_in_lakh() {
    let h = build(&[250_000.0, 750_000.0], 2);
    assert_eq!(h.bins()[0].label(), "₹2.5L");
    assert_eq!(h.bins()[1].label(), "₹5.0L");
}

#[test]
fn test_json_shape() {
    let h = build(&[0.0, 2.0], 2);
    let json = serde_json::to_value(&h).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"binStart": 0.0, "binEnd": 1.0, "count": 1},
            {"binStart": 1.0, "binEnd": 2.0, "count": 1}
        ])
    );
}

#[test]
fn test_deterministic() {
    let values: Vec<f64> = (0..5_000).map(|i| ((i * 7919) % 1_000) as f64 * 13.7).collect();
    assert_eq!(build(&values, 40), build(&values, 40));
}

fn finite_vec(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(
        prop::num::f64::NORMAL.prop_filter("bounded", |x| x.abs() < 1e12),
        min_len..=max_len,
    )
}

fn dirty_vec() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(
        prop_oneof![
            8 => -1e9_f64..1e9,
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
            1 => Just(f64::NEG_INFINITY),
        ],
        1..=300,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn counts_sum_to_sanitized_len(data in dirty_vec(), bins in 1_usize..80) {
        if let Ok(set) = SampleSet::ingest(&data) {
            let h = Histogram::build(&set, bins).unwrap();
            prop_assert_eq!(h.total_count(), set.len() as u64);
            prop_assert_eq!(h.len(), bins);
        } else {
            prop_assert!(data.iter().all(|v| !v.is_finite()));
        }
    }

    #[test]
    fn bins_are_contiguous(data in finite_vec(1, 200), bins in 1_usize..80) {
        let h = build(&data, bins);
        for pair in h.bins().windows(2) {
            prop_assert_eq!(pair[0].bin_end, pair[1].bin_start);
        }
    }

    #[test]
    fn every_sample_is_inside_its_range(data in finite_vec(1, 200), bins in 1_usize..80) {
        let set = SampleSet::ingest(&data).unwrap();
        let h = Histogram::build(&set, bins).unwrap();
        let bins = h.bins();
        prop_assert_eq!(bins[0].bin_start, set.min());
        prop_assert_eq!(bins[bins.len() - 1].bin_end, set.max());

        let last = bins.len() - 1;
        let mut recount = vec![0u64; bins.len()];
        for &v in &data {
            let home = bins.iter().enumerate().position(|(i, b)| {
                b.bin_start <= v && (v < b.bin_end || (i == last && v <= b.bin_end))
            });
            prop_assert!(home.is_some(), "{} lies outside every bin", v);
            recount[home.unwrap()] += 1;
        }
        prop_assert_eq!(recount, counts(&h));
    }

    #[test]
    fn bin_widths_are_positive(data in finite_vec(1, 200), bins in 1_usize..80) {
        let h = build(&data, bins);
        prop_assert!(h.iter().all(|b| b.width() > 0.0));
    }
}
