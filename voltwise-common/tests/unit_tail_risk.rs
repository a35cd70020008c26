use voltwise_common::{Jurisdiction, RiskBand, RiskRatio, TailEvent, TailEventView, TailRiskSummary};

#[test]
fn test_zero_expected_is_undefined() {
    let ratio = RiskRatio::compute(500_000.0, 0.0);
    assert_eq!(ratio, RiskRatio::Undefined);
    assert_eq!(ratio.value(), None);

    let summary = TailRiskSummary::assess(500_000.0, 0.0, "IN_IEX");
    assert!(summary.ratio.is_undefined());
    assert_eq!(summary.classification, RiskBand::Undefined);
    assert_eq!(summary.premium_pct, None);
    assert!(!summary.significant_tail);
}

#[test]
fn test_negative_zero_expected_is_undefined() {
    assert_eq!(RiskRatio::compute(500_000.0, -0.0), RiskRatio::Undefined);
}

#[test]
fn test_non_finite_inputs_are_undefined() {
    assert_eq!(RiskRatio::compute(f64::NAN, 1.0), RiskRatio::Undefined);
    assert_eq!(RiskRatio::compute(1.0, f64::INFINITY), RiskRatio::Undefined);
    // quotient overflows
    assert_eq!(RiskRatio::compute(f64::MAX, 1e-300), RiskRatio::Undefined);
}

#[test]
fn test_ratio_value_and_display() {
    let ratio = RiskRatio::compute(900_000.0, 500_000.0);
    assert_eq!(ratio, RiskRatio::Defined(1.8));
    assert_eq!(ratio.to_string(), "1.80x");
    assert_eq!(RiskRatio::Undefined.to_string(), "undefined");
}

#[test]
fn test_ratio_json_is_number_or_undefined() {
    assert_eq!(serde_json::to_string(&RiskRatio::Defined(1.5)).unwrap(), "1.5");
    assert_eq!(serde_json::to_string(&RiskRatio::Undefined).unwrap(), "\"undefined\"");
    assert_eq!(serde_json::from_str::<RiskRatio>("2.0").unwrap(), RiskRatio::Defined(2.0));
    assert_eq!(serde_json::from_str::<RiskRatio>("\"undefined\"").unwrap(), RiskRatio::Undefined);
    assert!(serde_json::from_str::<RiskRatio>("\"infinite\"").is_err());
}

#[test]
fn test_classification_thresholds() {
    // premium 0.10 → stable
    let s = TailRiskSummary::assess(110.0, 100.0, "");
    assert_eq!(s.classification, RiskBand::Stable);
    assert!(!s.significant_tail);
    assert_eq!(s.premium_pct, Some(10.0));

    // premium 0.18 → stable but significant
    let s = TailRiskSummary::assess(118.0, 100.0, "");
    assert_eq!(s.classification, RiskBand::Stable);
    assert!(s.significant_tail);

    // premium 0.25 → exposed
    let s = TailRiskSummary::assess(125.0, 100.0, "");
    assert_eq!(s.classification, RiskBand::RiskExposed);
    assert!(s.significant_tail);
    assert_eq!(s.premium_pct, Some(25.0));
}

#[test]
fn test_negative_expected_uses_magnitude() {
    let s = TailRiskSummary::assess(-50.0, -100.0, "");
    assert_eq!(s.ratio, RiskRatio::Defined(0.5));
    assert_eq!(s.premium_pct, Some(50.0));
    assert_eq!(s.classification, RiskBand::RiskExposed);
}

#[test]
fn test_jurisdiction_tags() {
    assert_eq!(Jurisdiction::classify("IN_IEX"), Jurisdiction::India);
    assert_eq!(Jurisdiction::classify("IEX Day-Ahead Market (Real Pulse)"), Jurisdiction::India);
    assert_eq!(Jurisdiction::classify("India (IEX DAM)"), Jurisdiction::India);
    assert_eq!(Jurisdiction::classify("PJM Real-Time RTM (Simulated)"), Jurisdiction::UnitedStates);
    assert_eq!(Jurisdiction::classify("US_ERCOT"), Jurisdiction::UnitedStates);
    assert_eq!(Jurisdiction::classify("Nord Pool Day-Ahead (Simulated)"), Jurisdiction::Europe);
    assert_eq!(Jurisdiction::classify("EU_NORDPOOL"), Jurisdiction::Europe);
    assert_eq!(Jurisdiction::classify("Global Market"), Jurisdiction::Global);
    assert_eq!(Jurisdiction::classify(""), Jurisdiction::Global);
}

#[test]
fn test_summary_json_shape() {
    let s = TailRiskSummary::assess(0.0, 0.0, "IN_IEX");
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["ratio"], "undefined");
    assert_eq!(json["classification"], "UNDEFINED");
    assert_eq!(json["jurisdiction"], "INDIA");
    assert_eq!(json["p95"], 0.0);
    assert_eq!(json["expected"], 0.0);
}

#[test]
fn test_tail_event_view_for_battery() {
    let event = TailEvent {
        path_index: Some(17),
        max_price: Some(12.345),
        peak_hour: Some(19),
        cost_inr: Some(1_234_567.0),
        bess_soc_at_peak: Some(0.876),
    };
    let view = TailEventView::from_event(&event, Some("BESS (4h Li-ion)"));
    assert_eq!(view.max_exposure, "₹12.35L");
    assert_eq!(view.peak_hour, Some(19));
    assert_eq!(view.soc_at_peak_pct, Some(88));
}

#[test]
fn test_tail_event_view_without_battery_or_data() {
    let view = TailEventView::from_event(&TailEvent::default(), Some("Hydrogen Electrolyzer"));
    assert_eq!(view.max_exposure, "₹0.00L");
    assert_eq!(view.peak_price, "₹0.00");
    assert_eq!(view.peak_hour, None);
    assert_eq!(view.soc_at_peak_pct, None);
}
