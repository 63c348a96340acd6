//! End-to-end tests from raw service bodies to comparative judgments.

use cipherscope_core::metrics::{
    self, equivalence_verdict, faster_algorithm, attempts_leader, format_large_number,
    format_time, EquivalenceVerdict,
};
use cipherscope_core::normalize::{CandidateStatus, StructuralReport};
use cipherscope_core::{
    normalize_attack, normalize_brute_force, normalize_structural, normalize_timing,
    AlgorithmId, AttackResult, AttackType, ComparisonSet,
};
use serde_json::{json, Value};

fn id(s: &str) -> AlgorithmId {
    AlgorithmId::new(s)
}

fn three_way() -> ComparisonSet {
    ComparisonSet::parse_list("TEA,AES,NTSA_3.5").unwrap()
}

// =============================================================================
// TIME AND MAGNITUDE FORMATTING
// =============================================================================

#[test]
fn format_time_examples() {
    assert_eq!(format_time(45.0), "45.00 seconds");
    assert_eq!(format_time(3700.0), "1.03 hours");
}

#[test]
fn format_time_unit_boundaries() {
    assert_eq!(format_time(59.999), "60.00 seconds");
    assert_eq!(format_time(60.0), "1.00 minutes");
    assert_eq!(format_time(3600.0), "1.00 hours");
    assert_eq!(format_time(86_400.0), "1.00 days");
    assert_eq!(format_time(31_536_000.0), "1.00 years");
    assert_eq!(format_time(31_535_999.0), "365.00 days");
}

#[test]
fn format_large_number_examples() {
    assert_eq!(format_large_number(1_500_000.0), "1.50M");
    assert_eq!(format_large_number(999.0), "999");
    assert_eq!(format_large_number(1000.0), "1.00K");
    assert_eq!(format_large_number(2.5e9), "2.50B");
    assert_eq!(format_large_number(2.5e12), "2.50T");
}

// =============================================================================
// AVALANCHE
// =============================================================================

fn avalanche_series(base: f64) -> Value {
    Value::Array(
        (0..128)
            .map(|bit| {
                json!({
                    "bit_position": bit,
                    "avalanche_percentage": base + if bit % 2 == 0 { 1.0 } else { -1.0 },
                    "changed_bits": 64,
                    "total_bits": 128
                })
            })
            .collect(),
    )
}

#[test]
fn avalanche_end_to_end() {
    let body = json!({"success": true, "results": {
        "TEA": avalanche_series(30.0),
        "AES": avalanche_series(50.0),
    }});
    let AttackResult::Avalanche(report) =
        normalize_attack(AttackType::Avalanche, &ComparisonSet::default(), &body)
    else {
        panic!("expected avalanche result");
    };

    assert_eq!(report.series.series(&id("TEA")).len(), 128);
    assert_eq!(report.series.series(&id("AES")).len(), 128);
    assert!((report.average(&id("TEA")).unwrap() - 30.0).abs() < 1e-9);
    assert!((report.average(&id("AES")).unwrap() - 50.0).abs() < 1e-9);

    let rows = report.chart_rows();
    assert_eq!(rows.len(), 128);
    assert_eq!(rows[0].x, "0");
    assert_eq!(rows[0].values[0], (id("TEA"), Some(31.0)));
    assert_eq!(rows[0].values[1], (id("AES"), Some(51.0)));

    let summary = metrics::avalanche_summary(&report);
    assert_eq!(summary.len(), 2);
    assert!(!summary[0].2);
    assert!(summary[1].2);
}

#[test]
fn third_algorithm_missing_is_no_data() {
    let body = json!({"results": {
        "TEA": avalanche_series(30.0),
        "AES": avalanche_series(50.0),
    }});
    let AttackResult::Avalanche(report) =
        normalize_attack(AttackType::Avalanche, &three_way(), &body)
    else {
        panic!("expected avalanche result");
    };
    assert!(report.series.series(&id("NTSA_3.5")).is_empty());
    assert_eq!(report.average(&id("NTSA_3.5")), None);
    assert_eq!(report.chart_rows()[5].values[2], (id("NTSA_3.5"), None));
}

// =============================================================================
// EQUIVALENT AND RELATED KEYS
// =============================================================================

#[test]
fn equivalent_keys_keep_both_flags() {
    let body = json!({"results": {
        "TEA": [
            {"key": "80112233c45566778899aabbccddeeff", "matches_base": false, "is_equivalent": true},
            {"key": "00112233445566778899aabbccddeeff", "matches_base": true, "is_equivalent": true}
        ],
        "AES": [
            {"key": "01112233445566778899aabbccddeeff", "matches_base": false}
        ]
    }});
    let AttackResult::Equivalent(report) =
        normalize_attack(AttackType::Equivalent, &ComparisonSet::default(), &body)
    else {
        panic!("expected equivalent result");
    };

    let tea = report.candidates.get(&id("TEA")).unwrap();
    assert_eq!(tea[0].candidate_index, 1);
    assert_eq!(tea[0].status(), CandidateStatus::ExperimentalLimitation);
    assert_eq!(tea[1].status(), CandidateStatus::Matching);
    assert_eq!(report.has_equivalent_keys(&id("TEA")), Some(true));
    assert_eq!(report.has_equivalent_keys(&id("AES")), Some(false));
    assert_eq!(
        equivalence_verdict(&report, &id("TEA")),
        Some(EquivalenceVerdict::Flawed)
    );
    assert_eq!(
        equivalence_verdict(&report, &id("AES")),
        Some(EquivalenceVerdict::Secure)
    );
}

#[test]
fn tea_without_matches_is_experimental_limitation() {
    let body = json!({"results": {
        "TEA": [{"key": "80", "matches_base": false, "is_equivalent": true}],
        "AES": []
    }});
    let AttackResult::Equivalent(report) =
        normalize_attack(AttackType::Equivalent, &ComparisonSet::default(), &body)
    else {
        panic!("expected equivalent result");
    };
    assert_eq!(
        equivalence_verdict(&report, &id("TEA")),
        Some(EquivalenceVerdict::ExperimentalLimitation)
    );
}

#[test]
fn related_key_rows_align_by_position() {
    let body = json!({"results": {
        "TEA": [{"delta": "0x1", "correlation": 98.0}, {"delta": "0x10000", "correlation": 97.5}],
        "AES": [{"delta": "0x01", "correlation": 0.4}, {"delta": "0x10", "correlation": 0.6}]
    }});
    let AttackResult::Related(report) =
        normalize_attack(AttackType::Related, &ComparisonSet::default(), &body)
    else {
        panic!("expected related result");
    };
    let rows = report.chart_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].x, "0x10000");
    assert_eq!(rows[1].values[1], (id("AES"), Some(0.6)));
    assert!((report.mean_correlation(&id("TEA")).unwrap() - 97.75).abs() < 1e-9);
}

// =============================================================================
// SINGLE-TARGET ATTACKS
// =============================================================================

#[test]
fn statistical_without_statistics_block() {
    let body = json!({"results": {"algorithm": "AES", "num_trials": 100,
                                  "confidence_level": 0.95, "test_type": "timing"}});
    let AttackResult::Statistical(report) =
        normalize_attack(AttackType::Statistical, &ComparisonSet::default(), &body)
    else {
        panic!("expected statistical result");
    };
    assert_eq!(report.algorithm, "AES");
    assert!(report.summary.is_none());
    assert!(report.trials.is_empty());
    assert_eq!(report.headline_mean(), None);
}

#[test]
fn statistical_with_interval() {
    let body = json!({"results": {"algorithm": "TEA", "num_trials": 3,
        "confidence_level": 0.99, "test_type": "timing",
        "statistics": {
            "overall_mean_us": 12.5,
            "confidence_interval": {"lower": 12.0, "upper": 13.0, "margin_error": 0.5},
            "all_trials": [{"trial": 1, "mean": 12.1, "std": 0.2}]
        }}});
    let AttackResult::Statistical(report) =
        normalize_attack(AttackType::Statistical, &ComparisonSet::default(), &body)
    else {
        panic!("expected statistical result");
    };
    assert_eq!(report.headline_mean(), Some(12.5));
    let ci = report.summary.unwrap().confidence_interval.unwrap();
    assert!(ci.contains(12.5));
    assert_eq!(report.trials.len(), 1);
}

#[test]
fn differential_ranked_by_probability() {
    let body = json!({"results": {
        "target": "TEA", "samples_tested": 500,
        "search_summary": {"total_unique_characteristics": 2,
                           "highest_probability": 0.5, "average_probability": 0.3},
        "characteristics_found": [
            {"input_diff_hex": ["0x1", "0x0"], "output_diff_hex": ["0x2", "0x0"], "count": 50, "probability": 0.1},
            {"input_diff_hex": ["0x80000000", "0x0"], "output_diff_hex": ["0x0", "0x80000000"], "count": 250, "probability": 0.5}
        ]
    }});
    let AttackResult::Differential(report) =
        normalize_attack(AttackType::Differential, &ComparisonSet::default(), &body)
    else {
        panic!("expected differential result");
    };
    let ranked = report.ranked();
    assert_eq!(ranked[0].count, 250);
    assert_eq!(ranked[0].input_diff_hex[0], "0x80000000");
    assert_eq!(report.summary.unwrap().unique_characteristics, 2);
}

#[test]
fn sidechannel_significant_bits() {
    let body = json!({"results": {
        "vulnerability_assessment": {"assessment": "VULNERABLE", "bits_with_leakage": 2,
                                     "vulnerability_percentage": 1.56},
        "timing_analysis": {"mean_diff_us": 0.01, "max_diff_us": 0.2, "correlation_strength": "weak"},
        "key_bit_correlations": [
            {"bit_position": 0, "timing_diff_us": 0.2, "t_statistic": 3.1, "significant": true},
            {"bit_position": 1, "timing_diff_us": 0.0, "t_statistic": 0.1, "significant": false},
            {"bit_position": 7, "timing_diff_us": 0.1, "t_statistic": 2.4, "significant": true}
        ]
    }});
    let AttackResult::SideChannel(report) =
        normalize_attack(AttackType::SideChannel, &ComparisonSet::default(), &body)
    else {
        panic!("expected side-channel result");
    };
    assert_eq!(metrics::significant_bit_count(&report), 2);
    assert_eq!(report.bits_with_leakage, 2);
    assert_eq!(report.timing.unwrap().correlation_strength, "weak");
}

// =============================================================================
// STUDIES
// =============================================================================

#[test]
fn faster_and_attempts_leader_may_disagree() {
    let body = json!({"results": {
        "TEA": {"total_key_space": 3.4e38, "attempts_per_second": 9.0e5,
                "seconds_to_exhaust": 3.7e32, "years_to_exhaust": 1.2e25},
        "AES": {"total_key_space": 3.4e38, "attempts_per_second": 4.0e5,
                "seconds_to_exhaust": 8.5e32, "years_to_exhaust": 2.7e25}
    }});
    let report = normalize_brute_force(&ComparisonSet::default(), &body);
    assert_eq!(faster_algorithm(&report), Some(id("AES")));
    assert_eq!(attempts_leader(&report), Some(id("TEA")));

    let rows = metrics::brute_force_rows(&report);
    assert!((rows[0].log_years.unwrap() - 1.2e25f64.log10()).abs() < 1e-12);
}

#[test]
fn timing_leaders_and_variance() {
    let body = json!({"results": {
        "TEA": {"average_time_us": 4.0, "min_time_us": 3.0, "max_time_us": 9.0,
                "std_deviation_us": 0.8, "variance_us": 0.64, "coefficient_of_variation": 0.2},
        "AES": {"average_time_us": 6.0, "min_time_us": 5.5, "max_time_us": 7.0,
                "std_deviation_us": 0.03, "variance_us": 0.0009, "coefficient_of_variation": 0.005}
    }});
    let report = normalize_timing(&ComparisonSet::default(), &body);
    assert_eq!(metrics::fastest_average(&report), Some(id("TEA")));
    assert_eq!(metrics::most_consistent(&report), Some(id("AES")));
    assert!(metrics::has_high_timing_variance(0.2));
    assert!(!metrics::has_high_timing_variance(0.005));

    let rows = metrics::timing_rows(&report);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].metric, "Avg Time (μs)");
    assert_eq!(rows[3].values[1], (id("AES"), Some(0.03)));
}

#[test]
fn timing_tie_has_no_leader() {
    let figures = json!({"average_time_us": 5.0, "coefficient_of_variation": 0.1});
    let body = json!({"results": {"TEA": figures, "AES": figures}});
    let report = normalize_timing(&ComparisonSet::default(), &body);
    assert_eq!(metrics::fastest_average(&report), None);
}

#[test]
fn structural_analysis_reads_analysis_key() {
    let body = json!({"analysis": {
        "TEA": {"round_structure": "64 Feistel rounds", "block_size": "64 bits",
                "key_size": "128 bits", "key_schedule": "none", "confusion": "add/xor",
                "diffusion": "shifts", "weaknesses": ["equivalent keys"]},
        "AES": {"round_structure": "10 rounds SPN", "strengths": ["no practical attacks"]}
    }});
    let report: StructuralReport = normalize_structural(&three_way(), &body);
    let tea = report.profiles.get(&id("TEA")).unwrap();
    assert_eq!(tea.weaknesses, vec!["equivalent keys".to_string()]);
    assert!(tea.strengths.is_empty());
    let aes = report.profiles.get(&id("AES")).unwrap();
    assert!(aes.weaknesses.is_empty());
    assert!(!report.profiles.has_data(&id("NTSA_3.5")));
}
