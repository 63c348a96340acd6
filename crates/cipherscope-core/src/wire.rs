//! Raw response shapes as the remote service emits them.
//!
//! Every field defaults when absent so a partially populated body still
//! deserializes. Numbers that the service sometimes renders as strings (and
//! vice versa) go through [`text_or_number`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accept a JSON string, number or bool and keep its textual form.
pub fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn hex_pair<'de, D>(deserializer: D) -> Result<[String; 2], D::Error>
where
    D: Deserializer<'de>,
{
    let parts = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect::<Vec<_>>(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    };
    let mut iter = parts.into_iter();
    Ok([
        iter.next().unwrap_or_default(),
        iter.next().unwrap_or_default(),
    ])
}

// ============================================================================
// Per-algorithm attack entries
// ============================================================================

/// One candidate key from `/api/equivalent-keys`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEquivalentKey {
    pub key: String,
    pub matches_base: bool,
    /// Only reported for ciphers with a structural equivalence class.
    pub is_equivalent: bool,
    pub ciphertext: Option<String>,
    pub note: Option<String>,
}

/// One delta from `/api/related-key-attack`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRelatedKey {
    #[serde(deserialize_with = "text_or_number")]
    pub delta: String,
    pub correlation: f64,
}

/// One flipped bit from `/api/avalanche-test`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAvalanchePoint {
    pub bit_position: u32,
    pub avalanche_percentage: f64,
    pub changed_bits: Option<u32>,
    pub total_bits: Option<u32>,
}

// ============================================================================
// Single-target attack bodies
// ============================================================================

/// `/api/tea-key-recovery` results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawKeyRecovery {
    pub method: String,
    #[serde(deserialize_with = "text_or_number")]
    pub theoretical_complexity: String,
    pub actual_attempts: u64,
    pub success: bool,
    pub steps: Vec<RawRecoveryStep>,
    pub partial_information: Vec<RawKeyCandidate>,
    pub educational_note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecoveryStep {
    #[serde(deserialize_with = "text_or_number")]
    pub step: String,
    pub description: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawKeyCandidate {
    #[serde(rename = "K0", deserialize_with = "text_or_number")]
    pub k0: String,
    #[serde(rename = "K1", deserialize_with = "text_or_number")]
    pub k1: String,
    pub partial_match: bool,
}

/// `/api/statistical-analysis` results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStatistical {
    pub algorithm: String,
    pub num_trials: u32,
    pub confidence_level: f64,
    pub test_type: String,
    pub statistics: Option<RawStatistics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStatistics {
    pub overall_mean_us: Option<f64>,
    pub mean_avalanche_percent: Option<f64>,
    pub confidence_interval: Option<RawConfidenceInterval>,
    pub all_trials: Vec<RawTrial>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub margin_error: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTrial {
    pub trial: u32,
    pub mean: f64,
    pub std: f64,
}

/// `/api/differential-search` results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDifferential {
    pub target: String,
    pub samples_tested: u32,
    pub search_summary: Option<RawSearchSummary>,
    pub characteristics_found: Vec<RawCharacteristic>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSearchSummary {
    pub total_unique_characteristics: u32,
    pub highest_probability: f64,
    pub average_probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCharacteristic {
    #[serde(deserialize_with = "hex_pair")]
    pub input_diff_hex: [String; 2],
    #[serde(deserialize_with = "hex_pair")]
    pub output_diff_hex: [String; 2],
    pub count: u32,
    pub probability: f64,
}

/// `/api/timing-sidechannel` results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSideChannel {
    pub vulnerability_assessment: Option<RawVulnerability>,
    pub timing_analysis: Option<RawTimingLeakage>,
    pub key_bit_correlations: Vec<RawBitCorrelation>,
    pub educational_note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawVulnerability {
    pub assessment: String,
    pub bits_with_leakage: u32,
    pub vulnerability_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTimingLeakage {
    pub mean_diff_us: f64,
    pub max_diff_us: f64,
    #[serde(deserialize_with = "text_or_number")]
    pub correlation_strength: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBitCorrelation {
    pub bit_position: u32,
    pub timing_diff_us: f64,
    pub t_statistic: f64,
    pub significant: bool,
}

// ============================================================================
// Studies and structural analysis
// ============================================================================

/// Per-algorithm entry of `/api/timing-analysis`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTimingFigures {
    pub average_time_us: f64,
    pub min_time_us: f64,
    pub max_time_us: f64,
    pub std_deviation_us: f64,
    pub variance_us: f64,
    pub coefficient_of_variation: f64,
}

/// Per-algorithm entry of `/api/brute-force-study`.
///
/// `total_key_space` is 2^128, beyond `u64`; it is read as `f64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBruteForceFigures {
    pub total_key_space: f64,
    pub attempts_per_second: f64,
    pub seconds_to_exhaust: f64,
    pub years_to_exhaust: f64,
}

/// Per-algorithm entry of `/api/structural-analysis`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStructuralProfile {
    pub round_structure: String,
    pub block_size: String,
    pub key_size: String,
    pub key_schedule: String,
    pub confusion: String,
    pub diffusion: String,
    pub weaknesses: Vec<String>,
    pub strengths: Vec<String>,
}

/// Body of `/api/encrypt` and `/api/decrypt`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTransform {
    pub filename: String,
    pub original_size: u64,
    pub encrypted_size: Option<u64>,
    pub decrypted_size: Option<u64>,
    pub performance: RawPerformance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPerformance {
    pub time_ms: f64,
    pub throughput_mbps: f64,
    pub cpu_percent: f64,
    pub memory_mb: f64,
}

/// Extract the `error` field of a failure body, if the body is a JSON
/// object carrying a non-empty string there.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("error")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn related_delta_accepts_string_or_number() {
        let a: RawRelatedKey = serde_json::from_value(json!({"delta": "0x10", "correlation": 3})).unwrap();
        let b: RawRelatedKey = serde_json::from_value(json!({"delta": 16, "correlation": 3.5})).unwrap();
        assert_eq!(a.delta, "0x10");
        assert_eq!(b.delta, "16");
        assert_eq!(b.correlation, 3.5);
    }

    #[test]
    fn aes_equivalent_entry_without_flag() {
        let entry: RawEquivalentKey =
            serde_json::from_value(json!({"key": "01", "matches_base": false})).unwrap();
        assert!(!entry.is_equivalent);
        assert!(entry.note.is_none());
    }

    #[test]
    fn characteristic_pairs_are_padded() {
        let c: RawCharacteristic = serde_json::from_value(json!({
            "input_diff_hex": ["0x80000000"],
            "output_diff_hex": ["0x1", "0x2", "0x3"],
            "count": 4,
            "probability": 0.25
        }))
        .unwrap();
        assert_eq!(c.input_diff_hex, ["0x80000000".to_string(), String::new()]);
        assert_eq!(c.output_diff_hex, ["0x1".to_string(), "0x2".to_string()]);
    }

    #[test]
    fn key_space_beyond_u64() {
        let raw = r#"{"total_key_space": 340282366920938463463374607431768211456,
                      "attempts_per_second": 12000.5,
                      "seconds_to_exhaust": 1.0e34,
                      "years_to_exhaust": 3.2e26}"#;
        let figures: RawBruteForceFigures = serde_json::from_str(raw).unwrap();
        assert!((figures.total_key_space - 2f64.powi(128)).abs() / 2f64.powi(128) < 1e-12);
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            error_message(br#"{"error": "No key provided"}"#),
            Some("No key provided".to_string())
        );
        assert_eq!(error_message(br#"{"error": ""}"#), None);
        assert_eq!(error_message(br#"{"error": 5}"#), None);
        assert_eq!(error_message(b"<html>500</html>"), None);
    }
}
