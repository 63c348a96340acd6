//! JSON export of normalized results.

use serde::Serialize;

/// Serialize any report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for the
/// normalized report types).
pub fn to_json<T: Serialize + ?Sized>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize any report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty<T: Serialize + ?Sized>(report: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::PanelReport;
    use cipherscope_core::{normalize_attack, AttackType, ComparisonSet};
    use serde_json::json;

    fn avalanche() -> PanelReport {
        let set = ComparisonSet::default();
        let body = json!({"results": {
            "TEA": [{"bit_position": 0, "avalanche_percentage": 49.5}],
            "AES": [{"bit_position": 0, "avalanche_percentage": 50.25}],
        }});
        PanelReport::Attack(normalize_attack(AttackType::Avalanche, &set, &body))
    }

    #[test]
    fn test_to_json_tags_report_kind() {
        let json = to_json(&avalanche()).unwrap();
        assert!(json.contains("\"kind\":\"attack\""));
        assert!(json.contains("\"type\":\"avalanche\""));
        assert!(json.contains("\"avalanche_percentage\":50.25"));
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json_pretty(&avalanche()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("bit_position"));
    }

    #[test]
    fn test_export_parses_back() {
        let report = avalanche();
        let back: PanelReport = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
        assert_eq!(back, report);
    }
}
