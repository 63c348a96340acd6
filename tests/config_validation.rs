//! Tests for configuration validation.
//!
//! Invalid builder values are rejected with panic messages; environment
//! values that fail to parse fall back to the defaults.

use std::time::Duration;

use cipherscope::{ComparisonSet, Config};

// =============================================================================
// BASE URL
// =============================================================================

#[test]
#[should_panic(expected = "base_url must not be empty")]
fn empty_base_url_panics() {
    let _ = Config::new().base_url("");
}

#[test]
#[should_panic(expected = "base_url must not be empty")]
fn whitespace_base_url_panics() {
    let _ = Config::new().base_url("   ");
}

#[test]
fn base_url_is_stored_verbatim() {
    let config = Config::new().base_url("http://10.0.0.2:8080/tools");
    assert_eq!(config.base_url, "http://10.0.0.2:8080/tools");
}

// =============================================================================
// TIMEOUT
// =============================================================================

#[test]
#[should_panic(expected = "request_timeout must be positive")]
fn zero_timeout_panics() {
    let _ = Config::new().request_timeout(Duration::ZERO);
}

#[test]
#[should_panic(expected = "request_timeout must be positive")]
fn zero_timeout_secs_panics() {
    let _ = Config::new().request_timeout_secs(0);
}

#[test]
fn timeout_secs_sets_duration() {
    let config = Config::new().request_timeout_secs(15);
    assert_eq!(config.request_timeout, Duration::from_secs(15));
}

// =============================================================================
// RUN LIFECYCLE
// =============================================================================

#[test]
fn zero_settle_delay_is_allowed() {
    let config = Config::new().settle_delay(Duration::ZERO);
    assert_eq!(config.settle_delay, Duration::ZERO);
}

#[test]
fn progress_can_be_disabled() {
    assert!(!Config::new().progress_enabled(false).progress_enabled);
}

// =============================================================================
// COMPARISON SET
// =============================================================================

#[test]
fn three_way_comparison() {
    let set = ComparisonSet::parse_list("TEA, AES, NTSA_3.5").unwrap();
    let config = Config::new().comparison_set(set);
    assert_eq!(config.comparison_set.len(), 3);
    assert_eq!(config.comparison_set.subject().as_str(), "NTSA_3.5");
}

#[test]
fn single_algorithm_list_is_rejected() {
    assert!(ComparisonSet::parse_list("TEA").is_err());
}

#[test]
fn duplicate_algorithms_are_rejected() {
    assert!(ComparisonSet::parse_list("AES,AES").is_err());
}
