//! Input validation performed before any request leaves the client.
//!
//! Keys and sample presence are hard errors. Numeric parameters never error:
//! unparseable input falls back to the parameter's default and anything else
//! is clamped into its documented range.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONFIDENCE_LEVEL, KEY_HEX_LEN, MAX_SAMPLE_BYTES};
use crate::types::AdvancedOptions;

/// A local validation failure. Never reaches the remote service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The key is not exactly 32 hex digits.
    #[error("Key must be 32 hexadecimal characters (128 bits)")]
    InvalidKey,

    /// A file-based operation was triggered without a loaded sample.
    #[error("Please upload a file first")]
    MissingSample,

    /// A file encrypt or decrypt was triggered without a file.
    #[error("Please select a file first")]
    MissingFile,
}

/// Check that `key` is exactly 32 hex digits (either case).
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
    if key.len() == KEY_HEX_LEN && key.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidKey)
    }
}

/// Check that a sample has been loaded and is non-empty.
pub fn require_sample(sample: Option<&PlaintextSample>) -> Result<&PlaintextSample, ValidationError> {
    match sample {
        Some(sample) if !sample.is_empty() => Ok(sample),
        _ => Err(ValidationError::MissingSample),
    }
}

/// Check the inputs of a whole-file encrypt or decrypt. The file is checked
/// before the key.
pub fn validate_transform(key: &str, content: &[u8]) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::MissingFile);
    }
    validate_key(key)
}

// ============================================================================
// PlaintextSample
// ============================================================================

/// Leading bytes of an uploaded file, hex encoded for the wire.
///
/// At most [`MAX_SAMPLE_BYTES`] bytes are kept, so the hex form is at most
/// 2048 characters. Shorter files are encoded as-is without padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaintextSample(String);

impl PlaintextSample {
    /// Encode the first 1024 bytes of `bytes` as lowercase hex.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let take = bytes.len().min(MAX_SAMPLE_BYTES);
        Self(hex::encode(&bytes[..take]))
    }

    /// Hex form as sent in the `plaintext` field.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Number of sample bytes represented.
    pub fn byte_len(&self) -> usize {
        self.0.len() / 2
    }

    /// True when the source file was empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Numeric bounds
// ============================================================================

/// Inclusive range and fallback for a positive integer parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Smallest accepted value.
    pub min: u32,
    /// Largest accepted value.
    pub max: u32,
    /// Used when the input is not a positive integer.
    pub default: u32,
}

impl Bounds {
    /// Define a parameter range.
    pub const fn new(min: u32, max: u32, default: u32) -> Self {
        Self { min, max, default }
    }

    /// Clamp an already-numeric value into range.
    pub fn clamp(&self, value: i64) -> u32 {
        value.clamp(self.min as i64, self.max as i64) as u32
    }

    /// Resolve free-form input: unparseable or zero falls back to the
    /// default, everything else is clamped.
    pub fn resolve(&self, input: &str) -> u32 {
        match input.trim().parse::<i64>() {
            Ok(0) | Err(_) => self.default,
            Ok(value) => self.clamp(value),
        }
    }

    /// Whether `value` already lies inside the range.
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Resolve a confidence level: anything outside (0, 1) becomes the default.
pub fn resolve_confidence(level: f64) -> f64 {
    if level.is_finite() && level > 0.0 && level < 1.0 {
        level
    } else {
        DEFAULT_CONFIDENCE_LEVEL
    }
}

/// Bring every advanced option into its documented range.
pub fn clamp_advanced(options: &AdvancedOptions) -> AdvancedOptions {
    use crate::constants::{NUM_SAMPLES, NUM_TRIALS};

    AdvancedOptions {
        num_trials: NUM_TRIALS.clamp(options.num_trials as i64),
        num_samples: NUM_SAMPLES.clamp(options.num_samples as i64),
        confidence_level: resolve_confidence(options.confidence_level),
        test_type: options.test_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BRUTE_FORCE_ITERATIONS, TIMING_ITERATIONS};

    #[test]
    fn default_key_is_valid() {
        assert_eq!(validate_key(crate::constants::DEFAULT_KEY), Ok(()));
    }

    #[test]
    fn key_with_whitespace_is_rejected() {
        assert_eq!(
            validate_key(" 0112233445566778899aabbccddeeff"),
            Err(ValidationError::InvalidKey)
        );
    }

    #[test]
    fn key_with_multibyte_char_is_rejected() {
        // 32 bytes but not 32 hex digits
        let key = "é0112233445566778899aabbccddeef";
        assert_eq!(key.len(), 32);
        assert_eq!(validate_key(key), Err(ValidationError::InvalidKey));
    }

    #[test]
    fn sample_hex_is_lowercase() {
        let sample = PlaintextSample::from_bytes(&[0x00, 0xAB, 0x0F, 0xFF]);
        assert_eq!(sample.as_hex(), "00ab0fff");
        assert_eq!(sample.byte_len(), 4);
    }

    #[test]
    fn empty_sample_is_missing() {
        let empty = PlaintextSample::from_bytes(&[]);
        assert_eq!(require_sample(Some(&empty)), Err(ValidationError::MissingSample));
        assert_eq!(require_sample(None), Err(ValidationError::MissingSample));
    }

    #[test]
    fn transform_checks_file_then_key() {
        assert_eq!(validate_transform("zz", b""), Err(ValidationError::MissingFile));
        assert_eq!(validate_transform("zz", b"hi"), Err(ValidationError::InvalidKey));
        assert_eq!(
            validate_transform("00112233445566778899AABBCCDDEEFF", b"hi"),
            Ok(())
        );
    }

    #[test]
    fn sample_keeps_first_kib_only() {
        let sample = PlaintextSample::from_bytes(&[0x5a; 1500]);
        assert_eq!(sample.byte_len(), 1024);
        assert_eq!(&sample.as_hex()[..4], "5a5a");
    }

    #[test]
    fn resolve_falls_back_on_garbage() {
        assert_eq!(BRUTE_FORCE_ITERATIONS.resolve("abc"), 1_000);
        assert_eq!(BRUTE_FORCE_ITERATIONS.resolve(""), 1_000);
        assert_eq!(BRUTE_FORCE_ITERATIONS.resolve("0"), 1_000);
        assert_eq!(TIMING_ITERATIONS.resolve("1.5"), 100);
    }

    #[test]
    fn resolve_clamps_out_of_range() {
        assert_eq!(BRUTE_FORCE_ITERATIONS.resolve("5"), 100);
        assert_eq!(BRUTE_FORCE_ITERATIONS.resolve("-40"), 100);
        assert_eq!(BRUTE_FORCE_ITERATIONS.resolve("999999"), 10_000);
        assert_eq!(TIMING_ITERATIONS.resolve("5"), 10);
        assert_eq!(TIMING_ITERATIONS.resolve(" 250 "), 250);
    }

    #[test]
    fn confidence_outside_unit_interval_uses_default() {
        assert_eq!(resolve_confidence(0.99), 0.99);
        assert_eq!(resolve_confidence(1.0), DEFAULT_CONFIDENCE_LEVEL);
        assert_eq!(resolve_confidence(0.0), DEFAULT_CONFIDENCE_LEVEL);
        assert_eq!(resolve_confidence(f64::NAN), DEFAULT_CONFIDENCE_LEVEL);
    }
}
