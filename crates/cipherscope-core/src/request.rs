//! Attack Parameter Builder.
//!
//! Maps a form state to the exact JSON payload of one endpoint. Each payload
//! struct carries only the fields its endpoint reads; nothing irrelevant to
//! the selected attack is ever serialized.

use serde::Serialize;

use crate::constants::{BRUTE_FORCE_ITERATIONS, DEFAULT_KEY, TIMING_ITERATIONS};
use crate::types::{AdvancedOptions, AlgorithmId, AttackType, ComparisonSet, TestType};
use crate::validate::{self, PlaintextSample, ValidationError};

// ============================================================================
// Form state
// ============================================================================

/// Everything the user has entered on the attack panel.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackForm {
    /// Selected attack.
    pub attack: AttackType,
    /// 32-hex-character key.
    pub key: String,
    /// Leading bytes of the uploaded file, if any.
    pub sample: Option<PlaintextSample>,
    /// Target of the single-algorithm attacks (`statistical`, `sidechannel`).
    pub algorithm: AlgorithmId,
    /// Trials, samples, confidence level and test type.
    pub advanced: AdvancedOptions,
}

impl AttackForm {
    /// Fresh form for `attack`, targeting the comparison set's subject cipher.
    pub fn new(attack: AttackType, comparison: &ComparisonSet) -> Self {
        Self {
            attack,
            key: DEFAULT_KEY.to_string(),
            sample: None,
            algorithm: comparison.subject().clone(),
            advanced: AdvancedOptions::default(),
        }
    }

    /// Replace the key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Load a sample from file contents.
    pub fn sample_bytes(mut self, bytes: &[u8]) -> Self {
        self.sample = Some(PlaintextSample::from_bytes(bytes));
        self
    }

    /// Target a specific algorithm.
    pub fn algorithm(mut self, algorithm: impl Into<AlgorithmId>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Replace the advanced options.
    pub fn advanced(mut self, advanced: AdvancedOptions) -> Self {
        self.advanced = advanced;
        self
    }

    /// Validate the form for its attack.
    ///
    /// File-based attacks check the sample before the key, so an empty panel
    /// reports the missing upload first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.attack.needs_sample() {
            validate::require_sample(self.sample.as_ref())?;
        }
        validate::validate_key(&self.key)
    }
}

/// Form state of the two studies that sit beside the attack menu.
#[derive(Debug, Clone, PartialEq)]
pub enum StudyForm {
    /// Brute-force feasibility: attempts per second and time to exhaust.
    BruteForce {
        /// 32-hex-character key.
        key: String,
        /// Key attempts to time (100–10000).
        iterations: u32,
    },
    /// Raw encryption performance over a sample.
    Timing {
        /// 32-hex-character key.
        key: String,
        /// Leading bytes of the uploaded file, if any.
        sample: Option<PlaintextSample>,
        /// Encryptions to time (10–10000).
        iterations: u32,
    },
}

impl StudyForm {
    /// Brute-force form with default iterations.
    pub fn brute_force(key: impl Into<String>) -> Self {
        StudyForm::BruteForce {
            key: key.into(),
            iterations: BRUTE_FORCE_ITERATIONS.default,
        }
    }

    /// Timing form with default iterations.
    pub fn timing(key: impl Into<String>, sample: Option<PlaintextSample>) -> Self {
        StudyForm::Timing {
            key: key.into(),
            sample,
            iterations: TIMING_ITERATIONS.default,
        }
    }

    /// Replace the iteration count.
    pub fn iterations(mut self, n: u32) -> Self {
        match &mut self {
            StudyForm::BruteForce { iterations, .. } | StudyForm::Timing { iterations, .. } => {
                *iterations = n
            }
        }
        self
    }

    /// Short name used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            StudyForm::BruteForce { .. } => "brute-force",
            StudyForm::Timing { .. } => "timing",
        }
    }

    /// Message shown when the remote call fails without an `error` field.
    pub fn fallback_error(&self) -> &'static str {
        match self {
            StudyForm::BruteForce { .. } => "Brute-force study failed",
            StudyForm::Timing { .. } => "Performance analysis failed",
        }
    }

    /// Validate the form. The timing study checks the sample first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            StudyForm::BruteForce { key, .. } => validate::validate_key(key),
            StudyForm::Timing { key, sample, .. } => {
                validate::require_sample(sample.as_ref())?;
                validate::validate_key(key)
            }
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// `{plaintext, key}` for equivalent, related and avalanche.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaintextPayload {
    pub plaintext: String,
    pub key: String,
}

/// `{plaintext, ciphertext, key}` for key recovery.
///
/// `ciphertext` is always empty; the service derives it from the plaintext.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyRecoveryPayload {
    pub plaintext: String,
    pub ciphertext: String,
    pub key: String,
}

/// `{algorithm, key, test_type, num_trials, confidence_level}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticalPayload {
    pub algorithm: AlgorithmId,
    pub key: String,
    pub test_type: TestType,
    pub num_trials: u32,
    pub confidence_level: f64,
}

/// `{key, num_samples}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferentialPayload {
    pub key: String,
    pub num_samples: u32,
}

/// `{algorithm, key, num_samples}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideChannelPayload {
    pub algorithm: AlgorithmId,
    pub key: String,
    pub num_samples: u32,
}

/// `{key, iterations}` for the brute-force study.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BruteForcePayload {
    pub key: String,
    pub iterations: u32,
}

/// `{plaintext, key, iterations}` for the timing study.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingPayload {
    pub plaintext: String,
    pub key: String,
    pub iterations: u32,
}

/// A ready-to-send attack request. Serializes to the bare payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttackRequest {
    Equivalent(PlaintextPayload),
    Related(PlaintextPayload),
    Avalanche(PlaintextPayload),
    KeyRecovery(KeyRecoveryPayload),
    Statistical(StatisticalPayload),
    Differential(DifferentialPayload),
    SideChannel(SideChannelPayload),
}

impl AttackRequest {
    /// The attack this request runs.
    pub fn attack_type(&self) -> AttackType {
        match self {
            AttackRequest::Equivalent(_) => AttackType::Equivalent,
            AttackRequest::Related(_) => AttackType::Related,
            AttackRequest::Avalanche(_) => AttackType::Avalanche,
            AttackRequest::KeyRecovery(_) => AttackType::KeyRecovery,
            AttackRequest::Statistical(_) => AttackType::Statistical,
            AttackRequest::Differential(_) => AttackType::Differential,
            AttackRequest::SideChannel(_) => AttackType::SideChannel,
        }
    }

    /// Endpoint the request is posted to.
    pub fn endpoint(&self) -> &'static str {
        self.attack_type().endpoint()
    }
}

/// A ready-to-send study request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StudyRequest {
    BruteForce(BruteForcePayload),
    Timing(TimingPayload),
}

impl StudyRequest {
    /// Endpoint the request is posted to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            StudyRequest::BruteForce(_) => "/api/brute-force-study",
            StudyRequest::Timing(_) => "/api/timing-analysis",
        }
    }
}

/// Build the request for an attack form.
///
/// Advanced options are clamped into range here; the form is expected to
/// have passed [`AttackForm::validate`].
pub fn build_attack(form: &AttackForm) -> AttackRequest {
    let key = form.key.clone();
    let plaintext = || {
        form.sample
            .as_ref()
            .map(|s| s.as_hex().to_string())
            .unwrap_or_default()
    };
    let advanced = validate::clamp_advanced(&form.advanced);

    match form.attack {
        AttackType::Equivalent => AttackRequest::Equivalent(PlaintextPayload {
            plaintext: plaintext(),
            key,
        }),
        AttackType::Related => AttackRequest::Related(PlaintextPayload {
            plaintext: plaintext(),
            key,
        }),
        AttackType::Avalanche => AttackRequest::Avalanche(PlaintextPayload {
            plaintext: plaintext(),
            key,
        }),
        AttackType::KeyRecovery => AttackRequest::KeyRecovery(KeyRecoveryPayload {
            plaintext: plaintext(),
            ciphertext: String::new(),
            key,
        }),
        AttackType::Statistical => AttackRequest::Statistical(StatisticalPayload {
            algorithm: form.algorithm.clone(),
            key,
            test_type: advanced.test_type,
            num_trials: advanced.num_trials,
            confidence_level: advanced.confidence_level,
        }),
        AttackType::Differential => AttackRequest::Differential(DifferentialPayload {
            key,
            num_samples: advanced.num_samples,
        }),
        AttackType::SideChannel => AttackRequest::SideChannel(SideChannelPayload {
            algorithm: form.algorithm.clone(),
            key,
            num_samples: advanced.num_samples,
        }),
    }
}

/// Build the request for a study form, clamping iterations into range.
pub fn build_study(form: &StudyForm) -> StudyRequest {
    match form {
        StudyForm::BruteForce { key, iterations } => StudyRequest::BruteForce(BruteForcePayload {
            key: key.clone(),
            iterations: BRUTE_FORCE_ITERATIONS.clamp(*iterations as i64),
        }),
        StudyForm::Timing {
            key,
            sample,
            iterations,
        } => StudyRequest::Timing(TimingPayload {
            plaintext: sample
                .as_ref()
                .map(|s| s.as_hex().to_string())
                .unwrap_or_default(),
            key: key.clone(),
            iterations: TIMING_ITERATIONS.clamp(*iterations as i64),
        }),
    }
}
