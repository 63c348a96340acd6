//! Core logic for comparing block ciphers under cryptanalytic attacks.
//!
//! This crate holds everything that does not touch the network: the data
//! model, input validation, request shaping, the raw wire shapes of the
//! analysis service, result normalization and the comparative metrics used
//! to render summaries. It has no async runtime and performs no I/O.
//!
//! # Features
//!
//! - `ansi` (default): colour verdicts in formatted summaries via `colored`
//!
//! ```
//! use cipherscope_core::{build_attack, AttackForm, AttackType, ComparisonSet};
//!
//! let set = ComparisonSet::default();
//! let form = AttackForm::new(AttackType::Differential, &set);
//! form.validate().unwrap();
//! let request = build_attack(&form);
//! assert_eq!(request.endpoint(), "/api/differential-search");
//! ```

pub mod colors;
pub mod constants;
pub mod formatting;
pub mod metrics;
pub mod normalize;
pub mod request;
pub mod types;
pub mod validate;
pub mod wire;

use rand::RngCore;

pub use normalize::{
    normalize_attack, normalize_brute_force, normalize_structural, normalize_timing,
    normalize_transform, AttackResult, BruteForceReport, PerAlgorithm, StructuralReport,
    StudyReport, TimingReport, TransformReceipt,
};
pub use request::{build_attack, build_study, AttackForm, AttackRequest, StudyForm, StudyRequest};
pub use types::{
    AdvancedOptions, AlgorithmId, AttackType, Cadence, ComparisonSet, ComparisonSetError,
    ProgressState, TestType,
};
pub use validate::{PlaintextSample, ValidationError};

/// A fresh random 128-bit key as 32 lowercase hex digits.
pub fn random_key() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
