//! Constants shared by validation, progress pacing and metrics.

use crate::validate::Bounds;

/// Required length of a 128-bit key rendered as hex.
pub const KEY_HEX_LEN: usize = 32;

/// Key pre-filled in every form.
pub const DEFAULT_KEY: &str = "00112233445566778899aabbccddeeff";

/// Maximum number of file bytes sent as a plaintext sample.
pub const MAX_SAMPLE_BYTES: usize = 1024;

// =============================================================================
// Progress pacing
// =============================================================================

/// The simulated indicator never passes this value while a call is unresolved.
pub const PROGRESS_CEILING: u8 = 90;

/// Value shown once the remote call has resolved successfully.
pub const PROGRESS_COMPLETE: u8 = 100;

/// How long a settled run holds its final progress before returning to idle.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Upper bound on a single remote call before the run is failed.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Numeric parameter bounds
// =============================================================================

/// Iterations for the brute-force feasibility study.
pub const BRUTE_FORCE_ITERATIONS: Bounds = Bounds::new(100, 10_000, 1_000);

/// Iterations for the encryption timing study.
pub const TIMING_ITERATIONS: Bounds = Bounds::new(10, 10_000, 100);

/// Trials for the generic statistical attack.
pub const NUM_TRIALS: Bounds = Bounds::new(10, 500, 100);

/// Samples for differential search and timing side-channel analysis.
pub const NUM_SAMPLES: Bounds = Bounds::new(100, 2_000, 500);

/// Confidence level used when none (or an out-of-range one) is supplied.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

// =============================================================================
// Metrics
// =============================================================================

/// Seconds in a (365-day) year, as used by `format_time`.
pub const SECONDS_PER_YEAR: f64 = 31_536_000.0;

/// Distance from 50% within which an average avalanche counts as strong diffusion.
pub const AVALANCHE_TOLERANCE_PERCENT: f64 = 5.0;

/// Coefficient of variation above which timing is reported as highly variable.
pub const HIGH_TIMING_VARIANCE_CV: f64 = 0.01;
