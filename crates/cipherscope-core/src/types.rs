//! Data model: algorithms, comparison sets, attack types and progress.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONFIDENCE_LEVEL, NUM_SAMPLES, NUM_TRIALS};

// ============================================================================
// AlgorithmId / ComparisonSet
// ============================================================================

/// Identifier of a cipher under test, exactly as the remote service keys it
/// (`"TEA"`, `"AES"`, `"NTSA_3.5"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlgorithmId(String);

impl AlgorithmId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as sent over the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlgorithmId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AlgorithmId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for AlgorithmId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Why a list of identifiers cannot form a comparison set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonSetError {
    /// Fewer than two or more than three members.
    #[error("a comparison set holds 2 or 3 algorithms, got {0}")]
    WrongSize(usize),

    /// The same identifier appears twice.
    #[error("algorithm {0} appears more than once")]
    Duplicate(String),

    /// An identifier is empty or only whitespace.
    #[error("algorithm identifiers must not be empty")]
    Empty,
}

/// Ordered list of the 2 or 3 ciphers compared by a deployment.
///
/// The first member is the weak baseline, the second the production cipher,
/// and an optional third the experimental cipher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AlgorithmId>", into = "Vec<AlgorithmId>")]
pub struct ComparisonSet {
    members: Vec<AlgorithmId>,
}

impl ComparisonSet {
    /// Build a set, rejecting wrong sizes, blanks and duplicates.
    pub fn new<I, A>(members: I) -> Result<Self, ComparisonSetError>
    where
        I: IntoIterator<Item = A>,
        A: Into<AlgorithmId>,
    {
        let members: Vec<AlgorithmId> = members.into_iter().map(Into::into).collect();
        if !(2..=3).contains(&members.len()) {
            return Err(ComparisonSetError::WrongSize(members.len()));
        }
        for (i, id) in members.iter().enumerate() {
            if id.as_str().trim().is_empty() {
                return Err(ComparisonSetError::Empty);
            }
            if members[..i].contains(id) {
                return Err(ComparisonSetError::Duplicate(id.to_string()));
            }
        }
        Ok(Self { members })
    }

    /// Parse a comma-separated list such as `"TEA,AES,NTSA_3.5"`.
    pub fn parse_list(list: &str) -> Result<Self, ComparisonSetError> {
        Self::new(list.split(',').map(|s| AlgorithmId::new(s.trim())))
    }

    /// Members in comparison order.
    pub fn members(&self) -> &[AlgorithmId] {
        &self.members
    }

    /// Iterate over members in comparison order.
    pub fn iter(&self) -> impl Iterator<Item = &AlgorithmId> {
        self.members.iter()
    }

    /// Number of members (2 or 3).
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; a set has at least two members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The weak baseline cipher.
    pub fn baseline(&self) -> &AlgorithmId {
        &self.members[0]
    }

    /// The cipher single-target attacks default to: the experimental cipher
    /// when present, else the production cipher.
    pub fn subject(&self) -> &AlgorithmId {
        &self.members[self.members.len() - 1]
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: &AlgorithmId) -> bool {
        self.members.contains(id)
    }
}

impl Default for ComparisonSet {
    fn default() -> Self {
        Self {
            members: vec![AlgorithmId::new("TEA"), AlgorithmId::new("AES")],
        }
    }
}

impl TryFrom<Vec<AlgorithmId>> for ComparisonSet {
    type Error = ComparisonSetError;

    fn try_from(members: Vec<AlgorithmId>) -> Result<Self, Self::Error> {
        Self::new(members)
    }
}

impl From<ComparisonSet> for Vec<AlgorithmId> {
    fn from(set: ComparisonSet) -> Self {
        set.members
    }
}

impl fmt::Display for ComparisonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(" vs ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

// ============================================================================
// AttackType
// ============================================================================

/// The fixed menu of structural and statistical attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttackType {
    /// Search for keys that yield the base ciphertext.
    Equivalent,
    /// Correlation of outputs under keys differing by a known delta.
    Related,
    /// Output bit flips per flipped input bit.
    Avalanche,
    /// Attempted recovery of the key from a known plaintext.
    KeyRecovery,
    /// Repeated trials with a confidence interval on the mean.
    Statistical,
    /// Search for high-probability differential characteristics.
    Differential,
    /// Correlation between key bits and execution time.
    SideChannel,
}

/// Fixed pacing of the simulated progress indicator for one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    increment: u8,
    interval: Duration,
}

impl Cadence {
    /// # Panics
    ///
    /// Panics if `increment` or `interval_ms` is zero.
    pub const fn new(increment: u8, interval_ms: u64) -> Self {
        assert!(increment > 0, "cadence increment must be positive");
        assert!(interval_ms > 0, "cadence interval must be positive");
        Self {
            increment,
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// Percentage points added per tick.
    pub const fn increment(&self) -> u8 {
        self.increment
    }

    /// Time between ticks. Never zero.
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl AttackType {
    /// Every attack, in menu order.
    pub const ALL: [AttackType; 7] = [
        AttackType::Equivalent,
        AttackType::Related,
        AttackType::Avalanche,
        AttackType::KeyRecovery,
        AttackType::Statistical,
        AttackType::Differential,
        AttackType::SideChannel,
    ];

    /// Wire name used in forms and results.
    pub fn as_str(self) -> &'static str {
        match self {
            AttackType::Equivalent => "equivalent",
            AttackType::Related => "related",
            AttackType::Avalanche => "avalanche",
            AttackType::KeyRecovery => "keyrecovery",
            AttackType::Statistical => "statistical",
            AttackType::Differential => "differential",
            AttackType::SideChannel => "sidechannel",
        }
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            AttackType::Equivalent => "Equivalent Keys Analysis",
            AttackType::Related => "Related-Key Attack",
            AttackType::Avalanche => "Avalanche Effect Test",
            AttackType::KeyRecovery => "Key Recovery Attempt",
            AttackType::Statistical => "Statistical Trials",
            AttackType::Differential => "Differential Characteristic Search",
            AttackType::SideChannel => "Timing Side-Channel Analysis",
        }
    }

    /// Remote endpoint path.
    pub fn endpoint(self) -> &'static str {
        match self {
            AttackType::Equivalent => "/api/equivalent-keys",
            AttackType::Related => "/api/related-key-attack",
            AttackType::Avalanche => "/api/avalanche-test",
            AttackType::KeyRecovery => "/api/tea-key-recovery",
            AttackType::Statistical => "/api/statistical-analysis",
            AttackType::Differential => "/api/differential-search",
            AttackType::SideChannel => "/api/timing-sidechannel",
        }
    }

    /// Message shown when the remote call fails without an `error` field.
    pub fn fallback_error(self) -> &'static str {
        match self {
            AttackType::Equivalent => "Equivalent keys analysis failed",
            AttackType::Related => "Related-key attack analysis failed",
            AttackType::Avalanche => "Avalanche test failed",
            AttackType::KeyRecovery => "Key recovery attempt failed",
            AttackType::Statistical => "Statistical analysis failed",
            AttackType::Differential => "Differential search failed",
            AttackType::SideChannel => "Timing side-channel analysis failed",
        }
    }

    /// Progress pacing (increment / interval).
    pub fn cadence(self) -> Cadence {
        match self {
            AttackType::Equivalent => Cadence::new(20, 200),
            AttackType::Related => Cadence::new(25, 200),
            AttackType::Avalanche => Cadence::new(15, 200),
            AttackType::KeyRecovery => Cadence::new(5, 300),
            AttackType::Statistical => Cadence::new(2, 500),
            AttackType::Differential => Cadence::new(3, 400),
            AttackType::SideChannel => Cadence::new(1, 600),
        }
    }

    /// Whether the attack operates on an uploaded plaintext sample.
    pub fn needs_sample(self) -> bool {
        matches!(
            self,
            AttackType::Equivalent
                | AttackType::Related
                | AttackType::Avalanche
                | AttackType::KeyRecovery
        )
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown attack name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attack type '{0}' (expected one of: equivalent, related, avalanche, keyrecovery, statistical, differential, sidechannel)")]
pub struct UnknownAttackType(pub String);

impl FromStr for AttackType {
    type Err = UnknownAttackType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        AttackType::ALL
            .into_iter()
            .find(|a| a.as_str() == lowered)
            .ok_or_else(|| UnknownAttackType(s.to_string()))
    }
}

// ============================================================================
// Advanced options
// ============================================================================

/// Which quantity the statistical attack measures per trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// Encryption time in microseconds.
    #[default]
    Timing,
    /// Avalanche percentage.
    Avalanche,
}

impl TestType {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Timing => "timing",
            TestType::Avalanche => "avalanche",
        }
    }
}

impl FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timing" => Ok(TestType::Timing),
            "avalanche" => Ok(TestType::Avalanche),
            other => Err(format!("unknown test type '{other}' (expected timing or avalanche)")),
        }
    }
}

/// Advanced parameters of the key-only attacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvancedOptions {
    /// Trials for `statistical` (10–500).
    pub num_trials: u32,
    /// Samples for `differential` and `sidechannel` (100–2000).
    pub num_samples: u32,
    /// Confidence level for the statistical interval, in (0, 1).
    pub confidence_level: f64,
    /// Quantity measured by `statistical`.
    pub test_type: TestType,
}

impl Default for AdvancedOptions {
    fn default() -> Self {
        Self {
            num_trials: NUM_TRIALS.default,
            num_samples: NUM_SAMPLES.default,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            test_type: TestType::Timing,
        }
    }
}

// ============================================================================
// ProgressState
// ============================================================================

/// The cosmetic progress indicator of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    /// 0–100.
    pub percent: u8,
    /// True from dispatch until the settle delay has elapsed.
    pub in_flight: bool,
}

impl ProgressState {
    /// Resting state between runs.
    pub const IDLE: ProgressState = ProgressState {
        percent: 0,
        in_flight: false,
    };
}
