//! Result Normalizer.
//!
//! Turns each endpoint's raw body into one uniform, chart-ready shape. The
//! per-algorithm payloads live in a [`PerAlgorithm`] map keyed by
//! [`AlgorithmId`]: an algorithm the service did not report (a two-cipher
//! deployment asked about a third cipher, or an entry that failed to parse)
//! is an entry with no data, never an error.
//!
//! None of the `normalize_*` functions can fail.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AlgorithmId, AttackType, ComparisonSet};
use crate::wire::{
    RawAvalanchePoint, RawBruteForceFigures, RawDifferential, RawEquivalentKey, RawKeyRecovery,
    RawRelatedKey, RawSideChannel, RawStatistical, RawStructuralProfile, RawTimingFigures,
    RawTransform,
};

// ============================================================================
// PerAlgorithm
// ============================================================================

/// One algorithm's slot: its identifier and, when reported, its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmEntry<T> {
    pub algorithm: AlgorithmId,
    pub data: Option<T>,
}

/// Mapping from algorithm identifier to optional payload.
///
/// Entries follow the comparison set's order; algorithms the service
/// reported beyond the set are appended in key order so nothing is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerAlgorithm<T> {
    entries: Vec<AlgorithmEntry<T>>,
}

impl<T> PerAlgorithm<T> {
    /// Map with every member of `set` present but empty.
    pub fn empty(set: &ComparisonSet) -> Self {
        Self {
            entries: set
                .iter()
                .map(|id| AlgorithmEntry {
                    algorithm: id.clone(),
                    data: None,
                })
                .collect(),
        }
    }

    /// Payload for `id`, or `None` when the algorithm has no data.
    pub fn get(&self, id: &AlgorithmId) -> Option<&T> {
        self.entries
            .iter()
            .find(|e| &e.algorithm == id)
            .and_then(|e| e.data.as_ref())
    }

    /// Whether `id` has data.
    pub fn has_data(&self, id: &AlgorithmId) -> bool {
        self.get(id).is_some()
    }

    /// Every slot, including the empty ones.
    pub fn entries(&self) -> &[AlgorithmEntry<T>] {
        &self.entries
    }

    /// Identifiers in slot order.
    pub fn algorithms(&self) -> impl Iterator<Item = &AlgorithmId> {
        self.entries.iter().map(|e| &e.algorithm)
    }

    /// Only the slots with data.
    pub fn present(&self) -> impl Iterator<Item = (&AlgorithmId, &T)> {
        self.entries
            .iter()
            .filter_map(|e| e.data.as_ref().map(|d| (&e.algorithm, d)))
    }

    /// Transform every present payload, keeping empty slots empty.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerAlgorithm<U> {
        PerAlgorithm {
            entries: self
                .entries
                .iter()
                .map(|e| AlgorithmEntry {
                    algorithm: e.algorithm.clone(),
                    data: e.data.as_ref().map(&mut f),
                })
                .collect(),
        }
    }

    fn insert(&mut self, id: AlgorithmId, data: Option<T>) {
        match self.entries.iter_mut().find(|e| e.algorithm == id) {
            Some(entry) => entry.data = data,
            None => self.entries.push(AlgorithmEntry { algorithm: id, data }),
        }
    }
}

impl<T> PerAlgorithm<Vec<T>> {
    /// The list reported for `id`; empty when the algorithm has no data.
    pub fn series(&self, id: &AlgorithmId) -> &[T] {
        self.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Read an open `{<alg>: payload}` object into a [`PerAlgorithm`].
///
/// A missing object yields all-empty slots; an entry that fails to parse is
/// logged and left empty.
pub fn per_algorithm<T: DeserializeOwned>(
    set: &ComparisonSet,
    object: Option<&Value>,
) -> PerAlgorithm<T> {
    let mut map = PerAlgorithm::empty(set);
    let Some(Value::Object(fields)) = object else {
        if object.is_some() {
            tracing::warn!("per-algorithm results are not a JSON object; treating as no data");
        }
        return map;
    };

    let extras: BTreeSet<&String> = fields
        .keys()
        .filter(|k| !set.contains(&AlgorithmId::new(k.as_str())))
        .collect();

    for id in set.iter() {
        if let Some(raw) = fields.get(id.as_str()) {
            map.insert(id.clone(), parse_entry(id.as_str(), raw));
        }
    }
    for key in extras {
        tracing::debug!(algorithm = %key, "service reported an algorithm outside the comparison set");
        map.insert(AlgorithmId::new(key.as_str()), parse_entry(key, &fields[key]));
    }
    map
}

fn parse_entry<T: DeserializeOwned>(algorithm: &str, raw: &Value) -> Option<T> {
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(%algorithm, error = %err, "malformed per-algorithm payload; treating as no data");
            None
        }
    }
}

/// Read a single-target object, falling back to defaults field by field.
fn single<T: DeserializeOwned + Default>(object: Option<&Value>) -> T {
    match object {
        None | Some(Value::Null) => T::default(),
        Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "malformed results object; using empty result");
            T::default()
        }),
    }
}

fn results(body: &Value) -> Option<&Value> {
    body.get("results")
}

// ============================================================================
// Normalized attack shapes
// ============================================================================

/// One tested key from the equivalent-key search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalentKeyCandidate {
    /// 1-based position in the service's list.
    pub candidate_index: usize,
    /// The key's ciphertext equals the base ciphertext.
    pub matches_base: bool,
    /// The key is structurally equivalent to the base key.
    pub is_equivalent: bool,
    pub key_hex: String,
}

/// The two independent flags of a candidate, read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    /// Produces the base ciphertext.
    Matching,
    /// Structurally equivalent but the ciphertext differs; detection needs
    /// single-block, padding-free testing.
    ExperimentalLimitation,
    /// Neither.
    Distinct,
}

impl EquivalentKeyCandidate {
    /// Combine `matches_base` and `is_equivalent` without losing either.
    pub fn status(&self) -> CandidateStatus {
        match (self.matches_base, self.is_equivalent) {
            (true, _) => CandidateStatus::Matching,
            (false, true) => CandidateStatus::ExperimentalLimitation,
            (false, false) => CandidateStatus::Distinct,
        }
    }
}

/// Normalized `/api/equivalent-keys`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalentKeysReport {
    pub candidates: PerAlgorithm<Vec<EquivalentKeyCandidate>>,
}

impl EquivalentKeysReport {
    /// `any(matches_base)` for `id`; `None` when the algorithm has no data.
    pub fn has_equivalent_keys(&self, id: &AlgorithmId) -> Option<bool> {
        self.candidates
            .get(id)
            .map(|list| list.iter().any(|c| c.matches_base))
    }
}

/// One delta of the related-key attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub delta: String,
    pub correlation: f64,
}

/// One x-axis position of a multi-series chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    /// Axis label.
    pub x: String,
    /// One value per algorithm slot, `None` where that series has no point.
    pub values: Vec<(AlgorithmId, Option<f64>)>,
}

/// Normalized `/api/related-key-attack`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedKeyReport {
    pub series: PerAlgorithm<Vec<CorrelationPoint>>,
}

impl RelatedKeyReport {
    /// One row per delta position, labelled by the first reporting
    /// algorithm's delta. Each algorithm tests its own delta list, so rows
    /// align by position rather than by delta value.
    pub fn chart_rows(&self) -> Vec<ChartRow> {
        let longest = self
            .series
            .present()
            .map(|(_, s)| s.len())
            .max()
            .unwrap_or(0);
        (0..longest)
            .map(|i| ChartRow {
                x: self
                    .series
                    .present()
                    .find_map(|(_, s)| s.get(i).map(|p| p.delta.clone()))
                    .unwrap_or_default(),
                values: self
                    .series
                    .entries()
                    .iter()
                    .map(|e| {
                        let value = e
                            .data
                            .as_ref()
                            .and_then(|s| s.get(i))
                            .map(|p| p.correlation);
                        (e.algorithm.clone(), value)
                    })
                    .collect(),
            })
            .collect()
    }

    /// Mean correlation for `id`.
    pub fn mean_correlation(&self, id: &AlgorithmId) -> Option<f64> {
        crate::metrics::mean(self.series.series(id).iter().map(|p| p.correlation))
    }
}

/// One flipped input bit of the avalanche test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvalanchePoint {
    pub bit_position: u32,
    pub avalanche_percentage: f64,
}

/// Normalized `/api/avalanche-test`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvalancheReport {
    pub series: PerAlgorithm<Vec<AvalanchePoint>>,
}

impl AvalancheReport {
    /// Arithmetic mean of the avalanche percentages for `id`.
    pub fn average(&self, id: &AlgorithmId) -> Option<f64> {
        crate::metrics::mean(
            self.series
                .series(id)
                .iter()
                .map(|p| p.avalanche_percentage),
        )
    }

    /// One row per bit position present in any series, aligned by
    /// `bit_position`.
    pub fn chart_rows(&self) -> Vec<ChartRow> {
        let positions: BTreeSet<u32> = self
            .series
            .present()
            .flat_map(|(_, s)| s.iter().map(|p| p.bit_position))
            .collect();
        positions
            .into_iter()
            .map(|bit| ChartRow {
                x: bit.to_string(),
                values: self
                    .series
                    .entries()
                    .iter()
                    .map(|e| {
                        let value = e.data.as_ref().and_then(|s| {
                            s.iter()
                                .find(|p| p.bit_position == bit)
                                .map(|p| p.avalanche_percentage)
                        });
                        (e.algorithm.clone(), value)
                    })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryStep {
    pub step: String,
    pub description: String,
    pub note: Option<String>,
}

/// Partial key information recovered for one key-word pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCandidate {
    pub k0: String,
    pub k1: String,
    pub partial_match: bool,
}

/// Normalized `/api/tea-key-recovery`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyRecoveryReport {
    pub method: String,
    pub theoretical_complexity: String,
    pub actual_attempts: u64,
    pub success: bool,
    pub steps: Vec<RecoveryStep>,
    pub candidates: Vec<KeyCandidate>,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub margin_error: f64,
}

impl ConfidenceInterval {
    /// Whether `value` lies inside `[lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub mean_time_us: Option<f64>,
    pub mean_avalanche_percent: Option<f64>,
    pub confidence_interval: Option<ConfidenceInterval>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialStat {
    pub trial: u32,
    pub mean: f64,
    pub std: f64,
}

/// Normalized `/api/statistical-analysis`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalReport {
    pub algorithm: String,
    pub num_trials: u32,
    pub confidence_level: f64,
    pub test_type: String,
    /// `None` when the service sent no statistics block.
    pub summary: Option<StatisticalSummary>,
    pub trials: Vec<TrialStat>,
}

impl StatisticalReport {
    /// The headline mean, whichever quantity was measured.
    pub fn headline_mean(&self) -> Option<f64> {
        let summary = self.summary.as_ref()?;
        summary.mean_time_us.or(summary.mean_avalanche_percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentialSummary {
    pub unique_characteristics: u32,
    pub highest_probability: f64,
    pub average_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    pub input_diff_hex: [String; 2],
    pub output_diff_hex: [String; 2],
    pub count: u32,
    pub probability: f64,
}

/// Normalized `/api/differential-search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DifferentialReport {
    pub target: String,
    pub samples_tested: u32,
    pub summary: Option<DifferentialSummary>,
    pub characteristics: Vec<Characteristic>,
}

impl DifferentialReport {
    /// Characteristics ordered by descending probability.
    pub fn ranked(&self) -> Vec<&Characteristic> {
        let mut ranked: Vec<&Characteristic> = self.characteristics.iter().collect();
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        ranked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingLeakage {
    pub mean_diff_us: f64,
    pub max_diff_us: f64,
    pub correlation_strength: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BitCorrelation {
    pub bit_position: u32,
    pub timing_diff_us: f64,
    pub t_statistic: f64,
    pub significant: bool,
}

/// Normalized `/api/timing-sidechannel`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideChannelReport {
    pub assessment: String,
    pub bits_with_leakage: u32,
    pub vulnerability_percentage: f64,
    pub timing: Option<TimingLeakage>,
    pub bit_correlations: Vec<BitCorrelation>,
    pub note: Option<String>,
}

impl SideChannelReport {
    /// Key bits whose timing difference the service marked significant.
    pub fn significant_bits(&self) -> impl Iterator<Item = &BitCorrelation> {
        self.bit_correlations.iter().filter(|c| c.significant)
    }
}

/// Normalized result of one attack run, tagged by attack type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AttackResult {
    Equivalent(EquivalentKeysReport),
    Related(RelatedKeyReport),
    Avalanche(AvalancheReport),
    #[serde(rename = "keyrecovery")]
    KeyRecovery(KeyRecoveryReport),
    Statistical(StatisticalReport),
    Differential(DifferentialReport),
    #[serde(rename = "sidechannel")]
    SideChannel(SideChannelReport),
}

impl AttackResult {
    /// The attack that produced this result.
    pub fn attack_type(&self) -> AttackType {
        match self {
            AttackResult::Equivalent(_) => AttackType::Equivalent,
            AttackResult::Related(_) => AttackType::Related,
            AttackResult::Avalanche(_) => AttackType::Avalanche,
            AttackResult::KeyRecovery(_) => AttackType::KeyRecovery,
            AttackResult::Statistical(_) => AttackType::Statistical,
            AttackResult::Differential(_) => AttackType::Differential,
            AttackResult::SideChannel(_) => AttackType::SideChannel,
        }
    }
}

// ============================================================================
// Attack normalization
// ============================================================================

/// Normalize the body of an attack endpoint.
pub fn normalize_attack(attack: AttackType, set: &ComparisonSet, body: &Value) -> AttackResult {
    let results = results(body);
    match attack {
        AttackType::Equivalent => AttackResult::Equivalent(equivalent(set, results)),
        AttackType::Related => AttackResult::Related(related(set, results)),
        AttackType::Avalanche => AttackResult::Avalanche(avalanche(set, results)),
        AttackType::KeyRecovery => AttackResult::KeyRecovery(key_recovery(single(results))),
        AttackType::Statistical => AttackResult::Statistical(statistical(single(results))),
        AttackType::Differential => AttackResult::Differential(differential(single(results))),
        AttackType::SideChannel => AttackResult::SideChannel(side_channel(single(results))),
    }
}

fn equivalent(set: &ComparisonSet, results: Option<&Value>) -> EquivalentKeysReport {
    let raw: PerAlgorithm<Vec<RawEquivalentKey>> = per_algorithm(set, results);
    EquivalentKeysReport {
        candidates: raw.map(|list| {
            list.iter()
                .enumerate()
                .map(|(i, k)| EquivalentKeyCandidate {
                    candidate_index: i + 1,
                    matches_base: k.matches_base,
                    is_equivalent: k.is_equivalent,
                    key_hex: k.key.clone(),
                })
                .collect()
        }),
    }
}

fn related(set: &ComparisonSet, results: Option<&Value>) -> RelatedKeyReport {
    let raw: PerAlgorithm<Vec<RawRelatedKey>> = per_algorithm(set, results);
    RelatedKeyReport {
        series: raw.map(|list| {
            list.iter()
                .map(|r| CorrelationPoint {
                    delta: r.delta.clone(),
                    correlation: r.correlation,
                })
                .collect()
        }),
    }
}

fn avalanche(set: &ComparisonSet, results: Option<&Value>) -> AvalancheReport {
    let raw: PerAlgorithm<Vec<RawAvalanchePoint>> = per_algorithm(set, results);
    AvalancheReport {
        series: raw.map(|list| {
            let mut points: Vec<AvalanchePoint> = list
                .iter()
                .map(|p| AvalanchePoint {
                    bit_position: p.bit_position,
                    avalanche_percentage: p.avalanche_percentage,
                })
                .collect();
            points.sort_by_key(|p| p.bit_position);
            points
        }),
    }
}

fn key_recovery(raw: RawKeyRecovery) -> KeyRecoveryReport {
    KeyRecoveryReport {
        method: raw.method,
        theoretical_complexity: raw.theoretical_complexity,
        actual_attempts: raw.actual_attempts,
        success: raw.success,
        steps: raw
            .steps
            .into_iter()
            .map(|s| RecoveryStep {
                step: s.step,
                description: s.description,
                note: s.note,
            })
            .collect(),
        candidates: raw
            .partial_information
            .into_iter()
            .map(|c| KeyCandidate {
                k0: c.k0,
                k1: c.k1,
                partial_match: c.partial_match,
            })
            .collect(),
        note: raw.educational_note,
    }
}

fn statistical(raw: RawStatistical) -> StatisticalReport {
    let (summary, trials) = match raw.statistics {
        Some(stats) => (
            Some(StatisticalSummary {
                mean_time_us: stats.overall_mean_us,
                mean_avalanche_percent: stats.mean_avalanche_percent,
                confidence_interval: stats.confidence_interval.map(|ci| ConfidenceInterval {
                    lower: ci.lower,
                    upper: ci.upper,
                    margin_error: ci.margin_error,
                }),
            }),
            stats
                .all_trials
                .into_iter()
                .map(|t| TrialStat {
                    trial: t.trial,
                    mean: t.mean,
                    std: t.std,
                })
                .collect(),
        ),
        None => (None, Vec::new()),
    };
    StatisticalReport {
        algorithm: raw.algorithm,
        num_trials: raw.num_trials,
        confidence_level: raw.confidence_level,
        test_type: raw.test_type,
        summary,
        trials,
    }
}

fn differential(raw: RawDifferential) -> DifferentialReport {
    DifferentialReport {
        target: raw.target,
        samples_tested: raw.samples_tested,
        summary: raw.search_summary.map(|s| DifferentialSummary {
            unique_characteristics: s.total_unique_characteristics,
            highest_probability: s.highest_probability,
            average_probability: s.average_probability,
        }),
        characteristics: raw
            .characteristics_found
            .into_iter()
            .map(|c| Characteristic {
                input_diff_hex: c.input_diff_hex,
                output_diff_hex: c.output_diff_hex,
                count: c.count,
                probability: c.probability,
            })
            .collect(),
    }
}

fn side_channel(raw: RawSideChannel) -> SideChannelReport {
    let vulnerability = raw.vulnerability_assessment.unwrap_or_default();
    SideChannelReport {
        assessment: vulnerability.assessment,
        bits_with_leakage: vulnerability.bits_with_leakage,
        vulnerability_percentage: vulnerability.vulnerability_percentage,
        timing: raw.timing_analysis.map(|t| TimingLeakage {
            mean_diff_us: t.mean_diff_us,
            max_diff_us: t.max_diff_us,
            correlation_strength: t.correlation_strength,
        }),
        bit_correlations: raw
            .key_bit_correlations
            .into_iter()
            .map(|c| BitCorrelation {
                bit_position: c.bit_position,
                timing_diff_us: c.timing_diff_us,
                t_statistic: c.t_statistic,
                significant: c.significant,
            })
            .collect(),
        note: raw.educational_note.filter(|n| !n.is_empty()),
    }
}

// ============================================================================
// Studies, structural analysis, file transforms
// ============================================================================

pub type TimingFigures = RawTimingFigures;
pub type BruteForceFigures = RawBruteForceFigures;

/// Normalized `/api/timing-analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    pub figures: PerAlgorithm<TimingFigures>,
}

/// Normalized `/api/brute-force-study`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BruteForceReport {
    pub figures: PerAlgorithm<BruteForceFigures>,
}

/// Static design description of one cipher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralProfile {
    pub round_structure: String,
    pub block_size: String,
    pub key_size: String,
    pub key_schedule: String,
    pub confusion: String,
    pub diffusion: String,
    pub weaknesses: Vec<String>,
    pub strengths: Vec<String>,
}

/// Normalized `/api/structural-analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralReport {
    pub profiles: PerAlgorithm<StructuralProfile>,
}

/// Outcome of an encrypt or decrypt upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformReceipt {
    /// Name to pass to `/api/download/:filename`.
    pub filename: String,
    pub original_size: u64,
    /// Encrypted or decrypted size, whichever the endpoint reported.
    pub output_size: Option<u64>,
    pub time_ms: f64,
    pub throughput_mbps: f64,
    pub cpu_percent: f64,
    pub memory_mb: f64,
}

/// Result of a study run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum StudyReport {
    BruteForce(BruteForceReport),
    Timing(TimingReport),
}

/// Normalize the body of `/api/timing-analysis`.
pub fn normalize_timing(set: &ComparisonSet, body: &Value) -> TimingReport {
    TimingReport {
        figures: per_algorithm(set, results(body)),
    }
}

/// Normalize the body of `/api/brute-force-study`.
pub fn normalize_brute_force(set: &ComparisonSet, body: &Value) -> BruteForceReport {
    BruteForceReport {
        figures: per_algorithm(set, results(body)),
    }
}

/// Normalize the body of `/api/structural-analysis` (keyed by `analysis`).
pub fn normalize_structural(set: &ComparisonSet, body: &Value) -> StructuralReport {
    let raw: PerAlgorithm<RawStructuralProfile> = per_algorithm(set, body.get("analysis"));
    StructuralReport {
        profiles: raw.map(|p| StructuralProfile {
            round_structure: p.round_structure.clone(),
            block_size: p.block_size.clone(),
            key_size: p.key_size.clone(),
            key_schedule: p.key_schedule.clone(),
            confusion: p.confusion.clone(),
            diffusion: p.diffusion.clone(),
            weaknesses: p.weaknesses.clone(),
            strengths: p.strengths.clone(),
        }),
    }
}

/// Normalize the body of `/api/encrypt` or `/api/decrypt`.
pub fn normalize_transform(body: &Value) -> TransformReceipt {
    let raw: RawTransform = single(Some(body));
    TransformReceipt {
        filename: raw.filename,
        original_size: raw.original_size,
        output_size: raw.encrypted_size.or(raw.decrypted_size),
        time_ms: raw.performance.time_ms,
        throughput_mbps: raw.performance.throughput_mbps,
        cpu_percent: raw.performance.cpu_percent,
        memory_mb: raw.performance.memory_mb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn three() -> ComparisonSet {
        ComparisonSet::new(["TEA", "AES", "NTSA_3.5"]).unwrap()
    }

    #[test]
    fn missing_results_object_is_all_empty() {
        let result = normalize_attack(AttackType::Avalanche, &three(), &json!({"success": true}));
        let AttackResult::Avalanche(report) = result else {
            panic!("wrong variant");
        };
        assert_eq!(report.series.entries().len(), 3);
        assert!(report.series.present().next().is_none());
        assert!(report.chart_rows().is_empty());
    }

    #[test]
    fn malformed_entry_degrades_only_that_algorithm() {
        let body = json!({"results": {
            "TEA": [{"delta": "0x1", "correlation": 12}],
            "AES": "not a list",
        }});
        let AttackResult::Related(report) = normalize_attack(AttackType::Related, &three(), &body)
        else {
            panic!("wrong variant");
        };
        assert_eq!(report.series.series(&"TEA".into()).len(), 1);
        assert!(report.series.series(&"AES".into()).is_empty());
        assert!(!report.series.has_data(&"AES".into()));
    }

    #[test]
    fn extra_algorithms_are_appended() {
        let set = ComparisonSet::default();
        let body = json!({"results": {
            "TEA": [], "AES": [], "NTSA_3.5": [{"bit_position": 0, "avalanche_percentage": 49.0}]
        }});
        let AttackResult::Avalanche(report) = normalize_attack(AttackType::Avalanche, &set, &body)
        else {
            panic!("wrong variant");
        };
        let ids: Vec<&str> = report.series.algorithms().map(|a| a.as_str()).collect();
        assert_eq!(ids, vec!["TEA", "AES", "NTSA_3.5"]);
        assert_eq!(report.average(&"NTSA_3.5".into()), Some(49.0));
    }

    #[test]
    fn single_target_results_not_an_object() {
        let result = normalize_attack(AttackType::KeyRecovery, &three(), &json!({"results": 7}));
        assert_eq!(result, AttackResult::KeyRecovery(KeyRecoveryReport::default()));
    }

    #[test]
    fn attack_result_serializes_tagged() {
        let result = AttackResult::Differential(DifferentialReport::default());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "differential");
        assert_eq!(result.attack_type(), AttackType::Differential);
    }

    #[test]
    fn transform_reports_either_size() {
        let receipt = normalize_transform(&json!({
            "filename": "decrypted_TEA_1.txt",
            "original_size": 16,
            "decrypted_size": 11,
            "performance": {"time_ms": 0.5, "throughput_mbps": 3.0, "cpu_percent": 1.0, "memory_mb": 0.1}
        }));
        assert_eq!(receipt.output_size, Some(11));
        assert_eq!(receipt.filename, "decrypted_TEA_1.txt");
        assert_eq!(receipt.time_ms, 0.5);
    }
}
