//! Comparative metrics over normalized results.
//!
//! Pure functions only: time and magnitude formatting, the log-scale
//! transform used for "years to exhaust", and the winner/loser judgments the
//! dashboards display.

use serde::{Deserialize, Serialize};

use crate::constants::{AVALANCHE_TOLERANCE_PERCENT, HIGH_TIMING_VARIANCE_CV, SECONDS_PER_YEAR};
use crate::normalize::{
    AvalancheReport, BruteForceReport, EquivalentKeysReport, PerAlgorithm, SideChannelReport,
    TimingReport,
};
use crate::types::AlgorithmId;

// ============================================================================
// Number formatting
// ============================================================================

/// Fixed-point rendering with `digits` decimals.
///
/// Rounding follows the exact decimal value of the double. Only exact ties
/// round away from zero, so `to_fixed(1.125, 2)` is `"1.13"` while
/// `to_fixed(4.35, 1)` is `"4.3"` (4.35 is stored as 4.3499999...).
pub fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    // Past the first dropped digit, a double near a tie is never within
    // 10^-(digits + TIE_GUARD) of it, so this expansion shows ties exactly.
    const TIE_GUARD: usize = 30;
    let wide = format!("{:.*}", digits + TIE_GUARD, magnitude);
    let (kept, dropped) = wide.split_at(wide.len() - TIE_GUARD);
    let is_tie = dropped.starts_with('5') && dropped[1..].bytes().all(|b| b == b'0');

    let body = if is_tie {
        increment_last_digit(kept.trim_end_matches('.'))
    } else {
        format!("{:.*}", digits, magnitude)
    };
    format!("{sign}{body}")
}

/// Add one unit in the last place of a plain decimal string.
fn increment_last_digit(decimal: &str) -> String {
    let mut bytes = decimal.as_bytes().to_vec();
    for byte in bytes.iter_mut().rev() {
        match *byte {
            b'.' => continue,
            b'9' => *byte = b'0',
            _ => {
                *byte += 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
        }
    }
    format!("1{}", String::from_utf8_lossy(&bytes))
}

/// Scientific notation with an explicit exponent sign, e.g. `"3.20e+26"`.
pub fn to_exponential(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rendered = format!("{:.*e}", digits, value);
    match rendered.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => rendered,
    }
}

/// Human-readable duration for a number of seconds.
///
/// Units switch at 60, 3600, 86400 and 31536000 seconds; a value exactly on
/// a boundary uses the larger unit.
pub fn format_time(seconds: f64) -> String {
    const MINUTE: f64 = 60.0;
    const HOUR: f64 = 3_600.0;
    const DAY: f64 = 86_400.0;

    if seconds < MINUTE {
        format!("{} seconds", to_fixed(seconds, 2))
    } else if seconds < HOUR {
        format!("{} minutes", to_fixed(seconds / MINUTE, 2))
    } else if seconds < DAY {
        format!("{} hours", to_fixed(seconds / HOUR, 2))
    } else if seconds < SECONDS_PER_YEAR {
        format!("{} days", to_fixed(seconds / DAY, 2))
    } else {
        format!("{} years", to_fixed(seconds / SECONDS_PER_YEAR, 2))
    }
}

/// Abbreviated magnitude: integers below 1000, then K, M, B and T.
pub fn format_large_number(n: f64) -> String {
    const STEPS: [(f64, f64, &str); 3] = [
        (1e6, 1e3, "K"),
        (1e9, 1e6, "M"),
        (1e12, 1e9, "B"),
    ];

    if n < 1_000.0 {
        return to_fixed(n, 0);
    }
    for (limit, divisor, suffix) in STEPS {
        if n < limit {
            return format!("{}{}", to_fixed(n / divisor, 2), suffix);
        }
    }
    format!("{}T", to_fixed(n / 1e12, 2))
}

/// Log10 of "years to exhaust" for charting; `None` for non-positive input.
pub fn log_years(years: f64) -> Option<f64> {
    (years > 0.0 && years.is_finite()).then(|| years.log10())
}

/// Inverse of [`log_years`], used to label chart tooltips.
pub fn years_from_log(log_value: f64) -> f64 {
    10f64.powf(log_value)
}

/// Arithmetic mean, `None` for an empty sequence.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

// ============================================================================
// Selection helpers
// ============================================================================

/// Algorithm with the largest value; ties go to the later algorithm.
fn argmax<T>(map: &PerAlgorithm<T>, value: impl Fn(&T) -> f64) -> Option<AlgorithmId> {
    let mut best: Option<(&AlgorithmId, f64)> = None;
    for (id, data) in map.present() {
        let v = value(data);
        if best.map_or(true, |(_, b)| v >= b) {
            best = Some((id, v));
        }
    }
    best.map(|(id, _)| id.clone())
}

/// Algorithm strictly below every other reporting algorithm, if one exists.
fn strict_min<T>(map: &PerAlgorithm<T>, value: impl Fn(&T) -> f64) -> Option<AlgorithmId> {
    let present: Vec<(&AlgorithmId, f64)> = map.present().map(|(id, d)| (id, value(d))).collect();
    present
        .iter()
        .find(|(id, v)| present.iter().all(|(other, w)| other == id || v < w))
        .map(|(id, _)| (*id).clone())
}

// ============================================================================
// Brute-force feasibility
// ============================================================================

/// One bar of the brute-force chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BruteForceRow {
    pub algorithm: AlgorithmId,
    pub attempts_per_second: f64,
    /// `log10(years_to_exhaust)`; `None` when the figure is not positive.
    pub log_years: Option<f64>,
}

/// Chart rows with the log transform applied.
pub fn brute_force_rows(report: &BruteForceReport) -> Vec<BruteForceRow> {
    report
        .figures
        .present()
        .map(|(id, f)| BruteForceRow {
            algorithm: id.clone(),
            attempts_per_second: f.attempts_per_second,
            log_years: log_years(f.years_to_exhaust),
        })
        .collect()
}

/// The "Faster Algorithm" headline: the algorithm with the larger
/// `years_to_exhaust`.
///
/// This deliberately mirrors the dashboard's comparison and can disagree
/// with [`attempts_leader`].
pub fn faster_algorithm(report: &BruteForceReport) -> Option<AlgorithmId> {
    argmax(&report.figures, |f| f.years_to_exhaust)
}

/// The algorithm processing the most attempts per second.
pub fn attempts_leader(report: &BruteForceReport) -> Option<AlgorithmId> {
    argmax(&report.figures, |f| f.attempts_per_second)
}

/// Caption under the headline, e.g. `"TEA processes more attempts/second"`.
pub fn attempts_caption(report: &BruteForceReport) -> Option<String> {
    attempts_leader(report).map(|id| format!("{id} processes more attempts/second"))
}

// ============================================================================
// Static security profile
// ============================================================================

/// Verdict attached to an algorithm by identity rather than by data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityProfile {
    /// Known structural weaknesses (TEA).
    Weak,
    /// No known structural weaknesses (AES).
    Strong,
    /// Not characterised.
    Unrated,
}

impl SecurityProfile {
    pub fn of(id: &AlgorithmId) -> Self {
        match id.as_str().to_ascii_uppercase().as_str() {
            "TEA" => SecurityProfile::Weak,
            "AES" => SecurityProfile::Strong,
            _ => SecurityProfile::Unrated,
        }
    }

    /// Related-key verdict line.
    pub fn correlation_verdict(self) -> &'static str {
        match self {
            SecurityProfile::Weak => "High correlation = VULNERABLE!",
            SecurityProfile::Strong => "Low correlation = SECURE!",
            SecurityProfile::Unrated => "Correlation not characterised",
        }
    }

    /// Avalanche verdict line shown beside the measured average.
    pub fn diffusion_verdict(self) -> &'static str {
        match self {
            SecurityProfile::Weak => "Poor avalanche = WEAK diffusion!",
            SecurityProfile::Strong => "~50% avalanche = STRONG diffusion!",
            SecurityProfile::Unrated => "Diffusion not characterised",
        }
    }
}

/// The "More Secure Overall" headline: the first algorithm with a strong
/// profile, falling back to the first non-weak one.
pub fn more_secure_overall<'a>(
    algorithms: impl IntoIterator<Item = &'a AlgorithmId>,
) -> Option<AlgorithmId> {
    let algorithms: Vec<&AlgorithmId> = algorithms.into_iter().collect();
    algorithms
        .iter()
        .find(|id| SecurityProfile::of(id) == SecurityProfile::Strong)
        .or_else(|| {
            algorithms
                .iter()
                .find(|id| SecurityProfile::of(id) != SecurityProfile::Weak)
        })
        .map(|id| (*id).clone())
}

// ============================================================================
// Data-derived verdicts
// ============================================================================

/// Equivalent-key verdict for one algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquivalenceVerdict {
    /// At least one candidate reproduced the base ciphertext.
    Flawed,
    /// None matched, but the algorithm has structurally equivalent keys
    /// that this test setup cannot detect.
    ExperimentalLimitation,
    /// None matched and none are expected.
    Secure,
}

impl EquivalenceVerdict {
    pub fn message(self, id: &AlgorithmId) -> String {
        match self {
            EquivalenceVerdict::Flawed => {
                format!("{id} HAS EQUIVALENT KEYS - CRITICAL SECURITY FLAW!")
            }
            EquivalenceVerdict::ExperimentalLimitation => {
                format!("{id} equivalent keys not detected - experimental limitation")
            }
            EquivalenceVerdict::Secure => format!("{id} has no equivalent keys - SECURE!"),
        }
    }
}

/// Verdict for `id`, `None` when the algorithm reported nothing.
pub fn equivalence_verdict(
    report: &EquivalentKeysReport,
    id: &AlgorithmId,
) -> Option<EquivalenceVerdict> {
    let candidates = report.candidates.get(id)?;
    Some(if candidates.iter().any(|c| c.matches_base) {
        EquivalenceVerdict::Flawed
    } else if candidates.iter().any(|c| c.is_equivalent)
        || SecurityProfile::of(id) == SecurityProfile::Weak
    {
        EquivalenceVerdict::ExperimentalLimitation
    } else {
        EquivalenceVerdict::Secure
    })
}

/// Whether an average avalanche percentage is close enough to the ideal 50%.
pub fn is_strong_diffusion(average_percent: f64) -> bool {
    (average_percent - 50.0).abs() <= AVALANCHE_TOLERANCE_PERCENT
}

/// Average and diffusion judgment for every reporting algorithm.
pub fn avalanche_summary(report: &AvalancheReport) -> Vec<(AlgorithmId, f64, bool)> {
    report
        .series
        .algorithms()
        .filter_map(|id| {
            report
                .average(id)
                .map(|avg| (id.clone(), avg, is_strong_diffusion(avg)))
        })
        .collect()
}

/// Number of key bits with statistically significant timing differences.
pub fn significant_bit_count(report: &SideChannelReport) -> usize {
    report.significant_bits().count()
}

// ============================================================================
// Encryption timing
// ============================================================================

/// One metric row of the timing chart, one value per algorithm slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingRow {
    pub metric: &'static str,
    pub values: Vec<(AlgorithmId, Option<f64>)>,
}

/// Avg/Min/Max/Std Dev rows in microseconds.
pub fn timing_rows(report: &TimingReport) -> Vec<TimingRow> {
    type Pick = fn(&crate::normalize::TimingFigures) -> f64;
    let metrics: [(&'static str, Pick); 4] = [
        ("Avg Time (μs)", |f| f.average_time_us),
        ("Min Time (μs)", |f| f.min_time_us),
        ("Max Time (μs)", |f| f.max_time_us),
        ("Std Dev (μs)", |f| f.std_deviation_us),
    ];
    metrics
        .into_iter()
        .map(|(metric, pick)| TimingRow {
            metric,
            values: report
                .figures
                .entries()
                .iter()
                .map(|e| (e.algorithm.clone(), e.data.as_ref().map(pick)))
                .collect(),
        })
        .collect()
}

/// Algorithm with the strictly lowest average encryption time.
pub fn fastest_average(report: &TimingReport) -> Option<AlgorithmId> {
    strict_min(&report.figures, |f| f.average_time_us)
}

/// Algorithm with the strictly lowest coefficient of variation.
pub fn most_consistent(report: &TimingReport) -> Option<AlgorithmId> {
    strict_min(&report.figures, |f| f.coefficient_of_variation)
}

/// High timing variance means more exposure to timing analysis.
pub fn has_high_timing_variance(coefficient_of_variation: f64) -> bool {
    coefficient_of_variation > HIGH_TIMING_VARIANCE_CV
}

/// Variance verdict line for one algorithm.
pub fn variance_verdict(coefficient_of_variation: f64) -> &'static str {
    if has_high_timing_variance(coefficient_of_variation) {
        "High timing variance detected"
    } else {
        "Low timing variance detected"
    }
}
