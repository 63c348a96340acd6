//! Human-readable summaries of normalized results.
//!
//! Each `format_*` function renders one report as multi-line text with the
//! comparative judgments from [`crate::metrics`]. Colour is applied through
//! [`crate::colors`], so output is plain when the `ansi` feature is off or
//! `NO_COLOR` is set.

use std::fmt::{self, Write};

use crate::colors::{bold, by_equivalence, by_profile, dim, green, pass_fail, red, yellow};
use crate::metrics::{
    attempts_caption, avalanche_summary, brute_force_rows, equivalence_verdict, faster_algorithm,
    fastest_average, format_large_number, format_time, has_high_timing_variance,
    more_secure_overall, most_consistent, significant_bit_count, timing_rows, to_exponential,
    to_fixed, variance_verdict, SecurityProfile,
};
use crate::normalize::{
    AttackResult, AvalancheReport, BruteForceReport, CandidateStatus, DifferentialReport,
    EquivalentKeysReport, KeyRecoveryReport, RelatedKeyReport, SideChannelReport,
    StatisticalReport, StructuralReport, StudyReport, TimingReport, TransformReceipt,
};
use crate::types::AlgorithmId;

/// Separator line used in output.
pub const SEPARATOR: &str = "──────────────────────────────────────────────────────────────";

const DEFAULT_WRAP_WIDTH: usize = 72;

/// Rows of the differential table shown before truncating.
const MAX_CHARACTERISTIC_ROWS: usize = 10;

fn render(f: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    match f(&mut out) {
        Ok(()) => out,
        Err(_) => String::new(),
    }
}

fn header(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "{}", bold(title))?;
    writeln!(out, "{}", SEPARATOR)
}

fn no_data(out: &mut String, id: &AlgorithmId) -> fmt::Result {
    writeln!(out, "  {}: {}", bold(id.as_str()), dim("no data"))
}

// ============================================================================
// Attacks
// ============================================================================

/// Format any attack result.
pub fn format_attack(result: &AttackResult) -> String {
    render(|out| match result {
        AttackResult::Equivalent(r) => equivalent(out, r),
        AttackResult::Related(r) => related(out, r),
        AttackResult::Avalanche(r) => avalanche(out, r),
        AttackResult::KeyRecovery(r) => key_recovery(out, r),
        AttackResult::Statistical(r) => statistical(out, r),
        AttackResult::Differential(r) => differential(out, r),
        AttackResult::SideChannel(r) => side_channel(out, r),
    })
}

fn equivalent(out: &mut String, report: &EquivalentKeysReport) -> fmt::Result {
    header(out, "Equivalent Keys Analysis")?;
    for entry in report.candidates.entries() {
        let id = &entry.algorithm;
        let Some(candidates) = &entry.data else {
            no_data(out, id)?;
            continue;
        };
        writeln!(out, "  {}", bold(id.as_str()))?;
        for c in candidates {
            let mark = if c.matches_base { green("\u{2713}") } else { yellow("\u{26A0}") };
            write!(
                out,
                "    {} Key {}: matches base {}  {}",
                mark,
                c.candidate_index,
                if c.matches_base { "YES" } else { "NO" },
                dim(&c.key_hex)
            )?;
            if c.status() == CandidateStatus::ExperimentalLimitation {
                write!(out, "  {}", yellow("candidate related key, block-level testing required"))?;
            }
            writeln!(out)?;
        }
        if let Some(verdict) = equivalence_verdict(report, id) {
            writeln!(out, "    {}", by_equivalence(verdict, &verdict.message(id)))?;
        }
    }
    Ok(())
}

fn related(out: &mut String, report: &RelatedKeyReport) -> fmt::Result {
    header(out, "Related-Key Attack Analysis")?;
    for entry in report.series.entries() {
        let id = &entry.algorithm;
        let Some(points) = &entry.data else {
            no_data(out, id)?;
            continue;
        };
        writeln!(out, "  {}", bold(id.as_str()))?;
        for p in points {
            writeln!(out, "    \u{0394}{}: {}", p.delta, p.correlation)?;
        }
        if let Some(mean) = report.mean_correlation(id) {
            writeln!(out, "    Mean correlation: {}", to_fixed(mean, 2))?;
        }
        let profile = SecurityProfile::of(id);
        writeln!(out, "    {}", by_profile(profile, profile.correlation_verdict()))?;
    }
    Ok(())
}

fn avalanche(out: &mut String, report: &AvalancheReport) -> fmt::Result {
    header(out, "Avalanche Effect Test")?;
    let summary = avalanche_summary(report);
    for id in report.series.algorithms() {
        let Some((_, avg, strong)) = summary.iter().find(|(a, _, _)| a == id) else {
            no_data(out, id)?;
            continue;
        };
        let points = report.series.series(id);
        writeln!(
            out,
            "  {}: {} bit positions, average {}%",
            bold(id.as_str()),
            points.len(),
            to_fixed(*avg, 2)
        )?;
        writeln!(
            out,
            "    Measured: {}",
            pass_fail(*strong, if *strong { "near 50%, strong diffusion" } else { "far from 50%, weak diffusion" })
        )?;
        let profile = SecurityProfile::of(id);
        writeln!(out, "    {}", by_profile(profile, profile.diffusion_verdict()))?;
    }
    Ok(())
}

fn key_recovery(out: &mut String, report: &KeyRecoveryReport) -> fmt::Result {
    header(out, "TEA Key Recovery")?;
    writeln!(out, "  Method: {}", report.method)?;
    writeln!(out, "  Theoretical complexity: {}", report.theoretical_complexity)?;
    writeln!(out, "  Attempts: {}", format_large_number(report.actual_attempts as f64))?;
    writeln!(
        out,
        "  Outcome: {}",
        if report.success { red("key recovered") } else { green("key not recovered") }
    )?;
    if !report.steps.is_empty() {
        writeln!(out)?;
        writeln!(out, "  Steps:")?;
        for step in &report.steps {
            writeln!(out, "    {}. {}", step.step, step.description)?;
            if let Some(note) = &step.note {
                writeln!(out, "       {}", dim(note))?;
            }
        }
    }
    if !report.candidates.is_empty() {
        writeln!(out)?;
        writeln!(out, "  Partial key information:")?;
        for c in &report.candidates {
            writeln!(
                out,
                "    K0={} K1={} {}",
                c.k0,
                c.k1,
                if c.partial_match { yellow("partial match") } else { dim("no match") }
            )?;
        }
    }
    note(out, &report.note)
}

fn statistical(out: &mut String, report: &StatisticalReport) -> fmt::Result {
    header(out, "Statistical Analysis")?;
    writeln!(
        out,
        "  {} {} test, {} trials, {}% confidence",
        report.algorithm,
        report.test_type,
        report.num_trials,
        to_fixed(report.confidence_level * 100.0, 0)
    )?;
    let Some(summary) = &report.summary else {
        return writeln!(out, "  {}", dim("no statistics reported"));
    };
    if let Some(mean) = summary.mean_time_us {
        writeln!(out, "  Mean time: {} \u{03BC}s", to_fixed(mean, 4))?;
    }
    if let Some(mean) = summary.mean_avalanche_percent {
        writeln!(out, "  Mean avalanche: {}%", to_fixed(mean, 2))?;
    }
    if let Some(ci) = &summary.confidence_interval {
        writeln!(
            out,
            "  Confidence interval: [{}, {}] \u{00B1}{}",
            to_fixed(ci.lower, 4),
            to_fixed(ci.upper, 4),
            to_fixed(ci.margin_error, 4)
        )?;
    }
    writeln!(out, "  Trials reported: {}", report.trials.len())
}

fn differential(out: &mut String, report: &DifferentialReport) -> fmt::Result {
    header(out, "Differential Characteristic Search")?;
    writeln!(out, "  Target: {}, {} samples", report.target, report.samples_tested)?;
    if let Some(s) = &report.summary {
        writeln!(out, "  Unique characteristics: {}", s.unique_characteristics)?;
        writeln!(out, "  Highest probability: {}", to_exponential(s.highest_probability, 2))?;
        writeln!(out, "  Average probability: {}", to_exponential(s.average_probability, 2))?;
    }
    let ranked = report.ranked();
    for c in ranked.iter().take(MAX_CHARACTERISTIC_ROWS) {
        writeln!(
            out,
            "    ({}, {}) \u{2192} ({}, {})  count {}  p={}",
            c.input_diff_hex[0],
            c.input_diff_hex[1],
            c.output_diff_hex[0],
            c.output_diff_hex[1],
            c.count,
            to_exponential(c.probability, 2)
        )?;
    }
    if ranked.len() > MAX_CHARACTERISTIC_ROWS {
        writeln!(out, "    {}", dim(&format!("... {} more", ranked.len() - MAX_CHARACTERISTIC_ROWS)))?;
    }
    Ok(())
}

fn side_channel(out: &mut String, report: &SideChannelReport) -> fmt::Result {
    header(out, "Timing Side-Channel Analysis")?;
    let leaking = significant_bit_count(report);
    let assessment = if leaking > 0 { red(&report.assessment) } else { green(&report.assessment) };
    writeln!(out, "  Assessment: {}", assessment)?;
    writeln!(
        out,
        "  Bits with leakage: {} ({}%)",
        report.bits_with_leakage,
        to_fixed(report.vulnerability_percentage, 1)
    )?;
    if let Some(t) = &report.timing {
        writeln!(
            out,
            "  Mean diff: {} \u{03BC}s, max diff: {} \u{03BC}s, correlation: {}",
            to_fixed(t.mean_diff_us, 4),
            to_fixed(t.max_diff_us, 4),
            t.correlation_strength
        )?;
    }
    for bit in report.significant_bits() {
        writeln!(
            out,
            "    bit {}: \u{0394}t={} \u{03BC}s, t={}",
            bit.bit_position,
            to_fixed(bit.timing_diff_us, 4),
            to_fixed(bit.t_statistic, 2)
        )?;
    }
    match &report.note {
        Some(n) => note(out, n),
        None => Ok(()),
    }
}

fn note(out: &mut String, text: &str) -> fmt::Result {
    if text.trim().is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "  Note: {}", dim(&wrap_text(text, DEFAULT_WRAP_WIDTH, 8, "        ")))
}

// ============================================================================
// Studies
// ============================================================================

/// Format either study report.
pub fn format_study(report: &StudyReport) -> String {
    match report {
        StudyReport::BruteForce(r) => format_brute_force(r),
        StudyReport::Timing(r) => format_timing(r),
    }
}

/// Brute-force feasibility with the "faster" and "more secure" headlines.
pub fn format_brute_force(report: &BruteForceReport) -> String {
    render(|out| {
        header(out, "Brute-Force Feasibility")?;
        for entry in report.figures.entries() {
            let id = &entry.algorithm;
            let Some(f) = &entry.data else {
                no_data(out, id)?;
                continue;
            };
            writeln!(out, "  {}", bold(id.as_str()))?;
            writeln!(out, "    Key space:        {}", format_large_number(f.total_key_space))?;
            writeln!(out, "    Attempts/second:  {}", format_large_number(f.attempts_per_second))?;
            writeln!(out, "    Time to exhaust:  {}", format_time(f.seconds_to_exhaust))?;
            writeln!(out, "    Years to exhaust: {} years", to_exponential(f.years_to_exhaust, 2))?;
        }
        if brute_force_rows(report).is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        if let Some(id) = faster_algorithm(report) {
            writeln!(out, "  Faster algorithm: {}", bold(id.as_str()))?;
        }
        if let Some(caption) = attempts_caption(report) {
            writeln!(out, "    {}", dim(&caption))?;
        }
        if let Some(id) = more_secure_overall(report.figures.algorithms()) {
            writeln!(out, "  More secure overall: {}", green(id.as_str()))?;
        }
        Ok(())
    })
}

/// Encryption timing with per-metric leaders and variance verdicts.
pub fn format_timing(report: &TimingReport) -> String {
    render(|out| {
        header(out, "Encryption Performance")?;
        for row in timing_rows(report) {
            write!(out, "  {:<14}", row.metric)?;
            for (id, value) in &row.values {
                match value {
                    Some(v) => write!(out, "  {}={}", id, to_fixed(*v, 2))?,
                    None => write!(out, "  {}={}", id, dim("-"))?,
                }
            }
            writeln!(out)?;
        }
        writeln!(out)?;
        for (id, f) in report.figures.present() {
            let cv = f.coefficient_of_variation;
            writeln!(
                out,
                "  {}: CV {}  {}",
                bold(id.as_str()),
                to_fixed(cv, 4),
                pass_fail(!has_high_timing_variance(cv), variance_verdict(cv))
            )?;
        }
        if let Some(id) = fastest_average(report) {
            writeln!(out, "  Fastest average: {}", green(id.as_str()))?;
        }
        if let Some(id) = most_consistent(report) {
            writeln!(out, "  Most timing-stable: {}", green(id.as_str()))?;
        }
        Ok(())
    })
}

// ============================================================================
// Structural analysis and file transforms
// ============================================================================

/// Side-by-side design description of each cipher.
pub fn format_structural(report: &StructuralReport) -> String {
    render(|out| {
        header(out, "Structural Analysis")?;
        for entry in report.profiles.entries() {
            let id = &entry.algorithm;
            let Some(p) = &entry.data else {
                no_data(out, id)?;
                continue;
            };
            writeln!(out, "  {}", bold(id.as_str()))?;
            writeln!(out, "    Rounds:       {}", p.round_structure)?;
            writeln!(out, "    Block size:   {}", p.block_size)?;
            writeln!(out, "    Key size:     {}", p.key_size)?;
            writeln!(out, "    Key schedule: {}", p.key_schedule)?;
            writeln!(out, "    Confusion:    {}", p.confusion)?;
            writeln!(out, "    Diffusion:    {}", p.diffusion)?;
            for w in &p.weaknesses {
                writeln!(out, "    {} {}", red("-"), w)?;
            }
            for s in &p.strengths {
                writeln!(out, "    {} {}", green("+"), s)?;
            }
        }
        Ok(())
    })
}

/// One-line receipt for an encrypt or decrypt upload.
pub fn format_transform(receipt: &TransformReceipt) -> String {
    let output = receipt
        .output_size
        .map(|n| format!("{n} bytes"))
        .unwrap_or_else(|| "unknown size".to_string());
    format!(
        "{} ({} bytes \u{2192} {}) in {} ms, {} MB/s",
        receipt.filename,
        receipt.original_size,
        output,
        to_fixed(receipt.time_ms, 3),
        to_fixed(receipt.throughput_mbps, 2)
    )
}

/// Wrap text to fit within a given width.
fn wrap_text(text: &str, width: usize, first_line_used: usize, cont_indent: &str) -> String {
    let first_available = width.saturating_sub(first_line_used);
    let cont_available = width.saturating_sub(cont_indent.len());
    if first_available == 0 || cont_available == 0 {
        return text.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let available = if lines.is_empty() { first_available } else { cont_available };
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= available {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join(&format!("\n{cont_indent}"))
}
