//! Terminal output with colors and box drawing.

use cipherscope_core::formatting::{format_attack, format_study};
use colored::Colorize;

use crate::orchestrator::{Outcome, PanelReport, PanelSnapshot, Phase};

const BOX_WIDTH: usize = 62;

/// Full rendering of a panel: status box, then the report or the error.
pub fn format_snapshot(snapshot: &PanelSnapshot) -> String {
    let mut output = format_status(snapshot);
    if let Some(ref report) = snapshot.report {
        output.push('\n');
        output.push_str(&format_report(report));
    } else if let Some(ref message) = snapshot.error {
        output.push('\n');
        output.push_str(&format_error(message));
    }
    output
}

/// Boxed one-glance status: phase and progress.
pub fn format_status(snapshot: &PanelSnapshot) -> String {
    let header = match snapshot.phase {
        Phase::Idle if snapshot.error.is_some() => "\u{26A0} IDLE".yellow().bold(),
        Phase::Idle => "IDLE".normal(),
        Phase::Validating => "VALIDATING".cyan(),
        Phase::Pending => "\u{2026} ANALYZING".cyan().bold(),
        Phase::Settled(Outcome::Success) => "\u{2713} COMPLETE".green().bold(),
        Phase::Settled(Outcome::Failure) => "\u{2717} FAILED".red().bold(),
    };

    let mut output = String::new();
    output.push_str(&format_box_top());
    output.push_str(&format_box_line(&header.to_string()));
    output.push_str(&format_box_separator());
    output.push_str(&format_box_line(&format!(
        "Progress: {} {:>3}%",
        progress_bar(snapshot.progress.percent),
        snapshot.progress.percent
    )));
    if snapshot.progress.in_flight {
        output.push_str(&format_box_line(&"in flight".dimmed().to_string()));
    }
    output.push_str(&format_box_bottom());
    output
}

/// Comparative summary of a normalized report.
pub fn format_report(report: &PanelReport) -> String {
    match report {
        PanelReport::Attack(result) => format_attack(result),
        PanelReport::Study(study) => format_study(study),
    }
}

/// A user-facing error line.
pub fn format_error(message: &str) -> String {
    format!("{} {}\n", "\u{2717}".red().bold(), message.red())
}

fn progress_bar(percent: u8) -> String {
    const CELLS: usize = 20;
    let filled = usize::from(percent.min(100)) * CELLS / 100;
    format!(
        "[{}{}]",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(CELLS - filled)
    )
}

fn format_box_top() -> String {
    format!("\u{250C}{}\u{2510}\n", "\u{2500}".repeat(BOX_WIDTH))
}

fn format_box_bottom() -> String {
    format!("\u{2514}{}\u{2518}\n", "\u{2500}".repeat(BOX_WIDTH))
}

fn format_box_separator() -> String {
    format!("\u{251C}{}\u{2524}\n", "\u{2500}".repeat(BOX_WIDTH))
}

fn format_box_line(content: &str) -> String {
    let visible_len = strip_ansi_codes(content).chars().count();
    let padding = (BOX_WIDTH - 2).saturating_sub(visible_len);
    format!("\u{2502} {}{} \u{2502}\n", content, " ".repeat(padding))
}

fn strip_ansi_codes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // CSI sequences end at 'm'
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipherscope_core::ProgressState;

    fn snapshot(phase: Phase, percent: u8) -> PanelSnapshot {
        PanelSnapshot {
            phase,
            progress: ProgressState {
                percent,
                in_flight: phase == Phase::Pending,
            },
            report: None,
            error: None,
        }
    }

    #[test]
    fn status_box_lines_have_equal_width() {
        colored::control::set_override(true);
        let out = format_status(&snapshot(Phase::Pending, 45));
        colored::control::unset_override();
        let widths: Vec<usize> = out
            .lines()
            .map(|l| strip_ansi_codes(l).chars().count())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{widths:?}");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0), format!("[{}]", "\u{2591}".repeat(20)));
        assert_eq!(progress_bar(100), format!("[{}]", "\u{2588}".repeat(20)));
        assert!(progress_bar(50).starts_with(&format!("[{}\u{2591}", "\u{2588}".repeat(10))));
    }

    #[test]
    fn snapshot_with_error_shows_message() {
        let mut s = snapshot(Phase::Settled(Outcome::Failure), 0);
        s.error = Some("Avalanche test failed".into());
        let out = strip_ansi_codes(&format_snapshot(&s));
        assert!(out.contains("FAILED"));
        assert!(out.contains("Avalanche test failed"));
    }

    #[test]
    fn strip_removes_escape_sequences() {
        assert_eq!(strip_ansi_codes("\x1b[1;32mOK\x1b[0m"), "OK");
    }
}
