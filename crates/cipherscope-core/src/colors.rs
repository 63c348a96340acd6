//! Terminal colour helpers for verdicts and summaries.
//!
//! With the `ansi` feature (default) these go through the `colored` crate,
//! which respects `NO_COLOR`, `CLICOLOR_FORCE` and TTY detection. Without it
//! they return the text unchanged.

use crate::metrics::{EquivalenceVerdict, SecurityProfile};

#[cfg(feature = "ansi")]
use colored::Colorize;

#[cfg(feature = "ansi")]
pub fn green(s: &str) -> String {
    s.green().to_string()
}

#[cfg(feature = "ansi")]
pub fn red(s: &str) -> String {
    s.red().to_string()
}

#[cfg(feature = "ansi")]
pub fn yellow(s: &str) -> String {
    s.yellow().to_string()
}

#[cfg(feature = "ansi")]
pub fn bold(s: &str) -> String {
    s.bold().to_string()
}

#[cfg(feature = "ansi")]
pub fn dim(s: &str) -> String {
    s.dimmed().to_string()
}

#[cfg(not(feature = "ansi"))]
pub fn green(s: &str) -> String {
    s.to_string()
}

#[cfg(not(feature = "ansi"))]
pub fn red(s: &str) -> String {
    s.to_string()
}

#[cfg(not(feature = "ansi"))]
pub fn yellow(s: &str) -> String {
    s.to_string()
}

#[cfg(not(feature = "ansi"))]
pub fn bold(s: &str) -> String {
    s.to_string()
}

#[cfg(not(feature = "ansi"))]
pub fn dim(s: &str) -> String {
    s.to_string()
}

/// Colour a line by the security profile it describes.
pub fn by_profile(profile: SecurityProfile, s: &str) -> String {
    match profile {
        SecurityProfile::Strong => green(s),
        SecurityProfile::Weak => red(s),
        SecurityProfile::Unrated => yellow(s),
    }
}

/// Colour a line by an equivalent-key verdict.
pub fn by_equivalence(verdict: EquivalenceVerdict, s: &str) -> String {
    match verdict {
        EquivalenceVerdict::Secure => green(s),
        EquivalenceVerdict::Flawed => red(s),
        EquivalenceVerdict::ExperimentalLimitation => yellow(s),
    }
}

/// Green for a pass, red otherwise.
pub fn pass_fail(ok: bool, s: &str) -> String {
    if ok {
        green(s)
    } else {
        red(s)
    }
}
