//! Rendering of panel snapshots and reports.
//!
//! - Terminal: a status box followed by the comparative summary
//! - JSON: the normalized report, for export

mod json;
mod terminal;

pub use json::{to_json, to_json_pretty};
pub use terminal::{format_error, format_report, format_snapshot, format_status};
