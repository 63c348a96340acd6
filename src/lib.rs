//! # cipherscope
//!
//! Run cryptanalytic attacks against a remote block-cipher analysis service
//! and compare the ciphers side by side.
//!
//! This crate adds the asynchronous half on top of [`cipherscope_core`]:
//! - A minimal HTTP/1.1 [`transport`] and a typed [`Client`] per endpoint
//! - An [`Orchestrator`] enforcing one pending run per panel, with a request
//!   timeout and per-run cancellation
//! - A simulated [`progress`] indicator that never claims real completion
//! - Terminal and JSON [`output`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use cipherscope::{AttackForm, AttackType, Config, Orchestrator};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! let panel = Orchestrator::new(&config)?;
//! let form = AttackForm::new(AttackType::Differential, panel.comparison());
//! let result = panel.run_attack(form).await?;
//! println!("{}", cipherscope::formatting::format_attack(&result));
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod transport;

pub use cancel::{RunGeneration, RunHandle};
pub use client::{Client, Direction};
pub use config::Config;
pub use error::{ClientError, RunError, TransportError};
pub use orchestrator::{Orchestrator, Outcome, PanelReport, PanelSnapshot, PanelState, Phase};
pub use progress::{ProgressSimulator, ProgressTracker};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

// Re-export the core crate's surface so callers need one dependency.
pub use cipherscope_core::{
    build_attack, build_study, colors, constants, formatting, metrics, normalize, random_key,
    request, types, validate, wire, AdvancedOptions, AlgorithmId, AttackForm, AttackRequest,
    AttackResult, AttackType, ComparisonSet, PlaintextSample, ProgressState, StudyForm,
    StudyReport, StudyRequest, TestType, ValidationError,
};
