//! Command-line front end for the cipher comparison service.
//!
//! # Usage
//!
//! ```bash
//! # Differential search against the default TEA vs AES comparison
//! cipherscope attack differential --samples 1000
//!
//! # Avalanche test over the first KiB of a file, three-way comparison
//! cipherscope --algorithms TEA,AES,NTSA_3.5 attack avalanche --file notes.txt
//!
//! # Brute-force feasibility study as JSON
//! cipherscope --json brute-force --iterations 5000
//!
//! # Encrypt a file and fetch the result
//! cipherscope encrypt --algorithm AES --key "$(cipherscope keygen)" --file notes.txt --download out/
//! ```
//!
//! Logging goes to stderr and is controlled by `CIPHERSCOPE_LOG`
//! (an `EnvFilter` directive, default `warn`).

use std::error::Error;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use cipherscope::client::{Client, Direction, DOWNLOAD_FALLBACK, STRUCTURAL_FALLBACK};
use cipherscope::config::ENV_BASE_URL;
use cipherscope::formatting::{format_structural, format_transform};
use cipherscope::output::{format_error, format_report, to_json_pretty};
use cipherscope::{
    random_key, AdvancedOptions, AlgorithmId, AttackForm, AttackType, ClientError, ComparisonSet,
    Config, Orchestrator, PanelReport, PlaintextSample, ProgressState, RunError, StudyForm,
    TestType,
};

/// Environment variable holding the log filter.
const ENV_LOG: &str = "CIPHERSCOPE_LOG";

/// Compare block ciphers under cryptanalytic attacks run by a remote service
#[derive(Parser, Debug)]
#[command(name = "cipherscope")]
#[command(about = "Run attacks and studies against a cipher analysis service and compare the results")]
#[command(version)]
struct Cli {
    /// Base URL of the analysis service
    #[arg(long, global = true, env = ENV_BASE_URL)]
    url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Comma-separated comparison set of 2 or 3 algorithms (e.g. TEA,AES,NTSA_3.5)
    #[arg(long, global = true, value_parser = ComparisonSet::parse_list)]
    algorithms: Option<ComparisonSet>,

    /// Print normalized results as JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    /// Hide the progress bar
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one attack across the comparison set
    Attack(AttackArgs),

    /// Estimate attempts per second and time to exhaust the key space
    BruteForce {
        /// 128-bit key as 32 hex characters
        #[arg(long)]
        key: Option<String>,

        /// Key attempts to time (100-10000)
        #[arg(long)]
        iterations: Option<u32>,
    },

    /// Measure raw encryption performance over a file sample
    Timing {
        /// 128-bit key as 32 hex characters
        #[arg(long)]
        key: Option<String>,

        /// File whose first KiB is encrypted
        #[arg(long)]
        file: Option<PathBuf>,

        /// Encryptions to time (10-10000)
        #[arg(long)]
        iterations: Option<u32>,
    },

    /// Show the static design comparison of the ciphers
    Structural,

    /// Encrypt a whole file
    Encrypt(TransformArgs),

    /// Decrypt a whole file
    Decrypt(TransformArgs),

    /// Print a fresh random 128-bit key
    Keygen,
}

#[derive(Args, Debug)]
struct AttackArgs {
    /// equivalent, related, avalanche, keyrecovery, statistical, differential or sidechannel
    attack: AttackType,

    /// 128-bit key as 32 hex characters
    #[arg(long)]
    key: Option<String>,

    /// Plaintext sample for file-based attacks (first KiB is used)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Target of statistical and sidechannel (defaults to the set's subject cipher)
    #[arg(long)]
    algorithm: Option<String>,

    /// Statistical trials (10-500)
    #[arg(long)]
    trials: Option<u32>,

    /// Differential / side-channel samples (100-2000)
    #[arg(long)]
    samples: Option<u32>,

    /// Confidence level for the statistical interval, in (0, 1)
    #[arg(long)]
    confidence: Option<f64>,

    /// Quantity measured per statistical trial: timing or avalanche
    #[arg(long)]
    test_type: Option<TestType>,
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Cipher to use
    #[arg(long)]
    algorithm: String,

    /// 128-bit key as 32 hex characters
    #[arg(long)]
    key: String,

    /// File to upload
    #[arg(long)]
    file: PathBuf,

    /// Directory to download the result into
    #[arg(long, value_name = "DIR")]
    download: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", format_error(&err.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn config_from(cli: &Cli) -> Config {
    let mut config = Config::from_env().progress_enabled(!cli.no_progress);
    if let Some(url) = cli.url.as_ref().filter(|u| !u.trim().is_empty()) {
        config = config.base_url(url.clone());
    }
    if let Some(secs) = cli.timeout {
        config = config.request_timeout_secs(secs.max(1));
    }
    if let Some(set) = &cli.algorithms {
        config = config.comparison_set(set.clone());
    }
    config
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = config_from(&cli);
    let show_bar = !cli.json && !cli.no_progress;

    match cli.command {
        Command::Keygen => {
            println!("{}", random_key());
            Ok(())
        }
        Command::Attack(args) => {
            let panel = Orchestrator::new(&config)?;
            let form = attack_form(&args, panel.comparison())?;
            let bar = ProgressDisplay::attach(
                panel.subscribe_progress(),
                args.attack.title(),
                show_bar,
            );
            let outcome = panel.run_attack(form).await;
            bar.finish();
            let result = outcome.map_err(run_failure)?;
            emit(cli.json, &PanelReport::Attack(result))
        }
        Command::BruteForce { key, iterations } => {
            let form = StudyForm::brute_force(key_or_default(key));
            let form = match iterations {
                Some(n) => form.iterations(n),
                None => form,
            };
            run_study(&config, form, "Brute-Force Feasibility", show_bar, cli.json).await
        }
        Command::Timing {
            key,
            file,
            iterations,
        } => {
            let sample = file.as_deref().map(read_sample).transpose()?;
            let form = StudyForm::timing(key_or_default(key), sample);
            let form = match iterations {
                Some(n) => form.iterations(n),
                None => form,
            };
            run_study(&config, form, "Encryption Performance", show_bar, cli.json).await
        }
        Command::Structural => {
            let client = Client::new(&config)?;
            let report = with_timeout(&config, client.structural_analysis())
                .await
                .map_err(|e| e.user_message(STRUCTURAL_FALLBACK))?;
            if cli.json {
                println!("{}", to_json_pretty(&report)?);
            } else {
                print!("{}", format_structural(&report));
            }
            Ok(())
        }
        Command::Encrypt(args) => transform(&config, Direction::Encrypt, args, cli.json).await,
        Command::Decrypt(args) => transform(&config, Direction::Decrypt, args, cli.json).await,
    }
}

async fn run_study(
    config: &Config,
    form: StudyForm,
    title: &str,
    show_bar: bool,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let panel = Orchestrator::new(config)?;
    let bar = ProgressDisplay::attach(panel.subscribe_progress(), title, show_bar);
    let outcome = panel.run_study(form).await;
    bar.finish();
    let report = outcome.map_err(run_failure)?;
    emit(json, &PanelReport::Study(report))
}

async fn transform(
    config: &Config,
    direction: Direction,
    args: TransformArgs,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let client = Client::new(config)?;
    let content = fs::read(&args.file)?;
    let filename = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());
    let algorithm = AlgorithmId::new(args.algorithm);

    let receipt = with_timeout(
        config,
        client.transform(direction, &algorithm, &args.key, &filename, content),
    )
    .await
    .map_err(|e| e.user_message(direction.fallback_error()))?;

    if json {
        println!("{}", to_json_pretty(&receipt)?);
    } else {
        println!("{}", format_transform(&receipt));
    }

    if let Some(dir) = args.download {
        let bytes = with_timeout(config, client.download(&receipt.filename))
            .await
            .map_err(|_| DOWNLOAD_FALLBACK.to_string())?;
        let target = dir.join(&receipt.filename);
        fs::create_dir_all(&dir)?;
        fs::write(&target, bytes)?;
        eprintln!("saved {}", target.display());
    }
    Ok(())
}

async fn with_timeout<T>(
    config: &Config,
    call: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    tokio::time::timeout(config.request_timeout, call)
        .await
        .unwrap_or(Err(ClientError::Timeout))
}

fn attack_form(args: &AttackArgs, set: &ComparisonSet) -> Result<AttackForm, Box<dyn Error>> {
    let defaults = AdvancedOptions::default();
    let mut form = AttackForm::new(args.attack, set)
        .key(key_or_default(args.key.clone()))
        .advanced(AdvancedOptions {
            num_trials: args.trials.unwrap_or(defaults.num_trials),
            num_samples: args.samples.unwrap_or(defaults.num_samples),
            confidence_level: args.confidence.unwrap_or(defaults.confidence_level),
            test_type: args.test_type.unwrap_or(defaults.test_type),
        });
    if let Some(algorithm) = &args.algorithm {
        form = form.algorithm(algorithm.as_str());
    }
    if let Some(path) = &args.file {
        form.sample = Some(read_sample(path)?);
    }
    Ok(form)
}

fn key_or_default(key: Option<String>) -> String {
    key.unwrap_or_else(|| cipherscope::constants::DEFAULT_KEY.to_string())
}

fn read_sample(path: &Path) -> Result<PlaintextSample, std::io::Error> {
    Ok(PlaintextSample::from_bytes(&fs::read(path)?))
}

fn run_failure(err: RunError) -> String {
    err.display_message().unwrap_or_else(|| err.to_string())
}

fn emit(json: bool, report: &PanelReport) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", to_json_pretty(report)?);
    } else {
        print!("{}", format_report(report));
    }
    Ok(())
}

/// An indicatif bar mirroring the panel's published progress.
struct ProgressDisplay {
    bar: ProgressBar,
    task: Option<JoinHandle<()>>,
}

impl ProgressDisplay {
    fn attach(mut rx: watch::Receiver<ProgressState>, title: &str, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
                task: None,
            };
        }
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos:>3}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.set_message(title.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));

        let mirror = bar.clone();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = *rx.borrow_and_update();
                mirror.set_position(u64::from(state.percent));
            }
        });
        Self {
            bar,
            task: Some(task),
        }
    }

    fn finish(self) {
        if let Some(task) = self.task {
            task.abort();
        }
        self.bar.finish_and_clear();
    }
}
