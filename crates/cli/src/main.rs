use std::path::PathBuf;
use std::process;

use clap::Parser;

use liveness_core::capture::infrastructure::json_trace_reader::JsonTraceReader;
use liveness_core::pipeline::run_liveness_check_use_case::{
    LivenessVerdict, RunLivenessCheckUseCase,
};
use liveness_core::session::domain::gesture::GestureKind;
use liveness_core::session::domain::liveness_config::LivenessConfig;
use liveness_core::session::infrastructure::logging_session_observer::LoggingSessionObserver;

const EXIT_NOT_LIVE: i32 = 2;

/// Gesture liveness check over a recorded facial landmark trace.
#[derive(Parser)]
#[command(name = "liveness-check")]
struct Cli {
    /// Landmark trace (JSON).
    trace: PathBuf,

    /// JSON config file; command-line options override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Gestures to perform, in order (comma-separated: blink, smile, head_rotation).
    #[arg(long, value_delimiter = ',')]
    gestures: Option<Vec<GestureKind>>,

    /// Minimum overall score to be judged live (0.0-1.0).
    #[arg(long)]
    min_score: Option<f64>,

    /// Session time budget in milliseconds.
    #[arg(long)]
    timeout_ms: Option<i64>,

    /// Pause between gestures in milliseconds.
    #[arg(long)]
    pause_ms: Option<i64>,

    /// Print the verdict as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_NOT_LIVE),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns whether the subject was judged live.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    config.validate()?;
    log::debug!("Liveness config: {config:?}");

    let source = JsonTraceReader::open(&cli.trace)?;
    let mut use_case = RunLivenessCheckUseCase::new(
        Box::new(source),
        Box::new(LoggingSessionObserver::default()),
        None,
    );
    let verdict = use_case.execute(config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_summary(&verdict);
    }
    Ok(verdict.is_live())
}

fn build_config(cli: &Cli) -> Result<LivenessConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => LivenessConfig::from_json_file(path)?,
        None => LivenessConfig::default(),
    };
    if let Some(gestures) = &cli.gestures {
        config.required_gestures = gestures.clone();
    }
    if let Some(score) = cli.min_score {
        config.min_liveness_score = score;
    }
    if let Some(timeout) = cli.timeout_ms {
        config.timeout_ms = timeout;
    }
    if let Some(pause) = cli.pause_ms {
        config.gesture_pause_ms = pause;
    }
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.trace.exists() {
        return Err(format!("Trace file not found: {}", cli.trace.display()).into());
    }
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()).into());
        }
    }
    if let Some(score) = cli.min_score {
        if !(0.0..=1.0).contains(&score) {
            return Err(format!("Minimum score must be between 0.0 and 1.0, got {score}").into());
        }
    }
    if let Some(timeout) = cli.timeout_ms {
        if timeout <= 0 {
            return Err(format!("Timeout must be positive, got {timeout}").into());
        }
    }
    if let Some(pause) = cli.pause_ms {
        if pause < 0 {
            return Err(format!("Pause must not be negative, got {pause}").into());
        }
    }
    if matches!(&cli.gestures, Some(g) if g.is_empty()) {
        return Err("--gestures must name at least one gesture".into());
    }
    Ok(())
}

fn print_summary(verdict: &LivenessVerdict) {
    let result = &verdict.result;
    println!(
        "{}: {:?} (score {:.2}, confidence {:.2}, {}ms)",
        if verdict.is_live() { "LIVE" } else { "NOT LIVE" },
        verdict.outcome,
        result.overall_score,
        result.confidence,
        result.total_time_ms
    );
    for outcome in &result.completed_gestures {
        println!(
            "  {:14} confidence={:.2} naturalness={:.2} at {}ms",
            outcome.kind.as_str(),
            outcome.confidence,
            outcome.naturalness,
            outcome.timestamp_ms
        );
    }
    println!(
        "  {} frames processed, {} without a face",
        verdict.frames_processed, verdict.frames_dropped
    );
}
