//! Command-line and environment configuration.
//!
//! Everything the libraries need arrives here and is handed down as plain
//! config structs; nothing below the CLI reads the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tubesense_ai::{EngineConfig, PredictOptions};
use tubesense_ingest::{CollectorConfig, FailurePolicy};

pub const DEFAULT_MODEL_DIR: &str = "artifacts/xlmr-sentiment-best-balanced";

#[derive(Parser, Debug)]
#[command(name = "tubesense", version)]
#[command(about = "Sentiment analysis of video comments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect a video's comments and report their sentiment
    Analyze(AnalyzeArgs),
    /// Print the canonical 11-character id for a URL or bare id
    VideoId {
        input: String,
    },
    /// Classify the given texts without touching the remote API
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Video URL or bare video id
    pub input: String,

    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Share of the reported comment total to collect
    #[arg(long, default_value_t = 0.5, value_parser = parse_percentage)]
    pub percentage: f64,

    /// Hard cap on collected comments
    #[arg(long)]
    pub max_comments: Option<usize>,

    /// Skip reply threads
    #[arg(long)]
    pub no_replies: bool,

    /// Ceiling on top-level comment pages
    #[arg(long, env = "MAX_PAGES", default_value_t = 200)]
    pub max_pages: usize,

    /// Quota units the run may spend on list calls
    #[arg(long, env = "QUOTA_BUDGET")]
    pub quota_budget: Option<u64>,

    /// What to do with gathered comments when the remote API fails
    #[arg(long, value_enum, default_value_t = OnError::FailFast)]
    pub on_error: OnError,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Write the full report as JSON to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Texts to classify
    #[arg(required = true)]
    pub texts: Vec<String>,

    /// Print predictions as JSON lines
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Directory with model.onnx, tokenizer.json and optional inference_config.json
    #[arg(long, env = "MODEL_DIR", default_value = DEFAULT_MODEL_DIR)]
    pub model_dir: PathBuf,

    /// Neutral probability at or above which a text is labelled neutral
    #[arg(long, env = "NEUTRAL_THRESHOLD", value_parser = parse_threshold)]
    pub neutral_threshold: Option<f32>,

    #[arg(long, env = "BATCH_SIZE", default_value_t = 32)]
    pub batch_size: usize,

    /// Token limit per text
    #[arg(long, env = "MAX_TEXT_LENGTH", default_value_t = 160)]
    pub max_length: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    FailFast,
    Partial,
}

impl ModelArgs {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            model_dir: self.model_dir.clone(),
            neutral_threshold: self.neutral_threshold,
            labels: None,
            options: PredictOptions {
                max_length: self.max_length,
                batch_size: self.batch_size,
            },
        }
    }
}

impl AnalyzeArgs {
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            max_pages: self.max_pages,
            quota_budget: self.quota_budget,
            failure_policy: match self.on_error {
                OnError::FailFast => FailurePolicy::FailFast,
                OnError::Partial => FailurePolicy::ReturnPartial,
            },
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_percentage(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.25..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between 0.25 and 1.0, got {value}"))
    }
}

fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between 0 and 1, got {value}"))
    }
}
