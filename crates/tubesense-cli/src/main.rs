use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tubesense_ai::SharedEngine;
use tubesense_core::VideoId;
use tubesense_ingest::{CommentCollector, RemoteClient, ReqwestTransport};

mod config;
mod display;
mod pipeline;

use config::{AnalyzeArgs, Cli, Command, PredictArgs};
use pipeline::AnalyzeRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    info!("tubesense v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Analyze(args) => analyze(args).await,
        Command::VideoId { input } => {
            println!("{}", VideoId::extract(&input)?);
            Ok(())
        }
        Command::Predict(args) => predict(args).await,
    }
}

/// Logs go to stderr so stdout carries only results.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let transport = ReqwestTransport::new(args.timeout()).context("building HTTP client")?;
    let collector = CommentCollector::new(RemoteClient::new(transport), args.collector_config());
    let engine = Arc::new(SharedEngine::from_config(args.model.engine_config()));

    let report = pipeline::run_analysis(
        &collector,
        engine,
        &AnalyzeRequest {
            input: &args.input,
            api_key: args.api_key.as_deref().unwrap_or_default(),
            percentage: args.percentage,
            hard_cap: args.max_comments,
            include_replies: !args.no_replies,
        },
    )
    .await?;

    display::print_report(&report);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        eprintln!("  Report written to {}", path.display());
    }
    Ok(())
}

async fn predict(args: PredictArgs) -> anyhow::Result<()> {
    let engine = SharedEngine::from_config(args.model.engine_config());
    let texts = args.texts.clone();
    let predictions = tokio::task::spawn_blocking(move || engine.predict(&texts))
        .await
        .context("inference task panicked")??;
    let texts = args.texts;

    for (text, prediction) in texts.iter().zip(&predictions) {
        if args.json {
            let line = serde_json::json!({ "text": text, "prediction": prediction });
            println!("{line}");
        } else {
            display::print_prediction(text, prediction);
        }
    }
    Ok(())
}
