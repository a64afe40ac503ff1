//! Analysis pipeline: resolve the id, collect comments, classify, aggregate.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::info;
use tubesense_ai::{LogitsModel, SharedEngine};
use tubesense_core::report::{EXAMPLES_PER_LABEL, MAX_EXAMPLES};
use tubesense_core::{AnalysisReport, Comment, Prediction, VideoId, select_examples, tally};
use tubesense_ingest::{Collection, CollectRequest, CommentCollector, Transport};

/// Inputs of one `analyze` run.
pub struct AnalyzeRequest<'a> {
    pub input: &'a str,
    pub api_key: &'a str,
    pub percentage: f64,
    pub hard_cap: Option<usize>,
    pub include_replies: bool,
}

/// Run the whole analysis and build the report.
pub async fn run_analysis<T, M>(
    collector: &CommentCollector<T>,
    engine: Arc<SharedEngine<M>>,
    req: &AnalyzeRequest<'_>,
) -> anyhow::Result<AnalysisReport>
where
    T: Transport,
    M: LogitsModel + 'static,
{
    let start = Instant::now();

    let video_id = VideoId::extract(req.input)?;
    info!(video_id = %video_id, percentage = req.percentage, "starting analysis");

    let collection = collector
        .collect(&CollectRequest {
            video_id: &video_id,
            api_key: req.api_key,
            percentage: req.percentage,
            hard_cap: req.hard_cap,
            include_replies: req.include_replies,
        })
        .await
        .with_context(|| format!("collecting comments for {video_id}"))?;

    let texts: Vec<String> = collection
        .comments
        .iter()
        .filter(|c| c.has_text())
        .map(|c| c.text.clone())
        .collect();
    info!(collected = collection.comments.len(), analyzable = texts.len(), "running inference");

    // Inference is CPU-bound; keep it off the async workers.
    let predictions = tokio::task::spawn_blocking(move || engine.predict(&texts))
        .await
        .context("inference task panicked")??;

    let report = build_report(&collection, &predictions, req.percentage, start.elapsed().as_secs_f64());
    info!(
        video_id = %video_id,
        analyzed = report.actual_analyzed,
        positive = report.counts.positive,
        neutral = report.counts.neutral,
        negative = report.counts.negative,
        secs = report.processing_time_secs,
        "analysis complete"
    );
    Ok(report)
}

/// Aggregate predictions for the comments that have text, in collection order.
pub fn build_report(
    collection: &Collection,
    predictions: &[Prediction],
    percentage: f64,
    processing_time_secs: f64,
) -> AnalysisReport {
    let analyzed: Vec<(&Comment, Prediction)> = collection
        .comments
        .iter()
        .filter(|c| c.has_text())
        .zip(predictions.iter().copied())
        .collect();

    let counts = tally(analyzed.iter().map(|(_, p)| p));
    AnalysisReport {
        video: collection.video.clone(),
        total_comments: collection.total_available,
        collected: collection.comments.len(),
        actual_analyzed: analyzed.len(),
        percentage_requested: percentage,
        counts,
        ratios: counts.ratios(),
        examples: select_examples(&analyzed, EXAMPLES_PER_LABEL, MAX_EXAMPLES),
        stop_reason: collection.stop_reason.describe(),
        partial: collection.stop_reason.is_partial(),
        quota_units_used: collection.quota_units_used,
        processing_time_secs,
        generated_at: chrono::Utc::now().to_rfc3339(),
    }
}
