//! Terminal rendering for analysis reports and predictions.
//!
//! Renders a report as a vertical card: video identity, collection
//! statistics, the sentiment breakdown, then example comments.

use tubesense_core::{AnalysisReport, Example, Prediction, SentimentLabel};

const MAX_EXAMPLE_CHARS: usize = 120;
const BAR_WIDTH: usize = 30;

// ── Public API ──

pub fn print_report(report: &AnalysisReport) {
    let video = &report.video;
    println!("=== {} ===", video.video_id);
    if !video.title.is_empty() {
        println!("{}", video.title);
    }
    println!();

    println!("Video");
    field("channel", &video.channel_title);
    field("published", &video.published_at);
    field("views", video.view_count);
    field("likes", video.like_count);
    println!();

    println!("Collection");
    field("reported comments", report.total_comments);
    field("requested share", format!("{:.0}%", report.percentage_requested * 100.0));
    field("collected", report.collected);
    field("analyzed", report.actual_analyzed);
    field("stopped", &report.stop_reason);
    if report.partial {
        field("partial", "yes");
    }
    field("quota units", report.quota_units_used);
    field("time", format!("{:.1}s", report.processing_time_secs));
    println!();

    println!("Sentiment");
    for label in [SentimentLabel::Positive, SentimentLabel::Neutral, SentimentLabel::Negative] {
        let count = report.counts.get(label);
        let ratio = match label {
            SentimentLabel::Positive => report.ratios.positive,
            SentimentLabel::Neutral => report.ratios.neutral,
            SentimentLabel::Negative => report.ratios.negative,
        };
        println!("  {:<20} {:>6}  {:>5.1}%  {}", label, count, ratio * 100.0, bar(ratio));
    }
    println!();

    if !report.examples.is_empty() {
        println!("Examples");
        for example in &report.examples {
            print_example(example);
        }
        println!();
    }
}

pub fn print_prediction(text: &str, prediction: &Prediction) {
    let s = &prediction.scores;
    println!(
        "{:<8} {:.3}  [neg {:.3} neu {:.3} pos {:.3}]  {}",
        prediction.label,
        prediction.confidence,
        s.negative,
        s.neutral,
        s.positive,
        truncate(text, MAX_EXAMPLE_CHARS)
    );
}

// ── Helpers ──

fn field(name: &str, value: impl std::fmt::Display) {
    println!("  {:<20} {}", name, value);
}

fn print_example(example: &Example) {
    let reply = if example.is_reply { " (reply)" } else { "" };
    println!(
        "  [{:<8} {:.2}] {} likes, {}{}",
        example.prediction.label,
        example.prediction.confidence,
        example.like_count,
        example.author,
        reply
    );
    println!("    {}", truncate(&example.text, MAX_EXAMPLE_CHARS));
}

fn bar(ratio: f64) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled)
}

/// First `max` characters on one line, with an ellipsis when cut.
fn truncate(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{cut}...")
}
