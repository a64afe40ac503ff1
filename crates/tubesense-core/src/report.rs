//! Aggregation of per-comment predictions into counts, ratios, and examples.

use serde::{Deserialize, Serialize};

use crate::{Comment, Prediction, SentimentLabel, VideoInfo};

/// Default number of examples kept per label.
pub const EXAMPLES_PER_LABEL: usize = 4;
/// Default cap on examples across all labels.
pub const MAX_EXAMPLES: usize = 15;

/// Order in which example groups appear in a report.
const EXAMPLE_ORDER: [SentimentLabel; 3] = [
    SentimentLabel::Positive,
    SentimentLabel::Neutral,
    SentimentLabel::Negative,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl LabelCounts {
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }

    fn bump(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Positive => self.positive += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }

    /// Share of each label; all zero when nothing was counted.
    pub fn ratios(&self) -> LabelRatios {
        let total = self.total();
        if total == 0 {
            return LabelRatios::default();
        }
        let ratio = |n: usize| n as f64 / total as f64;
        LabelRatios {
            negative: ratio(self.negative),
            neutral: ratio(self.neutral),
            positive: ratio(self.positive),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelRatios {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

/// Tally predictions by label.
pub fn tally<'a>(predictions: impl IntoIterator<Item = &'a Prediction>) -> LabelCounts {
    let mut counts = LabelCounts::default();
    for p in predictions {
        counts.bump(p.label);
    }
    counts
}

/// A representative comment shown alongside the aggregate numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    pub author: String,
    pub like_count: u64,
    pub published_at: String,
    pub is_reply: bool,
    pub prediction: Prediction,
}

/// Pick the most-liked comments for each label.
///
/// Takes up to `per_label` per label (positive, neutral, then negative) and
/// truncates the combined list to `max_total`. Equal like counts keep their
/// collection order.
pub fn select_examples(
    analyzed: &[(&Comment, Prediction)],
    per_label: usize,
    max_total: usize,
) -> Vec<Example> {
    let mut examples = Vec::new();
    for label in EXAMPLE_ORDER {
        let mut matching: Vec<&(&Comment, Prediction)> =
            analyzed.iter().filter(|(_, p)| p.label == label).collect();
        matching.sort_by(|a, b| b.0.like_count.cmp(&a.0.like_count));
        examples.extend(matching.into_iter().take(per_label).map(|(c, p)| Example {
            text: c.text.clone(),
            author: c.author.clone(),
            like_count: c.like_count,
            published_at: c.published_at.clone(),
            is_reply: c.is_reply,
            prediction: *p,
        }));
    }
    examples.truncate(max_total);
    examples
}

/// Final result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub video: VideoInfo,
    /// Top-level comment count reported by the platform.
    pub total_comments: u64,
    /// Comments gathered by the collector, replies included.
    pub collected: usize,
    /// Comments that went through inference.
    pub actual_analyzed: usize,
    pub percentage_requested: f64,
    pub counts: LabelCounts,
    pub ratios: LabelRatios,
    pub examples: Vec<Example>,
    /// Why collection stopped.
    pub stop_reason: String,
    /// Collection ended on an error and this report covers only part of it.
    pub partial: bool,
    pub quota_units_used: u64,
    pub processing_time_secs: f64,
    /// RFC 3339 timestamp.
    pub generated_at: String,
}
