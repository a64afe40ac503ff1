//! Sentiment labels, probability scores, and per-text predictions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three sentiment classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" | "neg" => Ok(Self::Negative),
            "neutral" | "neu" => Ok(Self::Neutral),
            "positive" | "pos" => Ok(Self::Positive),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// Probability per class. Components are in [0, 1] and sum to ~1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub negative: f32,
    pub neutral: f32,
    pub positive: f32,
}

impl SentimentScores {
    pub fn new(negative: f32, neutral: f32, positive: f32) -> Self {
        Self {
            negative,
            neutral,
            positive,
        }
    }

    pub fn get(&self, label: SentimentLabel) -> f32 {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }

    /// Highest-probability class. Ties resolve to the earlier class in
    /// negative, neutral, positive order.
    pub fn argmax(&self) -> SentimentLabel {
        let mut best = SentimentLabel::Negative;
        for label in SentimentLabel::ALL {
            if self.get(label) > self.get(best) {
                best = label;
            }
        }
        best
    }
}

/// Classification of a single text.
///
/// `confidence` is always `scores.get(label)`, which is not necessarily the
/// largest score when the neutral threshold chose the label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: SentimentLabel,
    pub confidence: f32,
    pub scores: SentimentScores,
}

impl Prediction {
    /// Build a prediction whose confidence is the chosen label's score.
    pub fn from_scores(label: SentimentLabel, scores: SentimentScores) -> Self {
        Self {
            label,
            confidence: scores.get(label),
            scores,
        }
    }

    /// Stand-in for a text whose batch failed inference.
    pub fn placeholder() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
            scores: SentimentScores::new(0.0, 1.0, 0.0),
        }
    }
}
