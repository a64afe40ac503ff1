//! Logits to label: softmax, then the neutral-biased rule.
//!
//! Neutral wins whenever its probability reaches the threshold; otherwise the
//! highest-probability class wins. Confidence is always the chosen class's
//! probability.

use tubesense_core::{Prediction, SentimentLabel};

use crate::labels::LabelLayout;
use crate::threshold::NeutralThreshold;

/// Numerically stable softmax over one row of logits.
pub fn softmax(logits: [f32; 3]) -> [f32; 3] {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.map(|x| (x - max).exp());
    let sum: f32 = exp.iter().sum();
    exp.map(|e| e / sum)
}

/// Apply the decision rule to a row of class probabilities in model order.
pub fn decide(probs: [f32; 3], layout: &LabelLayout, threshold: NeutralThreshold) -> Prediction {
    let scores = layout.scores(probs);
    let label = if scores.neutral >= threshold.value() {
        SentimentLabel::Neutral
    } else {
        scores.argmax()
    };
    Prediction::from_scores(label, scores)
}
