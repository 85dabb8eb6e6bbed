use anyhow::{anyhow, Result};
use serde::Serialize;

/// One label with its probability.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Predictions sorted by descending probability.
///
/// The first entry is always the argmax. Probabilities are clamped to 0..=1
/// (NaN becomes 0) but are not renormalized.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ClassificationResult {
    predictions: Vec<Prediction>,
}

impl ClassificationResult {
    /// Rank arbitrary predictions. Ties keep their input order.
    pub fn ranked(predictions: Vec<Prediction>) -> Self {
        let mut predictions: Vec<Prediction> = predictions
            .into_iter()
            .map(|p| Prediction {
                probability: if p.probability.is_nan() {
                    0.0
                } else {
                    p.probability.clamp(0.0, 1.0)
                },
                label: p.label,
            })
            .collect();
        predictions.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Self { predictions }
    }

    /// Pair model scores with labels in output order.
    pub fn from_scores(labels: &[String], scores: &[f32]) -> Result<Self> {
        if labels.len() != scores.len() {
            return Err(anyhow!(
                "model produced {} scores for {} labels",
                scores.len(),
                labels.len()
            ));
        }
        Ok(Self::ranked(
            labels
                .iter()
                .zip(scores)
                .map(|(label, score)| Prediction::new(label.clone(), *score))
                .collect(),
        ))
    }

    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    pub fn top_probability(&self) -> f32 {
        self.top().map(|p| p.probability).unwrap_or(0.0)
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Keep only the `count` most probable entries.
    pub fn truncate(&mut self, count: usize) {
        self.predictions.truncate(count);
    }

    pub fn into_predictions(self) -> Vec<Prediction> {
        self.predictions
    }
}

/// Softmax over raw logits. Used when a model emits unnormalized scores.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}
