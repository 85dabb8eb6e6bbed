use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::classify::backend::ImageClassifier;
use crate::classify::metadata::DEFAULT_INPUT_SIZE;
use crate::classify::result::{softmax, ClassificationResult, Prediction};
use crate::frame::Frame;

const FACE_SHAPE_LABELS: [&str; 5] = ["Oval", "Round", "Square", "Heart", "Oblong"];
const PERSONAL_TONE_LABELS: [&str; 2] = ["Warm", "Cool"];

/// Stub classifier for tests and demos.
///
/// `stub://face-shape` and `stub://personal-tone` derive probabilities from
/// coarse colour statistics, so identical input always yields identical
/// output. `scripted` returns fixed probabilities regardless of input.
pub struct StubClassifier {
    name: String,
    labels: Vec<String>,
    input_size: u32,
    mode: StubMode,
    calls: Arc<AtomicUsize>,
}

enum StubMode {
    Scripted(Vec<f32>),
    FaceShape,
    PersonalTone,
}

impl StubClassifier {
    pub fn scripted(name: &str, predictions: &[(&str, f32)]) -> Self {
        Self::new(
            name,
            predictions.iter().map(|(label, _)| label.to_string()).collect(),
            StubMode::Scripted(predictions.iter().map(|(_, p)| *p).collect()),
        )
    }

    pub fn face_shape() -> Self {
        Self::new(
            "stub-face-shape",
            FACE_SHAPE_LABELS.iter().map(|l| l.to_string()).collect(),
            StubMode::FaceShape,
        )
    }

    pub fn personal_tone() -> Self {
        Self::new(
            "stub-personal-tone",
            PERSONAL_TONE_LABELS.iter().map(|l| l.to_string()).collect(),
            StubMode::PersonalTone,
        )
    }

    pub fn from_url(url: &str) -> Result<Self> {
        match url.strip_prefix("stub://") {
            Some("face-shape") => Ok(Self::face_shape()),
            Some("personal-tone") => Ok(Self::personal_tone()),
            _ => Err(anyhow!("unknown stub classifier '{}'", url)),
        }
    }

    pub fn with_input_size(mut self, input_size: u32) -> Self {
        self.input_size = input_size;
        self
    }

    /// Shared count of `predict` calls.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    fn new(name: &str, labels: Vec<String>, mode: StubMode) -> Self {
        Self {
            name: name.to_string(),
            labels,
            input_size: DEFAULT_INPUT_SIZE,
            mode,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn scores(&self, image: &Frame) -> Vec<f32> {
        match &self.mode {
            StubMode::Scripted(probabilities) => probabilities.clone(),
            StubMode::FaceShape => {
                let [r, g, b] = image.mean_rgb();
                let logits: Vec<f32> = (0..self.labels.len())
                    .map(|i| ((r * (i as f32 + 1.0) * 7.0) + g * 3.0 + b).sin() * 4.0)
                    .collect();
                softmax(&logits)
            }
            StubMode::PersonalTone => {
                let [r, _, b] = image.mean_rgb();
                let warmth = (r - b) * 12.0;
                softmax(&[warmth, -warmth])
            }
        }
    }
}

impl ImageClassifier for StubClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn input_size(&self) -> u32 {
        self.input_size
    }

    fn predict(&mut self, image: &Frame) -> Result<ClassificationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scores = self.scores(image);
        Ok(ClassificationResult::ranked(
            self.labels
                .iter()
                .zip(scores)
                .map(|(label, p)| Prediction::new(label.clone(), p))
                .collect(),
        ))
    }
}
