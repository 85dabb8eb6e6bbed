#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::classify::backend::ImageClassifier;
use crate::classify::metadata::ModelMetadata;
use crate::classify::result::{softmax, ClassificationResult};
use crate::frame::Frame;

const MODEL_FILE: &str = "model.onnx";
const METADATA_FILE: &str = "metadata.json";

/// Tract-based classifier for an exported image model directory.
///
/// The directory holds `model.onnx` (NHWC input `[1, S, S, 3]`, pixels
/// scaled to -1..=1) and `metadata.json` with the label list and `imageSize`.
/// Model loading is the only file access.
pub struct TractClassifier {
    name: String,
    model: TypedRunnableModel<TypedModel>,
    metadata: ModelMetadata,
}

impl TractClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let metadata = ModelMetadata::load(model_dir.join(METADATA_FILE))?;
        let size = metadata.input_size() as usize;
        let model_path = model_dir.join(MODEL_FILE);
        let model = tract_onnx::onnx()
            .model_for_path(&model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, size, size, 3)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        let name = metadata
            .model_name
            .clone()
            .unwrap_or_else(|| model_dir.display().to_string());
        log::info!(
            "loaded classifier {} ({} labels, input {}px)",
            name,
            metadata.labels.len(),
            size
        );
        Ok(Self {
            name,
            model,
            metadata,
        })
    }

    fn build_input(&self, image: &Frame) -> Result<Tensor> {
        let size = self.metadata.input_size();
        if image.width() != size || image.height() != size {
            return Err(anyhow!(
                "image size {}x{} does not match model input {}x{}",
                image.width(),
                image.height(),
                size,
                size
            ));
        }
        let rgb = image.as_rgb();
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, size as usize, size as usize, 3),
            |(_, y, x, channel)| rgb.get_pixel(x as u32, y as u32)[channel] as f32 / 127.5 - 1.0,
        );
        Ok(input.into_tensor())
    }

    fn extract_scores(&self, outputs: TVec<TValue>) -> Result<Vec<f32>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let scores: Vec<f32> = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?
            .iter()
            .cloned()
            .collect();
        let sum: f32 = scores.iter().sum();
        let normalized = scores.iter().all(|s| (0.0..=1.0).contains(s)) && (sum - 1.0).abs() < 0.05;
        Ok(if normalized { scores } else { softmax(&scores) })
    }
}

impl ImageClassifier for TractClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.metadata.labels
    }

    fn input_size(&self) -> u32 {
        self.metadata.input_size()
    }

    fn predict(&mut self, image: &Frame) -> Result<ClassificationResult> {
        let input = self.build_input(image)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        let scores = self.extract_scores(outputs)?;
        ClassificationResult::from_scores(&self.metadata.labels, &scores)
    }
}
