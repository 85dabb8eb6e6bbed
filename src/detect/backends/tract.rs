#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::imageops::{self, FilterType};
use tract_onnx::prelude::*;

use crate::detect::backend::FaceDetector;
use crate::detect::result::FaceDetection;
use crate::frame::Frame;

/// UltraFace-style input (RFB-320).
const DETECTOR_WIDTH: u32 = 320;
const DETECTOR_HEIGHT: u32 = 240;

/// Tract-based face detector for ONNX models.
///
/// Expects two outputs: `scores` shaped `[1, N, 2]` (background, face) and
/// `boxes` shaped `[1, N, 4]` holding normalized `x1, y1, x2, y2` corners.
/// Model loading is the only file access.
pub struct TractDetector {
    model: TypedRunnableModel<TypedModel>,
}

impl TractDetector {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| {
                format!("failed to load ONNX detector from {}", model_path.display())
            })?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, DETECTOR_HEIGHT as usize, DETECTOR_WIDTH as usize),
                ),
            )
            .context("failed to set detector input fact")?
            .into_optimized()
            .context("failed to optimize ONNX detector")?
            .into_runnable()
            .context("failed to build runnable ONNX detector")?;
        Ok(Self { model })
    }

    fn build_input(&self, frame: &Frame) -> Tensor {
        let resized = imageops::resize(
            frame.as_rgb(),
            DETECTOR_WIDTH,
            DETECTOR_HEIGHT,
            FilterType::Triangle,
        );
        tract_ndarray::Array4::from_shape_fn(
            (1, 3, DETECTOR_HEIGHT as usize, DETECTOR_WIDTH as usize),
            |(_, channel, y, x)| {
                let value = resized.get_pixel(x as u32, y as u32)[channel] as f32;
                (value - 127.0) / 128.0
            },
        )
        .into_tensor()
    }
}

impl FaceDetector for TractDetector {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn estimate_faces(&mut self, frame: &Frame, threshold: f32) -> Result<Vec<FaceDetection>> {
        let input = self.build_input(frame);
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX face detection failed")?;
        if outputs.len() < 2 {
            return Err(anyhow!(
                "detector produced {} outputs, expected scores and boxes",
                outputs.len()
            ));
        }
        let scores = outputs[0]
            .to_array_view::<f32>()
            .context("detector scores were not f32")?;
        let boxes = outputs[1]
            .to_array_view::<f32>()
            .context("detector boxes were not f32")?;
        let scores = scores
            .to_shape((scores.len() / 2, 2))
            .context("unexpected detector scores shape")?;
        let boxes = boxes
            .to_shape((boxes.len() / 4, 4))
            .context("unexpected detector boxes shape")?;

        let (fw, fh) = (frame.width() as f32, frame.height() as f32);
        let mut faces = Vec::new();
        for (score, corners) in scores.outer_iter().zip(boxes.outer_iter()) {
            let confidence = score[1];
            if confidence < threshold {
                continue;
            }
            faces.push(FaceDetection {
                top_left: [corners[0].clamp(0.0, 1.0) * fw, corners[1].clamp(0.0, 1.0) * fh],
                bottom_right: [
                    corners[2].clamp(0.0, 1.0) * fw,
                    corners[3].clamp(0.0, 1.0) * fh,
                ],
                confidence,
            });
        }
        Ok(faces)
    }
}
