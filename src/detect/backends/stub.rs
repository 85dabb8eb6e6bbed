use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::detect::backend::FaceDetector;
use crate::detect::result::FaceDetection;
use crate::frame::Frame;

/// Share of the shorter frame side covered by a `stub://center` face.
const CENTER_FACE_FRACTION: f32 = 0.6;

/// Stub detector for tests and demos.
///
/// Selected with `stub://center`, `stub://none` or `stub://fail`, or built
/// directly with scripted detections.
pub struct StubDetector {
    mode: StubMode,
    calls: Arc<AtomicUsize>,
}

enum StubMode {
    Fixed(Vec<FaceDetection>),
    Centered(f32),
    Failing(String),
}

impl StubDetector {
    /// Always return the same detections.
    pub fn fixed(detections: Vec<FaceDetection>) -> Self {
        Self::with_mode(StubMode::Fixed(detections))
    }

    /// Never find a face.
    pub fn none() -> Self {
        Self::fixed(Vec::new())
    }

    /// A square face centred in the frame, `fraction` of the shorter side.
    pub fn centered(fraction: f32) -> Self {
        Self::with_mode(StubMode::Centered(fraction.clamp(0.0, 1.0)))
    }

    /// Fail every call.
    pub fn failing(message: &str) -> Self {
        Self::with_mode(StubMode::Failing(message.to_string()))
    }

    pub fn from_url(url: &str) -> Result<Self> {
        match url.strip_prefix("stub://") {
            Some("center") | Some("") => Ok(Self::centered(CENTER_FACE_FRACTION)),
            Some("none") => Ok(Self::none()),
            Some("fail") => Ok(Self::failing("stub detector failure")),
            _ => Err(anyhow!("unknown stub detector '{}'", url)),
        }
    }

    /// Shared count of `estimate_faces` calls.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    fn with_mode(mode: StubMode) -> Self {
        Self {
            mode,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FaceDetector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn estimate_faces(&mut self, frame: &Frame, threshold: f32) -> Result<Vec<FaceDetection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            StubMode::Fixed(detections) => Ok(detections
                .iter()
                .filter(|d| d.confidence >= threshold)
                .copied()
                .collect()),
            StubMode::Centered(fraction) => {
                let (w, h) = (frame.width() as f32, frame.height() as f32);
                let side = w.min(h) * fraction;
                let x = (w - side) / 2.0;
                let y = (h - side) / 2.0;
                Ok(vec![FaceDetection {
                    top_left: [x, y],
                    bottom_right: [x + side, y + side],
                    confidence: 0.98,
                }])
            }
            StubMode::Failing(message) => Err(anyhow!("{}", message)),
        }
    }
}
