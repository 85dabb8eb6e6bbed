#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use image::{ImageFormat, Rgb, RgbImage};

use style_mate::classify::StubClassifier;
use style_mate::detect::StubDetector;
use style_mate::{
    Camera, CaptureConfig, Catalog, ClassifierAdapter, FaceDetection, FaceDetector, ModelLoader,
    RecordingSink, StyleMate,
};

/// Hands out pre-built stubs and counts load attempts.
pub struct ScriptedLoader {
    pub face_shape: Option<StubClassifier>,
    pub personal_tone: Option<StubClassifier>,
    pub detector: Option<StubDetector>,
    pub fail_detector: bool,
    pub capture_url: String,
    pub model_loads: Arc<AtomicUsize>,
}

impl ScriptedLoader {
    pub fn new(face_shape: StubClassifier, personal_tone: StubClassifier) -> Self {
        Self {
            face_shape: Some(face_shape),
            personal_tone: Some(personal_tone),
            detector: Some(StubDetector::centered(0.6)),
            fail_detector: false,
            capture_url: "stub://camera".to_string(),
            model_loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_detector(mut self, detector: StubDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Live capture from a local image directory instead of the synthetic camera.
    pub fn with_capture_dir(mut self, dir: &Path) -> Self {
        self.capture_url = dir.to_string_lossy().into_owned();
        self
    }

    /// Classifier loads always fail.
    pub fn broken() -> Self {
        Self {
            face_shape: None,
            personal_tone: None,
            detector: None,
            fail_detector: false,
            capture_url: "stub://camera".to_string(),
            model_loads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ModelLoader for ScriptedLoader {
    fn load_classifiers(&mut self) -> Result<ClassifierAdapter> {
        self.model_loads.fetch_add(1, Ordering::SeqCst);
        match (self.face_shape.take(), self.personal_tone.take()) {
            (Some(face_shape), Some(personal_tone)) => Ok(ClassifierAdapter::new(
                Box::new(face_shape),
                Box::new(personal_tone),
            )),
            _ => Err(anyhow!("models/model1/model.onnx not found")),
        }
    }

    fn load_detector(&mut self) -> Result<Option<Box<dyn FaceDetector>>> {
        if self.fail_detector {
            return Err(anyhow!("detector weights unavailable"));
        }
        Ok(self
            .detector
            .take()
            .map(|d| Box::new(d) as Box<dyn FaceDetector>))
    }

    fn open_capture(&mut self) -> Result<Camera> {
        Camera::open(CaptureConfig {
            url: self.capture_url.clone(),
            width: 400,
            height: 400,
            target_fps: 30,
            mirror: true,
        })
    }
}

pub fn app(loader: ScriptedLoader) -> StyleMate<RecordingSink> {
    StyleMate::new(Box::new(loader), Catalog::builtin(), RecordingSink::new())
}

pub fn detection(x: f32, y: f32, width: f32, height: f32) -> FaceDetection {
    FaceDetection {
        top_left: [x, y],
        bottom_right: [x + width, y + height],
        confidence: 0.95,
    }
}

pub fn png_upload(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([205, 160, 140]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

pub fn face_shape_scores(top: f32) -> StubClassifier {
    let rest = (1.0 - top) / 4.0;
    StubClassifier::scripted(
        "scripted-face-shape",
        &[
            ("Oval", top),
            ("Round", rest),
            ("Square", rest),
            ("Heart", rest),
            ("Oblong", rest),
        ],
    )
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    std::fs::write(path, png_upload(width, height)).expect("write png");
}
