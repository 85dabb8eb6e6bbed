//! Collaborator loading.
//!
//! The controller never builds models itself; it asks a `ModelLoader`. Each
//! location is either a `stub://` URL or a filesystem path served by the
//! `backend-tract` feature.

use anyhow::{anyhow, Context, Result};

use crate::capture::{Camera, CaptureConfig};
use crate::classify::{ClassifierAdapter, ImageClassifier, StubClassifier};
use crate::config::StyleMateConfig;
use crate::detect::{FaceDetector, StubDetector};

pub trait ModelLoader {
    /// Both classifier slots. Any failure is an initialization failure.
    fn load_classifiers(&mut self) -> Result<ClassifierAdapter>;

    /// `Ok(None)` when no detector is configured.
    fn load_detector(&mut self) -> Result<Option<Box<dyn FaceDetector>>>;

    fn open_capture(&mut self) -> Result<Camera>;
}

/// Loads whatever a `StyleMateConfig` names.
pub struct ConfiguredLoader {
    face_shape: String,
    personal_tone: String,
    detector: Option<String>,
    capture: CaptureConfig,
}

impl ConfiguredLoader {
    pub fn from_config(config: &StyleMateConfig) -> Self {
        Self {
            face_shape: config.models.face_shape.clone(),
            personal_tone: config.models.personal_tone.clone(),
            detector: config.detector.clone(),
            capture: config.capture.clone(),
        }
    }
}

impl ModelLoader for ConfiguredLoader {
    fn load_classifiers(&mut self) -> Result<ClassifierAdapter> {
        let face_shape = load_classifier(&self.face_shape).context("model 1 (face shape)")?;
        let personal_tone =
            load_classifier(&self.personal_tone).context("model 2 (personal tone)")?;
        Ok(ClassifierAdapter::new(face_shape, personal_tone))
    }

    fn load_detector(&mut self) -> Result<Option<Box<dyn FaceDetector>>> {
        match self.detector.as_deref() {
            Some(location) => load_detector(location).map(Some),
            None => Ok(None),
        }
    }

    fn open_capture(&mut self) -> Result<Camera> {
        Camera::open(self.capture.clone())
    }
}

pub fn load_classifier(location: &str) -> Result<Box<dyn ImageClassifier>> {
    if location.starts_with("stub://") {
        let classifier = StubClassifier::from_url(location)?;
        log::info!("classifier {} loaded (stub)", location);
        return Ok(Box::new(classifier));
    }
    #[cfg(feature = "backend-tract")]
    {
        let classifier = crate::classify::TractClassifier::load(location)?;
        log::info!(
            "classifier {} loaded ({} classes)",
            location,
            classifier.class_count()
        );
        Ok(Box::new(classifier))
    }
    #[cfg(not(feature = "backend-tract"))]
    {
        Err(anyhow!(
            "loading model '{}' requires the backend-tract feature",
            location
        ))
    }
}

pub fn load_detector(location: &str) -> Result<Box<dyn FaceDetector>> {
    if location.starts_with("stub://") {
        let detector = StubDetector::from_url(location)?;
        log::info!("face detector {} loaded (stub)", location);
        return Ok(Box::new(detector));
    }
    #[cfg(feature = "backend-tract")]
    {
        let detector = crate::detect::TractDetector::new(location)?;
        log::info!("face detector {} loaded", location);
        Ok(Box::new(detector))
    }
    #[cfg(not(feature = "backend-tract"))]
    {
        Err(anyhow!(
            "loading face detector '{}' requires the backend-tract feature",
            location
        ))
    }
}
