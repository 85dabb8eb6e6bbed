use crate::detect::backend::FaceDetector;
use crate::detect::result::BoundingBox;
use crate::frame::Frame;

/// Minimum detector confidence for a face to count.
pub const FACE_DETECTION_THRESHOLD: f32 = 0.9;

/// Where the pipeline should look in a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Location {
    /// Highest-confidence face above the threshold.
    Face { bbox: BoundingBox, confidence: f32 },
    /// No detector loaded: the whole image is the region of interest.
    FullFrame(BoundingBox),
    /// Detector ran and found nothing.
    NotFound,
    /// Detector call failed for this frame only.
    Failed(String),
}

/// Wraps the face detector collaborator.
///
/// Yields at most one box per frame. When the detector could not be loaded
/// the locator degrades to full-frame analysis instead of failing.
pub struct FaceLocator {
    detector: Option<Box<dyn FaceDetector>>,
    threshold: f32,
    fallback_logged: bool,
}

impl FaceLocator {
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self {
            detector: Some(detector),
            threshold: FACE_DETECTION_THRESHOLD,
            fallback_logged: false,
        }
    }

    /// Locator with no detector; every frame is analysed whole.
    pub fn without_detector() -> Self {
        Self {
            detector: None,
            threshold: FACE_DETECTION_THRESHOLD,
            fallback_logged: false,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.detector.is_none()
    }

    pub fn detector_name(&self) -> Option<&'static str> {
        self.detector.as_ref().map(|d| d.name())
    }

    pub fn locate(&mut self, frame: &Frame) -> Location {
        let Some(detector) = self.detector.as_mut() else {
            if !self.fallback_logged {
                log::warn!("face detector not loaded; predicting with the full image");
                self.fallback_logged = true;
            }
            return Location::FullFrame(BoundingBox::full_frame(frame.width(), frame.height()));
        };

        match detector.estimate_faces(frame, self.threshold) {
            Ok(detections) => detections
                .into_iter()
                .filter(|d| d.confidence >= self.threshold)
                .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
                .map(|d| Location::Face {
                    bbox: d.bounding_box(),
                    confidence: d.confidence,
                })
                .unwrap_or(Location::NotFound),
            Err(e) => {
                log::warn!("face detection failed ({}): {:#}", detector.name(), e);
                Location::Failed(format!("{:#}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{FaceDetection, StubDetector};

    fn frame() -> Frame {
        Frame::from_rgb(320, 240, vec![120u8; 320 * 240 * 3]).unwrap()
    }

    fn hit(x: f32, conf: f32) -> FaceDetection {
        FaceDetection {
            top_left: [x, 10.0],
            bottom_right: [x + 80.0, 100.0],
            confidence: conf,
        }
    }

    #[test]
    fn picks_highest_confidence_detection() {
        let detector = StubDetector::fixed(vec![hit(0.0, 0.92), hit(100.0, 0.99), hit(200.0, 0.95)]);
        let mut locator = FaceLocator::new(Box::new(detector));
        match locator.locate(&frame()) {
            Location::Face { bbox, confidence } => {
                assert_eq!(bbox.x, 100.0);
                assert_eq!(confidence, 0.99);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn drops_detections_below_threshold() {
        let detector = StubDetector::fixed(vec![hit(0.0, 0.89)]);
        let mut locator = FaceLocator::new(Box::new(detector));
        assert_eq!(locator.locate(&frame()), Location::NotFound);
    }

    #[test]
    fn missing_detector_falls_back_to_full_frame() {
        let mut locator = FaceLocator::without_detector();
        assert!(locator.is_degraded());
        assert_eq!(
            locator.locate(&frame()),
            Location::FullFrame(BoundingBox::new(0.0, 0.0, 320.0, 240.0))
        );
    }

    #[test]
    fn detector_error_is_reported_per_call() {
        let mut locator = FaceLocator::new(Box::new(StubDetector::failing("backend crashed")));
        match locator.locate(&frame()) {
            Location::Failed(msg) => assert!(msg.contains("backend crashed")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
