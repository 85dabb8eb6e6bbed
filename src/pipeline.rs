//! Per-pass orchestration: locate → size gate → crop → classify → confidence
//! gate → recommend.
//!
//! A pass never renders directly. It returns the events it would emit in a
//! `PassReport`, and the controller forwards them only if the session that
//! issued the pass is still current.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::classify::{ClassifierAdapter, ModelSlot};
use crate::crop::{self, CROP_MARGIN_RATIO};
use crate::detect::{BoundingBox, FaceLocator, Location};
use crate::frame::Frame;
use crate::gate::{format_percent, ConfidenceGate, GateDecision};
use crate::render::{AdvisoryKind, RenderEvent};

const NO_MODEL_DETAIL: &str = "Select a model before starting the analysis.";
const NO_FACE_DETAIL: &str =
    "Face not detected. Center your face in the frame or brighten the lighting.";
const FACE_TOO_SMALL_DETAIL: &str =
    "Face is too small. Move closer to the camera or use a clearer image.";
const DETECTION_ERROR_DETAIL: &str = "Face detection failed for this image.";
const LOW_CONFIDENCE_HINT: &str =
    "Brighten the lighting, face the camera directly and simplify the background, then try again.";

/// How a pass ended.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PassOutcome {
    NoModelSelected,
    NoFace,
    FaceTooSmall { face: BoundingBox },
    AnalysisError { message: String },
    LowConfidence { top_probability: f32 },
    Recommended { label: String, top_probability: f32 },
}

impl PassOutcome {
    pub fn is_recommended(&self) -> bool {
        matches!(self, PassOutcome::Recommended { .. })
    }
}

#[derive(Clone, Debug)]
pub struct PassReport {
    pub outcome: PassOutcome,
    /// Region that was (or would have been) classified.
    pub face: Option<BoundingBox>,
    pub events: Vec<RenderEvent>,
}

impl PassReport {
    fn ended(outcome: PassOutcome, face: Option<BoundingBox>, event: RenderEvent) -> Self {
        Self {
            outcome,
            face,
            events: vec![event],
        }
    }
}

pub struct Pipeline {
    locator: FaceLocator,
    classifiers: ClassifierAdapter,
    gate: ConfidenceGate,
    catalog: Arc<Catalog>,
}

impl Pipeline {
    pub fn new(locator: FaceLocator, classifiers: ClassifierAdapter, catalog: Arc<Catalog>) -> Self {
        for slot in [ModelSlot::FaceShape, ModelSlot::PersonalTone] {
            let missing = catalog.missing_labels(slot.category(), classifiers.labels(slot));
            if !missing.is_empty() {
                log::warn!(
                    "{} labels without a catalog entry (fallback '{}' applies): {}",
                    slot.display_name(),
                    slot.category().fallback_label(),
                    missing.join(", ")
                );
            }
        }
        Self {
            locator,
            classifiers,
            gate: ConfidenceGate::new(),
            catalog,
        }
    }

    pub fn locator(&self) -> &FaceLocator {
        &self.locator
    }

    pub fn classifiers(&self) -> &ClassifierAdapter {
        &self.classifiers
    }

    pub fn run(&mut self, slot: Option<ModelSlot>, frame: &Frame) -> PassReport {
        let Some(slot) = slot else {
            return PassReport::ended(
                PassOutcome::NoModelSelected,
                None,
                RenderEvent::advisory(AdvisoryKind::NoModelSelected, NO_MODEL_DETAIL),
            );
        };

        let bbox = match self.locator.locate(frame) {
            Location::Face { bbox, confidence } => {
                log::debug!("face at {:?} (confidence {:.3})", bbox, confidence);
                bbox
            }
            Location::FullFrame(bbox) => bbox,
            Location::NotFound => {
                return PassReport::ended(
                    PassOutcome::NoFace,
                    None,
                    RenderEvent::advisory(AdvisoryKind::NoFaceDetected, NO_FACE_DETAIL),
                );
            }
            Location::Failed(message) => {
                return PassReport::ended(
                    PassOutcome::AnalysisError { message },
                    None,
                    RenderEvent::advisory(AdvisoryKind::AnalysisError, DETECTION_ERROR_DETAIL),
                );
            }
        };

        if let Err(small) = crop::check_face_size(&bbox) {
            log::debug!("{}", small);
            return PassReport::ended(
                PassOutcome::FaceTooSmall { face: bbox },
                Some(bbox),
                RenderEvent::advisory(AdvisoryKind::FaceTooSmall, FACE_TOO_SMALL_DETAIL),
            );
        }

        let input_size = self.classifiers.input_size(slot);
        let classified = crop::crop(frame, &bbox, CROP_MARGIN_RATIO, input_size)
            .and_then(|face| self.classifiers.classify(slot, &face));
        let result = match classified {
            Ok(result) => result,
            Err(e) => return self.analysis_error(bbox, format!("{:#}", e)),
        };

        match self.gate.admit(result) {
            GateDecision::Rejected { top_probability } => {
                let percent = format_percent(top_probability);
                log::debug!("{} below confidence threshold: {}", slot.display_name(), percent);
                PassReport::ended(
                    PassOutcome::LowConfidence { top_probability },
                    Some(bbox),
                    RenderEvent::advisory(
                        AdvisoryKind::LowConfidence,
                        format!("Low confidence for this image ({}). {}", percent, LOW_CONFIDENCE_HINT),
                    ),
                )
            }
            GateDecision::Accepted(result) => {
                let top_probability = result.top_probability();
                let label = match result.top() {
                    Some(top) => top.label.clone(),
                    None => return self.analysis_error(bbox, "empty classification".to_string()),
                };
                let recommendation = match self.catalog.lookup(slot.category(), &label) {
                    Ok(recommendation) => recommendation,
                    Err(e) => return self.analysis_error(bbox, format!("{:#}", e)),
                };
                PassReport {
                    outcome: PassOutcome::Recommended {
                        label,
                        top_probability,
                    },
                    face: Some(bbox),
                    events: vec![
                        RenderEvent::ShowRankedResults {
                            model: slot.display_name().to_string(),
                            predictions: result.into_predictions(),
                        },
                        RenderEvent::ShowRecommendation(recommendation),
                    ],
                }
            }
        }
    }

    fn analysis_error(&self, bbox: BoundingBox, message: String) -> PassReport {
        log::warn!("analysis failed: {}", message);
        PassReport::ended(
            PassOutcome::AnalysisError {
                message: message.clone(),
            },
            Some(bbox),
            RenderEvent::advisory(AdvisoryKind::AnalysisError, message),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::StubClassifier;
    use crate::detect::{FaceDetection, StubDetector};
    use std::sync::atomic::Ordering;

    fn frame() -> Frame {
        Frame::from_rgb(320, 240, vec![150u8; 320 * 240 * 3]).unwrap()
    }

    fn detection(x: f32, y: f32, w: f32, h: f32) -> FaceDetection {
        FaceDetection {
            top_left: [x, y],
            bottom_right: [x + w, y + h],
            confidence: 0.97,
        }
    }

    fn pipeline(detector: StubDetector, shape: StubClassifier) -> Pipeline {
        Pipeline::new(
            FaceLocator::new(Box::new(detector)),
            ClassifierAdapter::new(Box::new(shape), Box::new(StubClassifier::personal_tone())),
            Arc::new(Catalog::builtin()),
        )
    }

    #[test]
    fn no_slot_short_circuits_before_detection() {
        let detector = StubDetector::centered(0.5);
        let calls = detector.call_counter();
        let mut pipeline = pipeline(detector, StubClassifier::face_shape());
        let report = pipeline.run(None, &frame());
        assert_eq!(report.outcome, PassOutcome::NoModelSelected);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn detector_failure_is_a_per_pass_advisory() {
        let mut pipeline = pipeline(StubDetector::failing("backend crashed"), StubClassifier::face_shape());
        let report = pipeline.run(Some(ModelSlot::FaceShape), &frame());
        assert!(matches!(report.outcome, PassOutcome::AnalysisError { .. }));
        assert_eq!(
            report.events[0].advisory_kind(),
            Some(AdvisoryKind::AnalysisError)
        );
    }

    #[test]
    fn accepted_pass_emits_ranked_list_then_one_recommendation() {
        let shape = StubClassifier::scripted("shape", &[("Oval", 0.82), ("Round", 0.10), ("Square", 0.08)]);
        let mut pipeline = pipeline(StubDetector::fixed(vec![detection(60.0, 40.0, 120.0, 140.0)]), shape);
        let report = pipeline.run(Some(ModelSlot::FaceShape), &frame());
        assert!(report.outcome.is_recommended());
        assert_eq!(report.events.len(), 2);
        match &report.events[0] {
            RenderEvent::ShowRankedResults { model, predictions } => {
                assert_eq!(model, "Face Type Analysis");
                assert_eq!(predictions.len(), 3);
            }
            other => panic!("unexpected event {:?}", other),
        }
        match &report.events[1] {
            RenderEvent::ShowRecommendation(rec) => assert_eq!(rec.label, "Oval"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn degraded_locator_classifies_whole_frame() {
        let shape = StubClassifier::scripted("shape", &[("Heart", 0.7), ("Oval", 0.3)]);
        let calls = shape.call_counter();
        let mut pipeline = Pipeline::new(
            FaceLocator::without_detector(),
            ClassifierAdapter::new(Box::new(shape), Box::new(StubClassifier::personal_tone())),
            Arc::new(Catalog::builtin()),
        );
        let report = pipeline.run(Some(ModelSlot::FaceShape), &frame());
        assert_eq!(report.face, Some(BoundingBox::full_frame(320, 240)));
        assert!(report.outcome.is_recommended());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
