use anyhow::{anyhow, Context, Result};

use crate::classify::backend::ImageClassifier;
use crate::classify::result::ClassificationResult;
use crate::classify::slot::ModelSlot;
use crate::frame::Frame;

/// Owns both classifier slots and dispatches to exactly one per call.
pub struct ClassifierAdapter {
    face_shape: Box<dyn ImageClassifier>,
    personal_tone: Box<dyn ImageClassifier>,
}

impl ClassifierAdapter {
    pub fn new(
        face_shape: Box<dyn ImageClassifier>,
        personal_tone: Box<dyn ImageClassifier>,
    ) -> Self {
        Self {
            face_shape,
            personal_tone,
        }
    }

    pub fn classifier(&self, slot: ModelSlot) -> &dyn ImageClassifier {
        match slot {
            ModelSlot::FaceShape => self.face_shape.as_ref(),
            ModelSlot::PersonalTone => self.personal_tone.as_ref(),
        }
    }

    fn classifier_mut(&mut self, slot: ModelSlot) -> &mut dyn ImageClassifier {
        match slot {
            ModelSlot::FaceShape => self.face_shape.as_mut(),
            ModelSlot::PersonalTone => self.personal_tone.as_mut(),
        }
    }

    /// Input edge of the slot's model; crops are resampled to this size.
    pub fn input_size(&self, slot: ModelSlot) -> u32 {
        self.classifier(slot).input_size()
    }

    pub fn class_count(&self, slot: ModelSlot) -> usize {
        self.classifier(slot).class_count()
    }

    pub fn labels(&self, slot: ModelSlot) -> &[String] {
        self.classifier(slot).labels()
    }

    /// Classify with the given slot only.
    ///
    /// The ranked result is cut to the model's own class count.
    pub fn classify(&mut self, slot: ModelSlot, image: &Frame) -> Result<ClassificationResult> {
        let classifier = self.classifier_mut(slot);
        let class_count = classifier.class_count();
        let name = classifier.name().to_string();
        let mut result = classifier
            .predict(image)
            .with_context(|| format!("{} classifier ({}) failed", slot.display_name(), name))?;
        result.truncate(class_count);
        if result.is_empty() {
            return Err(anyhow!(
                "{} classifier ({}) produced no predictions",
                slot.display_name(),
                name
            ));
        }
        log::debug!(
            "slot {} ({}) top={:?} p={:.3}",
            slot.index(),
            name,
            result.top().map(|p| p.label.as_str()),
            result.top_probability()
        );
        Ok(result)
    }
}
