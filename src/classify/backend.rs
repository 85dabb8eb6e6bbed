use anyhow::Result;

use crate::classify::result::ClassificationResult;
use crate::frame::Frame;

/// Image classifier backend trait.
///
/// Each implementation wraps one external model with its own label set. The
/// adapter asks the model for its class count instead of assuming one.
pub trait ImageClassifier: Send {
    /// Backend identifier.
    fn name(&self) -> &str;

    /// Labels in model output order.
    fn labels(&self) -> &[String];

    fn class_count(&self) -> usize {
        self.labels().len()
    }

    /// Square input edge the model expects, in pixels.
    fn input_size(&self) -> u32;

    /// Run inference on an already cropped, `input_size` square image.
    fn predict(&mut self, image: &Frame) -> Result<ClassificationResult>;
}
