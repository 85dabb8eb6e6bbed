use anyhow::Result;

use crate::detect::result::FaceDetection;
use crate::frame::Frame;

/// Face detector backend trait.
///
/// A detector is an opaque external model: it receives a frame and a minimum
/// confidence and returns corner-style detections in source pixel
/// coordinates. Backends are loaded once and then called once per pass.
pub trait FaceDetector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Estimate faces in `frame`, keeping detections at or above `threshold`.
    ///
    /// Errors are per-call: the locator reports them as an analysis advisory
    /// and the next tick calls the detector again.
    fn estimate_faces(&mut self, frame: &Frame, threshold: f32) -> Result<Vec<FaceDetection>>;

    /// Called once after loading. An error counts as a failed load.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
