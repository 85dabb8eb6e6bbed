mod backend;
mod backends;
mod locator;
mod result;

pub use backend::FaceDetector;
pub use backends::StubDetector;
#[cfg(feature = "backend-tract")]
pub use backends::TractDetector;
pub use locator::{FaceLocator, Location, FACE_DETECTION_THRESHOLD};
pub use result::{BoundingBox, FaceDetection};
