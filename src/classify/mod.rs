//! Classifier slots.
//!
//! Two independently loaded image classifiers (face shape, personal tone)
//! sit behind `ImageClassifier`. `ClassifierAdapter` owns both and only ever
//! invokes the active slot.

mod adapter;
mod backend;
mod backends;
mod metadata;
mod result;
mod slot;

pub use adapter::ClassifierAdapter;
pub use backend::ImageClassifier;
pub use backends::StubClassifier;
#[cfg(feature = "backend-tract")]
pub use backends::TractClassifier;
pub use metadata::{ModelMetadata, DEFAULT_INPUT_SIZE};
pub use result::{ClassificationResult, Prediction};
pub use slot::ModelSlot;
