//! StyleMate
//!
//! Face-shape and personal-tone analysis: a live camera tick or an uploaded
//! photo flows through
//!
//! capture → locate face → size gate → crop → classify → confidence gate → recommend
//!
//! and ends as render events for a presentation layer.
//!
//! # Module Structure
//!
//! - `frame`: RGB frames and upload decoding
//! - `capture`: live capture surface (synthetic or image directory)
//! - `detect`: face detector trait, backends and the single-face locator
//! - `crop`: minimum-size gate and margin crop
//! - `classify`: classifier trait, backends, metadata and the two-slot adapter
//! - `gate`: confidence threshold
//! - `catalog`: label → hairstyle / colour palette guidance
//! - `pipeline`: one pass over one frame
//! - `session`: capture source, active slot and live-loop state machine
//! - `render`: events crossing the presentation boundary
//! - `app`: the controller tying these together
//! - `config`, `loader`: file/env configuration and collaborator loading

pub mod app;
pub mod capture;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod crop;
pub mod detect;
pub mod error;
pub mod frame;
pub mod gate;
pub mod loader;
pub mod pipeline;
pub mod render;
pub mod session;

pub use app::StyleMate;
pub use capture::{Camera, CaptureConfig};
pub use catalog::{Catalog, Category, Recommendation, RecommendationEntry};
pub use classify::{ClassificationResult, ClassifierAdapter, ImageClassifier, ModelSlot, Prediction};
pub use config::StyleMateConfig;
pub use crop::{CROP_MARGIN_RATIO, MIN_FACE_SIZE};
pub use detect::{BoundingBox, FaceDetection, FaceDetector, FaceLocator, FACE_DETECTION_THRESHOLD};
pub use error::StyleError;
pub use frame::Frame;
pub use gate::{format_percent, ConfidenceGate, GateDecision, CONFIDENCE_THRESHOLD};
pub use loader::{ConfiguredLoader, ModelLoader};
pub use pipeline::{PassOutcome, PassReport, Pipeline};
pub use render::{AdvisoryKind, JsonLinesSink, RecordingSink, RenderEvent, RenderSink};
pub use session::{CaptureSource, LiveState, PassTicket, Session, SourceChange, Toggle, UploadState};
