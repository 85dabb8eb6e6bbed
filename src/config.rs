use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::CaptureConfig;

const DEFAULT_FACE_SHAPE_MODEL: &str = "models/model1";
const DEFAULT_PERSONAL_TONE_MODEL: &str = "models/model2";
const DEFAULT_CAPTURE_URL: &str = "stub://camera";
const DEFAULT_CAPTURE_FPS: u32 = 10;
const DEFAULT_CAPTURE_SIZE: u32 = 400;
const MAX_CAPTURE_FPS: u32 = 60;

#[derive(Debug, Deserialize, Default)]
struct StyleMateConfigFile {
    models: Option<ModelsConfigFile>,
    detector: Option<DetectorConfigFile>,
    capture: Option<CaptureConfigFile>,
    catalog_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct ModelsConfigFile {
    face_shape: Option<String>,
    personal_tone: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    model: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CaptureConfigFile {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
    mirror: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct StyleMateConfig {
    pub models: ModelSettings,
    /// `None` runs every pass on the full image.
    pub detector: Option<String>,
    pub capture: CaptureConfig,
    pub catalog_path: Option<PathBuf>,
}

/// Model directory (holding `model.onnx` + `metadata.json`) or `stub://` URL
/// per classifier slot.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub face_shape: String,
    pub personal_tone: String,
}

impl StyleMateConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("STYLEMATE_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Stub collaborators everywhere; runs without model files.
    pub fn stub() -> Self {
        Self {
            models: ModelSettings {
                face_shape: "stub://face-shape".to_string(),
                personal_tone: "stub://personal-tone".to_string(),
            },
            detector: Some("stub://center".to_string()),
            capture: CaptureConfig::default(),
            catalog_path: None,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.capture.target_fps.max(1)))
    }

    fn from_file(file: StyleMateConfigFile) -> Self {
        let models = ModelSettings {
            face_shape: file
                .models
                .as_ref()
                .and_then(|models| models.face_shape.clone())
                .unwrap_or_else(|| DEFAULT_FACE_SHAPE_MODEL.to_string()),
            personal_tone: file
                .models
                .as_ref()
                .and_then(|models| models.personal_tone.clone())
                .unwrap_or_else(|| DEFAULT_PERSONAL_TONE_MODEL.to_string()),
        };
        let detector = file.detector.and_then(|detector| detector.model);
        let capture_file = file.capture.unwrap_or_default();
        let capture = CaptureConfig {
            url: capture_file
                .url
                .unwrap_or_else(|| DEFAULT_CAPTURE_URL.to_string()),
            width: capture_file.width.unwrap_or(DEFAULT_CAPTURE_SIZE),
            height: capture_file.height.unwrap_or(DEFAULT_CAPTURE_SIZE),
            target_fps: capture_file.target_fps.unwrap_or(DEFAULT_CAPTURE_FPS),
            mirror: capture_file.mirror.unwrap_or(true),
        };
        Self {
            models,
            detector,
            capture,
            catalog_path: file.catalog_path,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(model) = std::env::var("STYLEMATE_MODEL_1") {
            if !model.trim().is_empty() {
                self.models.face_shape = model;
            }
        }
        if let Ok(model) = std::env::var("STYLEMATE_MODEL_2") {
            if !model.trim().is_empty() {
                self.models.personal_tone = model;
            }
        }
        if let Ok(detector) = std::env::var("STYLEMATE_DETECTOR") {
            self.detector = match detector.trim() {
                "" | "none" => None,
                _ => Some(detector),
            };
        }
        if let Ok(url) = std::env::var("STYLEMATE_CAPTURE_URL") {
            if !url.trim().is_empty() {
                self.capture.url = url;
            }
        }
        if let Ok(fps) = std::env::var("STYLEMATE_CAPTURE_FPS") {
            self.capture.target_fps = fps
                .trim()
                .parse()
                .map_err(|_| anyhow!("STYLEMATE_CAPTURE_FPS must be an integer frame rate"))?;
        }
        if let Ok(path) = std::env::var("STYLEMATE_CATALOG") {
            if !path.trim().is_empty() {
                self.catalog_path = Some(PathBuf::from(path));
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.models.face_shape.trim().is_empty() || self.models.personal_tone.trim().is_empty()
        {
            return Err(anyhow!("both classifier model locations must be set"));
        }
        if self.capture.target_fps == 0 || self.capture.target_fps > MAX_CAPTURE_FPS {
            return Err(anyhow!(
                "capture target_fps must be between 1 and {}",
                MAX_CAPTURE_FPS
            ));
        }
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(anyhow!("capture width and height must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<StyleMateConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
