use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Classifier input edge used when metadata does not name one.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// `metadata.json` shipped next to an exported image model.
///
/// Only `labels` is required; the Teachable Machine export also carries
/// `imageSize` and `modelName`, other keys are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub labels: Vec<String>,
    #[serde(default)]
    pub image_size: Option<u32>,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl ModelMetadata {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model metadata {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid model metadata {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let metadata: ModelMetadata = serde_json::from_str(raw)?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn input_size(&self) -> u32 {
        self.image_size.unwrap_or(DEFAULT_INPUT_SIZE)
    }

    fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(anyhow!("model metadata lists no labels"));
        }
        if self.labels.iter().any(|label| label.trim().is_empty()) {
            return Err(anyhow!("model metadata contains an empty label"));
        }
        if self.image_size == Some(0) {
            return Err(anyhow!("imageSize must be greater than zero"));
        }
        Ok(())
    }
}
