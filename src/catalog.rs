//! Recommendation catalog.
//!
//! Static label → guidance table for both categories. Lookups never fail for
//! an unknown label: the category's fallback entry is used instead (`Oval`
//! for face type, `Cool` for personal tone). A catalog can be replaced from a
//! TOML file with the same shape as the built-in one.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

const FACE_TYPE_FALLBACK: &str = "Oval";
const PERSONAL_TONE_FALLBACK: &str = "Cool";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Face Type")]
    FaceType,
    #[serde(rename = "Personal Tone")]
    PersonalTone,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::FaceType => "Face Type",
            Category::PersonalTone => "Personal Tone",
        }
    }

    pub fn fallback_label(self) -> &'static str {
        match self {
            Category::FaceType => FACE_TYPE_FALLBACK,
            Category::PersonalTone => PERSONAL_TONE_FALLBACK,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "facetype" | "face" | "faceshape" => Ok(Category::FaceType),
            "personaltone" | "tone" => Ok(Category::PersonalTone),
            _ => Err(format!(
                "unknown category '{}'; expected \"Face Type\" or \"Personal Tone\"",
                s
            )),
        }
    }
}

/// Hairstyle guidance for a face shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HairStyleEntry {
    pub summary: String,
    pub short: String,
    pub long: String,
    pub short_image: String,
    pub long_image: String,
}

/// Colour guidance for a personal tone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorPaletteEntry {
    pub summary: String,
    pub hair: String,
    pub clothing: String,
    pub makeup: String,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationEntry {
    HairStyle(HairStyleEntry),
    ColorPalette(ColorPaletteEntry),
}

/// A resolved lookup.
///
/// `label` is what was asked for; `resolved_label` is the entry actually
/// used, which differs only when the fallback applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub category: Category,
    pub label: String,
    pub resolved_label: String,
    pub entry: RecommendationEntry,
}

impl Recommendation {
    pub fn is_fallback(&self) -> bool {
        self.label != self.resolved_label
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    face_type: BTreeMap<String, HairStyleEntry>,
    personal_tone: BTreeMap<String, ColorPaletteEntry>,
}

impl Catalog {
    /// Built-in guidance table.
    pub fn builtin() -> Self {
        let mut face_type = BTreeMap::new();
        for (label, summary, short, long, stem) in [
            (
                "Oval",
                "The most versatile face shape. Naturally suits most hairstyles.",
                "Crop cut, undercut, bob.",
                "Layered cuts, natural waves.",
                "oval",
            ),
            (
                "Round",
                "Styles that look longer and sharper work well. Best with styles that add vertical length and slim the sides.",
                "Voluminous tops, side-parted bob.",
                "Long layers, high ponytail.",
                "round",
            ),
            (
                "Square",
                "Softening styles that reduce angularity. Best with rounded styles or voluminous curls.",
                "Soft waves, graduated bob.",
                "Long layers, soft curls.",
                "square",
            ),
            (
                "Heart",
                "Styles that balance the narrow chin. Best with volume around the jawline.",
                "Pixie cut, chin-length bob.",
                "Long layers with volume at the bottom.",
                "heart",
            ),
            (
                "Oblong",
                "Styles that add width and reduce length. Best with styles that cover the forehead or add horizontal volume.",
                "Chin-length bob, fringe/bangs.",
                "Shoulder-length waves, full bangs.",
                "oblong",
            ),
        ] {
            face_type.insert(
                label.to_string(),
                HairStyleEntry {
                    summary: summary.to_string(),
                    short: short.to_string(),
                    long: long.to_string(),
                    short_image: format!("images/{}_short.png", stem),
                    long_image: format!("images/{}_long.png", stem),
                },
            );
        }

        let mut personal_tone = BTreeMap::new();
        personal_tone.insert(
            "Warm".to_string(),
            ColorPaletteEntry {
                summary: "Warm tones benefit from hair colors with golden, honey, or copper undertones.".to_string(),
                hair: "Warm browns (mocha, chestnut), rich reds (copper, auburn), golden blondes (honey, caramel).".to_string(),
                clothing: "Earth tones (olive green, terracotta), mustard yellow, warm reds.".to_string(),
                makeup: "Gold, bronze, coral, peach.".to_string(),
                image: "images/warm_palette.png".to_string(),
            },
        );
        personal_tone.insert(
            "Cool".to_string(),
            ColorPaletteEntry {
                summary: "Cool tones benefit from hair colors with ash, platinum, or blue-red undertones.".to_string(),
                hair: "Cool browns (ash brown, deep espresso), cool reds (burgundy, true red), ash blondes (platinum, silver).".to_string(),
                clothing: "Jewel tones (sapphire, emerald), pure white, cool pinks, navy blue.".to_string(),
                makeup: "Silver, pewter, cool pink, ruby red.".to_string(),
                image: "images/cool_palette.png".to_string(),
            },
        );

        Self {
            face_type,
            personal_tone,
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(raw).context("invalid catalog TOML")?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("catalog {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if !self.face_type.contains_key(FACE_TYPE_FALLBACK) {
            return Err(anyhow!(
                "catalog is missing the face type fallback entry '{}'",
                FACE_TYPE_FALLBACK
            ));
        }
        if !self.personal_tone.contains_key(PERSONAL_TONE_FALLBACK) {
            return Err(anyhow!(
                "catalog is missing the personal tone fallback entry '{}'",
                PERSONAL_TONE_FALLBACK
            ));
        }
        Ok(())
    }

    pub fn labels(&self, category: Category) -> Vec<&str> {
        match category {
            Category::FaceType => self.face_type.keys().map(String::as_str).collect(),
            Category::PersonalTone => self.personal_tone.keys().map(String::as_str).collect(),
        }
    }

    /// Labels a classifier can emit that have no entry of their own.
    pub fn missing_labels(&self, category: Category, labels: &[String]) -> Vec<String> {
        labels
            .iter()
            .filter(|label| match category {
                Category::FaceType => !self.face_type.contains_key(label.as_str()),
                Category::PersonalTone => !self.personal_tone.contains_key(label.as_str()),
            })
            .cloned()
            .collect()
    }

    /// Entry for `label`, or the category fallback.
    pub fn lookup(&self, category: Category, label: &str) -> Result<Recommendation> {
        let fallback = category.fallback_label();
        let (resolved_label, entry) = match category {
            Category::FaceType => {
                let (key, entry) = self
                    .face_type
                    .get_key_value(label)
                    .or_else(|| self.face_type.get_key_value(fallback))
                    .ok_or_else(|| anyhow!("catalog has no '{}' entry", fallback))?;
                (key.clone(), RecommendationEntry::HairStyle(entry.clone()))
            }
            Category::PersonalTone => {
                let (key, entry) = self
                    .personal_tone
                    .get_key_value(label)
                    .or_else(|| self.personal_tone.get_key_value(fallback))
                    .ok_or_else(|| anyhow!("catalog has no '{}' entry", fallback))?;
                (key.clone(), RecommendationEntry::ColorPalette(entry.clone()))
            }
        };
        if resolved_label != label {
            log::debug!(
                "no {} entry for '{}'; using '{}'",
                category,
                label,
                resolved_label
            );
        }
        Ok(Recommendation {
            category,
            label: label.to_string(),
            resolved_label,
            entry,
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
