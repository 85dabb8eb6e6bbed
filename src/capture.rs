//! Live capture surface.
//!
//! `Camera` hands the live loop one `Frame` per tick. Backends:
//! - `stub://...`: synthetic frames with a face-coloured ellipse in the centre
//! - a local directory: its JPEG/PNG files in name order, looping, scaled to
//!   the configured size
//!
//! Remote URL schemes are refused. An unopenable source is an
//! initialization failure for the live loop.

use anyhow::{anyhow, Context, Result};
use image::{imageops, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::frame::Frame;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// `stub://` or a local directory of images.
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
    /// Flip horizontally, like a selfie camera.
    pub mirror: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            url: "stub://camera".to_string(),
            width: 400,
            height: 400,
            target_fps: 10,
            mirror: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureStats {
    pub frames_captured: u64,
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CaptureState {
    Idle,
    Streaming,
    Paused,
}

pub struct Camera {
    config: CaptureConfig,
    backend: CaptureBackend,
    state: CaptureState,
    frames_captured: u64,
}

enum CaptureBackend {
    Synthetic(SyntheticCamera),
    Directory(DirectoryCamera),
}

impl Camera {
    pub fn open(config: CaptureConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(anyhow!("capture url is empty"));
        }
        if config.width == 0 || config.height == 0 {
            return Err(anyhow!(
                "capture size must be non-zero (got {}x{})",
                config.width,
                config.height
            ));
        }
        let backend = if config.url.starts_with("stub://") {
            CaptureBackend::Synthetic(SyntheticCamera::new(config.width, config.height))
        } else if config.url.contains("://") {
            return Err(anyhow!(
                "capture only supports stub:// or a local image directory, got '{}'",
                config.url
            ));
        } else {
            CaptureBackend::Directory(DirectoryCamera::scan(Path::new(&config.url))?)
        };
        Ok(Self {
            config,
            backend,
            state: CaptureState::Idle,
            frames_captured: 0,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        if let CaptureBackend::Directory(camera) = &self.backend {
            if camera.files.is_empty() {
                return Err(anyhow!("no images in {}", camera.root.display()));
            }
        }
        self.state = CaptureState::Streaming;
        log::info!("capture started: {}", self.config.url);
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state == CaptureState::Streaming {
            self.state = CaptureState::Paused;
            log::debug!("capture paused");
        }
    }

    pub fn resume(&mut self) {
        if self.state == CaptureState::Paused {
            self.state = CaptureState::Streaming;
            log::debug!("capture resumed");
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.state == CaptureState::Streaming
    }

    /// Grab the current surface contents.
    pub fn next_frame(&mut self) -> Result<Frame> {
        if self.state != CaptureState::Streaming {
            return Err(anyhow!("capture is not streaming"));
        }
        let frame = match &mut self.backend {
            CaptureBackend::Synthetic(camera) => camera.next_frame(),
            CaptureBackend::Directory(camera) => {
                camera.next_frame(self.config.width, self.config.height)?
            }
        };
        self.frames_captured += 1;
        Ok(if self.config.mirror {
            frame.mirrored()
        } else {
            frame
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn stats(&self) -> CaptureStats {
        CaptureStats {
            frames_captured: self.frames_captured,
            url: self.config.url.clone(),
        }
    }
}

struct SyntheticCamera {
    width: u32,
    height: u32,
    tick: u32,
}

impl SyntheticCamera {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tick: 0,
        }
    }

    fn next_frame(&mut self) -> Frame {
        self.tick = self.tick.wrapping_add(1);
        let (cx, cy) = (self.width as f32 / 2.0, self.height as f32 / 2.0);
        let (rx, ry) = (self.width as f32 * 0.22, self.height as f32 * 0.3);
        let shade = (self.tick % 32) as u8;
        let image = RgbImage::from_fn(self.width, self.height, |x, y| {
            let dx = (x as f32 - cx) / rx;
            let dy = (y as f32 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                Rgb([224, 172, 150])
            } else {
                Rgb([40 + shade, 60, 90u8.saturating_sub(shade)])
            }
        });
        Frame::from_rgb_image(image)
    }
}

struct DirectoryCamera {
    root: PathBuf,
    files: Vec<PathBuf>,
    cursor: usize,
}

impl DirectoryCamera {
    fn scan(root: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(root)
            .with_context(|| format!("failed to open capture directory {}", root.display()))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && is_image {
                files.push(path);
            }
        }
        files.sort();
        log::info!("capture directory {}: {} images", root.display(), files.len());
        Ok(Self {
            root: root.to_path_buf(),
            files,
            cursor: 0,
        })
    }

    /// Next decodable image, scaled to the configured size. Unreadable files
    /// are skipped; the source only fails once a full cycle yields nothing.
    fn next_frame(&mut self, width: u32, height: u32) -> Result<Frame> {
        if self.files.is_empty() {
            return Err(anyhow!("no images in {}", self.root.display()));
        }
        for _ in 0..self.files.len() {
            let path = &self.files[self.cursor % self.files.len()];
            self.cursor = (self.cursor + 1) % self.files.len();
            match Frame::open(path) {
                Ok(frame) => return Ok(fit_to(frame, width, height)),
                Err(e) => log::warn!("skipping capture image {}: {:#}", path.display(), e),
            }
        }
        Err(anyhow!("no readable images in {}", self.root.display()))
    }
}

fn fit_to(frame: Frame, width: u32, height: u32) -> Frame {
    if frame.width() == width && frame.height() == height {
        return frame;
    }
    Frame::from_rgb_image(imageops::resize(
        frame.as_rgb(),
        width,
        height,
        imageops::FilterType::Triangle,
    ))
}
