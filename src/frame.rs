//! Image frames flowing through the pipeline.
//!
//! - `Frame`: owned RGB8 pixels for one capture tick or one upload.
//! - Uploaded bytes are format-sniffed before decode; anything that is not a
//!   recognised image is rejected as `StyleError::InvalidInput` before any
//!   pipeline stage sees it.

use anyhow::{anyhow, Context, Result};
use image::{imageops, DynamicImage, RgbImage};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::StyleError;

/// Largest upload accepted, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// An RGB8 image. Frames are transient: one per tick or upload, never shared
/// across passes.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// Wrap tightly packed RGB24 pixels.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("RGB frame dimensions overflow"))? as usize;
        if pixels.len() != expected {
            return Err(anyhow!(
                "RGB frame length mismatch: expected {}, got {}",
                expected,
                pixels.len()
            ));
        }
        let image = RgbImage::from_raw(width, height, pixels)
            .ok_or_else(|| anyhow!("RGB buffer does not match {}x{}", width, height))?;
        Ok(Self { image })
    }

    pub fn from_rgb_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: image.into_rgb8(),
        }
    }

    /// Decode an uploaded file. Non-image payloads fail with `InvalidInput`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(StyleError::InvalidInput("uploaded file is empty".to_string()).into());
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(StyleError::InvalidInput(format!(
                "uploaded file exceeds {} bytes",
                MAX_UPLOAD_BYTES
            ))
            .into());
        }
        let format = image::guess_format(bytes).map_err(|_| {
            StyleError::InvalidInput(
                "only image files (JPG, PNG, etc.) can be uploaded".to_string(),
            )
        })?;
        let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| {
            StyleError::InvalidInput(format!("could not decode {:?} image: {}", format, e))
        })?;
        Ok(Self::from_dynamic(decoded))
    }

    /// Read and decode an image file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::decode(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Packed RGB24 bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Horizontal flip, as a selfie camera shows it.
    pub fn mirrored(self) -> Self {
        Self {
            image: imageops::flip_horizontal(&self.image),
        }
    }

    /// SHA-256 over dimensions and pixels. Identical uploads share a fingerprint.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.width().to_le_bytes());
        hasher.update(self.height().to_le_bytes());
        hasher.update(self.pixels());
        hasher.finalize().into()
    }

    /// Mean of each channel, scaled to 0..=1.
    pub fn mean_rgb(&self) -> [f32; 3] {
        let mut sums = [0u64; 3];
        for px in self.image.pixels() {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
        }
        let count = (self.width() as u64 * self.height() as u64).max(1) as f32;
        [
            sums[0] as f32 / count / 255.0,
            sums[1] as f32 / count / 255.0,
            sums[2] as f32 / count / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 90]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn decode_accepts_png_upload() {
        let frame = Frame::decode(&png_bytes(12, 8)).unwrap();
        assert_eq!(frame.width(), 12);
        assert_eq!(frame.height(), 8);
        assert_eq!(frame.pixels().len(), 12 * 8 * 3);
    }

    #[test]
    fn decode_rejects_non_image_as_invalid_input() {
        let err = Frame::decode(b"%PDF-1.7 definitely not a photo").unwrap_err();
        match err.downcast_ref::<StyleError>() {
            Some(StyleError::InvalidInput(_)) => {}
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn from_rgb_validates_length() {
        assert!(Frame::from_rgb(2, 2, vec![0u8; 11]).is_err());
        assert!(Frame::from_rgb(2, 2, vec![0u8; 12]).is_ok());
    }

    #[test]
    fn fingerprint_tracks_pixel_content() {
        let a = Frame::from_rgb(1, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let b = Frame::from_rgb(1, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let c = Frame::from_rgb(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn mirrored_swaps_columns() {
        let frame = Frame::from_rgb(2, 1, vec![10, 10, 10, 200, 200, 200]).unwrap();
        let flipped = frame.mirrored();
        assert_eq!(flipped.pixels(), &[200, 200, 200, 10, 10, 10]);
    }
}
