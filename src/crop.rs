//! Region cropper.
//!
//! Cuts the located face (plus margin) out of the source frame and resamples
//! it into the square the active classifier expects. Everything here is a
//! pure function of its inputs.

use anyhow::{anyhow, Result};
use image::imageops::{self, FilterType};

use crate::detect::BoundingBox;
use crate::frame::Frame;

/// Faces narrower or shorter than this (pixels) are not classified.
pub const MIN_FACE_SIZE: f32 = 50.0;

/// Margin added on every side, as a share of the box's longer side.
pub const CROP_MARGIN_RATIO: f32 = 0.1;

/// The located face is below `MIN_FACE_SIZE` in at least one dimension.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceTooSmall {
    pub width: f32,
    pub height: f32,
}

impl std::fmt::Display for FaceTooSmall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "face {:.0}x{:.0}px is below the {:.0}px minimum",
            self.width, self.height, MIN_FACE_SIZE
        )
    }
}

impl std::error::Error for FaceTooSmall {}

/// Integer pixel rectangle inside the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Size gate. Runs before margin expansion and before any classifier call.
pub fn check_face_size(bbox: &BoundingBox) -> std::result::Result<(), FaceTooSmall> {
    if bbox.width < MIN_FACE_SIZE || bbox.height < MIN_FACE_SIZE {
        return Err(FaceTooSmall {
            width: bbox.width,
            height: bbox.height,
        });
    }
    Ok(())
}

/// Grow `bbox` by `margin_ratio * max(width, height)` per side, clamped to the image.
pub fn expand_with_margin(
    bbox: &BoundingBox,
    margin_ratio: f32,
    image_width: u32,
    image_height: u32,
) -> CropRect {
    let margin = bbox.max_side() * margin_ratio.max(0.0);
    let (iw, ih) = (image_width as f32, image_height as f32);

    let x0 = (bbox.x - margin).clamp(0.0, iw).floor();
    let y0 = (bbox.y - margin).clamp(0.0, ih).floor();
    let x1 = (bbox.right() + margin).clamp(0.0, iw).ceil();
    let y1 = (bbox.bottom() + margin).clamp(0.0, ih).ceil();

    CropRect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0).max(0.0) as u32,
        height: (y1 - y0).max(0.0) as u32,
    }
}

/// Crop `bbox` with margin and resample to an `output_size` square.
pub fn crop(
    frame: &Frame,
    bbox: &BoundingBox,
    margin_ratio: f32,
    output_size: u32,
) -> Result<Frame> {
    check_face_size(bbox)?;
    if output_size == 0 {
        return Err(anyhow!("classifier input size must be greater than zero"));
    }
    let rect = expand_with_margin(bbox, margin_ratio, frame.width(), frame.height());
    if rect.width == 0 || rect.height == 0 {
        return Err(anyhow!(
            "face region {:?} lies outside the {}x{} image",
            bbox,
            frame.width(),
            frame.height()
        ));
    }
    let region = imageops::crop_imm(frame.as_rgb(), rect.x, rect.y, rect.width, rect.height)
        .to_image();
    let resized = imageops::resize(&region, output_size, output_size, FilterType::Triangle);
    Ok(Frame::from_rgb_image(resized))
}
