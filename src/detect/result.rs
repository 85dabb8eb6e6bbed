use serde::Serialize;

/// Axis-aligned box in source-image pixel coordinates.
///
/// Width and height are never negative. Boxes are produced fresh for each
/// detection call and never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Box spanning `top_left` to `bottom_right`.
    pub fn from_corners(top_left: [f32; 2], bottom_right: [f32; 2]) -> Self {
        Self::new(
            top_left[0],
            top_left[1],
            bottom_right[0] - top_left[0],
            bottom_right[1] - top_left[1],
        )
    }

    /// The whole image as region of interest.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn max_side(&self) -> f32 {
        self.width.max(self.height)
    }
}

/// One raw detector hit, corner form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceDetection {
    pub top_left: [f32; 2],
    pub bottom_right: [f32; 2],
    pub confidence: f32,
}

impl FaceDetection {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_corners(self.top_left, self.bottom_right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_convert_to_width_and_height() {
        let det = FaceDetection {
            top_left: [10.0, 20.0],
            bottom_right: [110.0, 140.0],
            confidence: 0.97,
        };
        let bbox = det.bounding_box();
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 100.0, 120.0));
        assert_eq!(bbox.right(), 110.0);
        assert_eq!(bbox.bottom(), 140.0);
        assert_eq!(bbox.max_side(), 120.0);
    }

    #[test]
    fn inverted_corners_clamp_to_empty_box() {
        let bbox = BoundingBox::from_corners([50.0, 50.0], [40.0, 45.0]);
        assert_eq!(bbox.width, 0.0);
        assert_eq!(bbox.height, 0.0);
    }
}
