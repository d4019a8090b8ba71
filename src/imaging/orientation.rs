//! EXIF orientation correction.
//!
//! The tag itself is read by the decoder (`ImageDecoder::orientation`); this
//! module names the eight cases and applies the correction table to the
//! decoded image:
//!
//! | Tag | Name | Operation |
//! |---|---|---|
//! | 1 | top-left | none |
//! | 2 | top-right | horizontal flip |
//! | 3 | bottom-right | rotate 180° |
//! | 4 | bottom-left | rotate 180°, then flip |
//! | 5 | left-top | rotate 90°, then flip |
//! | 6 | right-top | rotate 90° |
//! | 7 | right-bottom | rotate -90°, then flip |
//! | 8 | left-bottom | rotate -90° |
//!
//! Rotations are clockwise; every flip is horizontal. Unknown tag values
//! decode as top-left.

use image::DynamicImage;
use image::metadata::Orientation as ExifOrientation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    LeftTop,
    RightTop,
    RightBottom,
    LeftBottom,
}

impl Orientation {
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Self::TopLeft => img,
            Self::TopRight => img.fliph(),
            Self::BottomRight => img.rotate180(),
            Self::BottomLeft => img.rotate180().fliph(),
            Self::LeftTop => img.rotate90().fliph(),
            Self::RightTop => img.rotate90(),
            Self::RightBottom => img.rotate270().fliph(),
            Self::LeftBottom => img.rotate270(),
        }
    }
}

impl From<ExifOrientation> for Orientation {
    fn from(value: ExifOrientation) -> Self {
        match value {
            ExifOrientation::NoTransforms => Self::TopLeft,
            ExifOrientation::FlipHorizontal => Self::TopRight,
            ExifOrientation::Rotate180 => Self::BottomRight,
            ExifOrientation::FlipVertical => Self::BottomLeft,
            ExifOrientation::Rotate90FlipH => Self::LeftTop,
            ExifOrientation::Rotate90 => Self::RightTop,
            ExifOrientation::Rotate270FlipH => Self::RightBottom,
            ExifOrientation::Rotate270 => Self::LeftBottom,
        }
    }
}
