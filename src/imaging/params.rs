//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`ImageAttributes`](crate::image::ImageAttributes)
//! (which decides the target box and policy) and the
//! [`backend`](super::backend) (which does the pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 85). Clamped on construction.
//! - [`ResizePolicy`]: best-fit (inside the box) or best-fill (crop to the box).
//! - [`OutputFormat`]: JPEG or PNG; the only formats resize accepts.
//! - [`TransformParams`]: everything one resize needs.

use image::ImageFormat;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// How the source is mapped onto the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Scale to fit inside the box, preserving aspect ratio.
    BestFit { do_not_enlarge: bool },
    /// Scale to cover the box, then center-crop to it exactly.
    BestFill,
}

impl ResizePolicy {
    pub fn new(best_fill: bool, do_not_enlarge: bool) -> Self {
        if best_fill {
            Self::BestFill
        } else {
            Self::BestFit { do_not_enlarge }
        }
    }
}

/// Formats the resize pipeline can re-encode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Parameters for one resize-and-re-encode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    pub width: u32,
    pub height: u32,
    pub policy: ResizePolicy,
    pub format: OutputFormat,
    /// Only used when `format` is JPEG.
    pub quality: Quality,
}
