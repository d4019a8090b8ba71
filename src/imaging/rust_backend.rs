//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::with_guessed_format` + `into_dimensions` (header only) |
//! | Decode + EXIF | `ImageDecoder::orientation` + `DynamicImage::from_decoder` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Orientation | [`Orientation::apply`] (rotate / flip) |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` |
//!
//! Metadata stripping falls out of the decode/encode round trip: a decoded
//! `DynamicImage` holds pixels only, and the encoders are never handed EXIF
//! or ICC data, so the output carries no profiles.

use super::backend::{BackendError, Dimensions, Encoded, ImageBackend};
use super::calculations::{fill_plan, fit_bounds, fit_dimensions};
use super::orientation::Orientation;
use super::params::{OutputFormat, Quality, ResizePolicy, TransformParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Decode an image along with its EXIF orientation.
fn decode(data: &[u8]) -> Result<(DynamicImage, Orientation), BackendError> {
    let mut decoder = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_decoder()?;
    let orientation = Orientation::from(decoder.orientation()?);
    let img = DynamicImage::from_decoder(decoder)?;
    Ok((img, orientation))
}

fn resize(img: DynamicImage, params: &TransformParams) -> DynamicImage {
    let source = (img.width(), img.height());
    let target = (params.width, params.height);

    match params.policy {
        ResizePolicy::BestFill => {
            let plan = fill_plan(source, target);
            let (x, y) = plan.offset;
            let (w, h) = plan.crop;
            img.resize_exact(plan.scaled.0, plan.scaled.1, FilterType::Lanczos3)
                .crop_imm(x, y, w, h)
        }
        ResizePolicy::BestFit { do_not_enlarge } => {
            let (w, h) = fit_dimensions(source, fit_bounds(source, target, do_not_enlarge));
            if (w, h) == source {
                img
            } else {
                img.resize_exact(w, h, FilterType::Lanczos3)
            }
        }
    }
}

/// Encode to an in-memory buffer in the requested format.
fn encode(img: &DynamicImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
            rgb.write_with_encoder(encoder)?;
        }
        OutputFormat::Png => {
            let encoder = PngEncoder::new(&mut buf);
            img.write_with_encoder(encoder)?;
        }
    }
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let dims = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(dims.into())
    }

    /// Header-only read; the format comes from the content, not the extension.
    fn identify_path(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let dims = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(dims.into())
    }

    fn transform(&self, data: &[u8], params: &TransformParams) -> Result<Encoded, BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ProcessingFailed(format!(
                "Invalid target {}x{}",
                params.width, params.height
            )));
        }

        let (img, orientation) = decode(data)?;
        let resized = resize(img, params);
        let oriented = orientation.apply(resized);
        let bytes = encode(&oriented, params.format, params.quality)?;

        Ok(Encoded {
            bytes,
            dimensions: Dimensions {
                width: oriented.width(),
                height: oriented.height(),
            },
        })
    }
}
