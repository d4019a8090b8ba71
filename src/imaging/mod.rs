//! Image engine: identify, resize, orient, re-encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **EXIF orientation** | `ImageDecoder::orientation` + rotate/flip table |
//! | **Best-fit** | aspect-preserving `resize_exact`, optional no-enlarge clamp |
//! | **Best-fill** | `resize_exact` to cover + centered `crop_imm` |
//! | **Re-encode** | JPEG (configurable quality) or PNG, no metadata |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for resize geometry (unit testable)
//! - **Parameters**: Data structures describing a transform
//! - **Orientation**: the EXIF correction table
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod calculations;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, Encoded, ImageBackend};
pub use orientation::Orientation;
pub use params::{OutputFormat, Quality, ResizePolicy, TransformParams};
pub use rust_backend::RustBackend;
