//! Shared test utilities for the mediadoc test suite.
//!
//! Synthetic images are generated in memory so no binary fixtures are
//! needed. The fetchers and blobs here stand in for network and storage
//! without touching either.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let data = jpeg_bytes(1000, 500);
//! let fetcher = StaticFetcher::new(data);
//! let file = FileAttributes::from_reference("https://x.test/a.jpg", &fetcher, &config)?;
//! assert_eq!(fetcher.calls(), 1);
//! ```

use crate::source::{Blob, FetchError, Fetcher};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use std::cell::Cell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode a gradient JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a gradient PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a half-transparent RGBA PNG.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        image::Rgba([200, 40, 40, if x % 2 == 0 { 255 } else { 64 }])
    });
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    buf
}

/// Write a gradient JPEG to `path`.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// APP1 segment: `Exif\0\0`, big-endian TIFF header, IFD0 with a single
/// orientation entry. Byte 29 holds the tag value.
const EXIF_APP1: [u8; 36] = [
    0xFF, 0xE1, 0x00, 0x22, b'E', b'x', b'i', b'f', 0, 0, //
    b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, //
    0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, //
    0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Gradient JPEG tagged with the given EXIF orientation.
pub fn jpeg_with_orientation(width: u32, height: u32, value: u8) -> Vec<u8> {
    let jpeg = jpeg_bytes(width, height);
    let mut segment = EXIF_APP1;
    segment[29] = value;

    // SOI, then the APP1 segment ahead of everything the encoder wrote
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Names of the entries directly under `dir`.
pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

// =========================================================================
// Fetchers
// =========================================================================

/// Fetcher that serves the same body for every URL and counts calls.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    body: Vec<u8>,
    calls: Cell<usize>,
}

impl StaticFetcher {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, _url: &str, limit: u64, sink: &mut dyn Write) -> Result<u64, FetchError> {
        self.calls.set(self.calls.get() + 1);
        let end = self.body.len().min(limit as usize);
        sink.write_all(&self.body[..end])?;
        Ok(end as u64)
    }
}

/// Fetcher whose connection always fails after writing a few bytes.
#[derive(Debug, Default)]
pub struct FailingFetcher;

impl Fetcher for FailingFetcher {
    fn fetch(&self, _url: &str, _limit: u64, sink: &mut dyn Write) -> Result<u64, FetchError> {
        sink.write_all(b"partial")?;
        Err(FetchError::Io(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        )))
    }
}

/// Fetcher whose server answers every request with an error status.
#[derive(Debug)]
pub struct StatusFetcher(pub u16);

impl Fetcher for StatusFetcher {
    fn fetch(&self, url: &str, _limit: u64, _sink: &mut dyn Write) -> Result<u64, FetchError> {
        Err(FetchError::Status {
            url: url.to_string(),
            status: self.0,
        })
    }
}

// =========================================================================
// Blobs
// =========================================================================

/// In-memory blob that counts full-content reads.
#[derive(Debug)]
pub struct CountingBlob {
    data: Vec<u8>,
    reads: Rc<Cell<usize>>,
}

impl CountingBlob {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            reads: Rc::new(Cell::new(0)),
        }
    }

    /// Shared counter that stays readable after the blob is moved away.
    pub fn reads(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.reads)
    }
}

impl Blob for CountingBlob {
    fn bytes(&self) -> io::Result<Vec<u8>> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.data.clone())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn set_bytes(&mut self, bytes: Vec<u8>) -> io::Result<()> {
        self.data = bytes;
        Ok(())
    }
}
