//! Image entities: file attributes plus cached dimensions and resize.
//!
//! [`ImageAttributes`] embeds a [`FileAttributes`] and adds `width`/`height`,
//! computed together by the first accessor that needs them and cached until
//! the content changes.
//!
//! ## Resize pipeline
//!
//! ```text
//! validate target ──► source exists? ──► MIME is JPEG/PNG?
//!        │
//!        ▼
//! copy_on_resize? ──► stage owned temp copy (original untouched)
//!        │
//!        ▼
//! read bytes ──► backend: decode → fit/fill → orient → re-encode
//!        │
//!        ▼
//! write back (file or blob) ──► reset length/hash ──► overwrite width/height
//! ```
//!
//! Every check runs before the first mutation, so a rejected resize leaves the
//! entity and its content exactly as they were.

use crate::config::{FetchConfig, ImagesConfig};
use crate::file::{AttributeError, DerivedAttributes, FileAttributes, FileRecord};
use crate::imaging::{
    Dimensions, ImageBackend, OutputFormat, Quality, ResizePolicy, RustBackend, TransformParams,
};
use crate::source::{Blob, ContentSource, Fetcher};
use serde::Serialize;
use std::path::PathBuf;

/// Persisted shape of an image entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    #[serde(flatten)]
    pub file: FileRecord,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A file entity that is an image.
///
/// Transform parameters (`jpeg_quality`, `copy_on_resize`, `do_not_enlarge`,
/// `best_fill`) are settings of this instance only and are not persisted.
#[derive(Debug)]
pub struct ImageAttributes<B: ImageBackend = RustBackend> {
    file: FileAttributes,
    width: Option<u32>,
    height: Option<u32>,
    /// Content generation the cached dimensions were read from.
    generation: u64,
    jpeg_quality: Quality,
    copy_on_resize: bool,
    do_not_enlarge: bool,
    best_fill: bool,
    backend: B,
}

impl ImageAttributes<RustBackend> {
    pub fn new(source: impl Into<ContentSource>) -> Self {
        Self::with_backend(FileAttributes::new(source), RustBackend::new())
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_backend(FileAttributes::from_path(path), RustBackend::new())
    }

    pub fn from_blob(blob: impl Blob + 'static) -> Self {
        Self::with_backend(FileAttributes::from_blob(blob), RustBackend::new())
    }

    /// See [`FileAttributes::from_reference`].
    pub fn from_reference(
        reference: &str,
        fetcher: &dyn Fetcher,
        config: &FetchConfig,
    ) -> Result<Self, AttributeError> {
        let file = FileAttributes::from_reference(reference, fetcher, config)?;
        Ok(Self::with_backend(file, RustBackend::new()))
    }
}

impl<B: ImageBackend> ImageAttributes<B> {
    pub fn with_backend(file: FileAttributes, backend: B) -> Self {
        let defaults = ImagesConfig::default();
        let generation = file.content_generation();
        Self {
            file,
            width: None,
            height: None,
            generation,
            jpeg_quality: Quality::new(defaults.jpeg_quality),
            copy_on_resize: defaults.copy_on_resize,
            do_not_enlarge: defaults.do_not_enlarge,
            best_fill: defaults.best_fill,
            backend,
        }
    }

    /// Apply transform defaults from configuration.
    pub fn with_config(mut self, config: &ImagesConfig) -> Self {
        self.jpeg_quality = Quality::new(config.jpeg_quality);
        self.copy_on_resize = config.copy_on_resize;
        self.do_not_enlarge = config.do_not_enlarge;
        self.best_fill = config.best_fill;
        self
    }

    pub fn file(&self) -> &FileAttributes {
        &self.file
    }

    /// Mutable access to the embedded file. Reassigning its content here
    /// also invalidates the cached dimensions.
    pub fn file_mut(&mut self) -> &mut FileAttributes {
        &mut self.file
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn set_source(&mut self, source: impl Into<ContentSource>) {
        self.file.set_source(source);
        self.sync_dimensions();
    }

    /// Drop cached dimensions that belong to replaced content.
    fn sync_dimensions(&mut self) {
        let generation = self.file.content_generation();
        if self.generation != generation {
            self.width = None;
            self.height = None;
            self.generation = generation;
        }
    }

    fn current(&self, value: Option<u32>) -> Option<u32> {
        value.filter(|_| self.generation == self.file.content_generation())
    }

    /// Read width and height from the content if either is unset.
    ///
    /// Local files are identified from their header. Unfetched remote
    /// references leave both unset.
    pub fn update_dimensions(&mut self) -> Result<(), AttributeError> {
        self.sync_dimensions();
        if self.width.is_some() && self.height.is_some() {
            return Ok(());
        }

        let dims = match self.file.source() {
            ContentSource::Local(_) | ContentSource::Owned(_) => {
                let Some(path) = self.file.source().local_path() else {
                    return Ok(());
                };
                if !path.exists() {
                    return Err(AttributeError::SourceNotFound(path.to_path_buf()));
                }
                self.backend.identify_path(path)?
            }
            ContentSource::Blob(blob) => self.backend.identify(&blob.bytes()?)?,
            ContentSource::Remote(url) => {
                tracing::debug!(url = %url, "Remote content not fetched; dimensions left unset");
                return Ok(());
            }
        };

        tracing::debug!(width = dims.width, height = dims.height, "Computed image dimensions");
        self.width.get_or_insert(dims.width);
        self.height.get_or_insert(dims.height);
        Ok(())
    }

    pub fn width(&mut self) -> Result<Option<u32>, AttributeError> {
        self.sync_dimensions();
        if self.width.is_none() {
            self.update_dimensions()?;
        }
        Ok(self.width)
    }

    pub fn height(&mut self) -> Result<Option<u32>, AttributeError> {
        self.sync_dimensions();
        if self.height.is_none() {
            self.update_dimensions()?;
        }
        Ok(self.height)
    }

    pub fn cached_width(&self) -> Option<u32> {
        self.current(self.width)
    }

    pub fn cached_height(&self) -> Option<u32> {
        self.current(self.height)
    }

    pub fn set_width(&mut self, width: u32) {
        self.sync_dimensions();
        self.width = Some(width);
    }

    pub fn set_height(&mut self, height: u32) {
        self.sync_dimensions();
        self.height = Some(height);
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality.value()
    }

    /// Clamped to 1..=100.
    pub fn set_jpeg_quality(&mut self, quality: u8) {
        self.jpeg_quality = Quality::new(quality);
    }

    pub fn copy_on_resize(&self) -> bool {
        self.copy_on_resize
    }

    pub fn set_copy_on_resize(&mut self, copy_on_resize: bool) {
        self.copy_on_resize = copy_on_resize;
    }

    pub fn do_not_enlarge(&self) -> bool {
        self.do_not_enlarge
    }

    pub fn set_do_not_enlarge(&mut self, do_not_enlarge: bool) {
        self.do_not_enlarge = do_not_enlarge;
    }

    pub fn best_fill(&self) -> bool {
        self.best_fill
    }

    pub fn set_best_fill(&mut self, best_fill: bool) {
        self.best_fill = best_fill;
    }

    pub fn resize_policy(&self) -> ResizePolicy {
        ResizePolicy::new(self.best_fill, self.do_not_enlarge)
    }

    /// Resize the content in place and return the new dimensions.
    ///
    /// With `copy_on_resize` set, a local source is first replaced by an
    /// owned temporary copy and only the copy is rewritten.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Dimensions, AttributeError> {
        if width == 0 || height == 0 {
            return Err(AttributeError::InvalidTarget { width, height });
        }
        self.sync_dimensions();
        match self.file.source() {
            ContentSource::Remote(url) => return Err(AttributeError::Unfetched(url.clone())),
            source => {
                if let Some(path) = source.local_path().filter(|p| !p.exists()) {
                    return Err(AttributeError::SourceNotFound(path.to_path_buf()));
                }
            }
        }

        let mime = self.file.mime_type()?.unwrap_or_default().to_string();
        let format =
            OutputFormat::from_mime(&mime).ok_or(AttributeError::UnsupportedFormat(mime))?;

        if self.copy_on_resize {
            self.file.stage_copy()?;
        }

        let data = self.file.read_content()?;
        let params = TransformParams {
            width,
            height,
            policy: self.resize_policy(),
            format,
            quality: self.jpeg_quality,
        };
        let encoded = self.backend.transform(&data, &params)?;
        tracing::debug!(
            target_width = width,
            target_height = height,
            width = encoded.dimensions.width,
            height = encoded.dimensions.height,
            format = format.mime_type(),
            bytes = encoded.bytes.len(),
            "Resized image"
        );

        self.file.write_content(encoded.bytes)?;
        self.file.reset_content_digest();
        self.width = Some(encoded.dimensions.width);
        self.height = Some(encoded.dimensions.height);
        Ok(encoded.dimensions)
    }

    /// File attributes first, then dimensions.
    pub fn before_save(&mut self) -> Result<(), AttributeError> {
        self.file.before_save()?;
        self.update_dimensions()
    }

    pub fn to_record(&mut self) -> Result<ImageRecord, AttributeError> {
        self.before_save()?;
        Ok(ImageRecord {
            file: self.file.record(),
            width: self.cached_width(),
            height: self.cached_height(),
        })
    }
}

impl<B: ImageBackend> DerivedAttributes for ImageAttributes<B> {
    fn attributes(&self) -> &FileAttributes {
        &self.file
    }

    fn attributes_mut(&mut self) -> &mut FileAttributes {
        &mut self.file
    }

    fn set_source(&mut self, source: ContentSource) {
        ImageAttributes::set_source(self, source);
    }

    fn before_save(&mut self) -> Result<(), AttributeError> {
        ImageAttributes::before_save(self)
    }
}
