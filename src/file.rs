//! File entities and their lazily derived attributes.
//!
//! A [`FileAttributes`] owns a [`ContentSource`] plus three derived values:
//! size, MIME type and MD5 hash. Each accessor returns the cached value when
//! there is one, and otherwise runs [`FileAttributes::update_attributes`],
//! which fills *every* unset field from a single read of the content.
//!
//! ## Cache lifecycle
//!
//! ```text
//! set_source(..) ──► all three unset
//!      │
//!      ▼
//! first accessor / before_save ──► fill unset fields ──► cached
//!      │
//!      ▼
//! later accessors ──► cached values, no I/O
//! ```
//!
//! Each field is guarded on its own, so a caller can pre-seed one value (say,
//! a hash already known from upload) and only the others are computed.
//!
//! ## Source variants
//!
//! | Source | length | MIME | hash |
//! |---|---|---|---|
//! | local / owned path | `fs::metadata` | sniffed from file bytes | MD5 of file bytes |
//! | stored blob | `Blob::size` | sniffed from buffer | MD5 of buffer |
//! | unfetched remote URL | unset | unset | unset |

use crate::config::FetchConfig;
use crate::id_generator::IdGenerator;
use crate::imaging::BackendError;
use crate::sniff::{md5_hex, sniff_mime};
use crate::source::{self, Blob, ContentSource, FetchError, Fetcher, HttpFetcher};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttributeError {
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(#[from] FetchError),
    #[error("Unsupported mime type: \"{0}\"")]
    UnsupportedFormat(String),
    #[error("Content at {0} has not been fetched")]
    Unfetched(String),
    #[error("Invalid resize target {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Shared capability of file-like entities.
///
/// Image entities embed a [`FileAttributes`] and expose it through
/// [`attributes`](Self::attributes) instead of inheriting from it, so the
/// file-level cache logic is written once.
pub trait DerivedAttributes {
    fn attributes(&self) -> &FileAttributes;

    fn attributes_mut(&mut self) -> &mut FileAttributes;

    /// Replace the content reference and invalidate everything derived from it.
    fn set_source(&mut self, source: ContentSource);

    /// Lifecycle hook run by the persistence layer before a write.
    fn before_save(&mut self) -> Result<(), AttributeError>;

    fn mime_type(&mut self) -> Result<Option<&str>, AttributeError> {
        self.attributes_mut().mime_type()
    }

    fn length(&mut self) -> Result<Option<u64>, AttributeError> {
        self.attributes_mut().length()
    }

    fn content_hash(&mut self) -> Result<Option<&str>, AttributeError> {
        self.attributes_mut().content_hash()
    }

    fn cleanup(&mut self) {
        self.attributes_mut().cleanup();
    }
}

/// Persisted shape of a file entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Option<String>,
    pub mime_type: Option<String>,
    pub length: Option<u64>,
    pub md5: Option<String>,
    pub temporary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A file entity with lazily cached size, MIME type and content hash.
#[derive(Debug)]
pub struct FileAttributes {
    id: Option<String>,
    source: ContentSource,
    mime_type: Option<String>,
    length: Option<u64>,
    content_hash: Option<String>,
    temporary: bool,
    temp_dir: Option<PathBuf>,
    generation: u64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl FileAttributes {
    pub fn new(source: impl Into<ContentSource>) -> Self {
        Self {
            id: None,
            source: source.into(),
            mime_type: None,
            length: None,
            content_hash: None,
            temporary: false,
            temp_dir: None,
            generation: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(ContentSource::Local(path.into()))
    }

    pub fn from_blob(blob: impl Blob + 'static) -> Self {
        Self::new(ContentSource::blob(blob))
    }

    /// Build from a string reference, fetching `http(s)://` URLs right away.
    ///
    /// A fetched body lands in an owned temporary file (at most
    /// `config.max_bytes` long) that becomes the content source. Anything
    /// else is taken as a local path.
    pub fn from_reference(
        reference: &str,
        fetcher: &dyn Fetcher,
        config: &FetchConfig,
    ) -> Result<Self, AttributeError> {
        let source = match ContentSource::from_reference(reference) {
            ContentSource::Remote(url) => {
                ContentSource::Owned(source::stage_remote(&url, fetcher, config)?)
            }
            other => other,
        };
        let mut file = Self::new(source);
        file.temp_dir = config.temp_dir.clone();
        Ok(file)
    }

    /// [`from_reference`](Self::from_reference) with an HTTP fetcher built from `config`.
    pub fn fetch(reference: &str, config: &FetchConfig) -> Result<Self, AttributeError> {
        let fetcher = HttpFetcher::new(config)?;
        Self::from_reference(reference, &fetcher, config)
    }

    /// Directory for temporaries staged later (e.g. copy-on-resize).
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<ContentSource>) {
        let previous = std::mem::replace(&mut self.source, source.into());
        release(previous);
        self.reset_attributes();
        self.generation += 1;
    }

    /// Bumped on every content reassignment. Owners caching their own
    /// derived values compare it to detect a source swapped underneath them.
    pub fn content_generation(&self) -> u64 {
        self.generation
    }

    fn reset_attributes(&mut self) {
        self.length = None;
        self.mime_type = None;
        self.content_hash = None;
    }

    /// Forget length and hash after the content was rewritten in place.
    pub(crate) fn reset_content_digest(&mut self) {
        self.length = None;
        self.content_hash = None;
    }

    /// Delete the owned temporary file, if any.
    ///
    /// The path is kept as a plain local reference. Calling this again, or on
    /// a source that was never owned, does nothing.
    pub fn cleanup(&mut self) {
        if !self.source.is_owned() {
            return;
        }
        let current = std::mem::replace(&mut self.source, ContentSource::Local(PathBuf::new()));
        self.source = match current {
            ContentSource::Owned(temp) => {
                let path = temp.to_path_buf();
                source::discard(temp);
                ContentSource::Local(path)
            }
            other => other,
        };
    }

    /// Fill every unset derived attribute from the current source.
    ///
    /// A missing local file is an error even when all values are cached. An
    /// unfetched remote reference leaves the fields untouched.
    pub fn update_attributes(&mut self) -> Result<(), AttributeError> {
        let needs_content = self.mime_type.is_none() || self.content_hash.is_none();

        match &self.source {
            ContentSource::Local(_) | ContentSource::Owned(_) => {
                let path = self.source.local_path().unwrap_or(Path::new(""));
                if !path.exists() {
                    return Err(AttributeError::SourceNotFound(path.to_path_buf()));
                }
                if self.length.is_none() {
                    self.length = Some(fs::metadata(path)?.len());
                }
                if needs_content {
                    let data = fs::read(path)?;
                    tracing::debug!(path = %path.display(), bytes = data.len(), "Computing file attributes");
                    fill_from_content(&mut self.mime_type, &mut self.content_hash, &data);
                }
            }
            ContentSource::Blob(blob) => {
                if self.length.is_none() {
                    self.length = Some(blob.size());
                }
                if needs_content {
                    let data = blob.bytes()?;
                    tracing::debug!(bytes = data.len(), "Computing blob attributes");
                    fill_from_content(&mut self.mime_type, &mut self.content_hash, &data);
                }
            }
            ContentSource::Remote(url) => {
                tracing::debug!(url = %url, "Remote content not fetched; attributes left unset");
            }
        }
        Ok(())
    }

    /// Lifecycle hook run before persistence.
    pub fn before_save(&mut self) -> Result<(), AttributeError> {
        self.update_attributes()?;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    pub fn mime_type(&mut self) -> Result<Option<&str>, AttributeError> {
        if self.mime_type.is_none() {
            self.update_attributes()?;
        }
        Ok(self.mime_type.as_deref())
    }

    pub fn length(&mut self) -> Result<Option<u64>, AttributeError> {
        if self.length.is_none() {
            self.update_attributes()?;
        }
        Ok(self.length)
    }

    /// Hex MD5 of the content.
    pub fn content_hash(&mut self) -> Result<Option<&str>, AttributeError> {
        if self.content_hash.is_none() {
            self.update_attributes()?;
        }
        Ok(self.content_hash.as_deref())
    }

    /// Cached values without triggering computation.
    pub fn cached_mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn cached_length(&self) -> Option<u64> {
        self.length
    }

    pub fn cached_content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    pub fn set_mime_type(&mut self, mime_type: impl Into<String>) {
        self.mime_type = Some(mime_type.into());
    }

    pub fn set_length(&mut self, length: u64) {
        self.length = Some(length);
    }

    pub fn set_content_hash(&mut self, hash: impl Into<String>) {
        self.content_hash = Some(hash.into());
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Assign a primary key from `generator` unless one is already set.
    pub fn assign_id(&mut self, generator: &dyn IdGenerator) -> &str {
        self.id.get_or_insert_with(|| generator.generate())
    }

    /// Whether the stored record itself is provisional.
    pub fn temporary(&self) -> bool {
        self.temporary
    }

    pub fn set_temporary(&mut self, temporary: bool) {
        self.temporary = temporary;
    }

    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Run the before-save hook and snapshot the persisted fields.
    pub fn to_record(&mut self) -> Result<FileRecord, AttributeError> {
        self.before_save()?;
        Ok(self.record())
    }

    pub(crate) fn record(&self) -> FileRecord {
        FileRecord {
            id: self.id.clone(),
            mime_type: self.mime_type.clone(),
            length: self.length,
            md5: self.content_hash.clone(),
            temporary: self.temporary,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Full content of the current source.
    pub fn read_content(&self) -> Result<Vec<u8>, AttributeError> {
        match &self.source {
            ContentSource::Local(_) | ContentSource::Owned(_) => {
                let path = self.source.local_path().unwrap_or(Path::new(""));
                if !path.exists() {
                    return Err(AttributeError::SourceNotFound(path.to_path_buf()));
                }
                Ok(fs::read(path)?)
            }
            ContentSource::Blob(blob) => Ok(blob.bytes()?),
            ContentSource::Remote(url) => Err(AttributeError::Unfetched(url.clone())),
        }
    }

    /// Overwrite the content in place: the local file or the blob's bytes.
    pub(crate) fn write_content(&mut self, bytes: Vec<u8>) -> Result<(), AttributeError> {
        match &mut self.source {
            ContentSource::Local(path) => fs::write(path, bytes)?,
            ContentSource::Owned(temp) => fs::write(&**temp, bytes)?,
            ContentSource::Blob(blob) => blob.set_bytes(bytes)?,
            ContentSource::Remote(url) => return Err(AttributeError::Unfetched(url.clone())),
        }
        Ok(())
    }

    /// Swap an unowned local source for an owned temporary copy of it.
    ///
    /// The copy has identical content, so cached attributes stay valid.
    /// Other sources, including already-owned files, are left alone.
    pub(crate) fn stage_copy(&mut self) -> Result<(), AttributeError> {
        let ContentSource::Local(path) = &self.source else {
            return Ok(());
        };
        let temp = source::stage_copy(path, self.temp_dir.as_deref())?;
        let previous = std::mem::replace(&mut self.source, ContentSource::Owned(temp));
        release(previous);
        Ok(())
    }
}

impl Drop for FileAttributes {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl DerivedAttributes for FileAttributes {
    fn attributes(&self) -> &FileAttributes {
        self
    }

    fn attributes_mut(&mut self) -> &mut FileAttributes {
        self
    }

    fn set_source(&mut self, source: ContentSource) {
        FileAttributes::set_source(self, source);
    }

    fn before_save(&mut self) -> Result<(), AttributeError> {
        FileAttributes::before_save(self)
    }
}

fn fill_from_content(mime_type: &mut Option<String>, hash: &mut Option<String>, data: &[u8]) {
    if mime_type.is_none() {
        *mime_type = Some(sniff_mime(data));
    }
    if hash.is_none() {
        *hash = Some(md5_hex(data));
    }
}

/// Dispose of a superseded source, deleting it if it was owned.
fn release(previous: ContentSource) {
    if let ContentSource::Owned(temp) = previous {
        source::discard(temp);
    }
}
