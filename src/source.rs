//! Content references and how they become readable bytes.
//!
//! A [`ContentSource`] is exactly one of:
//!
//! | Variant | Meaning |
//! |---|---|
//! | `Local` | a path we read but never delete |
//! | `Owned` | a temporary file this crate created and must delete |
//! | `Remote` | an `http(s)://` URL that has not been fetched |
//! | `Blob` | a stored object handed out by a [`Blob`] store |
//!
//! Ownership is carried by the variant itself: an `Owned` source holds a
//! [`TempPath`], so dropping or replacing it removes the file.

use crate::config::FetchConfig;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use thiserror::Error;

const TEMP_PREFIX: &str = "mediadoc-";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("No content received from {0}")]
    Empty(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A stored binary object, e.g. a GridFS-style file handle.
pub trait Blob: fmt::Debug {
    /// Full content of the object.
    fn bytes(&self) -> io::Result<Vec<u8>>;

    /// Size in bytes as reported by the store.
    fn size(&self) -> u64;

    /// Replace the content of the existing object.
    fn set_bytes(&mut self, bytes: Vec<u8>) -> io::Result<()>;
}

/// In-memory [`Blob`], useful for stores that hand back buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryBlob {
    data: Vec<u8>,
}

impl MemoryBlob {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Blob for MemoryBlob {
    fn bytes(&self) -> io::Result<Vec<u8>> {
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

/// Where the content of a file entity currently lives.
#[derive(Debug)]
pub enum ContentSource {
    Local(PathBuf),
    Owned(TempPath),
    Remote(String),
    Blob(Box<dyn Blob>),
}

impl ContentSource {
    /// Classify a string reference: `http://` and `https://` become
    /// [`Remote`](Self::Remote), anything else is a local path.
    pub fn from_reference(reference: &str) -> Self {
        if is_remote_reference(reference) {
            Self::Remote(reference.to_string())
        } else {
            Self::Local(PathBuf::from(reference))
        }
    }

    pub fn blob(blob: impl Blob + 'static) -> Self {
        Self::Blob(Box::new(blob))
    }

    /// Filesystem path for `Local` and `Owned` sources.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Self::Local(path) => Some(path.as_path()),
            Self::Owned(temp) => Some(&**temp),
            Self::Remote(_) | Self::Blob(_) => None,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    pub fn as_blob(&self) -> Option<&dyn Blob> {
        match self {
            Self::Blob(blob) => Some(blob.as_ref()),
            _ => None,
        }
    }
}

impl From<PathBuf> for ContentSource {
    fn from(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

impl From<&Path> for ContentSource {
    fn from(path: &Path) -> Self {
        Self::Local(path.to_path_buf())
    }
}

/// True when the reference is an `http://` or `https://` URL.
pub fn is_remote_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Downloads remote content into a writer.
pub trait Fetcher {
    /// Copy at most `limit` bytes of the body at `url` into `sink`,
    /// returning the number of bytes written.
    fn fetch(&self, url: &str, limit: u64, sink: &mut dyn Write) -> Result<u64, FetchError>;
}

/// [`Fetcher`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, limit: u64, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let mut body = response.take(limit);
        Ok(io::copy(&mut body, sink)?)
    }
}

fn new_temp_file(temp_dir: Option<&Path>) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_PREFIX);
    match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
}

/// Delete a temporary file, logging instead of failing.
pub(crate) fn discard(temp: TempPath) {
    let path = temp.to_path_buf();
    if let Err(err) = temp.close() {
        tracing::warn!(path = %path.display(), error = %err, "Failed to remove temporary file");
    }
}

/// Fetch `url` into a new owned temporary file.
///
/// On any failure, including a body of zero bytes, the partially written
/// file is removed before the error is returned.
pub fn stage_remote(
    url: &str,
    fetcher: &dyn Fetcher,
    config: &FetchConfig,
) -> Result<TempPath, FetchError> {
    let mut file = new_temp_file(config.temp_dir.as_deref())?;

    let result = fetcher
        .fetch(url, config.max_bytes, file.as_file_mut())
        .and_then(|written| {
            file.as_file_mut().flush()?;
            Ok(written)
        });

    match result {
        Ok(0) => {
            discard(file.into_temp_path());
            Err(FetchError::Empty(url.to_string()))
        }
        Ok(written) => {
            tracing::debug!(url, bytes = written, path = %file.path().display(), "Fetched remote content");
            Ok(file.into_temp_path())
        }
        Err(err) => {
            discard(file.into_temp_path());
            Err(err)
        }
    }
}

/// Copy a local file into a new owned temporary file.
pub fn stage_copy(source: &Path, temp_dir: Option<&Path>) -> io::Result<TempPath> {
    let file = new_temp_file(temp_dir)?;
    let temp = file.into_temp_path();
    std::fs::copy(source, &temp)?;
    tracing::debug!(from = %source.display(), to = %temp.display(), "Staged working copy");
    Ok(temp)
}
