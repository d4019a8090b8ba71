//! # mediadoc
//!
//! Attribute layer for stored documents that carry binary content: files and
//! images whose MIME type, size, MD5 hash and pixel dimensions are derived
//! from the content itself, plus readable slugs and random primary keys for
//! the records that hold them.
//!
//! # Architecture
//!
//! ```text
//! reference ──► ContentSource ──► FileAttributes ──► ImageAttributes
//!  (path/url/blob)   (source)        (file)             (image)
//!                                      │                   │
//!                                 sniff + md5        imaging backend
//! ```
//!
//! Derived values are computed lazily, cached on the entity, and dropped the
//! moment its content is reassigned. A persistence layer drives the rest
//! through `before_save`, `update_readable_id` and an [`id_generator::IdGenerator`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Content references, blob store seam, bounded remote fetch into owned temp files |
//! | [`sniff`] | MIME detection from magic bytes and MD5 hex digests |
//! | [`file`] | `FileAttributes`: lazily cached length, MIME type and hash |
//! | [`image`](crate::image) | `ImageAttributes`: cached dimensions and the resize pipeline |
//! | [`imaging`] | Pure-Rust image engine: fit/fill geometry, EXIF orientation, re-encode |
//! | [`readable_id`] | Slug normalization and three-phase collision resolution |
//! | [`id_generator`] | Random string primary keys of a given bit strength |
//! | [`config`] | `mediadoc.toml` loading and validation |
//!
//! # Design Decisions
//!
//! ## Composition Over Inheritance
//!
//! An image is a file with extra attributes. [`ImageAttributes`](crate::image::ImageAttributes) embeds
//! a [`file::FileAttributes`] and both implement [`file::DerivedAttributes`],
//! so the cache invalidation rules live in one place.
//!
//! ## Ownership in the Type
//!
//! A fetched remote body lands in a temporary file that the entity owns. That
//! ownership is the `Owned` variant of [`source::ContentSource`], holding a
//! [`tempfile::TempPath`]: replacing the source or dropping the entity deletes
//! the file, with no flag to fall out of sync.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decode, Lanczos3
//! resampling and JPEG/PNG encoding. No system libraries are required.
//!
//! ## Injected Randomness
//!
//! Slug suffixes and primary keys draw from a caller-supplied `rand` generator
//! when determinism matters (`create_readable_id_with`, `generate_with`), and
//! from the thread-local generator otherwise.

pub mod config;
pub mod file;
pub mod id_generator;
pub mod image;
pub mod imaging;
pub mod readable_id;
pub mod sniff;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
