//! Content inspection: MIME type by magic bytes, MD5 digests.
//!
//! Image signatures come from `image::guess_format`. Anything it does not
//! recognise is classified as empty, plain text (valid UTF-8, no NUL bytes)
//! or opaque binary.

use md5::{Digest, Md5};

pub const MIME_EMPTY: &str = "application/x-empty";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_BINARY: &str = "application/octet-stream";

/// Detect a MIME type from content.
pub fn sniff_mime(data: &[u8]) -> String {
    if data.is_empty() {
        return MIME_EMPTY.to_string();
    }
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type().to_string();
    }
    if !data.contains(&0) && std::str::from_utf8(data).is_ok() {
        return MIME_TEXT.to_string();
    }
    MIME_BINARY.to_string()
}

/// Lowercase hex MD5 of `data` (32 characters).
pub fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", Md5::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, png_bytes};

    #[test]
    fn sniffs_jpeg_and_png() {
        assert_eq!(sniff_mime(&jpeg_bytes(8, 8)), "image/jpeg");
        assert_eq!(sniff_mime(&png_bytes(8, 8)), "image/png");
    }

    #[test]
    fn sniffs_text() {
        assert_eq!(sniff_mime(b"hello world\n"), MIME_TEXT);
        assert_eq!(sniff_mime("naïve café".as_bytes()), MIME_TEXT);
    }

    #[test]
    fn sniffs_binary_and_empty() {
        assert_eq!(sniff_mime(&[0x00, 0xff, 0x13, 0x37]), MIME_BINARY);
        assert_eq!(sniff_mime(b""), MIME_EMPTY);
    }

    #[test]
    fn md5_known_vectors() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            md5_hex(b"The quick brown fox jumps over the lazy dog"),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }
}
