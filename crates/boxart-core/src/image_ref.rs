//! Image source references - remote URLs, local paths, and embedded `data:` URLs
//!
//! Uploaded files are stored in records as base64 `data:` URLs so a saved
//! record is self-contained.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageRefError {
    #[error("Malformed data URL: {0}")]
    MalformedDataUrl(String),
    #[error("Unsupported data URL encoding (only base64 is supported)")]
    UnsupportedEncoding,
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Which image slot of a box a source belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Front,
    Back,
    Spine,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 3] = [ImageSlot::Front, ImageSlot::Back, ImageSlot::Spine];

    pub fn label(&self) -> &'static str {
        match self {
            ImageSlot::Front => "Front",
            ImageSlot::Back => "Back",
            ImageSlot::Spine => "Spine",
        }
    }
}

/// A parsed image source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    /// No image assigned
    Empty,
    /// `http://` or `https://` URL
    Remote(String),
    /// Anything else: a path relative to the asset root or the filesystem
    Local(String),
    /// Decoded `data:` URL payload
    Embedded { mime: String, bytes: Vec<u8> },
}

impl ImageRef {
    pub fn parse(source: &str) -> Result<Self, ImageRefError> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(ImageRef::Empty);
        }
        if let Some(rest) = source.strip_prefix("data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| ImageRefError::MalformedDataUrl(truncate(source)))?;
            let mut parts = header.split(';');
            let mime = parts.next().unwrap_or_default();
            if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
                return Err(ImageRefError::UnsupportedEncoding);
            }
            let bytes = STANDARD.decode(payload.trim())?;
            let mime = if mime.is_empty() { "application/octet-stream" } else { mime };
            return Ok(ImageRef::Embedded {
                mime: mime.to_string(),
                bytes,
            });
        }
        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(ImageRef::Remote(source.to_string()))
        } else {
            Ok(ImageRef::Local(source.to_string()))
        }
    }
}

/// Encode raw file content as a base64 `data:` URL
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Best-effort MIME type from a file name, for uploads without one
pub fn guess_mime(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Short form of a source for log lines (data URLs can be megabytes)
pub fn describe_source(source: &str) -> String {
    truncate(source)
}

fn truncate(source: &str) -> String {
    const MAX: usize = 64;
    if source.len() <= MAX {
        return source.to_string();
    }
    let mut end = MAX;
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}… ({} bytes)", &source[..end], source.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!(ImageRef::parse("  ").unwrap(), ImageRef::Empty);
        assert_eq!(
            ImageRef::parse("https://example.com/a.png").unwrap(),
            ImageRef::Remote("https://example.com/a.png".to_string())
        );
        assert_eq!(
            ImageRef::parse("art/front.jpg").unwrap(),
            ImageRef::Local("art/front.jpg".to_string())
        );
    }

    #[test]
    fn test_data_url_roundtrip() {
        let url = encode_data_url("image/png", &[1, 2, 3, 250]);
        assert!(url.starts_with("data:image/png;base64,"));
        match ImageRef::parse(&url).unwrap() {
            ImageRef::Embedded { mime, bytes } => {
                assert_eq!(mime, "image/png");
                assert_eq!(bytes, vec![1, 2, 3, 250]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_data_urls() {
        assert!(matches!(
            ImageRef::parse("data:image/png;base64"),
            Err(ImageRefError::MalformedDataUrl(_))
        ));
        assert!(matches!(
            ImageRef::parse("data:text/plain,hello"),
            Err(ImageRefError::UnsupportedEncoding)
        ));
        assert!(matches!(
            ImageRef::parse("data:image/png;base64,!!!"),
            Err(ImageRefError::Base64(_))
        ));
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("cover.JPG"), "image/jpeg");
        assert_eq!(guess_mime("spine.webp"), "image/webp");
        assert_eq!(guess_mime("README"), "application/octet-stream");
    }

    #[test]
    fn test_describe_source_truncates() {
        let long = format!("data:image/png;base64,{}", "A".repeat(500));
        let short = describe_source(&long);
        assert!(short.len() < 100);
        assert!(short.contains("bytes"));
    }
}
