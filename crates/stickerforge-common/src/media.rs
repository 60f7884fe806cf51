//! Resolved media payloads and MIME classification.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME type of the animated raster format accepted for transcoding.
pub const GIF_MIME: &str = "image/gif";

/// MIME type produced by the text compositor.
pub const PNG_MIME: &str = "image/png";

/// MIME type of animated stickers produced by the transcoder.
pub const WEBP_MIME: &str = "image/webp";

/// How the pipeline treats a given MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A static raster image (`image/*` other than GIF).
    Static,
    /// An animated raster image (GIF).
    Animated,
    /// Anything the pipeline cannot turn into a sticker.
    Other,
}

impl MediaKind {
    /// Classify a MIME type. Parameters and case are ignored.
    pub fn from_mime(mime: &str) -> Self {
        let mime = normalize_mime(mime);
        if mime == GIF_MIME {
            MediaKind::Animated
        } else if mime.starts_with("image/") && mime.len() > "image/".len() {
            MediaKind::Static
        } else {
            MediaKind::Other
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Animated => write!(f, "animated"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Lowercase a MIME value and strip any `; param=value` suffix.
pub fn normalize_mime(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// A resolved media payload.
///
/// Immutable once constructed; cloning is cheap because the payload is
/// reference counted.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaBlob {
    bytes: Bytes,
    mime_type: String,
    suggested_name: String,
}

impl MediaBlob {
    /// Create a blob. The MIME type is normalized.
    pub fn new(
        bytes: impl Into<Bytes>,
        mime_type: impl AsRef<str>,
        suggested_name: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: normalize_mime(mime_type.as_ref()),
            suggested_name: suggested_name.into(),
        }
    }

    /// Raw payload.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Normalized MIME type, e.g. `image/png`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File name to use when the payload is delivered or saved.
    pub fn suggested_name(&self) -> &str {
        &self.suggested_name
    }

    /// Pipeline classification of this blob's MIME type.
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime_type)
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for MediaBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaBlob")
            .field("mime_type", &self.mime_type)
            .field("suggested_name", &self.suggested_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
