use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Result, TryOnError};

/// A user-supplied photo (person or garment) ready for encoding.
///
/// Holds the raw bytes and a MIME type; immutable once constructed.
#[derive(Debug, Clone)]
pub struct ImageInput {
    bytes: Vec<u8>,
    mime: String,
}

impl ImageInput {
    /// Create an image input from raw bytes and a MIME type
    /// (e.g. `image/jpeg`). Empty byte slices are rejected.
    pub fn from_bytes(bytes: Vec<u8>, mime: impl Into<String>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(TryOnError::InvalidInput("image is empty".into()));
        }
        Ok(Self {
            bytes,
            mime: mime.into(),
        })
    }

    /// Read an image from disk, guessing the MIME type from the extension.
    /// Unrecognized extensions fall back to `image/jpeg`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            TryOnError::Encoding(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_bytes(bytes, mime_for_extension(path))
    }

    /// The MIME type of this image.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Size of the raw image in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: empty inputs are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64-encode this image for transmission.
    pub fn encode(&self) -> EncodedImage {
        EncodedImage {
            base64: STANDARD.encode(&self.bytes),
            mime: self.mime.clone(),
        }
    }
}

fn mime_for_extension(path: &Path) -> String {
    let subtype = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "png",
        Some("webp") => "webp",
        Some("gif") => "gif",
        _ => "jpeg",
    };
    format!("image/{}", subtype)
}

/// Base64 representation of an [`ImageInput`].
///
/// Stores the bare payload internally; [`EncodedImage::to_data_uri`]
/// produces the `data:image/<subtype>;base64,` form when the wire format
/// calls for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    base64: String,
    mime: String,
}

impl EncodedImage {
    /// Wrap an existing base64 payload. Strings already carrying a
    /// `data:` prefix are parsed rather than double-wrapped.
    pub fn from_base64(payload: impl Into<String>, mime: impl Into<String>) -> Result<Self> {
        let payload = payload.into();
        if payload.starts_with("data:") {
            return Self::from_data_uri(&payload);
        }
        Ok(Self {
            base64: payload,
            mime: mime.into(),
        })
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| TryOnError::Encoding("not a data URI".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| TryOnError::Encoding("data URI has no payload".into()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| TryOnError::Encoding("data URI is not base64-encoded".into()))?;
        Ok(Self {
            base64: payload.to_string(),
            mime: mime.to_string(),
        })
    }

    /// The bare base64 payload, without any URI prefix.
    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    /// The MIME type recorded at encode time.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Render as a `data:<mime>;base64,<payload>` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }

    /// Decode back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.base64)
            .map_err(|e| TryOnError::Encoding(format!("invalid base64 payload: {}", e)))
    }
}
