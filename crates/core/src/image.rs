//! Image payloads.
//!
//! Two shapes exist: [`ImageUpload`] is the raw file staged in a form and sent
//! as the multipart `image` part; [`InlineImage`] is the displayable `data:`
//! URI the local collection stores after transcoding server bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use crate::types::FALLBACK_CONTENT_TYPE;

/// Image encoded as a `data:<type>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    content_type: String,
    data_uri: String,
}

impl InlineImage {
    /// Transcode raw bytes into an inline URI.
    ///
    /// A missing or blank content type falls back to
    /// [`FALLBACK_CONTENT_TYPE`].
    pub fn from_bytes(content_type: Option<&str>, bytes: &[u8]) -> Self {
        let content_type = match content_type.map(str::trim) {
            Some(ct) if !ct.is_empty() => ct.to_string(),
            _ => FALLBACK_CONTENT_TYPE.to_string(),
        };
        let data_uri = format!("data:{content_type};base64,{}", BASE64.encode(bytes));
        Self {
            content_type,
            data_uri,
        }
    }

    /// Accept an already-inline URI as served by some backends.
    ///
    /// Returns `None` if `uri` is not a base64 `data:` URI.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (content_type, _payload) = rest.split_once(";base64,")?;
        Some(Self {
            content_type: content_type.to_string(),
            data_uri: uri.to_string(),
        })
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn as_data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Decode the payload back to bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let payload = self
            .data_uri
            .split_once(";base64,")
            .map(|(_, p)| p)
            .unwrap_or_default();
        BASE64.decode(payload)
    }
}

/// A newly selected image file, held only until the form is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Stage a file, sniffing its content type from the bytes first and the
    /// file extension second.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = sniff_content_type(&file_name, &bytes).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Stage a file with an explicit content type.
    pub fn with_content_type(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Inline preview of the staged bytes.
    pub fn preview(&self) -> InlineImage {
        InlineImage::from_bytes(Some(&self.content_type), &self.bytes)
    }
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Best-effort MIME type for an image file.
pub fn sniff_content_type(file_name: &str, bytes: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    content_type_for_extension(file_name).unwrap_or(FALLBACK_CONTENT_TYPE)
}

/// MIME type implied by a file name's extension, if it is a known image type.
pub fn content_type_for_extension(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
