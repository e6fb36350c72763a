//! Outbound media sources.

use std::path::PathBuf;

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::ParseMode;

/// Failed to build an [`InputFile`] from encoded data.
#[derive(Debug, Error)]
pub enum InputFileError {
    #[error("malformed data URI: {0}")]
    InvalidDataUri(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Where an outbound file comes from.
///
/// `FileId` and `Url` are sent as plain string parameters; `Path` and
/// `Bytes` make the client switch to a multipart upload.
#[derive(Debug, Clone)]
pub enum InputFile {
    /// A file already stored on the server.
    FileId(String),
    /// A remote file the server fetches itself.
    Url(String),
    /// A local file, read at send time.
    Path(PathBuf),
    /// In-memory contents with the name the upload is labelled with.
    Bytes { file_name: String, bytes: Vec<u8> },
}

impl InputFile {
    pub fn file_id(id: impl Into<String>) -> Self {
        Self::FileId(id.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Decodes a `data:{kind}/{ext};base64,{payload}` URI into in-memory
    /// bytes named `{kind}.{ext}`.
    pub fn from_data_uri(uri: &str) -> Result<Self, InputFileError> {
        let invalid = || InputFileError::InvalidDataUri(uri.to_string());
        let rest = uri.strip_prefix("data:").ok_or_else(invalid)?;
        let (mime, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
        let (kind, ext) = mime.split_once('/').ok_or_else(invalid)?;
        if kind.is_empty() || ext.is_empty() || payload.is_empty() {
            return Err(invalid());
        }
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
        Ok(Self::Bytes {
            file_name: format!("{kind}.{ext}"),
            bytes,
        })
    }

    /// Decodes a bare base64 payload, e.g. the remainder of a `base64://`
    /// style reference.
    pub fn from_base64(
        encoded: &str,
        file_name: impl Into<String>,
    ) -> Result<Self, InputFileError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        Ok(Self::Bytes {
            file_name: file_name.into(),
            bytes,
        })
    }

    /// The string form for `FileId` and `Url` sources.
    pub fn as_string_param(&self) -> Option<&str> {
        match self {
            Self::FileId(id) => Some(id),
            Self::Url(url) => Some(url),
            Self::Path(_) | Self::Bytes { .. } => None,
        }
    }

    /// Whether sending this source requires a multipart upload.
    pub fn needs_upload(&self) -> bool {
        matches!(self, Self::Path(_) | Self::Bytes { .. })
    }

    /// The file name the upload would carry, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Path(path) => path.file_name().and_then(|n| n.to_str()),
            Self::Bytes { file_name, .. } => Some(file_name),
            Self::FileId(_) | Self::Url(_) => None,
        }
    }

    /// The lowercased file extension of a local source, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name()?;
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() {
            None
        } else {
            Some(ext.to_ascii_lowercase())
        }
    }
}

/// Media group kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMediaKind {
    Photo,
    Video,
    Animation,
    Audio,
    Document,
}

/// One item of a media group.
///
/// `media` is a file id or URL; media groups do not upload local files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMedia {
    #[serde(rename = "type")]
    pub kind: InputMediaKind,
    pub media: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
}

impl InputMedia {
    fn bare(kind: InputMediaKind, media: impl Into<String>) -> Self {
        Self {
            kind,
            media: media.into(),
            caption: None,
            parse_mode: None,
            width: None,
            height: None,
            duration: None,
        }
    }

    pub fn photo(media: impl Into<String>) -> Self {
        Self::bare(InputMediaKind::Photo, media)
    }

    pub fn video(media: impl Into<String>) -> Self {
        Self::bare(InputMediaKind::Video, media)
    }

    pub fn animation(media: impl Into<String>) -> Self {
        Self::bare(InputMediaKind::Animation, media)
    }

    pub fn audio(media: impl Into<String>) -> Self {
        Self::bare(InputMediaKind::Audio, media)
    }

    pub fn document(media: impl Into<String>) -> Self {
        Self::bare(InputMediaKind::Document, media)
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_round_trip() {
        let file = InputFile::from_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        match &file {
            InputFile::Bytes { file_name, bytes } => {
                assert_eq!(file_name, "image.png");
                assert_eq!(bytes, b"hello");
            }
            other => panic!("expected bytes, got {other:?}"),
        }
        assert!(file.needs_upload());
        assert_eq!(file.extension().as_deref(), Some("png"));
    }

    #[test]
    fn test_data_uri_rejects_malformed_inputs() {
        assert!(InputFile::from_data_uri("image/png;base64,aGVsbG8=").is_err());
        assert!(InputFile::from_data_uri("data:image/png,aGVsbG8=").is_err());
        assert!(InputFile::from_data_uri("data:imagepng;base64,aGVsbG8=").is_err());
        assert!(InputFile::from_data_uri("data:image/png;base64,!!!").is_err());
    }

    #[test]
    fn test_string_sources_skip_upload() {
        let by_id = InputFile::file_id("abc123");
        assert_eq!(by_id.as_string_param(), Some("abc123"));
        assert!(!by_id.needs_upload());
        assert_eq!(by_id.extension(), None);

        let local = InputFile::path("/tmp/clip.MOV");
        assert_eq!(local.as_string_param(), None);
        assert_eq!(local.extension().as_deref(), Some("mov"));
    }

    #[test]
    fn test_media_group_item_wire_shape() {
        let item = InputMedia::photo("https://cdn.example/pic.jpg").caption("hi");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "photo",
                "media": "https://cdn.example/pic.jpg",
                "caption": "hi"
            })
        );
    }
}
