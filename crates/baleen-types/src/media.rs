//! Media attachments: photos, videos, audio, documents, stickers and files.

use serde::{Deserialize, Serialize};

/// One size variant of a photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSize {
    /// Identifier used to download or re-send the file.
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// A video file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// An animation (GIF or soundless video).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// An audio file treated as music.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audio {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub performer: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// A generic file attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// A voice note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// A sticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sticker {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Emoji associated with the sticker.
    #[serde(default)]
    pub emoji: Option<String>,
    /// Name of the sticker set this sticker belongs to.
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// A named set of stickers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StickerSet {
    /// Machine name used in set-management calls.
    pub name: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
}

/// The storage format of a sticker, selecting the upload parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StickerFormat {
    /// A `.webp`/`.png` image.
    Static,
    /// A `.tgs` animation.
    Animated,
    /// A `.webm` video.
    Video,
}

impl StickerFormat {
    /// The request parameter carrying the sticker file for this format.
    pub fn param_name(self) -> &'static str {
        match self {
            StickerFormat::Static => "png_sticker",
            StickerFormat::Animated => "tgs_sticker",
            StickerFormat::Video => "webm_sticker",
        }
    }

    /// The wire name of the format itself.
    pub fn as_str(self) -> &'static str {
        match self {
            StickerFormat::Static => "static",
            StickerFormat::Animated => "animated",
            StickerFormat::Video => "video",
        }
    }
}

/// A file ready to be downloaded via its `file_path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Relative path passed to the file-download endpoint.
    #[serde(default)]
    pub file_path: Option<String>,
}

/// A shared contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    /// The contact's user id, when they have an account.
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// A point on the map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticker_format_param_names() {
        assert_eq!(StickerFormat::Static.param_name(), "png_sticker");
        assert_eq!(StickerFormat::Animated.param_name(), "tgs_sticker");
        assert_eq!(StickerFormat::Video.param_name(), "webm_sticker");
    }

    #[test]
    fn test_photo_size_decodes_without_optionals() {
        let photo: PhotoSize =
            serde_json::from_str(r#"{"file_id": "abc", "width": 10, "height": 20}"#).unwrap();
        assert_eq!(photo.file_id, "abc");
        assert!(photo.file_unique_id.is_none());
    }
}
