//! Multipart form assembly for media uploads.

use reqwest::multipart::{Form, Part};

use baleen_types::{ChatId, InputFile, SendMediaOptions};

use crate::error::{ClientError, ClientResult};

pub(crate) const ANIMATION_EXTENSIONS: &[&str] = &["gif", "mp4", "mov", "mkv", "avi", "webm"];
pub(crate) const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "ogg", "wav", "flac", "aac"];
pub(crate) const STICKER_EXTENSIONS: &[&str] = &["webp"];

/// Rejects local sources whose extension the API would refuse.
///
/// Remote sources pass through untouched; the server validates those itself.
pub(crate) fn require_extension(
    file: &InputFile,
    allowed: &[&str],
    what: &str,
) -> ClientResult<()> {
    if !file.needs_upload() {
        return Ok(());
    }
    match file.extension() {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ClientError::invalid_input(format!(
            "unsupported {what} extension .{ext}, expected one of: {}",
            allowed.join(", ")
        ))),
        None => Err(ClientError::invalid_input(format!(
            "{what} upload needs a file extension, expected one of: {}",
            allowed.join(", ")
        ))),
    }
}

/// Adds a local file source to a form under the given field name.
pub(crate) async fn attach(form: Form, field: &str, file: InputFile) -> ClientResult<Form> {
    match file {
        InputFile::Path(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            let bytes = tokio::fs::read(&path).await?;
            Ok(form.part(field.to_string(), Part::bytes(bytes).file_name(name)))
        }
        InputFile::Bytes { file_name, bytes } => Ok(form.part(
            field.to_string(),
            Part::bytes(bytes).file_name(file_name),
        )),
        InputFile::FileId(value) | InputFile::Url(value) => {
            Ok(form.text(field.to_string(), value))
        }
    }
}

/// Builds the multipart form for one media sender call.
pub(crate) async fn media_form(
    chat_id: &ChatId,
    field: &str,
    file: InputFile,
    options: &SendMediaOptions,
) -> ClientResult<Form> {
    let mut form = Form::new().text("chat_id", chat_id.to_string());
    form = attach(form, field, file).await?;
    if let Some(caption) = &options.caption {
        form = form.text("caption", caption.clone());
    }
    if let Some(message_id) = options.reply_to_message_id {
        form = form.text("reply_to_message_id", message_id.to_string());
    }
    if let Some(markup) = &options.reply_markup {
        form = form.text("reply_markup", serde_json::to_string(markup)?);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_gate_only_applies_to_local_sources() {
        let remote = InputFile::url("https://cdn.example/clip.txt");
        assert!(require_extension(&remote, ANIMATION_EXTENSIONS, "animation").is_ok());

        let local = InputFile::path("/tmp/clip.webm");
        assert!(require_extension(&local, ANIMATION_EXTENSIONS, "animation").is_ok());

        let wrong = InputFile::path("/tmp/clip.txt");
        let err = require_extension(&wrong, ANIMATION_EXTENSIONS, "animation").unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let nameless = InputFile::bytes("blob", vec![1, 2, 3]);
        assert!(require_extension(&nameless, AUDIO_EXTENSIONS, "audio").is_err());
    }

    #[test]
    fn test_sticker_gate_is_webp_only() {
        let webp = InputFile::bytes("sticker.webp", vec![0u8; 4]);
        assert!(require_extension(&webp, STICKER_EXTENSIONS, "sticker").is_ok());
        let png = InputFile::bytes("sticker.png", vec![0u8; 4]);
        assert!(require_extension(&png, STICKER_EXTENSIONS, "sticker").is_err());
    }
}
