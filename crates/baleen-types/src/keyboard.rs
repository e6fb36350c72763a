//! Inline and reply keyboards attached to outbound messages.

use serde::{Deserialize, Serialize};

/// A web app opened by a keyboard button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAppInfo {
    /// HTTPS URL of the web app.
    pub url: String,
}

/// Text copied to the user's clipboard when the button is pressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyTextButton {
    pub text: String,
}

/// One button of an inline keyboard.
///
/// Exactly one action field should be set; the constructors below enforce
/// this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Button label.
    pub text: String,
    /// Data delivered in the resulting callback interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    /// URL opened when the button is pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Web app launched when the button is pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebAppInfo>,
    /// Text copied to the clipboard when the button is pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_text: Option<CopyTextButton>,
}

impl InlineKeyboardButton {
    fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: None,
            url: None,
            web_app: None,
            copy_text: None,
        }
    }

    /// A button that triggers a callback interaction carrying `data`.
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            callback_data: Some(data.into()),
            ..Self::bare(text)
        }
    }

    /// A button that opens a URL.
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::bare(text)
        }
    }

    /// A button that opens a web app.
    pub fn web_app(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            web_app: Some(WebAppInfo { url: url.into() }),
            ..Self::bare(text)
        }
    }

    /// A button that copies `copied` to the user's clipboard.
    pub fn copy_text(text: impl Into<String>, copied: impl Into<String>) -> Self {
        Self {
            copy_text: Some(CopyTextButton {
                text: copied.into(),
            }),
            ..Self::bare(text)
        }
    }
}

/// An inline keyboard shown under a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a full row of buttons.
    pub fn row(mut self, buttons: Vec<InlineKeyboardButton>) -> Self {
        self.inline_keyboard.push(buttons);
        self
    }

    /// Appends one button to the last row, creating a row when none exists.
    pub fn button(mut self, button: InlineKeyboardButton) -> Self {
        match self.inline_keyboard.last_mut() {
            Some(row) => row.push(button),
            None => self.inline_keyboard.push(vec![button]),
        }
        self
    }
}

/// One button of a reply keyboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyboardButton {
    /// Button label, sent back as a plain message when pressed.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_contact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_location: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebAppInfo>,
}

impl KeyboardButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: None,
            request_location: None,
            web_app: None,
        }
    }

    /// Requests the user's phone number when pressed.
    pub fn request_contact(mut self) -> Self {
        self.request_contact = Some(true);
        self
    }

    /// Requests the user's location when pressed.
    pub fn request_location(mut self) -> Self {
        self.request_location = Some(true);
        self
    }
}

/// A custom reply keyboard replacing the user's input field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

impl ReplyKeyboardMarkup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a full row of buttons.
    pub fn row(mut self, buttons: Vec<KeyboardButton>) -> Self {
        self.keyboard.push(buttons);
        self
    }

    /// Appends one button to the last row, creating a row when none exists.
    pub fn button(mut self, button: KeyboardButton) -> Self {
        match self.keyboard.last_mut() {
            Some(row) => row.push(button),
            None => self.keyboard.push(vec![button]),
        }
        self
    }

    /// Limits the keyboard to the users addressed by the message.
    pub fn selective(mut self) -> Self {
        self.selective = Some(true);
        self
    }
}

/// Removes the current reply keyboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyKeyboardRemove {
    /// Always `true` on the wire.
    pub remove_keyboard: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selective: Option<bool>,
}

impl ReplyKeyboardRemove {
    pub fn new() -> Self {
        Self {
            remove_keyboard: true,
            selective: None,
        }
    }
}

impl Default for ReplyKeyboardRemove {
    fn default() -> Self {
        Self::new()
    }
}

/// Any keyboard accepted by the `reply_markup` parameter of send/edit calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline(InlineKeyboardMarkup),
    Reply(ReplyKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
}

impl From<InlineKeyboardMarkup> for ReplyMarkup {
    fn from(markup: InlineKeyboardMarkup) -> Self {
        ReplyMarkup::Inline(markup)
    }
}

impl From<ReplyKeyboardMarkup> for ReplyMarkup {
    fn from(markup: ReplyKeyboardMarkup) -> Self {
        ReplyMarkup::Reply(markup)
    }
}

impl From<ReplyKeyboardRemove> for ReplyMarkup {
    fn from(markup: ReplyKeyboardRemove) -> Self {
        ReplyMarkup::Remove(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_builder_rows() {
        let markup = InlineKeyboardMarkup::new()
            .row(vec![
                InlineKeyboardButton::callback("Yes", "vote:yes"),
                InlineKeyboardButton::callback("No", "vote:no"),
            ])
            .button(InlineKeyboardButton::url("Docs", "https://dev.bale.ai"));

        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 3);

        let value = serde_json::to_value(&markup).unwrap();
        let first = &value["inline_keyboard"][0][0];
        assert_eq!(first["callback_data"], "vote:yes");
        assert!(first.get("url").is_none());
    }

    #[test]
    fn test_button_starts_first_row() {
        let markup = InlineKeyboardMarkup::new()
            .button(InlineKeyboardButton::callback("Only", "only"));
        assert_eq!(markup.inline_keyboard.len(), 1);
    }

    #[test]
    fn test_remove_keyboard_wire_shape() {
        let value = serde_json::to_value(ReplyKeyboardRemove::new()).unwrap();
        assert_eq!(value["remove_keyboard"], true);
        assert!(value.get("selective").is_none());
    }
}
