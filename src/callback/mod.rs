use std::fmt;

use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, InlineKeyboardMarkup, MessageId};

use crate::config::Config;
use crate::keyboard;
use crate::query::Verdict;
use crate::templates;

/// Platform limit for callback data, in bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

/// What a callback button asks for. Serialized as compact JSON, e.g.
/// `{"a":"open","u":"alice"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "a", rename_all = "snake_case")]
pub enum CallbackAction {
    Open {
        #[serde(rename = "u")]
        username: String,
    },
    Reshow {
        #[serde(rename = "u")]
        username: String,
    },
    Dismiss,
}

#[derive(Debug)]
pub enum CallbackError {
    Json(serde_json::Error),
    TooLong(usize),
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed callback data: {err}"),
            Self::TooLong(len) => write!(
                f,
                "callback data is {len} bytes, the limit is {MAX_CALLBACK_DATA}"
            ),
        }
    }
}

impl std::error::Error for CallbackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::TooLong(_) => None,
        }
    }
}

impl From<serde_json::Error> for CallbackError {
    fn from(err: serde_json::Error) -> Self {
        CallbackError::Json(err)
    }
}

impl CallbackAction {
    pub fn encode(&self) -> Result<String, CallbackError> {
        let data = serde_json::to_string(self)?;
        if data.len() > MAX_CALLBACK_DATA {
            return Err(CallbackError::TooLong(data.len()));
        }
        Ok(data)
    }

    pub fn decode(data: &str) -> Result<Self, CallbackError> {
        if data.len() > MAX_CALLBACK_DATA {
            return Err(CallbackError::TooLong(data.len()));
        }
        Ok(serde_json::from_str(data)?)
    }
}

/// What to do with the message the pressed button belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    Edit {
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
        notice: &'static str,
    },
    Remove,
}

pub fn react(action: &CallbackAction, config: &Config) -> Result<Reaction, CallbackError> {
    match action {
        CallbackAction::Open { username } => Ok(Reaction::Edit {
            text: templates::confirmed_body(username),
            keyboard: Some(keyboard::confirmed_keyboard(&config.web_app_url, username)?),
            notice: "Access confirmed",
        }),
        CallbackAction::Reshow { username } => {
            let rendered = templates::render(&Verdict::Success { username }, config);
            Ok(Reaction::Edit {
                text: rendered.body,
                keyboard: Some(keyboard::success_keyboard(
                    config.button,
                    &config.web_app_url,
                    username,
                )?),
                notice: "Back to the start",
            })
        }
        CallbackAction::Dismiss => Ok(Reaction::Remove),
    }
}

/// The platform call that carries out a reaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery<'a> {
    EditInline {
        id: &'a str,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    EditChat {
        chat: ChatId,
        message: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Delete {
        chat: ChatId,
        message: MessageId,
    },
    Nothing,
}

/// Picks the call for the pressed button's message. Inline messages can't be
/// deleted, so removing one edits it to the dismissed text instead.
pub fn deliver(
    reaction: Reaction,
    inline_id: Option<&str>,
    chat_message: Option<(ChatId, MessageId)>,
) -> (Delivery<'_>, &'static str) {
    match reaction {
        Reaction::Edit {
            text,
            keyboard,
            notice,
        } => {
            let delivery = match (inline_id, chat_message) {
                (Some(id), _) => Delivery::EditInline { id, text, keyboard },
                (None, Some((chat, message))) => Delivery::EditChat {
                    chat,
                    message,
                    text,
                    keyboard,
                },
                (None, None) => Delivery::Nothing,
            };
            (delivery, notice)
        }
        Reaction::Remove => {
            let delivery = match (chat_message, inline_id) {
                (Some((chat, message)), _) => Delivery::Delete { chat, message },
                (None, Some(id)) => Delivery::EditInline {
                    id,
                    text: templates::DISMISSED_TEXT.to_string(),
                    keyboard: None,
                },
                (None, None) => Delivery::Nothing,
            };
            (delivery, "Dismissed")
        }
    }
}
