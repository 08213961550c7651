use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use url::Url;

use crate::callback::{CallbackAction, CallbackError};
use crate::config::ButtonKind;
use crate::query::Outcome;
use crate::templates;

const FALLBACK_LABEL: &str = "Open";

/// Target page with the username attached as a query parameter.
pub fn target_url(base: &Url, username: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("username", username);
    url
}

/// The single button under a success answer.
pub fn success_keyboard(
    kind: ButtonKind,
    base: &Url,
    username: &str,
) -> Result<InlineKeyboardMarkup, CallbackError> {
    let label = templates::template(Outcome::Success)
        .button
        .unwrap_or(FALLBACK_LABEL);

    let button = match kind {
        ButtonKind::Url => InlineKeyboardButton::url(label, target_url(base, username)),
        ButtonKind::WebApp => InlineKeyboardButton::web_app(
            label,
            WebAppInfo {
                url: target_url(base, username),
            },
        ),
        ButtonKind::Callback => {
            let data = CallbackAction::Open {
                username: username.to_string(),
            }
            .encode()?;
            // Pressing leads to a Back button, which must fit too.
            CallbackAction::Reshow {
                username: username.to_string(),
            }
            .encode()?;
            InlineKeyboardButton::callback(label, data)
        }
    };

    Ok(InlineKeyboardMarkup::new([[button]]))
}

/// Shown after an `Open` press: the link itself, then back and dismiss.
pub fn confirmed_keyboard(base: &Url, username: &str) -> Result<InlineKeyboardMarkup, CallbackError> {
    let back = CallbackAction::Reshow {
        username: username.to_string(),
    }
    .encode()?;
    let dismiss = CallbackAction::Dismiss.encode()?;

    Ok(InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url(
            "🌐 Open page",
            target_url(base, username),
        )],
        vec![
            InlineKeyboardButton::callback("⬅️ Back", back),
            InlineKeyboardButton::callback("✖️ Dismiss", dismiss),
        ],
    ]))
}
