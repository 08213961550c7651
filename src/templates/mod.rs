use teloxide::utils::html;

use crate::config::Config;
use crate::query::{Outcome, Verdict};

/// Fixed reply to `/start`.
pub const HELP_TEXT: &str = "The bot is running! Type the bot's @handle in any chat followed by \
     your access code and a username to use inline mode, or send /link to do it here.";

pub const USERNAME_PROMPT: &str = "Send me the username you want to link.";
pub const USERNAME_EMPTY: &str = "That doesn't look like a username, try again.";
pub const DISMISSED_TEXT: &str = "This message was dismissed.";

const CONFIRMED_BODY: &str = "✅ <b>Access confirmed</b>\n\nTarget username: <b>{payload}</b>\n\n\
     Use the button below to open the page.";

const REVEAL_LINE: &str = "\nCorrect code: <code>{secret}</code>";

/// One row of the outcome table. Titles and descriptions are plain text,
/// bodies are HTML.
#[derive(Debug)]
pub struct Template {
    pub outcome: Outcome,
    pub title: &'static str,
    pub description: &'static str,
    pub body: &'static str,
    pub button: Option<&'static str>,
}

static TEMPLATES: [Template; 4] = [
    Template {
        outcome: Outcome::Instructions,
        title: "Enter your access code",
        description: "Format: CODE USERNAME",
        body: "ℹ️ <b>How to use</b>\n\nType the access code followed by the target username:\n\
               <code>CODE username</code>",
        button: None,
    },
    Template {
        outcome: Outcome::WrongCode,
        title: "Wrong access code",
        description: "Code {code} is not valid",
        body: "❌ <b>Wrong access code</b>\n\nEntered code: <code>{code}</code>",
        button: None,
    },
    Template {
        outcome: Outcome::PayloadRequired,
        title: "Username required",
        description: "Add the target username after the code",
        body: "⚠️ <b>Username required</b>\n\nType the username after the code:\n\
               <code>CODE username</code>",
        button: None,
    },
    Template {
        outcome: Outcome::Success,
        title: "Send access link for {payload}",
        description: "Tap to send the message with the web app button",
        body: "🚀 <b>Access granted</b>\n\nTarget username: <b>{payload}</b>\n\n\
               Tap the button below to open the web app.",
        button: Some("🌐 Open Web App"),
    },
];

pub fn template(outcome: Outcome) -> &'static Template {
    match outcome {
        Outcome::Instructions => &TEMPLATES[0],
        Outcome::WrongCode => &TEMPLATES[1],
        Outcome::PayloadRequired => &TEMPLATES[2],
        Outcome::Success => &TEMPLATES[3],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub outcome: Outcome,
    pub title: String,
    pub description: String,
    pub body: String,
}

pub fn render(verdict: &Verdict<'_>, config: &Config) -> Rendered {
    let outcome = verdict.outcome();
    let template = template(outcome);

    let (code, payload) = match *verdict {
        Verdict::WrongCode { entered } => (entered, ""),
        Verdict::Success { username } => ("", username),
        Verdict::Instructions | Verdict::PayloadRequired => ("", ""),
    };

    let plain = [("code", code), ("payload", payload)];
    let escaped_code = html::escape(code);
    let escaped_payload = html::escape(payload);
    let escaped_secret = html::escape(&config.auth_code);
    let escaped = [
        ("code", escaped_code.as_str()),
        ("payload", escaped_payload.as_str()),
        ("secret", escaped_secret.as_str()),
    ];

    let mut body = fill(template.body, &escaped);
    if outcome == Outcome::WrongCode && config.reveal_auth_code {
        body.push_str(&fill(REVEAL_LINE, &escaped));
    }

    Rendered {
        outcome,
        title: fill(template.title, &plain),
        description: fill(template.description, &plain),
        body,
    }
}

pub fn confirmed_body(username: &str) -> String {
    let username = html::escape(username);
    fill(CONFIRMED_BODY, &[("payload", username.as_str())])
}

/// Replaces `{key}` placeholders in one pass. Substituted values are never
/// scanned again, unknown keys are left as they are.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
