use chrono::Utc;
use teloxide::types::{
    InlineQueryResultArticle, InputMessageContent, InputMessageContentText, ParseMode,
};

use crate::callback::CallbackError;
use crate::config::Config;
use crate::keyboard;
use crate::query::{self, Outcome, Verdict};
use crate::templates;

#[derive(Debug, Clone)]
pub struct Response {
    pub outcome: Outcome,
    pub article: InlineQueryResultArticle,
}

/// Builds the single article offered for an inline query.
pub fn respond(raw: &str, config: &Config) -> Result<Response, CallbackError> {
    let parsed = query::parse(raw);
    let verdict = query::classify(&parsed, &config.auth_code);
    let rendered = templates::render(&verdict, config);

    let content = InputMessageContent::Text(
        InputMessageContentText::new(rendered.body).parse_mode(ParseMode::Html),
    );

    let mut article = InlineQueryResultArticle::new(result_id(rendered.outcome), rendered.title, content)
        .description(rendered.description);

    if let Verdict::Success { username } = verdict {
        article = article.reply_markup(keyboard::success_keyboard(
            config.button,
            &config.web_app_url,
            username,
        )?);
    }

    Ok(Response {
        outcome: rendered.outcome,
        article,
    })
}

/// Unique per answer so clients never merge results from different queries.
fn result_id(outcome: Outcome) -> String {
    let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}-{stamp}", outcome.as_str())
}
