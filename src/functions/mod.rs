use std::sync::Arc;

use teloxide::{
    dispatching::{dialogue::InMemStorage, HandlerExt, UpdateFilterExt, UpdateHandler},
    prelude::*,
    types::{ChosenInlineResult, InlineQuery, InlineQueryResult, ParseMode},
    utils::command::BotCommands,
    RequestError,
};

use crate::callback::{self, CallbackAction, Delivery};
use crate::config::Config;
use crate::keyboard;
use crate::misc::{
    normalize_username, HandlerResult, LinkDialogue, OwnerCommands, State, UserCommands,
};
use crate::query::Verdict;
use crate::responder;
use crate::templates;

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let owner_commands = dptree::filter(|cfg: Arc<Config>, msg: Message| {
        msg.from()
            .map(|user| cfg.is_owner(user.id))
            .unwrap_or_default()
    })
    .filter_command::<OwnerCommands>()
    .endpoint(owner_command_handler);

    let message_handler = Update::filter_message()
        .enter_dialogue::<Message, InMemStorage<State>, State>()
        .branch(owner_commands)
        .branch(
            dptree::entry()
                .filter_command::<UserCommands>()
                .endpoint(user_command_handler),
        )
        .branch(dptree::case![State::AwaitingUsername].endpoint(receive_username));

    dptree::entry()
        .branch(message_handler)
        .branch(Update::filter_inline_query().endpoint(inline_query_handler))
        .branch(Update::filter_chosen_inline_result().endpoint(chosen_result_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

async fn user_command_handler(
    bot: Bot,
    msg: Message,
    dialogue: LinkDialogue,
    cmd: UserCommands,
    cfg: Arc<Config>,
) -> HandlerResult {
    match cmd {
        UserCommands::Start => {
            bot.send_message(msg.chat.id, templates::HELP_TEXT).await?;
        }
        UserCommands::Help => {
            bot.send_message(msg.chat.id, UserCommands::descriptions().to_string())
                .await?;
        }
        UserCommands::Link if !msg.chat.is_private() => {
            bot.send_message(msg.chat.id, "Send /link in a private chat with me.")
                .await?;
        }
        UserCommands::Link => match dialogue.get_or_default().await? {
            State::Completed { username } => {
                send_success(&bot, msg.chat.id, &username, &cfg).await?;
            }
            current => {
                advance(&dialogue, &current, State::AwaitingUsername).await?;
                bot.send_message(msg.chat.id, templates::USERNAME_PROMPT)
                    .await?;
            }
        },
    }
    Ok(())
}

async fn owner_command_handler(
    bot: Bot,
    msg: Message,
    cmd: OwnerCommands,
    cfg: Arc<Config>,
) -> HandlerResult {
    match cmd {
        OwnerCommands::Settings => {
            bot.send_message(msg.chat.id, cfg.summary()).await?;
        }
    }
    Ok(())
}

async fn receive_username(
    bot: Bot,
    msg: Message,
    dialogue: LinkDialogue,
    cfg: Arc<Config>,
) -> HandlerResult {
    let username = msg.text().and_then(normalize_username);

    let Some(username) = username else {
        bot.send_message(msg.chat.id, templates::USERNAME_EMPTY).await?;
        return Ok(());
    };

    let next = State::Completed {
        username: username.to_string(),
    };
    advance(&dialogue, &State::AwaitingUsername, next).await?;
    log::info!("Chat {} linked username {username}", msg.chat.id);

    send_success(&bot, msg.chat.id, username, &cfg).await
}

/// Stores `next` only if it moves the dialogue forward.
pub(crate) async fn advance(dialogue: &LinkDialogue, current: &State, next: State) -> HandlerResult {
    if current.can_advance_to(&next) {
        dialogue.update(next).await?;
    } else {
        log::debug!("Chat {} stays in {current:?}", dialogue.chat_id());
    }
    Ok(())
}

async fn send_success(bot: &Bot, chat: ChatId, username: &str, cfg: &Config) -> HandlerResult {
    let rendered = templates::render(&Verdict::Success { username }, cfg);
    let keyboard = keyboard::success_keyboard(cfg.button, &cfg.web_app_url, username)?;
    bot.send_message(chat, rendered.body)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

async fn inline_query_handler(bot: Bot, q: InlineQuery, cfg: Arc<Config>) -> HandlerResult {
    let results = match responder::respond(&q.query, &cfg) {
        Ok(response) => {
            log::info!(
                "Inline query {} from {} answered with {}",
                q.id,
                q.from.id,
                response.outcome.as_str()
            );
            vec![InlineQueryResult::Article(response.article)]
        }
        Err(err) => {
            log::error!("Couldn't build the answer for inline query {}: {err}", q.id);
            Vec::new()
        }
    };

    let response = bot
        .answer_inline_query(&q.id, results)
        .cache_time(cfg.cache_time)
        .is_personal(true)
        .await;
    if let Err(err) = response {
        log::error!("Error in inline query handler: {:?}", err);
    }
    Ok(())
}

async fn chosen_result_handler(chosen: ChosenInlineResult) -> HandlerResult {
    log::info!(
        "User {} sent inline result {}",
        chosen.from.id,
        chosen.result_id
    );
    Ok(())
}

async fn callback_handler(bot: Bot, q: CallbackQuery, cfg: Arc<Config>) -> HandlerResult {
    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };

    let reaction = CallbackAction::decode(data).and_then(|action| callback::react(&action, &cfg));
    let reaction = match reaction {
        Ok(reaction) => reaction,
        Err(err) => {
            log::warn!("Rejected callback from {}: {err}", q.from.id);
            bot.answer_callback_query(&q.id)
                .text("This button is no longer valid")
                .show_alert(true)
                .await?;
            return Ok(());
        }
    };

    let chat_message = q.message.as_ref().map(|msg| (msg.chat.id, msg.id));
    let (delivery, notice) =
        callback::deliver(reaction, q.inline_message_id.as_deref(), chat_message);

    match apply_delivery(&bot, delivery).await {
        Ok(()) => {
            bot.answer_callback_query(&q.id).text(notice).await?;
        }
        Err(err) => {
            log::error!("Couldn't update the message for {}: {err}", q.from.id);
            bot.answer_callback_query(&q.id)
                .text("Couldn't update the message, try again later")
                .show_alert(true)
                .await?;
        }
    }
    Ok(())
}

async fn apply_delivery(bot: &Bot, delivery: Delivery<'_>) -> Result<(), RequestError> {
    match delivery {
        Delivery::EditInline { id, text, keyboard } => {
            let mut request = bot
                .edit_message_text_inline(id, text)
                .parse_mode(ParseMode::Html);
            if let Some(keyboard) = keyboard {
                request = request.reply_markup(keyboard);
            }
            request.await?;
        }
        Delivery::EditChat {
            chat,
            message,
            text,
            keyboard,
        } => {
            let mut request = bot
                .edit_message_text(chat, message, text)
                .parse_mode(ParseMode::Html);
            if let Some(keyboard) = keyboard {
                request = request.reply_markup(keyboard);
            }
            request.await?;
        }
        Delivery::Delete { chat, message } => {
            bot.delete_message(chat, message).await?;
        }
        Delivery::Nothing => {}
    }
    Ok(())
}
