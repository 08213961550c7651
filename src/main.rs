use std::{net::SocketAddr, process, sync::Arc};

use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    update_listeners::webhooks,
};

use config::Config;
use misc::State;

mod callback;
mod config;
mod functions;
mod keyboard;
mod misc;
mod query;
mod responder;
mod templates;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() {
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting bot..");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Invalid configuration: {err}");
            process::exit(1);
        }
    };
    log::info!(
        "Answering inline queries with {} buttons to {}",
        config.button.as_str(),
        config.web_app_url
    );

    let bot = Bot::new(&config.bot_token);
    let webhook = config.webhook.clone();

    let mut dispatcher = Dispatcher::builder(bot.clone(), functions::schema())
        .dependencies(dptree::deps![
            Arc::new(config),
            InMemStorage::<State>::new()
        ])
        .default_handler(|upd| async move {
            log::warn!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build();

    let Some(webhook) = webhook else {
        log::info!("No WEBHOOK_URL set, using long polling");
        dispatcher.dispatch().await;
        return;
    };

    let url = match webhook.endpoint() {
        Ok(url) => url,
        Err(err) => {
            log::error!("Invalid webhook url {}: {err}", webhook.base_url);
            process::exit(1);
        }
    };
    let address = SocketAddr::from(([0, 0, 0, 0], webhook.port));
    log::info!("Listening for webhook updates on {address}, public url {url}");

    let listener = match webhooks::axum(bot, webhooks::Options::new(address, url)).await {
        Ok(listener) => listener,
        Err(err) => {
            log::error!("Couldn't set up the webhook: {err}");
            process::exit(1);
        }
    };

    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;
}
