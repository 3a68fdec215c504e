use std::sync::Arc;

use anyhow::{Context, Result};
use dressbot::bot::{self, AppState};
use dressbot::config::{BotConfig, Launch, WebhookConfig, ENV_BOT_TOKEN};
use dressbot::diagnostics::TracingDiagnostics;
use dressbot::logging::init_logging;
use dressbot::text_pool::MessagePools;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use teloxide::update_listeners::webhooks;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::load_default().context("Failed to load configuration")?;

    init_logging(&config.logging)?;

    info!("dressbot v{}", env!("CARGO_PKG_VERSION"));

    let loaded = MessagePools::load(&config.messages, &config.assets_dir, &TracingDiagnostics);
    let pools = match loaded {
        Ok(pools) => pools,
        Err(e) => {
            error!(category = e.category(), error = %e, "Failed to load message pool");
            return Err(e).context("Failed to load message pools");
        }
    };

    let token = config.resolve_token(std::env::var(ENV_BOT_TOKEN).ok())?;

    info!("Starting Telegram bot...");
    let bot = Bot::new(token);

    let bot_username = match bot.get_me().await {
        Ok(me) => me.user.username.clone(),
        Err(e) => {
            warn!(error = %e, "Failed to fetch bot identity, accepting any command mention");
            None
        }
    };

    let state = Arc::new(AppState {
        pools,
        format: config.format,
        command: config.command.clone(),
        bot_username,
        block_from_ids: config.block_from_ids.clone(),
        ignore_chat_ids: config.ignore_chat_ids.clone(),
        diagnostics: Arc::new(TracingDiagnostics),
    });

    let mut dispatcher = Dispatcher::builder(bot.clone(), bot::schema())
        .dependencies(dptree::deps![state])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build();

    match config.launch {
        Launch::Polling => {
            info!("Telegram bot has started.");
            dispatcher.dispatch().await;
        }
        Launch::Webhook(webhook) => {
            let url = webhook.url.clone();
            let listener = webhooks::axum(bot, webhook_options(webhook))
                .await
                .context("Failed to set up webhook")?;
            info!(url = %url, "Telegram bot has started.");
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    Ok(())
}

fn webhook_options(webhook: WebhookConfig) -> webhooks::Options {
    let mut options = webhooks::Options::new(webhook.address, webhook.url);
    if let Some(path) = webhook.path {
        options.path = path;
    }
    if let Some(cert) = webhook.certificate_path {
        options.certificate = Some(InputFile::file(cert));
    }
    options
}
