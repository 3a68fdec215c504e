//! Message Handler module for answering the slash-command

use std::sync::Arc;

use anyhow::Result;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Message, ReplyParameters};
use tracing::{debug, error, info};

use super::response_builder::ReplyPayload;
use super::{report_delivery_failure, AppState};
use crate::errors::DeliveryFailure;
use crate::formatter::Sender;

/// Whether `text` starts with `/command` or `/command@bot_username`.
///
/// The command name is case-sensitive, the username is not. A mention of another bot does not match. Without a known username any
/// mention is accepted.
pub fn is_command_for(text: &str, command: &str, bot_username: Option<&str>) -> bool {
    let Some(first) = text.split_whitespace().next() else {
        return false;
    };
    let Some(invoked) = first.strip_prefix('/') else {
        return false;
    };

    let (name, target) = match invoked.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (invoked, None),
    };
    if name != command {
        return false;
    }

    match (target, bot_username) {
        (Some(target), Some(me)) => target.eq_ignore_ascii_case(me),
        _ => true,
    }
}

/// Reply to the configured command with a random message; other messages
/// are ignored
pub async fn message_handler(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if !is_command_for(text, &state.command, state.bot_username.as_deref()) {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    debug!(user_id = %user.id, chat_id = %msg.chat.id, "Received command");

    if !state.accepts_command(user.id, msg.chat.id) {
        debug!(user_id = %user.id, chat_id = %msg.chat.id, "Ignoring command from blocked user or chat");
        return Ok(());
    }

    let sender = Sender::from(user);
    let payload = {
        let mut rng = rand::thread_rng();
        state.builder().command_reply(&sender, &mut rng)
    };

    let failure = match send_payload(&bot, &msg, &payload).await {
        Ok(()) => {
            debug!(user_id = %user.id, chat_id = %msg.chat.id, "Command answered");
            return Ok(());
        }
        Err(failure) => failure,
    };

    let content = match &payload {
        ReplyPayload::Article { text, .. } => text.as_str(),
        ReplyPayload::Photo { caption, .. } => caption.as_str(),
    };
    report_delivery_failure(state.diagnostics.as_ref(), &failure, content);

    let error_text = {
        let mut rng = rand::thread_rng();
        state.builder().error_text(&mut rng)
    };
    let fallback = ReplyPayload::Article {
        text: error_text,
        parse_mode: None,
    };
    match send_payload(&bot, &msg, &fallback).await {
        Ok(()) => info!(chat_id = %msg.chat.id, "Command answered with error message"),
        Err(e) => error!(chat_id = %msg.chat.id, error = %e, "Failed to send error message"),
    }

    Ok(())
}

async fn send_payload(bot: &Bot, msg: &Message, payload: &ReplyPayload) -> Result<(), DeliveryFailure> {
    let reply_to = ReplyParameters::new(msg.id);
    let sent = match payload {
        ReplyPayload::Article { text, parse_mode } => {
            let mut request = bot
                .send_message(msg.chat.id, text.clone())
                .reply_parameters(reply_to);
            if let Some(mode) = parse_mode {
                request = request.parse_mode(*mode);
            }
            request.await
        }
        ReplyPayload::Photo {
            url,
            caption,
            parse_mode,
        } => {
            let photo_url = Url::parse(url).map_err(|e| {
                DeliveryFailure::Unexpected(format!("invalid photo url {url:?}: {e}"))
            })?;
            let mut request = bot
                .send_photo(msg.chat.id, InputFile::url(photo_url))
                .reply_parameters(reply_to);
            if !caption.is_empty() {
                request = request.caption(caption.clone());
            }
            if let Some(mode) = parse_mode {
                request = request.parse_mode(*mode);
            }
            request.await
        }
    };

    sent.map(|_| ()).map_err(|e| DeliveryFailure::from(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_matching() {
        assert!(is_command_for("/dress", "dress", None));
        assert!(is_command_for("/dress extra words", "dress", None));
        assert!(is_command_for("/dress@My_Bot", "dress", Some("my_bot")));
        assert!(is_command_for("/dress@any_bot", "dress", None));

        assert!(!is_command_for("/dress@other_bot", "dress", Some("my_bot")));
        assert!(!is_command_for("dress", "dress", None));
        assert!(!is_command_for("/dressup", "dress", None));
        assert!(!is_command_for("/DRESS", "dress", Some("my_bot")));
        assert!(!is_command_for("/Dress@my_bot", "dress", Some("my_bot")));
        assert!(!is_command_for("", "dress", None));
    }
}
