//! Inline Handler module for answering inline queries

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{InlineQuery, InlineQueryResult};
use tracing::{debug, error, info};

use super::response_builder::{InlineResult, ReplyPayload};
use super::ui_builder::to_inline_query_result;
use super::{report_delivery_failure, AppState};
use crate::errors::DeliveryFailure;
use crate::formatter::Sender;

/// Answer an inline query with one random result.
///
/// Failures never leave this function: a rejected answer is replaced by a
/// result from the error pool, and a rejected fallback is only logged.
pub async fn inline_query_handler(bot: Bot, q: InlineQuery, state: Arc<AppState>) -> Result<()> {
    debug!(user_id = %q.from.id, query = %q.query, "Received inline query");

    if !state.accepts_inline(q.from.id) {
        debug!(user_id = %q.from.id, "Ignoring inline query from blocked user");
        return Ok(());
    }

    let sender = Sender::from(&q.from);
    let result = {
        let mut rng = rand::thread_rng();
        state.builder().inline_result(&sender, &mut rng)
    };
    let content = payload_content(&result.payload).to_string();

    let failure = match to_inline_query_result(result, state.diagnostics.as_ref()) {
        Ok(tg_result) => match answer(&bot, &q, tg_result).await {
            Ok(()) => {
                debug!(user_id = %q.from.id, "Inline query answered");
                return Ok(());
            }
            Err(failure) => failure,
        },
        Err(e) => DeliveryFailure::Unexpected(format!("{e:#}")),
    };

    report_delivery_failure(state.diagnostics.as_ref(), &failure, &content);

    let fallback = {
        let mut rng = rand::thread_rng();
        state.builder().error_result(&mut rng)
    };
    if let Err(e) = send_fallback(&bot, &q, fallback, &state).await {
        error!(user_id = %q.from.id, error = %e, "Failed to answer inline query with error result");
    } else {
        info!(user_id = %q.from.id, "Inline query answered with error result");
    }

    Ok(())
}

async fn answer(
    bot: &Bot,
    q: &InlineQuery,
    result: InlineQueryResult,
) -> Result<(), DeliveryFailure> {
    bot.answer_inline_query(q.id.clone(), vec![result])
        .cache_time(0)
        .await
        .map(|_| ())
        .map_err(|e| DeliveryFailure::from(&e))
}

async fn send_fallback(
    bot: &Bot,
    q: &InlineQuery,
    fallback: InlineResult,
    state: &AppState,
) -> Result<()> {
    let tg_result = to_inline_query_result(fallback, state.diagnostics.as_ref())?;
    answer(bot, q, tg_result).await?;
    Ok(())
}

fn payload_content(payload: &ReplyPayload) -> &str {
    match payload {
        ReplyPayload::Article { text, .. } => text,
        ReplyPayload::Photo { caption, .. } => caption,
    }
}
