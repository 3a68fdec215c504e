//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `inline_handler`: Answers inline queries with a random message
//! - `message_handler`: Answers the slash-command with a random message
//! - `response_builder`: Picks, classifies and formats reply payloads
//! - `ui_builder`: Converts payloads into Telegram result types

pub mod inline_handler;
pub mod message_handler;
pub mod response_builder;
pub mod ui_builder;

use std::collections::HashSet;
use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatId, UserId};

use crate::diagnostics::Diagnostics;
use crate::errors::DeliveryFailure;
use crate::formatter::FormatOptions;
use crate::text_pool::MessagePools;

pub use inline_handler::inline_query_handler;
pub use message_handler::{is_command_for, message_handler};
pub use response_builder::{InlineResult, ReplyPayload, ResponseBuilder};

/// Immutable state shared by every handler
pub struct AppState {
    pub pools: MessagePools,
    pub format: FormatOptions,
    /// Command name without the leading slash
    pub command: String,
    /// Username of the running bot, used to match `/command@username`
    pub bot_username: Option<String>,
    pub block_from_ids: HashSet<u64>,
    pub ignore_chat_ids: HashSet<i64>,
    pub diagnostics: Arc<dyn Diagnostics>,
}

impl AppState {
    pub fn builder(&self) -> ResponseBuilder<'_> {
        ResponseBuilder::new(&self.pools, self.format, self.diagnostics.as_ref())
    }

    pub fn is_blocked_user(&self, user_id: UserId) -> bool {
        self.block_from_ids.contains(&user_id.0)
    }

    pub fn is_ignored_chat(&self, chat_id: ChatId) -> bool {
        self.ignore_chat_ids.contains(&chat_id.0)
    }

    /// Inline queries have no chat, so only the user block list applies
    pub fn accepts_inline(&self, user_id: UserId) -> bool {
        !self.is_blocked_user(user_id)
    }

    pub fn accepts_command(&self, user_id: UserId, chat_id: ChatId) -> bool {
        !self.is_blocked_user(user_id) && !self.is_ignored_chat(chat_id)
    }
}

/// Dispatcher handler tree: inline queries and messages
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_inline_query().endpoint(inline_query_handler))
        .branch(Update::filter_message().endpoint(message_handler))
}

/// Log a rejected reply: expected failures as warnings, the rest as errors
pub fn report_delivery_failure(
    diagnostics: &dyn Diagnostics,
    failure: &DeliveryFailure,
    content: &str,
) {
    match failure {
        DeliveryFailure::CantParseEntities(_) => {
            diagnostics.warn(&format!("string \"{content}\" can't parse as html."))
        }
        DeliveryFailure::QueryExpired => {
            diagnostics.warn(&format!("query expired before answering with \"{content}\""))
        }
        DeliveryFailure::Unexpected(_) => diagnostics.error(&failure.to_string()),
    }
}
