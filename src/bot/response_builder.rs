//! Response Builder module: turns a random pick into a reply payload
//!
//! Every build runs synchronously against the loaded pools and an injected
//! RNG, so nothing here awaits or touches the network.

use chrono::Utc;
use rand::Rng;
use teloxide::types::ParseMode;

use crate::diagnostics::Diagnostics;
use crate::formatter::{format_text, FormatOptions, Sender};
use crate::markup::{classify, Markup};
use crate::text_pool::MessagePools;

/// Title and description of the inline fallback result
pub const ERROR_RESULT_TITLE: &str = "error!";

/// Upper bound (exclusive) of the random offset added to result identifiers
const ID_OFFSET_RANGE: u64 = 10_000;

/// Outgoing message, independent of the interaction type
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPayload {
    Article {
        text: String,
        parse_mode: Option<ParseMode>,
    },
    Photo {
        url: String,
        caption: String,
        parse_mode: Option<ParseMode>,
    },
}

/// One entry of an inline query answer
#[derive(Debug, Clone, PartialEq)]
pub struct InlineResult {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumb_url: Option<String>,
    pub payload: ReplyPayload,
}

/// Best-effort unique identifier: current unix millis plus a random
/// offset, in lowercase hex
pub fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_id_at(Utc::now().timestamp_millis(), rng)
}

pub fn random_id_at<R: Rng + ?Sized>(unix_millis: i64, rng: &mut R) -> String {
    let base = u64::try_from(unix_millis).unwrap_or_default();
    format!("{:x}", base + rng.gen_range(0..ID_OFFSET_RANGE))
}

pub struct ResponseBuilder<'a> {
    pools: &'a MessagePools,
    options: FormatOptions,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> ResponseBuilder<'a> {
    pub fn new(
        pools: &'a MessagePools,
        options: FormatOptions,
        diagnostics: &'a dyn Diagnostics,
    ) -> Self {
        Self {
            pools,
            options,
            diagnostics,
        }
    }

    /// Pick, classify and format a message for `sender`
    pub fn payload<R: Rng + ?Sized>(&self, sender: &Sender, rng: &mut R) -> ReplyPayload {
        let picked = self.pools.contents.pick(rng);
        self.payload_for(picked, sender, rng)
    }

    /// Classify and format an already picked message
    pub fn payload_for<R: Rng + ?Sized>(
        &self,
        picked: &str,
        sender: &Sender,
        rng: &mut R,
    ) -> ReplyPayload {
        let wraps = self.pools.wraps.as_slice();
        match classify(picked, self.diagnostics) {
            Markup::Image { src, alt } => ReplyPayload::Photo {
                url: src,
                caption: format_text(&alt, sender, wraps, false, self.options, rng),
                parse_mode: Some(ParseMode::Html),
            },
            Markup::PlainText(text) => ReplyPayload::Article {
                text: format_text(&text, sender, wraps, true, self.options, rng),
                parse_mode: Some(ParseMode::Html),
            },
        }
    }

    /// Single result for an inline query
    pub fn inline_result<R: Rng + ?Sized>(&self, sender: &Sender, rng: &mut R) -> InlineResult {
        let id = random_id(rng);
        let title = self.pools.titles.pick(rng).to_string();
        let thumb_url = self.pools.thumb_urls.pick(rng).to_string();
        InlineResult {
            id,
            title,
            description: None,
            thumb_url: Some(thumb_url),
            payload: self.payload(sender, rng),
        }
    }

    /// Direct reply to the slash-command
    pub fn command_reply<R: Rng + ?Sized>(&self, sender: &Sender, rng: &mut R) -> ReplyPayload {
        self.payload(sender, rng)
    }

    /// Minimal inline result carrying a message from the error pool
    pub fn error_result<R: Rng + ?Sized>(&self, rng: &mut R) -> InlineResult {
        InlineResult {
            id: random_id(rng),
            title: ERROR_RESULT_TITLE.to_string(),
            description: Some(ERROR_RESULT_TITLE.to_string()),
            thumb_url: None,
            payload: ReplyPayload::Article {
                text: self.error_text(rng),
                parse_mode: None,
            },
        }
    }

    /// Plain message from the error pool
    pub fn error_text<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.pools.errors.pick(rng).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_id_is_hex_near_timestamp() {
        let mut rng = StdRng::seed_from_u64(3);
        let id = random_id_at(1_700_000_000_000, &mut rng);
        let value = u64::from_str_radix(&id, 16).unwrap();
        assert!((1_700_000_000_000..1_700_000_010_000).contains(&value));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn test_random_id_negative_clock_does_not_panic() {
        let mut rng = StdRng::seed_from_u64(3);
        let value = u64::from_str_radix(&random_id_at(-5, &mut rng), 16).unwrap();
        assert!(value < ID_OFFSET_RANGE);
    }
}
