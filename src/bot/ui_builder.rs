//! UI Builder module for converting reply payloads into Telegram types

use anyhow::{Context, Result};
use reqwest::Url;
use teloxide::types::{
    InlineQueryResult, InlineQueryResultArticle, InlineQueryResultPhoto, InputMessageContent,
    InputMessageContentText,
};

use super::response_builder::{InlineResult, ReplyPayload};
use crate::diagnostics::Diagnostics;

/// Build the Telegram inline result.
///
/// A photo result fails when its URL is invalid. A bad thumbnail is dropped
/// from articles and replaced by the photo itself for photos.
pub fn to_inline_query_result(
    result: InlineResult,
    diagnostics: &dyn Diagnostics,
) -> Result<InlineQueryResult> {
    let thumbnail = result
        .thumb_url
        .as_deref()
        .and_then(|thumb| match Url::parse(thumb) {
            Ok(url) => Some(url),
            Err(e) => {
                diagnostics.warn(&format!("Ignoring invalid thumbnail url {thumb:?}: {e}"));
                None
            }
        });

    match result.payload {
        ReplyPayload::Article { text, parse_mode } => {
            let mut content = InputMessageContentText::new(text);
            content.parse_mode = parse_mode;

            let mut article = InlineQueryResultArticle::new(
                result.id,
                result.title,
                InputMessageContent::Text(content),
            );
            article.description = result.description;
            article.thumbnail_url = thumbnail;

            Ok(InlineQueryResult::Article(article))
        }
        ReplyPayload::Photo {
            url,
            caption,
            parse_mode,
        } => {
            let photo_url =
                Url::parse(&url).with_context(|| format!("Invalid photo url {url:?}"))?;
            let thumbnail = thumbnail.unwrap_or_else(|| photo_url.clone());

            let mut photo = InlineQueryResultPhoto::new(result.id, photo_url, thumbnail);
            photo.title = Some(result.title);
            photo.description = result.description;
            photo.caption = Some(caption).filter(|c| !c.is_empty());
            photo.parse_mode = parse_mode;

            Ok(InlineQueryResult::Photo(photo))
        }
    }
}
