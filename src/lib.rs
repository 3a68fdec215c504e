//! # Dressbot
//!
//! A Telegram bot answering inline queries and a single slash-command with a
//! randomly picked message. Messages come from configurable pools and may be
//! plain HTML text or an `<img>` tag, which is sent as a photo.

pub mod bot;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod formatter;
pub mod logging;
pub mod markup;
pub mod selector;
pub mod text_pool;
