//! # Template Formatter Module
//!
//! Placeholder substitution for picked messages.
//!
//! - `{TEXT}` is replaced by the picked message verbatim (it is expected to
//!   already be valid Telegram HTML)
//! - `{NAME}` is replaced by a `tg://user` mention whose visible text is the
//!   HTML-escaped display name of the sender
//!
//! Occasionally the message is embedded in a random wrap template first.

use rand::Rng;
use teloxide::types::User;

use crate::selector;

pub const TEXT_PLACEHOLDER: &str = "{TEXT}";
pub const NAME_PLACEHOLDER: &str = "{NAME}";

/// Default chance that a message gets wrapped
pub const WRAP_PROBABILITY: f64 = 0.03;

/// The user a reply is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl Sender {
    pub fn new(id: u64, first_name: impl Into<String>, last_name: Option<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name,
        }
    }

    /// First and last name joined by a space, unescaped
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name,
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    /// HTML anchor mentioning the user
    pub fn mention(&self) -> String {
        format!(
            "<a href=\"tg://user?id={}\">{}</a>",
            self.id,
            escape_html(&self.display_name())
        )
    }
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Escape `& < > " '` for embedding in HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Substitute `{TEXT}` and then `{NAME}` into `template`
pub fn render(template: &str, text: &str, sender: &Sender) -> String {
    template
        .replace(TEXT_PLACEHOLDER, text)
        .replace(NAME_PLACEHOLDER, &sender.mention())
}

/// Wrapping behaviour shared by every call site
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatOptions {
    pub wrap_probability: f64,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            wrap_probability: WRAP_PROBABILITY,
        }
    }
}

impl FormatOptions {
    /// Never wrap
    pub fn without_wrap() -> Self {
        Self {
            wrap_probability: 0.0,
        }
    }
}

/// Format a picked message for `sender`.
///
/// With `allow_wrap` unset (image captions) no wrap is applied and the roll
/// is skipped entirely.
pub fn format_text<R: Rng + ?Sized>(
    text: &str,
    sender: &Sender,
    wraps: &[String],
    allow_wrap: bool,
    options: FormatOptions,
    rng: &mut R,
) -> String {
    let template = if allow_wrap && roll_wrap(options.wrap_probability, rng) {
        selector::pick(wraps, rng)
            .map(String::as_str)
            .unwrap_or(TEXT_PLACEHOLDER)
    } else {
        TEXT_PLACEHOLDER
    };
    render(template, text, sender)
}

fn roll_wrap<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
    probability > 0.0 && rng.gen::<f64>() < probability
}
