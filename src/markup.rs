//! # Markup Classifier Module
//!
//! Decides whether a picked message is an image reference
//! (`<img src="..." alt="...">` spanning the whole message) or plain text.
//!
//! Attribute extraction is done by a small single-tag parser that accepts
//! double-quoted, single-quoted and unquoted values in any order. Anything
//! it cannot make sense of is reported through `Diagnostics` and treated as
//! plain text.

use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostics::Diagnostics;
use crate::errors::MarkupError;

static IMG_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<img.*>$").expect("image shape pattern should be valid"));

/// Result of classifying a message
#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    PlainText(String),
    Image { src: String, alt: String },
}

/// Attributes extracted from a single `<img>` tag
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTag {
    pub src: String,
    pub alt: Option<String>,
}

/// Whether the text has the overall shape of a lone image tag
pub fn looks_like_image(text: &str) -> bool {
    IMG_SHAPE.is_match(text.trim())
}

/// Classify a message, falling back to plain text when an image-shaped
/// message cannot be parsed
pub fn classify(text: &str, diagnostics: &dyn Diagnostics) -> Markup {
    if !looks_like_image(text) {
        return Markup::PlainText(text.to_string());
    }

    match parse_img_tag(text) {
        Ok(tag) => Markup::Image {
            src: tag.src,
            alt: tag.alt.unwrap_or_default(),
        },
        Err(e) => {
            diagnostics.warn(&format!("Failure: fail to parse img html \"{text}\": {e}"));
            Markup::PlainText(text.to_string())
        }
    }
}

/// Parse a message consisting of exactly one `<img ...>` tag
pub fn parse_img_tag(text: &str) -> Result<ImageTag, MarkupError> {
    let text = text.trim();
    let rest = text
        .get(..4)
        .filter(|head| head.eq_ignore_ascii_case("<img"))
        .map(|_| &text[4..])
        .ok_or(MarkupError::NotImageTag)?;

    let mut scanner = Scanner::new(rest);
    if !scanner.at_end() && !scanner.peek_is(|c| c.is_whitespace() || c == '/' || c == '>') {
        return Err(MarkupError::NotImageTag);
    }

    let mut src = None;
    let mut alt = None;

    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            None => return Err(MarkupError::Malformed("unterminated tag".to_string())),
            Some('>') => {
                scanner.bump();
                break;
            }
            Some('/') => {
                scanner.bump();
                scanner.skip_whitespace();
                if scanner.peek() != Some('>') {
                    return Err(MarkupError::Malformed("stray '/' in tag".to_string()));
                }
            }
            Some(_) => {
                let (name, value) = scanner.attribute()?;
                match name.to_ascii_lowercase().as_str() {
                    "src" if src.is_none() => src = value.map(|v| decode_entities(&v)),
                    // alt ends up in an HTML caption, so it stays as written
                    "alt" if alt.is_none() => alt = value,
                    _ => {}
                }
            }
        }
    }

    if !scanner.remaining().trim().is_empty() {
        return Err(MarkupError::Malformed(
            "content after the image tag".to_string(),
        ));
    }

    match src {
        Some(src) if !src.trim().is_empty() => Ok(ImageTag {
            src: src.trim().to_string(),
            alt,
        }),
        _ => Err(MarkupError::MissingSrc),
    }
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_is(&self, pred: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(pred)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_is(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek_is(&pred) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    /// `name`, `name=value`, `name="value"` or `name='value'`
    fn attribute(&mut self) -> Result<(String, Option<String>), MarkupError> {
        let name = self.take_while(|c| !c.is_whitespace() && !matches!(c, '=' | '/' | '>' | '"' | '\''));
        if name.is_empty() {
            return Err(MarkupError::Malformed(format!(
                "unexpected character {:?}",
                self.peek().unwrap_or_default()
            )));
        }

        self.skip_whitespace();
        if self.peek() != Some('=') {
            return Ok((name.to_string(), None));
        }
        self.bump();
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let value = self.take_while(|c| c != quote);
                if self.bump() != Some(quote) {
                    return Err(MarkupError::Malformed(format!(
                        "unterminated value for {name}"
                    )));
                }
                value
            }
            Some(_) => self.take_while(|c| !c.is_whitespace() && c != '>'),
            None => {
                return Err(MarkupError::Malformed(format!("missing value for {name}")));
            }
        };

        Ok((name.to_string(), Some(value.to_string())))
    }
}

/// Decode the handful of entities that show up in `src` URLs
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_order_and_quoting() {
        let tag = parse_img_tag("<img alt='hi there' src=u.png>").unwrap();
        assert_eq!(tag.src, "u.png");
        assert_eq!(tag.alt.as_deref(), Some("hi there"));

        let tag = parse_img_tag("<IMG SRC=\"a.jpg\" class=\"x\" alt=\"cap\" />").unwrap();
        assert_eq!(tag.src, "a.jpg");
        assert_eq!(tag.alt.as_deref(), Some("cap"));
    }

    #[test]
    fn test_entities_decoded_in_src_only() {
        let tag = parse_img_tag("<img src=\"https://e.org/p?a=1&amp;b=2\" alt=\"&lt;3\">").unwrap();
        assert_eq!(tag.src, "https://e.org/p?a=1&b=2");
        assert_eq!(tag.alt.as_deref(), Some("&lt;3"));
    }

    #[test]
    fn test_malformed_tags() {
        assert_eq!(parse_img_tag("<img alt=\"x\">"), Err(MarkupError::MissingSrc));
        assert_eq!(parse_img_tag("<img src=\"\">"), Err(MarkupError::MissingSrc));
        assert!(matches!(
            parse_img_tag("<img src=\"a.png>"),
            Err(MarkupError::Malformed(_))
        ));
        assert!(matches!(
            parse_img_tag("<img src=a.png> and <b>more</b>"),
            Err(MarkupError::Malformed(_))
        ));
        assert_eq!(parse_img_tag("<imgx src=a>"), Err(MarkupError::NotImageTag));
    }

    #[test]
    fn test_shape_requires_whole_string() {
        assert!(looks_like_image("<img src=\"u.png\">"));
        assert!(!looks_like_image("look: <img src=\"u.png\">"));
        assert!(!looks_like_image("hello {NAME}"));
    }
}
