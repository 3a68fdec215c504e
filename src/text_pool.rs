//! # Text Pool Module
//!
//! Turns the `msgs.*` configuration values into in-memory message pools.
//!
//! ## Sources
//!
//! - A single string becomes a one-message pool
//! - A list of strings is used as-is
//! - A file reference `{ "path": ..., "parsemode": "text" | "json" }` is read
//!   once at startup. `text` files hold comma-separated messages, `json`
//!   files hold an array of strings.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::diagnostics::Diagnostics;
use crate::errors::PoolError;
use crate::selector;

/// How a referenced file is split into messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    #[serde(alias = "txt")]
    Text,
    Json,
}

/// File reference inside a `TextSource`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileRef {
    pub path: PathBuf,
    #[serde(default)]
    pub parsemode: ParseMode,
}

/// Where the messages of one category come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextSource {
    Literal(String),
    List(Vec<String>),
    File(FileRef),
}

impl TextSource {
    /// Validate a raw configuration value for `category`
    pub fn from_value(category: &str, value: serde_json::Value) -> Result<Self, PoolError> {
        serde_json::from_value(value).map_err(|_| PoolError::Configuration {
            category: category.to_string(),
            reason: "expected a string, a list of strings or { \"path\", \"parsemode\" }"
                .to_string(),
        })
    }
}

/// Materialize a source into its ordered list of messages.
///
/// Lists come back unchanged and literals as a one-element list. Relative
/// file paths that do not exist as given are looked up under `assets_dir`.
pub fn produce_content_pool(
    category: &str,
    source: &TextSource,
    assets_dir: &Path,
) -> Result<Vec<String>, PoolError> {
    match source {
        TextSource::Literal(text) => Ok(vec![text.clone()]),
        TextSource::List(items) => Ok(items.clone()),
        TextSource::File(file) => {
            let path = resolve_path(category, &file.path, assets_dir)?;

            let bytes = fs::read(&path).map_err(|e| PoolError::Parse {
                category: category.to_string(),
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let content = String::from_utf8(bytes).map_err(|e| PoolError::Parse {
                category: category.to_string(),
                path: path.clone(),
                reason: format!("file is not valid UTF-8: {e}"),
            })?;

            match file.parsemode {
                ParseMode::Json => {
                    serde_json::from_str::<Vec<String>>(&content).map_err(|e| PoolError::Parse {
                        category: category.to_string(),
                        path,
                        reason: e.to_string(),
                    })
                }
                ParseMode::Text => Ok(split_text(&content)),
            }
        }
    }
}

/// Split comma-separated content, trimming pieces and dropping empty ones
pub fn split_text(content: &str) -> Vec<String> {
    content
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve_path(category: &str, path: &Path, assets_dir: &Path) -> Result<PathBuf, PoolError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    let fallback = assets_dir.join(path);
    if fallback.is_file() {
        return Ok(fallback);
    }

    let mut tried = vec![path.to_path_buf()];
    if fallback != path {
        tried.push(fallback);
    }
    Err(PoolError::FileNotFound {
        category: category.to_string(),
        tried,
    })
}

/// Non-empty, immutable list of messages for one category
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPool {
    items: Vec<String>,
}

impl ContentPool {
    /// Wrap already loaded messages, rejecting an empty list
    pub fn new(category: &str, items: Vec<String>) -> Result<Self, PoolError> {
        if items.is_empty() {
            return Err(PoolError::Empty {
                category: category.to_string(),
            });
        }
        Ok(Self { items })
    }

    /// Load and validate a pool from its configured source
    pub fn load(
        category: &str,
        source: &TextSource,
        assets_dir: &Path,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Self, PoolError> {
        let items = produce_content_pool(category, source, assets_dir)?;
        let pool = Self::new(category, items)?;
        let origin = match source {
            TextSource::Literal(_) => "literal".to_string(),
            TextSource::List(_) => "list".to_string(),
            TextSource::File(file) => file.path.display().to_string(),
        };
        diagnostics.info(&format!(
            "Loaded {} messages for \"{category}\" from {origin}",
            pool.len()
        ));
        Ok(pool)
    }

    /// Random message from the pool
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        selector::pick(&self.items, rng)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The five message categories the bot draws from
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePools {
    pub titles: ContentPool,
    pub thumb_urls: ContentPool,
    pub contents: ContentPool,
    pub wraps: ContentPool,
    pub errors: ContentPool,
}

/// Validated sources for every message category
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSources {
    pub title: TextSource,
    pub thumb_url: TextSource,
    pub content: TextSource,
    pub wrap: TextSource,
    pub error: TextSource,
}

impl MessagePools {
    /// Load every category, failing on the first broken one
    pub fn load(
        sources: &MessageSources,
        assets_dir: &Path,
        diagnostics: &dyn Diagnostics,
    ) -> Result<Self, PoolError> {
        let load = |category: &str, source: &TextSource| {
            ContentPool::load(category, source, assets_dir, diagnostics)
        };
        Ok(Self {
            titles: load("title", &sources.title)?,
            thumb_urls: load("thumb_url", &sources.thumb_url)?,
            contents: load("content", &sources.content)?,
            wraps: load("wrap", &sources.wrap)?,
            errors: load("error", &sources.error)?,
        })
    }

    /// Pools built from literal lists, mostly useful in tests
    pub fn from_lists(
        titles: &[&str],
        thumb_urls: &[&str],
        contents: &[&str],
        wraps: &[&str],
        errors: &[&str],
    ) -> Result<Self, PoolError> {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Ok(Self {
            titles: ContentPool::new("title", owned(titles))?,
            thumb_urls: ContentPool::new("thumb_url", owned(thumb_urls))?,
            contents: ContentPool::new("content", owned(contents))?,
            wraps: ContentPool::new("wrap", owned(wraps))?,
            errors: ContentPool::new("error", owned(errors))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_text_trims_and_drops_empties() {
        assert_eq!(split_text("a, b ,,c"), vec!["a", "b", "c"]);
        assert_eq!(split_text(" \n , ,"), Vec::<String>::new());
    }

    #[test]
    fn test_source_shapes_from_config_values() {
        assert_eq!(
            TextSource::from_value("title", json!("hello")).unwrap(),
            TextSource::Literal("hello".to_string())
        );
        assert_eq!(
            TextSource::from_value("title", json!(["a", "b"])).unwrap(),
            TextSource::List(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            TextSource::from_value("content", json!({ "path": "content.txt" })).unwrap(),
            TextSource::File(FileRef {
                path: PathBuf::from("content.txt"),
                parsemode: ParseMode::Text,
            })
        );
        assert_eq!(
            TextSource::from_value("content", json!({ "path": "c.txt", "parsemode": "txt" }))
                .unwrap(),
            TextSource::File(FileRef {
                path: PathBuf::from("c.txt"),
                parsemode: ParseMode::Text,
            })
        );
    }

    #[test]
    fn test_malformed_source_is_configuration_error() {
        for value in [json!(42), json!({ "file": "x" }), json!([1, 2]), json!(null)] {
            let err = TextSource::from_value("wrap", value).unwrap_err();
            assert!(matches!(err, PoolError::Configuration { ref category, .. } if category == "wrap"));
        }
    }

    #[test]
    fn test_empty_pool_rejected() {
        let err = ContentPool::new("error", Vec::new()).unwrap_err();
        assert_eq!(
            err,
            PoolError::Empty {
                category: "error".to_string()
            }
        );
    }
}
