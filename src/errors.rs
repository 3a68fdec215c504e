//! # Error Types Module
//!
//! Error types for message pool loading, image markup classification and
//! reply delivery. Startup errors are fatal; markup and delivery errors are
//! recovered by the caller.

use std::path::PathBuf;

use teloxide::{ApiError, RequestError};

/// Errors raised while turning a `TextSource` into a content pool
#[derive(Debug, Clone, PartialEq)]
pub enum PoolError {
    /// The configured value has an unsupported shape
    Configuration { category: String, reason: String },
    /// Neither the given path nor the path under the assets directory exists
    FileNotFound {
        category: String,
        tried: Vec<PathBuf>,
    },
    /// The file exists but could not be read or decoded
    Parse {
        category: String,
        path: PathBuf,
        reason: String,
    },
    /// The source resolved to zero candidate strings
    Empty { category: String },
}

impl PoolError {
    /// Message category (`title`, `content`, ...) the error belongs to
    pub fn category(&self) -> &str {
        match self {
            PoolError::Configuration { category, .. }
            | PoolError::FileNotFound { category, .. }
            | PoolError::Parse { category, .. }
            | PoolError::Empty { category } => category,
        }
    }
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::Configuration { category, reason } => {
                write!(f, "Configuration error in msgs.{category}: {reason}")
            }
            PoolError::FileNotFound { category, tried } => {
                let tried = tried
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "File not found for msgs.{category} (tried: {tried})")
            }
            PoolError::Parse {
                category,
                path,
                reason,
            } => write!(
                f,
                "Parse error in msgs.{category} ({}): {reason}",
                path.display()
            ),
            PoolError::Empty { category } => {
                write!(f, "Configuration error in msgs.{category}: no messages")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Errors raised while loading and validating the bot configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration file could not be read
    Io { path: PathBuf, reason: String },
    /// The configuration file is not valid JSON for the expected shape
    Json { path: PathBuf, reason: String },
    /// A field has an invalid value
    Invalid { field: String, reason: String },
    /// One of the `msgs.*` sources has an invalid shape
    Messages(PoolError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, reason } => {
                write!(f, "Cannot read config {}: {reason}", path.display())
            }
            ConfigError::Json { path, reason } => {
                write!(f, "Invalid config {}: {reason}", path.display())
            }
            ConfigError::Invalid { field, reason } => {
                write!(f, "Configuration error in {field}: {reason}")
            }
            ConfigError::Messages(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Messages(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PoolError> for ConfigError {
    fn from(err: PoolError) -> Self {
        ConfigError::Messages(err)
    }
}

/// Errors raised while extracting attributes from an `<img>` candidate
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupError {
    /// Text does not look like a single image tag
    NotImageTag,
    /// Tag looks like an image but its attributes could not be parsed
    Malformed(String),
    /// Tag parsed but has no usable `src`
    MissingSrc,
}

impl std::fmt::Display for MarkupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkupError::NotImageTag => write!(f, "not an image tag"),
            MarkupError::Malformed(msg) => write!(f, "malformed image tag: {msg}"),
            MarkupError::MissingSrc => write!(f, "image tag has no src attribute"),
        }
    }
}

impl std::error::Error for MarkupError {}

/// Classification of a rejected outgoing reply
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryFailure {
    /// Telegram could not parse the HTML entities of the message
    CantParseEntities(String),
    /// The inline query expired before it was answered
    QueryExpired,
    /// Anything else reported by the transport
    Unexpected(String),
}

impl DeliveryFailure {
    /// Expected, transient failures are logged as warnings rather than errors
    pub fn is_expected(&self) -> bool {
        !matches!(self, DeliveryFailure::Unexpected(_))
    }
}

impl From<&RequestError> for DeliveryFailure {
    fn from(err: &RequestError) -> Self {
        match err {
            RequestError::Api(ApiError::CantParseEntities(msg)) => {
                DeliveryFailure::CantParseEntities(msg.clone())
            }
            RequestError::Api(ApiError::InvalidQueryId) => DeliveryFailure::QueryExpired,
            other => DeliveryFailure::Unexpected(other.to_string()),
        }
    }
}

impl std::fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryFailure::CantParseEntities(msg) => write!(f, "can't parse entities: {msg}"),
            DeliveryFailure::QueryExpired => write!(f, "inline query expired"),
            DeliveryFailure::Unexpected(msg) => write!(f, "delivery failed: {msg}"),
        }
    }
}

impl std::error::Error for DeliveryFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_display_names_category_and_path() {
        let err = PoolError::Parse {
            category: "content".to_string(),
            path: PathBuf::from("/tmp/content.json"),
            reason: "expected value".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("msgs.content"));
        assert!(msg.contains("/tmp/content.json"));
        assert_eq!(err.category(), "content");
    }

    #[test]
    fn test_delivery_failure_classification() {
        let parse = RequestError::Api(ApiError::CantParseEntities("bad tag".to_string()));
        assert_eq!(
            DeliveryFailure::from(&parse),
            DeliveryFailure::CantParseEntities("bad tag".to_string())
        );
        assert!(DeliveryFailure::from(&parse).is_expected());

        let expired = RequestError::Api(ApiError::InvalidQueryId);
        assert_eq!(DeliveryFailure::from(&expired), DeliveryFailure::QueryExpired);

        let other = RequestError::Api(ApiError::BotBlocked);
        assert!(!DeliveryFailure::from(&other).is_expected());
    }
}
