//! # Bot Configuration Module
//!
//! Loads the JSON configuration file: Telegram token, launch mode, logging,
//! the five message sources and the static block lists.
//!
//! The file path comes from `DRESSBOT_CONFIG` and defaults to
//! `config/config.json`. `TELEGRAM_BOT_TOKEN` overrides the `token` field.

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;

use crate::errors::ConfigError;
use crate::formatter::{FormatOptions, WRAP_PROBABILITY};
use crate::text_pool::{MessageSources, TextSource};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";
pub const ENV_CONFIG_PATH: &str = "DRESSBOT_CONFIG";
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const DEFAULT_COMMAND: &str = "dress";

/// How updates are received
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchType {
    #[default]
    Polling,
    Webhook,
}

/// Minimum log level written by the subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    /// Extra log file; empty or missing means console only
    #[serde(default)]
    pub logfile: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn logfile(&self) -> Option<&Path> {
        self.logfile
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawWebhook {
    #[serde(default)]
    port: u16,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    certificate_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawMessages {
    title: serde_json::Value,
    thumb_url: serde_json::Value,
    content: serde_json::Value,
    wrap: serde_json::Value,
    error: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    launch_type: LaunchType,
    #[serde(default)]
    webhook: Option<RawWebhook>,
    #[serde(default)]
    logging: LoggingConfig,
    msgs: RawMessages,
    #[serde(default)]
    msgs_dir: Option<PathBuf>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    wrap_probability: Option<f64>,
    #[serde(default)]
    block_from_ids: Vec<u64>,
    #[serde(default)]
    ignore_chat_ids: Vec<i64>,
}

/// Validated webhook settings
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookConfig {
    pub address: SocketAddr,
    pub url: Url,
    pub path: Option<String>,
    pub certificate_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Launch {
    Polling,
    Webhook(WebhookConfig),
}

/// Fully validated configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub token: Option<String>,
    pub launch: Launch,
    pub logging: LoggingConfig,
    pub messages: MessageSources,
    /// Base directory for relative message file paths
    pub assets_dir: PathBuf,
    pub command: String,
    pub format: FormatOptions,
    pub block_from_ids: HashSet<u64>,
    pub ignore_chat_ids: HashSet<i64>,
}

impl BotConfig {
    /// Load from `$DRESSBOT_CONFIG` or `config/config.json`
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load(&path)
    }

    /// Load from an explicit file; relative message files resolve against
    /// its directory unless `msgs_dir` says otherwise
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::from_json_str(&content, config_dir).map_err(|e| match e {
            ConfigError::Json { reason, .. } => ConfigError::Json {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse and validate configuration text
    pub fn from_json_str(content: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(content).map_err(|e| ConfigError::Json {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;

        let messages = MessageSources {
            title: TextSource::from_value("title", raw.msgs.title)?,
            thumb_url: TextSource::from_value("thumb_url", raw.msgs.thumb_url)?,
            content: TextSource::from_value("content", raw.msgs.content)?,
            wrap: TextSource::from_value("wrap", raw.msgs.wrap)?,
            error: TextSource::from_value("error", raw.msgs.error)?,
        };

        let launch = match raw.launch_type {
            LaunchType::Polling => Launch::Polling,
            LaunchType::Webhook => Launch::Webhook(validate_webhook(raw.webhook)?),
        };

        let wrap_probability = raw.wrap_probability.unwrap_or(WRAP_PROBABILITY);
        if !(0.0..=1.0).contains(&wrap_probability) {
            return Err(ConfigError::Invalid {
                field: "wrap_probability".to_string(),
                reason: format!("{wrap_probability} is outside [0, 1]"),
            });
        }

        let command = raw
            .command
            .map(|c| c.trim().trim_start_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_COMMAND.to_string());
        if command.is_empty() || command.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "command".to_string(),
                reason: format!("{command:?} is not a valid command name"),
            });
        }

        let assets_dir = match raw.msgs_dir {
            Some(dir) if dir.is_relative() => config_dir.join(dir),
            Some(dir) => dir,
            None => config_dir.to_path_buf(),
        };

        Ok(Self {
            token: raw.token.filter(|t| !t.trim().is_empty()),
            launch,
            logging: raw.logging,
            messages,
            assets_dir,
            command,
            format: FormatOptions { wrap_probability },
            block_from_ids: raw.block_from_ids.into_iter().collect(),
            ignore_chat_ids: raw.ignore_chat_ids.into_iter().collect(),
        })
    }

    /// Bot token, preferring the environment value over the file
    pub fn resolve_token(&self, from_env: Option<String>) -> Result<String, ConfigError> {
        from_env
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.token.clone())
            .ok_or_else(|| ConfigError::Invalid {
                field: "token".to_string(),
                reason: format!("set {ENV_BOT_TOKEN} or the token field"),
            })
    }
}

fn validate_webhook(raw: Option<RawWebhook>) -> Result<WebhookConfig, ConfigError> {
    let raw = raw.ok_or_else(|| ConfigError::Invalid {
        field: "webhook".to_string(),
        reason: "launch_type is webhook but no webhook section is present".to_string(),
    })?;

    let url_text = raw.url.unwrap_or_default();
    let url = Url::parse(&url_text).map_err(|e| ConfigError::Invalid {
        field: "webhook.url".to_string(),
        reason: format!("can't parse webhook url {url_text:?}: {e}"),
    })?;

    if raw.port == 0 {
        return Err(ConfigError::Invalid {
            field: "webhook.port".to_string(),
            reason: "port must be non-zero".to_string(),
        });
    }

    Ok(WebhookConfig {
        address: SocketAddr::from(([0, 0, 0, 0], raw.port)),
        url,
        path: raw.path.filter(|p| !p.is_empty()),
        certificate_path: raw
            .certificate_path
            .filter(|p| !p.as_os_str().is_empty()),
    })
}
