use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::WatchError;

const ENV_FILE: &str = ".env";
const ENV_PASSWORD: &str = "DEAL_WATCH_EMAIL_PASSWORD";
const ENV_RECIPIENTS: &str = "DEAL_WATCH_EMAIL_RECIPIENTS";
const ENV_SENT_FILE: &str = "DEAL_WATCH_SENT_FILE";

/// Upstream listing endpoints refuse anything above this.
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    pub filter: FilterConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listing sort orders accepted by the feed.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Hot,
    #[default]
    New,
    Top,
    Rising,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Hot => "hot",
            SortOrder::New => "new",
            SortOrder::Top => "top",
            SortOrder::Rising => "rising",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub subreddit: String,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub user_agent: String,
    #[serde(default = "default_feed_timeout")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://www.reddit.com".to_string()
}
fn default_limit() -> u32 { 50 }
fn default_feed_timeout() -> u64 { 10_000 }

/// The three term groups the rule filter is built from.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FilterConfig {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub qualify: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub from: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub subject: String,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_ms: u64,
}

fn default_smtp_port() -> u16 { 587 }
fn default_smtp_timeout() -> u64 { 30_000 }

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("sent_posts.json")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { path: default_state_path() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RenderConfig {
    /// Replaces the built-in digest layout when set.
    pub template_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file: None }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), WatchError> {
        if self.feed.subreddit.trim().is_empty() {
            return Err(WatchError::Config("feed.subreddit must not be empty".into()));
        }
        if self.feed.limit == 0 || self.feed.limit > MAX_LIMIT {
            return Err(WatchError::Config(format!(
                "feed.limit must be between 1 and {}, got {}",
                MAX_LIMIT, self.feed.limit
            )));
        }
        if self.feed.user_agent.trim().is_empty() {
            return Err(WatchError::Config("feed.user_agent is required by the upstream".into()));
        }
        if self.filter.allow.is_empty() || self.filter.qualify.is_empty() {
            tracing::warn!("filter.allow or filter.qualify is empty; no item can match");
        }
        Ok(())
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// SMTP password. Only required when mail is actually sent.
    pub fn email_password() -> Result<String> {
        match std::env::var(ENV_PASSWORD) {
            Ok(pw) if !pw.is_empty() => Ok(sanitize_value(&pw)),
            _ => anyhow::bail!("{} is not set", ENV_PASSWORD),
        }
    }

    /// Recipients from the environment (comma-separated), falling back to `[mail] recipients`.
    pub fn email_recipients(&self) -> Result<Vec<String>> {
        let recipients = match std::env::var(ENV_RECIPIENTS) {
            Ok(raw) if !raw.trim().is_empty() => split_recipients(&raw),
            _ => self.mail.recipients.clone(),
        };
        if recipients.is_empty() {
            anyhow::bail!("no recipients: set {} or [mail] recipients", ENV_RECIPIENTS);
        }
        Ok(recipients)
    }

    /// State file location: environment first, then `[state] path`.
    pub fn sent_file(&self) -> PathBuf {
        match std::env::var(ENV_SENT_FILE) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(sanitize_value(&p)),
            _ => self.state.path.clone(),
        }
    }
}

fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(sanitize_value)
        .filter(|r| !r.is_empty())
        .collect()
}

/// Strip carriage returns, BOM, and other invisible chars from an env value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
