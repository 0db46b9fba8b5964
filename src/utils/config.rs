use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context as _;
use lettre::message::Mailbox;

impl Config {
    /// Load a `.toml` file from disk and parse it as a [`Config`].
    pub async fn load(file: &str) -> anyhow::Result<Config> {
        async fn load_inner(file: &str) -> anyhow::Result<Config> {
            let contents = tokio::fs::read_to_string(file).await?;
            Ok(toml::from_str(&contents)?)
        }
        load_inner(file).await.with_context(|| format!("loading config={file}"))
    }
}

/// Bag of app configuration values, parsed from a TOML file with serde.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub net: NetConfig,
    pub db: DbConfig,
    /// Optional; without it notifications go to the log only.
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Webapp configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct AppConfig {
    /// Public facing domain, e.g. `site.com`.
    pub domain: String,
    /// Public facing URL, e.g. `https://site.com`.
    pub url: String,
    /// Mailbox that receives contact/comment/milestone notifications.
    pub admin_email: Mailbox,
}

/// Networking configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NetConfig {
    /// HTTP server bind address.
    pub bind_addr: SocketAddr,
}

/// Database configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct DbConfig {
    /// Path to sqlite3 database file.
    pub file: PathBuf,
    pub seed_data: Option<PathBuf>,
}

/// Email configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct EmailConfig {
    /// SMTP address, starting with `smtp://`.
    pub smtp_addr: String,
    /// SMTP username.
    pub smtp_username: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
    /// Mailbox to send email from.
    pub from: Mailbox,
    /// Mailbox to put as ReplyTo.
    pub reply_to: Option<Mailbox>,
}

/// Anti-abuse configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct GuardConfig {
    /// Comments from these email domains skip moderation.
    #[serde(default)]
    pub trusted_domains: Vec<String>,
    /// Contact submissions from these email domains are refused.
    #[serde(default = "default_disposable_domains")]
    pub disposable_domains: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { trusted_domains: vec![], disposable_domains: default_disposable_domains() }
    }
}

fn default_disposable_domains() -> Vec<String> {
    ["tempmail.com", "throwaway.email", "10minutemail.com", "guerrillamail.com", "mailinator.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Read-cache configuration.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct CacheConfig {
    /// Default TTL for cached aggregate reads, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: default_cache_ttl() }
    }
}

fn default_cache_ttl() -> u64 {
    300
}
