//! Configuration types and loading.
//!
//! Config is loaded from an optional JSON file and the environment. Environment
//! variables (`ACCESS_TOKEN`, `CHANNEL_SECRET`, `PORT`, `BIND`, `LINE_API_BASE`)
//! override file values. Secrets are resolved once at startup into [`Credentials`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default LINE Messaging API base URL.
pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE channel settings.
    #[serde(default)]
    pub line: LineConfig,
}

/// Bind address and port for the callback server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 8000). Overridden by PORT env.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"). Overridden by BIND env.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_port() -> u16 {
    8000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// LINE channel config. Both secrets may also come from the environment.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    /// Channel access token for the reply API. Overridden by ACCESS_TOKEN env.
    pub access_token: Option<String>,
    /// Channel secret for webhook signatures. Overridden by CHANNEL_SECRET env.
    pub channel_secret: Option<String>,
    /// Messaging API base URL. Overridden by LINE_API_BASE env.
    pub api_base: Option<String>,
}

impl fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("channel_secret", &self.channel_secret.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("access token not configured (set ACCESS_TOKEN or line.accessToken)")]
    MissingAccessToken,
    #[error("channel secret not configured (set CHANNEL_SECRET or line.channelSecret)")]
    MissingChannelSecret,
    #[error("invalid port: {0:?}")]
    InvalidPort(String),
}

/// Secrets used for the lifetime of the process: the access token authorizes
/// replies, the channel secret verifies inbound signatures.
#[derive(Clone)]
pub struct Credentials {
    access_token: String,
    channel_secret: String,
}

impl Credentials {
    /// Build credentials from resolved values. Blank values count as missing.
    /// The access token is trimmed; the channel secret is kept byte-for-byte
    /// since it is the HMAC key.
    pub fn from_parts(
        access_token: Option<String>,
        channel_secret: Option<String>,
    ) -> Result<Self, ConfigError> {
        let access_token =
            non_empty(access_token.as_deref()).ok_or(ConfigError::MissingAccessToken)?;
        let channel_secret = channel_secret
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingChannelSecret)?;
        Ok(Self {
            access_token,
            channel_secret,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn channel_secret(&self) -> &str {
        &self.channel_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("channel_secret", &"<redacted>")
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Like [`non_empty`] but returns the value untrimmed.
fn present(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}

/// Reads one environment variable.
fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolve the access token: env ACCESS_TOKEN overrides config.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    access_token_from(config, process_env)
}

fn access_token_from(config: &Config, env: impl Fn(&str) -> Option<String>) -> Option<String> {
    non_empty(env("ACCESS_TOKEN").as_deref())
        .or_else(|| non_empty(config.line.access_token.as_deref()))
}

/// Resolve the channel secret: env CHANNEL_SECRET overrides config. Not trimmed.
pub fn resolve_channel_secret(config: &Config) -> Option<String> {
    channel_secret_from(config, process_env)
}

fn channel_secret_from(config: &Config, env: impl Fn(&str) -> Option<String>) -> Option<String> {
    present(env("CHANNEL_SECRET").as_deref())
        .or_else(|| present(config.line.channel_secret.as_deref()))
}

/// Resolve both secrets; fails if either is absent.
pub fn resolve_credentials(config: &Config) -> Result<Credentials, ConfigError> {
    credentials_from(config, process_env)
}

fn credentials_from(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, ConfigError> {
    Credentials::from_parts(access_token_from(config, &env), channel_secret_from(config, &env))
}

/// Parse a port override, falling back to `default` when unset or blank.
pub fn parse_port(value: Option<&str>, default: u16) -> Result<u16, ConfigError> {
    match non_empty(value) {
        None => Ok(default),
        Some(s) => s.parse().map_err(|_| ConfigError::InvalidPort(s)),
    }
}

/// Resolve the listen port: env PORT overrides config.
pub fn resolve_port(config: &Config) -> Result<u16, ConfigError> {
    port_from(config, process_env)
}

fn port_from(config: &Config, env: impl Fn(&str) -> Option<String>) -> Result<u16, ConfigError> {
    parse_port(env("PORT").as_deref(), config.server.port)
}

/// Resolve the bind address: env BIND overrides config.
pub fn resolve_bind(config: &Config) -> String {
    bind_from(config, process_env)
}

fn bind_from(config: &Config, env: impl Fn(&str) -> Option<String>) -> String {
    non_empty(env("BIND").as_deref()).unwrap_or_else(|| config.server.bind.trim().to_string())
}

/// Resolve the Messaging API base URL (trailing slash stripped).
pub fn resolve_line_api_base(config: &Config) -> String {
    line_api_base_from(config, process_env)
}

fn line_api_base_from(config: &Config, env: impl Fn(&str) -> Option<String>) -> String {
    non_empty(env("LINE_API_BASE").as_deref())
        .or_else(|| non_empty(config.line.api_base.as_deref()))
        .unwrap_or_else(|| DEFAULT_LINE_API_BASE.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Everything the relay needs at startup, resolved once from config and env.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub bind: String,
    pub port: u16,
    pub api_base: String,
    pub credentials: Credentials,
}

/// Resolve startup settings; fails if a secret is missing or PORT is not a number.
pub fn resolve_settings(config: &Config) -> Result<RelaySettings, ConfigError> {
    settings_from(config, process_env)
}

fn settings_from(
    config: &Config,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RelaySettings, ConfigError> {
    let credentials = credentials_from(config, &env)?;
    Ok(RelaySettings {
        bind: bind_from(config, &env),
        port: port_from(config, &env)?,
        api_base: line_api_base_from(config, &env),
        credentials,
    })
}

/// Resolve config path from env or default (`line-echo.json` in the working directory).
pub fn default_config_path() -> PathBuf {
    std::env::var("LINE_ECHO_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("line-echo.json"))
}

/// Load config from `path` (or the default path). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
