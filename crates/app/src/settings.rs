//! Layered application settings.
//!
//! Values come from `config/settings.{toml,yaml,...}` overridden by
//! `CELENGAN_*` environment variables (e.g. `CELENGAN_TELEGRAM__TOKEN`).

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub telegram: Telegram,
    pub database: Database,
}

#[derive(Clone, Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Clone, Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    /// When set the bot receives updates over HTTP instead of long polling.
    pub webhook: Option<Webhook>,
    /// Dialogues idle for longer than this are dropped. Off when absent.
    pub session_idle_timeout_minutes: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Webhook {
    /// Public HTTPS url Telegram delivers updates to.
    pub url: String,
    /// Local address the webhook listener binds, e.g. `0.0.0.0:8443`.
    pub bind: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(PathBuf),
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(Environment::with_prefix("CELENGAN").separator("__"))
            .build()?
            .try_deserialize()
    }
}
