use serde::{Deserialize, Serialize};

use crate::snapshot::DEFAULT_SLOT_FILE;
use crate::trigger::TriggerSpec;

/// Shown instead of secret values when the configuration is logged.
pub const REDACTED: &str = "***PRIVATE***";

/// Top-level configuration for the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TarifaConfig {
    #[serde(default)]
    pub prices: PricesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub bot: BotConfig,
    /// Evaluated in declaration order; the first structural match decides.
    #[serde(default)]
    pub triggers: Vec<TriggerSpec>,
}

/// Configuration for the upstream pricing API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricesConfig {
    /// Endpoint returning the cheapest slots of the current day.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Market zone code.
    #[serde(default = "default_zone")]
    pub zone: String,
    /// Number of ranked entries to request.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            zone: default_zone(),
            count: default_count(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Configuration for the daily price cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Path of the single slot file.
    #[serde(default = "default_slot_path")]
    pub path: String,
    /// Maximum number of days kept in the in-memory hot layer.
    #[serde(default = "default_memory_capacity")]
    pub memory_max_capacity: u64,
    /// How long a day stays in the hot layer, in seconds.
    #[serde(default = "default_memory_ttl")]
    pub memory_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_slot_path(),
            memory_max_capacity: default_memory_capacity(),
            memory_ttl_seconds: default_memory_ttl(),
        }
    }
}

/// Chat-facing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotConfig {
    /// Messaging platform token. Never logged.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Reply to `/start`.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Master switch for trigger replies.
    #[serde(default = "default_true")]
    pub replies_enabled: bool,
    /// Probability in `[0, 1]` that a matched trigger produces a reply.
    #[serde(default = "default_verbosity")]
    pub verbosity: f64,
    /// Tracing filter used when `RUST_LOG` is unset, e.g. `info` or `tarifa=debug`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            webhook_url: None,
            greeting: default_greeting(),
            replies_enabled: true,
            verbosity: default_verbosity(),
            log_level: default_log_level(),
        }
    }
}

impl TarifaConfig {
    /// `(name, value)` pairs describing the effective configuration, secrets redacted.
    pub fn log_entries(&self) -> Vec<(&'static str, String)> {
        let token = match &self.bot.token {
            Some(_) => REDACTED.to_string(),
            None => "<unset>".to_string(),
        };
        vec![
            ("prices.api_url", self.prices.api_url.clone()),
            ("prices.zone", self.prices.zone.clone()),
            ("prices.count", self.prices.count.to_string()),
            ("prices.timeout_seconds", self.prices.timeout_seconds.to_string()),
            ("cache.path", self.cache.path.clone()),
            ("cache.memory_max_capacity", self.cache.memory_max_capacity.to_string()),
            ("cache.memory_ttl_seconds", self.cache.memory_ttl_seconds.to_string()),
            ("bot.token", token),
            (
                "bot.webhook_url",
                self.bot.webhook_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            ),
            ("bot.replies_enabled", self.bot.replies_enabled.to_string()),
            ("bot.verbosity", self.bot.verbosity.to_string()),
            ("bot.log_level", self.bot.log_level.clone()),
            ("triggers", self.triggers.len().to_string()),
        ]
    }
}

fn default_api_url() -> String {
    "https://api.preciodelaluz.org/v1/prices/cheapests".to_string()
}
fn default_zone() -> String {
    "PCB".to_string()
}
fn default_count() -> usize {
    5
}
fn default_timeout() -> u64 {
    30
}
fn default_slot_path() -> String {
    DEFAULT_SLOT_FILE.to_string()
}
fn default_memory_capacity() -> u64 {
    4
}
fn default_memory_ttl() -> u64 {
    3600
}
fn default_greeting() -> String {
    "Hola! Estoy listo para darte información sobre el precio de la luz. \
     Usa el comando /help para ver las acciones disponibles."
        .to_string()
}
fn default_true() -> bool {
    true
}
fn default_verbosity() -> f64 {
    0.5
}
fn default_log_level() -> String {
    "info".to_string()
}
