//! tarifa - electricity price chat bot
//!
//! Answers `/cheapest` with the day's cheapest hourly slots, cached in a
//! single slot file, and replies to free text through configurable triggers.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use tarifa::models::config::TarifaConfig;
//! use tarifa::cache::{DailyPriceCache, SlotFile};
//! use tarifa::triggers::TriggerEngine;
//! use tarifa::{build_bot, Bot, Command};
//! ```

pub use tarifa_cache as cache;
pub use tarifa_models as models;
pub use tarifa_prices as prices;
pub use tarifa_triggers as triggers;

pub mod bot;
pub mod uptime;

pub use bot::{Bot, Command};

use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context};
use tarifa_cache::DailyPriceCache;
use tarifa_models::config::TarifaConfig;
use tarifa_prices::{PriceClient, PriceSource};
use tarifa_triggers::TriggerEngine;

/// Environment variables that override the file configuration.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const WEBHOOK_ENV: &str = "WEBHOOK_URL";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Read, parse, override from the environment and validate a TOML config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<TarifaConfig, anyhow::Error> {
    let path = path.as_ref();
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let mut config: TarifaConfig =
        toml::from_str(&config_str).with_context(|| "Failed to parse config")?;

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

/// Apply `TELEGRAM_BOT_TOKEN`, `WEBHOOK_URL` and `LOG_LEVEL` overrides using `lookup`.
pub fn apply_overrides<F>(config: &mut TarifaConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
        config.bot.token = Some(token);
    }
    if let Some(url) = lookup(WEBHOOK_ENV).filter(|v| !v.is_empty()) {
        config.bot.webhook_url = Some(url);
    }
    if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|v| !v.is_empty()) {
        config.bot.log_level = level.to_lowercase();
    }
}

pub fn validate(config: &TarifaConfig) -> Result<(), anyhow::Error> {
    ensure!(
        (0.0..=1.0).contains(&config.bot.verbosity),
        "bot.verbosity must be within [0, 1], got {}",
        config.bot.verbosity
    );
    ensure!(config.prices.count > 0, "prices.count must be positive");
    ensure!(
        config.prices.timeout_seconds > 0,
        "prices.timeout_seconds must be positive"
    );
    ensure!(!config.cache.path.is_empty(), "cache.path must not be empty");
    Ok(())
}

/// Build a Bot backed by the HTTP price client.
pub fn build_bot(config: &TarifaConfig) -> Result<Bot, anyhow::Error> {
    let client = PriceClient::from_config(&config.prices)?;
    Ok(build_bot_with_source(config, Arc::new(client)))
}

/// Build a Bot around any price source.
pub fn build_bot_with_source(config: &TarifaConfig, source: Arc<dyn PriceSource>) -> Bot {
    let cache = DailyPriceCache::from_config(&config.cache, &config.prices, source);
    let triggers = TriggerEngine::from_config(config);
    Bot::new(config.bot.clone(), cache, triggers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarifa_cache::test_support::CountingSource;

    #[test]
    fn env_overrides_token_and_webhook() {
        let mut config = TarifaConfig::default();
        apply_overrides(&mut config, |key| match key {
            TOKEN_ENV => Some("123:abc".to_string()),
            WEBHOOK_ENV => Some("https://example.org/hook".to_string()),
            LOG_LEVEL_ENV => Some("DEBUG".to_string()),
            _ => None,
        });
        assert_eq!(config.bot.log_level, "debug");
        assert_eq!(config.bot.token.as_deref(), Some("123:abc"));
        assert_eq!(
            config.bot.webhook_url.as_deref(),
            Some("https://example.org/hook")
        );
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = TarifaConfig::default();
        config.bot.token = Some("from-file".to_string());
        apply_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.bot.token.as_deref(), Some("from-file"));
        assert_eq!(config.bot.log_level, "info");
    }

    #[test]
    fn validate_rejects_bad_verbosity() {
        let mut config = TarifaConfig::default();
        assert!(validate(&config).is_ok());

        config.bot.verbosity = 1.5;
        assert!(validate(&config).is_err());

        config.bot.verbosity = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn validate_rejects_zero_count() {
        let mut config = TarifaConfig::default();
        config.prices.count = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tarifa.toml");
        std::fs::write(
            &path,
            r#"
[bot]
verbosity = 0.1

[[triggers]]
words = ["luz"]
reply = "💡"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.bot.verbosity, 0.1);
        assert_eq!(config.triggers.len(), 1);
        assert_eq!(config.prices.zone, "PCB");
    }

    #[test]
    fn load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tarifa.toml");
        std::fs::write(&path, "[bot]\nverbosity = 2.0\n").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[tokio::test]
    async fn built_bot_serves_prices_from_configured_slot() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = TarifaConfig::default();
        config.cache.path = dir.path().join("today.csv").to_string_lossy().to_string();

        let source = Arc::new(CountingSource::five_cheapest(100.0));
        let bot = build_bot_with_source(&config, source.clone());
        let today = chrono::NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();

        let message = bot.cheapest(today).await.unwrap();
        assert!(message.starts_with("<pre>Hoy 05/06/2024</pre>"));
        assert_eq!(source.calls(), 1);
        assert!(bot.cache().slot().path().exists());
    }

    #[test]
    fn build_bot_with_http_client() {
        assert!(build_bot(&TarifaConfig::default()).is_ok());
    }
}
