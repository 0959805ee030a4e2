use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tarifa_models::config::PricesConfig;
use tarifa_models::price::PriceEntry;
use tracing::{debug, instrument, warn};

use crate::error::PriceError;

/// Source of the cheapest hourly slots. Mockable for testing.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    /// Cheapest `count` slots for `zone`, in upstream order (ascending price).
    async fn fetch_cheapest(
        &self,
        date: NaiveDate,
        zone: &str,
        count: usize,
    ) -> Result<Vec<PriceEntry>, PriceError>;
}

/// HTTP client for the preciodelaluz.org API.
pub struct PriceClient {
    client: Client,
    api_url: String,
}

impl PriceClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, PriceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    pub fn from_config(config: &PricesConfig) -> Result<Self, PriceError> {
        Self::new(
            config.api_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl PriceSource for PriceClient {
    fn name(&self) -> &str {
        "preciodelaluz"
    }

    #[instrument(skip(self))]
    async fn fetch_cheapest(
        &self,
        date: NaiveDate,
        zone: &str,
        count: usize,
    ) -> Result<Vec<PriceEntry>, PriceError> {
        let count = count.to_string();
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("zone", zone), ("n", count.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Pricing API returned an error status");
            return Err(PriceError::Network(format!(
                "pricing API returned {status}"
            )));
        }

        let body = response.text().await?;
        let entries = parse_cheapest(&body)?;
        debug!(entries = entries.len(), "Fetched cheapest prices");
        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    #[serde(default)]
    hour: Option<String>,
    #[serde(default)]
    price: Option<f64>,
}

/// Decode the upstream body: a JSON array of `{hour, price}` objects, price in €/MWh.
///
/// Absent or null fields are tolerated; a negative price is rejected.
pub fn parse_cheapest(body: &str) -> Result<Vec<PriceEntry>, PriceError> {
    let raw: Vec<RawPrice> = serde_json::from_str(body)
        .map_err(|e| PriceError::Decode(format!("unexpected pricing payload: {e}")))?;

    raw.into_iter()
        .map(|item| {
            if let Some(price) = item.price {
                if price < 0.0 {
                    return Err(PriceError::Decode(format!(
                        "negative price {price} for hour {:?}",
                        item.hour
                    )));
                }
            }
            Ok(PriceEntry::from_raw(item.hour.unwrap_or_default(), item.price))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_payload() {
        let body = r#"[
            {"date": "05-06-2024", "hour": "03-04", "is-cheap": true, "market": "PVPC", "price": 101.6, "units": "€/MWh"},
            {"date": "05-06-2024", "hour": "04-05", "is-cheap": true, "market": "PVPC", "price": 104.0, "units": "€/MWh"}
        ]"#;
        let entries = parse_cheapest(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].hour, "03-04");
        assert_eq!(entries[0].render(1), "1. <b>03-04</b>: 0.102 € / kWh.");
        assert_eq!(entries[1].price_per_kwh, Some(0.104));
    }

    #[test]
    fn keeps_upstream_order() {
        let body = r#"[{"hour": "b", "price": 200}, {"hour": "a", "price": 100}]"#;
        let entries = parse_cheapest(body).unwrap();
        assert_eq!(entries[0].hour, "b");
        assert_eq!(entries[1].hour, "a");
    }

    #[test]
    fn missing_fields_do_not_fail() {
        let body = r#"[{"hour": "00-01"}, {"price": null}, {}]"#;
        let entries = parse_cheapest(body).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].price_per_kwh, None);
        assert_eq!(entries[1].hour, "");
        assert_eq!(entries[2].render(3), "3. <b></b>:  € / kWh.");
    }

    #[test]
    fn non_json_is_decode_error() {
        let err = parse_cheapest("<html>down for maintenance</html>").unwrap_err();
        assert!(matches!(err, PriceError::Decode(_)));
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let err = parse_cheapest(r#"{"hour": "00-01", "price": 1}"#).unwrap_err();
        assert!(matches!(err, PriceError::Decode(_)));

        let err = parse_cheapest(r#"[{"hour": "00-01", "price": "cheap"}]"#).unwrap_err();
        assert!(matches!(err, PriceError::Decode(_)));
    }

    #[test]
    fn negative_price_is_decode_error() {
        let err = parse_cheapest(r#"[{"hour": "00-01", "price": -3.0}]"#).unwrap_err();
        assert!(matches!(err, PriceError::Decode(_)));
    }

    #[test]
    fn client_from_default_config() {
        let client = PriceClient::from_config(&PricesConfig::default()).unwrap();
        assert_eq!(client.name(), "preciodelaluz");
        assert_eq!(
            client.api_url(),
            "https://api.preciodelaluz.org/v1/prices/cheapests"
        );
    }
}
