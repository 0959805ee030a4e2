use serde::{Deserialize, Serialize};

/// Raw upstream prices are quoted in €/MWh.
pub const RAW_UNITS_PER_KWH: f64 = 1000.0;

/// One ranked hourly slot as shown to users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceEntry {
    /// Slot label as returned upstream, e.g. `"03-04"`.
    pub hour: String,
    /// Price in €/kWh. `None` when upstream omitted it.
    pub price_per_kwh: Option<f64>,
}

impl PriceEntry {
    pub fn new(hour: impl Into<String>, price_per_kwh: Option<f64>) -> Self {
        Self {
            hour: hour.into(),
            price_per_kwh,
        }
    }

    /// Build an entry from the upstream €/MWh value.
    pub fn from_raw(hour: impl Into<String>, raw_price: Option<f64>) -> Self {
        Self::new(hour, raw_price.map(|p| p / RAW_UNITS_PER_KWH))
    }

    /// Render as a ranked display line. A missing price leaves the numeric field empty.
    ///
    /// Line breaks in the hour label become spaces: one entry is always one line.
    pub fn render(&self, rank: usize) -> String {
        let price = self
            .price_per_kwh
            .map(|p| format!("{p:.3}"))
            .unwrap_or_default();
        let hour = self.hour.replace(['\r', '\n'], " ");
        format!("{rank}. <b>{hour}</b>: {price} € / kWh.")
    }
}
