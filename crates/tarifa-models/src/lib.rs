pub mod config;
pub mod price;
pub mod snapshot;
pub mod trigger;

pub use config::{BotConfig, CacheConfig, PricesConfig, TarifaConfig};
pub use price::PriceEntry;
pub use snapshot::{DailySnapshot, SlotRecord};
pub use trigger::{BotReplyDecision, ReplyPool, TriggerSpec};
