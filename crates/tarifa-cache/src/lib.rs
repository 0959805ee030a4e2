pub mod daily;
pub mod error;
pub mod memory;
pub mod slot;

pub mod test_support;

pub use daily::{CacheLookup, DailyPriceCache, MissReason};
pub use error::CacheError;
pub use slot::SlotFile;
