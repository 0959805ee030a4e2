pub mod client;
pub mod error;

pub use client::{parse_cheapest, PriceClient, PriceSource};
pub use error::PriceError;
