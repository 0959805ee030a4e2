use tarifa_prices::PriceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Price fetch failed: {0}")]
    Price(#[from] PriceError),
}
