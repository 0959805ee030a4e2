use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for PriceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PriceError::Decode(e.to_string())
        } else {
            PriceError::Network(e.to_string())
        }
    }
}
