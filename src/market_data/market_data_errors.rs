use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("No price found: {0}")]
    PriceNotFound(String),

    #[error("Invalid price data: {0}")]
    InvalidPrice(String),

    #[error("Fetch error: {0}")]
    FetchError(String),
}
