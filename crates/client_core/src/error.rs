use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid AQI endpoint '{0}'")]
    InvalidUrl(String),
    #[error("AQI request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("AQI endpoint answered with status {0}")]
    Status(u16),
    #[error("AQI payload could not be used: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("balance {balance} is below the minimum of {minimum} coins needed to redeem")]
    InsufficientBalance { balance: u64, minimum: u64 },
    #[error("wallet storage failed: {0:#}")]
    Storage(#[from] anyhow::Error),
}
