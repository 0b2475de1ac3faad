use thiserror::Error;

/// Failure classes of a claim cycle.
///
/// `Configuration` and `Claim` leave no state behind and are retried on the
/// next tick. `Payment` is recorded per holder and never aborts a batch.
/// `Persistence` after a transfer went out cannot be compensated and is
/// only logged.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Fee claim failed: {0}")]
    Claim(String),

    #[error("Holder fetch failed: {0}")]
    HolderFetch(String),

    #[error("Payment to {address} failed: {reason}")]
    Payment { address: String, reason: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Claim already in progress")]
    ClaimInProgress,
}

impl EngineError {
    pub fn persistence(err: anyhow::Error) -> Self {
        EngineError::Persistence(format!("{:#}", err))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
