use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("strategy id must not be empty")]
    EmptyStrategyId,

    #[error("strategy not found: {0}")]
    StrategyNotFound(String),

    #[error("backend does not support {endpoint} (HTTP {status})")]
    UnsupportedEndpoint { endpoint: &'static str, status: u16 },

    #[error("strategy '{strategy_id}' has conflicting references: {detail}")]
    Conflict { strategy_id: String, detail: String },

    #[error("strategy '{strategy_id}' still in conflict after re-purging its jobs: {detail}")]
    StillInConflict { strategy_id: String, detail: String },

    #[error("purging jobs for strategy '{strategy_id}' exceeded {rounds} rounds; retry later")]
    PurgeLimitExceeded { strategy_id: String, rounds: u32 },

    #[error("unexpected HTTP {status} from {endpoint}: {detail}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: u16,
        detail: String,
    },

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;
