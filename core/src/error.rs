use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid snapshot for month '{month}': {reason}")]
    InvalidSnapshot { month: String, reason: String },

    #[error("Risk factor '{factor}' out of range [0, 100]: {value}")]
    InvalidRiskFactor { factor: &'static str, value: f64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
