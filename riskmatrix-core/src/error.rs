//! Error types for the risk scoring engine.
//!
//! Uses `thiserror` for public API error types. Every failure in this crate is
//! a local computation failure caused by bad input or bad configuration; none
//! of them are transient or worth retrying.

/// Top-level error type for the riskmatrix core library.
#[derive(Debug, thiserror::Error)]
pub enum RiskMatrixError {
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while validating engine inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    /// A frequency or impact rating outside `1..=5`.
    #[error("Invalid rating for {field}: {value} (expected 1-5)")]
    InvalidRating { field: &'static str, value: i64 },

    #[error("Invalid grid cell key '{0}' (expected \"prob-imp\")")]
    InvalidCell(String),

    #[error("Unknown option for {criterion}: '{label}'")]
    UnknownOption {
        criterion: &'static str,
        label: String,
    },

    #[error("Unknown risk level: '{0}'")]
    UnknownLevel(String),

    /// A cause lacks its frequency, or carries neither a global impact nor
    /// any dimension ratings.
    #[error("Cause has no {0} rating")]
    MissingRating(&'static str),
}

/// Errors from loading or validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Weights for {name} must sum to 1.0, got {sum}")]
    InvalidWeights { name: &'static str, sum: f64 },

    #[error("Effectiveness thresholds must be strictly descending within 0-100: {0}")]
    InvalidThresholds(String),

    #[error("Mitigation for '{tier}' must be within 0.0-1.0 and not exceed the tier above, got {value}")]
    InvalidMitigation { tier: String, value: f64 },

    #[error("Level palette must contain at least one level")]
    EmptyPalette,

    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Failed to write configuration: {0}")]
    Save(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Convenience result alias for the core crate.
pub type Result<T> = std::result::Result<T, RiskMatrixError>;
