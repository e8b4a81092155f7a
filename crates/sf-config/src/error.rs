//! Configuration error taxonomy

use thiserror::Error;

/// Configuration defects, surfaced before any RTP computation runs
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required config section: {0}")]
    MissingSection(&'static str),

    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("symbol weights must be non-empty with a positive total")]
    DegenerateWeights,

    #[error("{context} references unknown symbol `{symbol}`")]
    UnknownSymbol {
        context: &'static str,
        symbol: String,
    },

    #[error("symbol `{symbol}` is assigned more than one special role")]
    DuplicateRole { symbol: String },

    #[error("payout for `{combo}` must be non-negative, got {value}")]
    NegativePayout { combo: String, value: f64 },

    #[error("unknown difficulty preset `{name}`, available: {available}")]
    UnknownPreset { name: String, available: String },

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
