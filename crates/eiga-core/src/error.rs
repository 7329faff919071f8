use thiserror::Error;

#[derive(Debug, Error)]
pub enum EigaError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid thresholds: high {high} must be >= low {low}, both within 0..=100")]
    InvalidThresholds { high: f64, low: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
