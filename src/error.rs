//! Error types for RMI driver operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RmiError>;

#[derive(Error, Debug)]
pub enum RmiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed telegram: {0}")]
    Telegram(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
