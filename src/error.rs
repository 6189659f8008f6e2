use crate::models::MonitorConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TurfPlanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    MonitorConfig(#[from] MonitorConfigError),

    #[error("Invalid recurrence pattern: {}", .0.join("; "))]
    InvalidPattern(Vec<String>),

    #[error("Unknown treatment type: {0}")]
    UnknownTreatment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Alert delivery failed: {0}")]
    AlertDelivery(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, TurfPlanError>;
