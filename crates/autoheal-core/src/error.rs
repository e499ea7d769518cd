use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutohealError {
    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("action for alert '{0}' has an empty command")]
    EmptyCommand(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("no action mapped for alert '{0}'")]
    NoActionMapped(String),

    #[error("failed to spawn remediation: {0}")]
    SpawnFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AutohealError>;
