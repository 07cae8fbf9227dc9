use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("could not read manifest {path}: {reason}")]
    ManifestUnreadable { path: PathBuf, reason: String },

    #[error("malformed manifest {path}: {reason}")]
    ManifestMalformed { path: PathBuf, reason: String },

    #[error("could not scan {path}: {reason}")]
    ScanFailed { path: PathBuf, reason: String },

    #[error("template {0} not found")]
    TemplateMissing(PathBuf),

    #[error("failed to create issue: {0}")]
    Publish(String),

    #[error("issue tracker command '{0}' not found on PATH")]
    PublisherNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
