// ABOUTME: Application-wide error types for polepole.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown destination: {0}")]
    UnknownDestination(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Rollout(#[from] crate::rollout::RolloutError),

    #[error(transparent)]
    Lock(#[from] crate::rollout::LockError),

    #[error("provider error: {0}")]
    Provider(#[from] crate::provider::ContainerError),

    #[error("revision error: {0}")]
    Revision(#[from] crate::provider::RevisionError),

    #[error("sidecar error: {0}")]
    Dapr(#[from] crate::provider::DaprError),

    #[error("health status error: {0}")]
    Probe(#[from] crate::provider::ProbeError),

    #[error("control plane error: {0}")]
    ControlPlane(#[from] crate::controlplane::ControlPlaneError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
