// ABOUTME: Error types for rollout orchestration.
// ABOUTME: Wraps the failing phase and app/revision for operator display.

use crate::health::HealthError;
use crate::provider::{ContainerError, DaprError, RevisionError};
use crate::types::{AppName, RevisionName};
use thiserror::Error;

/// Errors from rollout state transitions, tagged with the failing phase.
#[derive(Debug, Error)]
pub enum RolloutError {
    #[error("{app}: deploy failed: {source}")]
    Deploy {
        app: AppName,
        source: ContainerError,
    },

    #[error("{app}: sidecar validation failed: {source}")]
    Sidecar { app: AppName, source: DaprError },

    #[error("{app}: health wait failed: {source}")]
    Health { app: AppName, source: HealthError },

    #[error("{app}: staging revision failed: {source}")]
    Stage { app: AppName, source: RevisionError },

    #[error("{app}: revision {revision} not ready: {source}")]
    RevisionHealth {
        app: AppName,
        revision: RevisionName,
        source: HealthError,
    },

    #[error("{app}: traffic split failed: {source}")]
    Traffic { app: AppName, source: RevisionError },
}

/// Error kind for programmatic handling (exit codes, retry policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutErrorKind {
    /// Malformed spec or sidecar config. Fatal; never retried.
    Validation,
    /// A control-plane call failed.
    Execution,
    /// A health wait exceeded its deadline.
    Timeout,
    /// Terminal Failed state or a failed endpoint probe.
    HealthCheck,
}

impl RolloutError {
    pub fn kind(&self) -> RolloutErrorKind {
        match self {
            RolloutError::Deploy { source, .. } => match source {
                ContainerError::SpecInvalid(_) => RolloutErrorKind::Validation,
                _ => RolloutErrorKind::Execution,
            },
            RolloutError::Sidecar { source, .. } => match source {
                DaprError::MissingAppId | DaprError::InvalidAppPort => {
                    RolloutErrorKind::Validation
                }
                _ => RolloutErrorKind::Execution,
            },
            RolloutError::Health { source, .. } | RolloutError::RevisionHealth { source, .. } => {
                match source {
                    HealthError::Timeout { .. } => RolloutErrorKind::Timeout,
                    _ => RolloutErrorKind::HealthCheck,
                }
            }
            RolloutError::Stage { source, .. } | RolloutError::Traffic { source, .. } => {
                match source {
                    RevisionError::SpecInvalid(_) => RolloutErrorKind::Validation,
                    _ => RolloutErrorKind::Execution,
                }
            }
        }
    }
}
