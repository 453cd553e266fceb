// ABOUTME: Dapr sidecar capability for deployment providers.
// ABOUTME: Sidecar deployment, configuration validation, and sidecar health.

use super::sealed::Sealed;
use super::shared_types::{ContainerSpec, HealthProbeResult};
use async_trait::async_trait;

/// Dapr sidecar operations.
#[async_trait]
pub trait DaprProvider: Sealed + Send + Sync {
    /// Ensure the spec's sidecar is attached.
    ///
    /// On managed platforms sidecar attachment is automatic, so this
    /// validates the enriched spec and issues no provisioning call. A
    /// self-managed provider would submit an explicit attach request here.
    async fn deploy_dapr_sidecar(&self, spec: &ContainerSpec) -> Result<(), DaprError>;

    /// Check that the deployed app has its sidecar enabled.
    async fn validate_dapr_configuration(&self, app_id: &str) -> Result<(), DaprError>;

    /// Probe the health of the app the sidecar fronts.
    async fn dapr_health(&self, app_id: &str) -> Result<HealthProbeResult, DaprError>;
}

/// Errors from sidecar operations and validation.
#[derive(Debug, thiserror::Error)]
pub enum DaprError {
    #[error("sidecar app ID is empty")]
    MissingAppId,

    #[error("sidecar app port must be greater than zero")]
    InvalidAppPort,

    #[error("app '{0}' does not have its sidecar enabled")]
    NotEnabled(String),

    #[error("no deployed app for sidecar ID '{0}'")]
    AppNotFound(String),

    #[error("control plane error: {0}")]
    ControlPlane(String),
}

impl From<crate::controlplane::ControlPlaneError> for DaprError {
    fn from(err: crate::controlplane::ControlPlaneError) -> Self {
        DaprError::ControlPlane(err.to_string())
    }
}
