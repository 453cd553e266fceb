// ABOUTME: Health status capability for deployment providers.
// ABOUTME: Provisioning-state probes and endpoint resolution.

use super::sealed::Sealed;
use super::shared_types::ProvisioningState;
use crate::types::AppName;
use async_trait::async_trait;

/// Point-in-time health queries.
///
/// The polling engine drives these; implementations must not cache the
/// answers — every call re-queries the control plane.
#[async_trait]
pub trait ContainerHealthChecker: Sealed + Send + Sync {
    /// Current provisioning state of the app.
    async fn check_container_status(&self, name: &AppName)
    -> Result<ProvisioningState, ProbeError>;

    /// Externally reachable health endpoint URL for the app.
    async fn container_endpoint(&self, name: &AppName) -> Result<String, ProbeError>;
}

/// Errors from health status queries.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("app not found: {0}")]
    AppNotFound(String),

    #[error("app '{0}' has no external endpoint")]
    NoEndpoint(String),

    #[error("control plane error: {0}")]
    ControlPlane(String),
}

impl From<crate::controlplane::ControlPlaneError> for ProbeError {
    fn from(err: crate::controlplane::ControlPlaneError) -> Self {
        ProbeError::ControlPlane(err.to_string())
    }
}
