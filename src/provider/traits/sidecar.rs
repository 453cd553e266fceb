// ABOUTME: Sidecar injection capability for deployment providers.
// ABOUTME: Attaches validated sidecar configuration to a container spec.

use super::dapr::DaprError;
use super::sealed::Sealed;
use super::shared_types::{ContainerSpec, DaprSidecarConfig};
use async_trait::async_trait;

/// Sidecar configuration injection.
#[async_trait]
pub trait DaprSidecarInjector: Sealed + Send + Sync {
    /// Attach the sidecar configuration to the spec.
    async fn inject_sidecar(
        &self,
        spec: &mut ContainerSpec,
        config: &DaprSidecarConfig,
    ) -> Result<(), DaprError>;

    /// Validate a sidecar configuration without touching the platform.
    fn validate_sidecar_config(&self, config: &DaprSidecarConfig) -> Result<(), DaprError>;

    /// Logical name of the sidecar for an app ID.
    ///
    /// Pure and deterministic; used for log and metric correlation, not
    /// for addressing the sidecar process.
    fn sidecar_name(&self, app_id: &str) -> String;
}
