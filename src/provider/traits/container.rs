// ABOUTME: Container lifecycle capability for deployment providers.
// ABOUTME: Deploy, stop, health wait, logs, and scope-wide cleanup.

use super::sealed::Sealed;
use super::shared_types::{CleanupResult, ContainerSpec, HealthProbeResult, SpecError};
use crate::health::HealthError;
use crate::types::{AppName, ImageRef};
use async_trait::async_trait;
use std::time::Duration;

/// Container lifecycle operations.
///
/// Safe to call concurrently for different app names; calls for the same
/// name must be serialized by the caller.
#[async_trait]
pub trait ContainerProvider: Sealed + Send + Sync {
    /// Verify the provider can reach its control plane.
    async fn initialize(&self) -> Result<(), ContainerError>;

    /// Deploy the spec, creating the app or rolling a new revision of it.
    async fn deploy_container(&self, spec: &ContainerSpec) -> Result<(), ContainerError>;

    /// Stop an app by scaling its replicas to zero. Never deletes.
    async fn stop_container(&self, name: &AppName) -> Result<(), ContainerError>;

    /// Block until the app reaches a healthy state or the timeout elapses.
    async fn wait_for_container_health(
        &self,
        name: &AppName,
        timeout: Duration,
    ) -> Result<HealthProbeResult, HealthError>;

    /// Fetch the last `tail` log lines for an app.
    async fn container_logs(&self, name: &AppName, tail: u32) -> Result<String, ContainerError>;

    /// Whether the app is currently provisioned and serving.
    async fn is_container_running(&self, name: &AppName) -> Result<bool, ContainerError>;

    /// Make the image available to the platform.
    async fn pull_image(&self, image: &ImageRef) -> Result<(), ContainerError>;

    /// List all apps in the provider's scope.
    async fn list_containers(&self) -> Result<Vec<AppName>, ContainerError>;

    /// Stop every app in scope, best-effort per item.
    async fn cleanup(&self) -> Result<CleanupResult, ContainerError>;
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("app not found: {0}")]
    NotFound(String),

    #[error("invalid spec: {0}")]
    SpecInvalid(String),

    #[error("control plane error: {0}")]
    ControlPlane(String),
}

impl From<SpecError> for ContainerError {
    fn from(err: SpecError) -> Self {
        ContainerError::SpecInvalid(err.to_string())
    }
}

impl From<crate::controlplane::ControlPlaneError> for ContainerError {
    fn from(err: crate::controlplane::ControlPlaneError) -> Self {
        ContainerError::ControlPlane(err.to_string())
    }
}
