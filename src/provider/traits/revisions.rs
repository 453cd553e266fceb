// ABOUTME: Revision lifecycle capability for deployment providers.
// ABOUTME: Revision creation, weighted traffic splitting, soft retirement.

use super::sealed::Sealed;
use super::shared_types::ContainerSpec;
use crate::controlplane::Revision;
use crate::health::HealthError;
use crate::types::{AppName, RevisionName, TrafficWeight};
use async_trait::async_trait;
use std::time::Duration;

/// Revision lifecycle and traffic-splitting operations.
///
/// Revisions are never deleted through this interface — deactivation is
/// the only retirement, preserving rollback capability.
#[async_trait]
pub trait RevisionManager: Sealed + Send + Sync {
    /// Roll a new revision of the app and route `traffic` percent to it.
    ///
    /// Returns the name of the revision that was created.
    async fn update_container_app_revision(
        &self,
        spec: &ContainerSpec,
        traffic: TrafficWeight,
    ) -> Result<RevisionName, RevisionError>;

    /// Rebuild the app's traffic table around a new revision weight.
    ///
    /// The remaining weight is split across the other active revisions by
    /// integer division; the truncation remainder is not redistributed, so
    /// the submitted table may sum to less than 100.
    async fn configure_traffic_splitting(
        &self,
        app: &AppName,
        new_revision: &RevisionName,
        weight: TrafficWeight,
    ) -> Result<(), RevisionError>;

    /// All revisions currently known to the platform for the app.
    async fn list_app_revisions(&self, app: &AppName) -> Result<Vec<Revision>, RevisionError>;

    /// Soft-retire a revision. It remains addressable for rollback.
    async fn deactivate_revision(
        &self,
        app: &AppName,
        revision: &RevisionName,
    ) -> Result<(), RevisionError>;

    /// Block until the revision is listed active or the timeout elapses.
    async fn wait_for_revision_ready(
        &self,
        app: &AppName,
        revision: &RevisionName,
        timeout: Duration,
    ) -> Result<(), HealthError>;
}

/// Errors from revision operations.
#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    #[error("revision not found: {0}")]
    NotFound(String),

    #[error("invalid spec: {0}")]
    SpecInvalid(String),

    #[error("control plane error: {0}")]
    ControlPlane(String),
}

impl From<crate::controlplane::ControlPlaneError> for RevisionError {
    fn from(err: crate::controlplane::ControlPlaneError) -> Self {
        RevisionError::ControlPlane(err.to_string())
    }
}

impl From<crate::provider::SpecError> for RevisionError {
    fn from(err: crate::provider::SpecError) -> Self {
        RevisionError::SpecInvalid(err.to_string())
    }
}
