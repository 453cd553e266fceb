// ABOUTME: External control-plane boundary for the managed platform.
// ABOUTME: The orchestrator talks to the platform only through this client.

mod az;
mod descriptor;
mod error;
mod types;

pub use az::AzCli;
pub use descriptor::*;
pub use error::ControlPlaneError;
pub use types::{AppDetails, Revision, TrafficAssignment};

use crate::types::{AppName, ResourceGroup, RevisionName};
use async_trait::async_trait;

/// Client for the platform control plane.
///
/// Deliberately not sealed: tests substitute a deterministic in-memory
/// fake instead of spawning external processes.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Check the control plane is reachable and authenticated.
    async fn verify(&self) -> Result<(), ControlPlaneError>;

    /// Create an application from a descriptor.
    async fn create_app(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        descriptor: &AppDescriptor,
    ) -> Result<AppDetails, ControlPlaneError>;

    /// Update an application, optionally naming the new revision via a suffix.
    async fn update_app(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        descriptor: &AppDescriptor,
        revision_suffix: Option<&str>,
    ) -> Result<AppDetails, ControlPlaneError>;

    /// Fetch current details for an application.
    async fn show_app(
        &self,
        name: &AppName,
        group: &ResourceGroup,
    ) -> Result<AppDetails, ControlPlaneError>;

    /// List all revisions of an application.
    async fn list_revisions(
        &self,
        name: &AppName,
        group: &ResourceGroup,
    ) -> Result<Vec<Revision>, ControlPlaneError>;

    /// Submit a complete traffic table in one atomic update.
    async fn set_traffic(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        assignments: &[TrafficAssignment],
    ) -> Result<(), ControlPlaneError>;

    /// Set the app's replica bounds. Scaling to zero stops it without deleting.
    async fn scale_app(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        min_replicas: u32,
        max_replicas: u32,
    ) -> Result<(), ControlPlaneError>;

    /// Deactivate a revision. The revision is retained, not deleted.
    async fn deactivate_revision(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        revision: &RevisionName,
    ) -> Result<(), ControlPlaneError>;

    /// Fetch the last `tail` log lines of an application.
    async fn show_logs(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        tail: u32,
    ) -> Result<String, ControlPlaneError>;

    /// List application names in the resource group.
    async fn list_apps(&self, group: &ResourceGroup) -> Result<Vec<AppName>, ControlPlaneError>;
}
