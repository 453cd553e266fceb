// ABOUTME: Shared types used across provider trait definitions.
// ABOUTME: ContainerSpec, DaprSidecarConfig, ProvisioningState, HealthProbeResult.

use crate::types::{AppName, ImageRef};
use std::collections::HashMap;
use std::str::FromStr;

/// Declarative description of a deployable unit.
///
/// Built by the caller from configuration; validated and enriched before it
/// reaches a provider.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    /// Application name, unique per platform scope.
    pub name: AppName,
    /// Image to deploy. The platform pulls it server-side.
    pub image: ImageRef,
    /// Port the application listens on.
    pub port: u16,
    /// Service-mesh application ID; absent for apps without a sidecar.
    pub dapr_app_id: Option<String>,
    /// Environment variables, resolved to plain strings.
    pub env: HashMap<String, String>,
    /// Resource limits.
    pub resources: Option<ResourceLimits>,
    /// HTTP path for the platform-side liveness probe.
    pub health_path: Option<String>,
    /// Sidecar configuration, populated by enrichment before deploy.
    pub dapr: Option<DaprSidecarConfig>,
    /// Provider-specific extension block.
    pub extensions: ProviderExtensions,
}

impl ContainerSpec {
    pub fn new(name: AppName, image: ImageRef, port: u16) -> Self {
        Self {
            name,
            image,
            port,
            dapr_app_id: None,
            env: HashMap::new(),
            resources: None,
            health_path: None,
            dapr: None,
            extensions: ProviderExtensions::None,
        }
    }

    /// Check the invariants a provider relies on.
    ///
    /// Name and image are non-empty by construction; the port is the one
    /// field a caller can still get wrong.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.port == 0 {
            return Err(SpecError::InvalidPort(self.name.clone()));
        }
        Ok(())
    }
}

/// Errors from spec validation.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("{0}: listening port must be greater than zero")]
    InvalidPort(AppName),
}

/// Resource limits for a container app.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLimits {
    /// CPU cores (1.0 = 1 CPU).
    pub cpus: f64,
    /// Memory quantity in platform notation, e.g. "512Mi".
    pub memory: String,
}

/// Platform-specific deployment hints.
///
/// Providers read the variant they understand and ignore the rest.
#[derive(Debug, Clone, Default)]
pub enum ProviderExtensions {
    #[default]
    None,
    /// Hints for managed container-app platforms.
    Managed(ManagedExtensions),
}

/// Scaling and ingress hints for a managed platform.
#[derive(Debug, Clone)]
pub struct ManagedExtensions {
    pub min_replicas: u32,
    pub max_replicas: u32,
    /// Expose the app through external ingress.
    pub external_ingress: bool,
}

impl Default for ManagedExtensions {
    fn default() -> Self {
        Self {
            min_replicas: 1,
            max_replicas: 1,
            external_ingress: true,
        }
    }
}

/// Sidecar configuration attached to a spec by enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaprSidecarConfig {
    /// Service-mesh application ID.
    pub app_id: String,
    /// Port the sidecar forwards application traffic to.
    pub app_port: u16,
    /// Additional sidecar settings, passed through to the platform.
    pub settings: HashMap<String, String>,
}

/// Provisioning state reported by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    Provisioning,
    Succeeded,
    Failed,
    Unknown,
}

impl ProvisioningState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProvisioningState::Succeeded | ProvisioningState::Failed)
    }
}

impl FromStr for ProvisioningState {
    type Err = std::convert::Infallible;

    /// States the control plane may report that we do not model
    /// (InProgress, Canceled, ...) map to `Unknown` and keep polling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Provisioning" | "InProgress" => ProvisioningState::Provisioning,
            // Apps report Succeeded; revisions report Provisioned.
            "Succeeded" | "Provisioned" => ProvisioningState::Succeeded,
            "Failed" | "Canceled" => ProvisioningState::Failed,
            _ => ProvisioningState::Unknown,
        })
    }
}

/// Result of a single health probe. Transient; never cached.
#[derive(Debug, Clone)]
pub struct HealthProbeResult {
    pub state: ProvisioningState,
    /// Externally reachable endpoint, when the app has ingress.
    pub endpoint: Option<String>,
}

/// Outcome of a best-effort cleanup sweep.
///
/// A stuck app must not block cleanup of the rest, so per-item failures
/// are collected instead of propagated.
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub stopped: Vec<AppName>,
    pub failed: Vec<CleanupFailure>,
}

impl CleanupResult {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A single app that could not be stopped during cleanup.
#[derive(Debug)]
pub struct CleanupFailure {
    pub app: AppName,
    pub error: String,
}
