// ABOUTME: Managed container-app platform provider.
// ABOUTME: Implements every capability trait on top of the control-plane client.

use crate::controlplane::{
    AppDescriptor, ContainerTemplate, ControlPlaneClient, EnvVarEntry, ProbeSpec, Revision,
    TrafficAssignment,
};
use crate::controlplane::{AppDetails, ControlPlaneError};
use crate::dapr::SidecarManager;
use crate::health::{self, HealthError, HealthPoller, PollOutcome};
use crate::provider::traits::sealed::Sealed;
use crate::provider::{
    CleanupFailure, CleanupResult, ContainerError, ContainerHealthChecker, ContainerProvider,
    ContainerSpec, DaprError, DaprProvider, DaprSidecarConfig, DaprSidecarInjector,
    HealthProbeResult, ManagedExtensions, ProbeError, ProviderExtensions, ProvisioningState,
    RevisionError, RevisionManager,
};
use crate::types::{AppName, ImageRef, ResourceGroup, RevisionName, TrafficWeight};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

/// Health paths by logical app name. Control-plane components expose the
/// sidecar health endpoint; everything else answers on the service path.
const HEALTH_PATHS: &[(&str, &str)] = &[
    ("dapr-placement", "/v1.0/healthz"),
    ("dapr-operator", "/v1.0/healthz"),
    ("dapr-sentry", "/v1.0/healthz"),
];

const DEFAULT_HEALTH_PATH: &str = "/health";

/// Timeout for a single HTTP health probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolve the health-check path for an app by name.
pub fn health_path_for(name: &AppName) -> &'static str {
    HEALTH_PATHS
        .iter()
        .find(|(app, _)| *app == name.as_str())
        .map(|(_, path)| *path)
        .unwrap_or(DEFAULT_HEALTH_PATH)
}

/// Provider for managed container-app platforms.
///
/// Owns the traffic-splitting algorithm and the revision lifecycle. Holds
/// no app state of its own — every read re-queries the control plane.
pub struct ManagedProvider<C> {
    client: C,
    group: ResourceGroup,
    http: reqwest::Client,
}

impl<C: ControlPlaneClient> ManagedProvider<C> {
    pub fn new(client: C, group: ResourceGroup) -> Self {
        let http = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .expect("static client configuration is valid");
        Self {
            client,
            group,
            http,
        }
    }

    pub fn group(&self) -> &ResourceGroup {
        &self.group
    }

    /// Revision suffix from the current time. Second resolution is unique
    /// enough within one process: deploys of the same app are serialized.
    fn revision_suffix() -> String {
        Utc::now().format("r%Y%m%d%H%M%S").to_string()
    }

    fn qualified_revision(app: &AppName, suffix: &str) -> RevisionName {
        RevisionName::new(format!("{}--{}", app, suffix))
    }

    /// Build the platform deployment descriptor from a spec.
    fn build_descriptor(&self, spec: &ContainerSpec) -> AppDescriptor {
        use crate::controlplane::{
            DaprSpec, DescriptorConfiguration, DescriptorProperties, DescriptorTemplate,
            HttpGetSpec, IngressSpec, ResourcesSpec, ScaleSpec,
        };

        let managed = match &spec.extensions {
            ProviderExtensions::Managed(m) => m.clone(),
            ProviderExtensions::None => ManagedExtensions::default(),
        };

        let dapr = spec.dapr.as_ref().map(|d| {
            let mut settings: Vec<EnvVarEntry> = d
                .settings
                .iter()
                .map(|(name, value)| EnvVarEntry {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect();
            settings.sort_by(|a, b| a.name.cmp(&b.name));
            DaprSpec {
                enabled: true,
                app_id: d.app_id.clone(),
                app_port: d.app_port,
                settings,
            }
        });

        let mut env: Vec<EnvVarEntry> = spec
            .env
            .iter()
            .map(|(name, value)| EnvVarEntry {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        env.sort_by(|a, b| a.name.cmp(&b.name));

        let health_path = spec
            .health_path
            .clone()
            .unwrap_or_else(|| health_path_for(&spec.name).to_string());

        AppDescriptor {
            properties: DescriptorProperties {
                configuration: DescriptorConfiguration {
                    ingress: Some(IngressSpec {
                        external: managed.external_ingress,
                        target_port: spec.port,
                    }),
                    dapr,
                },
                template: DescriptorTemplate {
                    containers: vec![ContainerTemplate {
                        name: spec.name.to_string(),
                        image: spec.image.to_string(),
                        env,
                        resources: spec.resources.as_ref().map(|r| ResourcesSpec {
                            cpu: r.cpus,
                            memory: r.memory.clone(),
                        }),
                        probes: vec![ProbeSpec {
                            kind: "Liveness".to_string(),
                            http_get: HttpGetSpec {
                                path: health_path,
                                port: spec.port,
                            },
                        }],
                    }],
                    scale: ScaleSpec {
                        min_replicas: managed.min_replicas,
                        max_replicas: managed.max_replicas,
                    },
                },
            },
        }
    }

    async fn show(&self, name: &AppName) -> Result<AppDetails, ControlPlaneError> {
        self.client.show_app(name, &self.group).await
    }

    /// One tick of the app-level health wait.
    async fn app_health_tick(&self, name: &AppName) -> PollOutcome<HealthProbeResult> {
        let details = match self.show(name).await {
            Ok(details) => details,
            Err(err) => {
                // Transient query failures are not terminal; keep polling.
                tracing::debug!(app = %name, %err, "status query failed during health wait");
                return PollOutcome::Continue;
            }
        };

        match details.provisioning_state {
            ProvisioningState::Succeeded => match details.fqdn {
                Some(fqdn) => {
                    let url = health::endpoint_url(&fqdn, health_path_for(name));
                    match health::probe_endpoint(&self.http, &url).await {
                        Ok(()) => PollOutcome::Ready(HealthProbeResult {
                            state: ProvisioningState::Succeeded,
                            endpoint: Some(url),
                        }),
                        Err(err) => PollOutcome::Fatal(err),
                    }
                }
                // No ingress means nothing to probe; provisioning success
                // is the whole signal.
                None => PollOutcome::Ready(HealthProbeResult {
                    state: ProvisioningState::Succeeded,
                    endpoint: None,
                }),
            },
            ProvisioningState::Failed => {
                PollOutcome::Fatal(HealthError::ProvisioningFailed(name.to_string()))
            }
            _ => PollOutcome::Continue,
        }
    }

    /// One tick of the revision readiness wait.
    async fn revision_ready_tick(
        &self,
        app: &AppName,
        revision: &RevisionName,
    ) -> PollOutcome<()> {
        let revisions = match self.client.list_revisions(app, &self.group).await {
            Ok(revisions) => revisions,
            Err(err) => {
                tracing::debug!(app = %app, %err, "revision query failed during readiness wait");
                return PollOutcome::Continue;
            }
        };

        match revisions.iter().find(|r| &r.name == revision) {
            Some(r) if r.active && r.provisioning_state == ProvisioningState::Succeeded => {
                PollOutcome::Ready(())
            }
            Some(r) if r.provisioning_state == ProvisioningState::Failed => {
                PollOutcome::Fatal(HealthError::ProvisioningFailed(revision.to_string()))
            }
            // Not listed yet, or still provisioning.
            _ => PollOutcome::Continue,
        }
    }
}

impl<C> Sealed for ManagedProvider<C> {}

#[async_trait]
impl<C: ControlPlaneClient> ContainerProvider for ManagedProvider<C> {
    async fn initialize(&self) -> Result<(), ContainerError> {
        self.client.verify().await?;
        Ok(())
    }

    async fn deploy_container(&self, spec: &ContainerSpec) -> Result<(), ContainerError> {
        spec.validate()?;
        let descriptor = self.build_descriptor(spec);

        // Create-or-update: an app that cannot be shown is treated as new.
        // If it does exist after all, create fails and the error surfaces.
        match self.show(&spec.name).await {
            Ok(_) => {
                tracing::debug!(app = %spec.name, "app exists, updating in place");
                self.client
                    .update_app(&spec.name, &self.group, &descriptor, None)
                    .await?;
            }
            Err(_) => {
                tracing::debug!(app = %spec.name, "app not found, creating");
                self.client
                    .create_app(&spec.name, &self.group, &descriptor)
                    .await?;
            }
        }
        Ok(())
    }

    async fn stop_container(&self, name: &AppName) -> Result<(), ContainerError> {
        self.client.scale_app(name, &self.group, 0, 0).await?;
        Ok(())
    }

    async fn wait_for_container_health(
        &self,
        name: &AppName,
        timeout: Duration,
    ) -> Result<HealthProbeResult, HealthError> {
        HealthPoller::app_level()
            .wait(timeout, || self.app_health_tick(name))
            .await
    }

    async fn container_logs(&self, name: &AppName, tail: u32) -> Result<String, ContainerError> {
        Ok(self.client.show_logs(name, &self.group, tail).await?)
    }

    async fn is_container_running(&self, name: &AppName) -> Result<bool, ContainerError> {
        let details = self.show(name).await?;
        Ok(details.provisioning_state == ProvisioningState::Succeeded)
    }

    async fn pull_image(&self, image: &ImageRef) -> Result<(), ContainerError> {
        // The platform pulls images server-side on deploy; validation is
        // all this provider can usefully do here.
        tracing::debug!(image = %image, "image pull is handled by the platform");
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<AppName>, ContainerError> {
        Ok(self.client.list_apps(&self.group).await?)
    }

    async fn cleanup(&self) -> Result<CleanupResult, ContainerError> {
        let apps = self.client.list_apps(&self.group).await?;

        // Different apps are independent; stop them concurrently. One
        // stuck app must not block cleanup of the rest, so per-item
        // failures are collected instead of propagated.
        let stops = apps.into_iter().map(|app| async move {
            let outcome = self.stop_container(&app).await;
            (app, outcome)
        });

        let mut result = CleanupResult::default();
        for (app, outcome) in futures::future::join_all(stops).await {
            match outcome {
                Ok(()) => result.stopped.push(app),
                Err(err) => {
                    tracing::warn!(app = %app, %err, "failed to stop app during cleanup");
                    result.failed.push(CleanupFailure {
                        app,
                        error: err.to_string(),
                    });
                }
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl<C: ControlPlaneClient> DaprProvider for ManagedProvider<C> {
    async fn deploy_dapr_sidecar(&self, spec: &ContainerSpec) -> Result<(), DaprError> {
        // Sidecar attachment is automatic on this platform; the deploy
        // descriptor already carried the dapr block. Validate only. The
        // flag is checked on the app itself — the mesh app ID does not
        // have to match the app name.
        let config = spec.dapr.as_ref().ok_or(DaprError::MissingAppId)?;
        SidecarManager::validate_config(config)?;

        let details = self
            .show(&spec.name)
            .await
            .map_err(|_| DaprError::AppNotFound(config.app_id.clone()))?;
        if !details.dapr_enabled {
            return Err(DaprError::NotEnabled(config.app_id.clone()));
        }
        Ok(())
    }

    async fn validate_dapr_configuration(&self, app_id: &str) -> Result<(), DaprError> {
        let name =
            AppName::new(app_id).map_err(|_| DaprError::AppNotFound(app_id.to_string()))?;
        let details = self
            .show(&name)
            .await
            .map_err(|_| DaprError::AppNotFound(app_id.to_string()))?;

        if !details.dapr_enabled {
            return Err(DaprError::NotEnabled(app_id.to_string()));
        }
        Ok(())
    }

    async fn dapr_health(&self, app_id: &str) -> Result<HealthProbeResult, DaprError> {
        let name =
            AppName::new(app_id).map_err(|_| DaprError::AppNotFound(app_id.to_string()))?;
        let details = self
            .show(&name)
            .await
            .map_err(|_| DaprError::AppNotFound(app_id.to_string()))?;

        Ok(HealthProbeResult {
            state: details.provisioning_state,
            endpoint: details
                .fqdn
                .map(|fqdn| health::endpoint_url(&fqdn, "/v1.0/healthz")),
        })
    }
}

#[async_trait]
impl<C: ControlPlaneClient> ContainerHealthChecker for ManagedProvider<C> {
    async fn check_container_status(
        &self,
        name: &AppName,
    ) -> Result<ProvisioningState, ProbeError> {
        let details = self.show(name).await?;
        Ok(details.provisioning_state)
    }

    async fn container_endpoint(&self, name: &AppName) -> Result<String, ProbeError> {
        let details = self.show(name).await?;
        let fqdn = details
            .fqdn
            .ok_or_else(|| ProbeError::NoEndpoint(name.to_string()))?;
        Ok(health::endpoint_url(&fqdn, health_path_for(name)))
    }
}

#[async_trait]
impl<C: ControlPlaneClient> DaprSidecarInjector for ManagedProvider<C> {
    async fn inject_sidecar(
        &self,
        spec: &mut ContainerSpec,
        config: &DaprSidecarConfig,
    ) -> Result<(), DaprError> {
        // Attachment is automatic; injection records the validated config
        // on the spec so the next deploy carries it.
        SidecarManager::validate_config(config)?;
        spec.dapr = Some(config.clone());
        Ok(())
    }

    fn validate_sidecar_config(&self, config: &DaprSidecarConfig) -> Result<(), DaprError> {
        SidecarManager::validate_config(config)
    }

    fn sidecar_name(&self, app_id: &str) -> String {
        SidecarManager::sidecar_name(app_id)
    }
}

#[async_trait]
impl<C: ControlPlaneClient> RevisionManager for ManagedProvider<C> {
    async fn update_container_app_revision(
        &self,
        spec: &ContainerSpec,
        traffic: TrafficWeight,
    ) -> Result<RevisionName, RevisionError> {
        spec.validate()?;
        let suffix = Self::revision_suffix();
        let descriptor = self.build_descriptor(spec);

        self.client
            .update_app(&spec.name, &self.group, &descriptor, Some(&suffix))
            .await?;

        let new_revision = Self::qualified_revision(&spec.name, &suffix);
        tracing::info!(app = %spec.name, revision = %new_revision, %traffic, "created revision");

        self.configure_traffic_splitting(&spec.name, &new_revision, traffic)
            .await?;
        Ok(new_revision)
    }

    async fn configure_traffic_splitting(
        &self,
        app: &AppName,
        new_revision: &RevisionName,
        weight: TrafficWeight,
    ) -> Result<(), RevisionError> {
        let revisions = self.client.list_revisions(app, &self.group).await?;
        let table = split_traffic(&revisions, new_revision, weight);

        tracing::debug!(app = %app, entries = table.len(), "submitting traffic table");
        self.client.set_traffic(app, &self.group, &table).await?;
        Ok(())
    }

    async fn list_app_revisions(&self, app: &AppName) -> Result<Vec<Revision>, RevisionError> {
        Ok(self.client.list_revisions(app, &self.group).await?)
    }

    async fn deactivate_revision(
        &self,
        app: &AppName,
        revision: &RevisionName,
    ) -> Result<(), RevisionError> {
        tracing::info!(app = %app, revision = %revision, "deactivating revision");
        self.client
            .deactivate_revision(app, &self.group, revision)
            .await?;
        Ok(())
    }

    async fn wait_for_revision_ready(
        &self,
        app: &AppName,
        revision: &RevisionName,
        timeout: Duration,
    ) -> Result<(), HealthError> {
        HealthPoller::revision_level()
            .wait(timeout, || self.revision_ready_tick(app, revision))
            .await
    }
}

/// Compute the full traffic table for an app around a new revision weight.
///
/// The remaining weight is divided evenly across the other active revisions
/// with integer division. The truncation remainder is not redistributed, so
/// the table may sum to less than 100; likewise, with no other active
/// revisions the new revision keeps exactly the requested weight.
fn split_traffic(
    revisions: &[Revision],
    new_revision: &RevisionName,
    weight: TrafficWeight,
) -> Vec<TrafficAssignment> {
    let others: Vec<&Revision> = revisions
        .iter()
        .filter(|r| r.active && r.name != *new_revision)
        .collect();

    let mut table = vec![TrafficAssignment {
        revision: new_revision.clone(),
        weight,
    }];

    if !others.is_empty() {
        let share = u32::from(weight.remainder()) / others.len() as u32;
        let share = TrafficWeight::new(share).expect("share of a 0-100 remainder is in range");
        for revision in others {
            table.push(TrafficAssignment {
                revision: revision.name.clone(),
                weight: share,
            });
        }
    }

    table
}
