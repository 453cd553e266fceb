// ABOUTME: Deterministic in-memory control plane for integration tests.
// ABOUTME: Scripts show/list responses and records every mutation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use polepole::controlplane::{
    AppDescriptor, AppDetails, ControlPlaneClient, ControlPlaneError, Revision, TrafficAssignment,
};
use polepole::provider::ProvisioningState;
use polepole::types::{AppName, ResourceGroup, RevisionName, TrafficWeight};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Build app details for scripting.
pub fn details(state: ProvisioningState, fqdn: Option<&str>, dapr_enabled: bool) -> AppDetails {
    AppDetails {
        provisioning_state: state,
        fqdn: fqdn.map(str::to_string),
        dapr_enabled,
    }
}

/// Build a revision for scripting.
pub fn revision(name: &str, active: bool, weight: u32, state: ProvisioningState) -> Revision {
    Revision {
        name: RevisionName::new(name),
        created: DateTime::UNIX_EPOCH,
        active,
        traffic_weight: TrafficWeight::new(weight).expect("test weight in range"),
        provisioning_state: state,
    }
}

#[derive(Default)]
struct State {
    show_script: VecDeque<Result<AppDetails, String>>,
    show_fallback: Option<AppDetails>,
    show_calls: u32,
    revision_script: VecDeque<Vec<Revision>>,
    revisions: Vec<Revision>,
    revision_calls: u32,
    traffic_tables: Vec<Vec<(String, u8)>>,
    deactivated: Vec<String>,
    scaled: Vec<(String, u32, u32)>,
    fail_scale: HashSet<String>,
    created: Vec<String>,
    updated: Vec<(String, Option<String>)>,
    apps: Vec<AppName>,
    logs: String,
}

/// In-memory stand-in for the platform control plane.
///
/// Clones share state, so a test can keep one handle for assertions after
/// handing another to the provider. Apps do not exist until `create_app`
/// (or an explicit `set_app`) registers them.
#[derive(Clone, Default)]
pub struct FakeControlPlane {
    state: Arc<Mutex<State>>,
}

impl FakeControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `show_app` responses consumed one per call.
    pub fn script_show(&self, script: Vec<AppDetails>) {
        self.state.lock().unwrap().show_script = script.into_iter().map(Ok).collect();
    }

    /// Queue `show_app` responses including transient errors.
    pub fn script_show_results(&self, script: Vec<Result<AppDetails, String>>) {
        self.state.lock().unwrap().show_script = script.into();
    }

    /// Register the app so `show_app` succeeds once the script is drained.
    pub fn set_app(&self, details: AppDetails) {
        self.state.lock().unwrap().show_fallback = Some(details);
    }

    /// Queue `list_revisions` responses consumed one per call.
    pub fn script_revisions(&self, script: Vec<Vec<Revision>>) {
        self.state.lock().unwrap().revision_script = script.into();
    }

    pub fn add_revision(&self, revision: Revision) {
        self.state.lock().unwrap().revisions.push(revision);
    }

    pub fn set_apps(&self, apps: Vec<AppName>) {
        self.state.lock().unwrap().apps = apps;
    }

    pub fn set_logs(&self, logs: &str) {
        self.state.lock().unwrap().logs = logs.to_string();
    }

    pub fn fail_scale_for(&self, app: &AppName) {
        self.state.lock().unwrap().fail_scale.insert(app.to_string());
    }

    pub fn show_calls(&self) -> u32 {
        self.state.lock().unwrap().show_calls
    }

    pub fn revision_calls(&self) -> u32 {
        self.state.lock().unwrap().revision_calls
    }

    /// Every submitted traffic table, in order, as (revision, weight) rows.
    pub fn traffic_tables(&self) -> Vec<Vec<(String, u8)>> {
        self.state.lock().unwrap().traffic_tables.clone()
    }

    pub fn deactivated(&self) -> Vec<String> {
        self.state.lock().unwrap().deactivated.clone()
    }

    pub fn scaled(&self) -> Vec<(String, u32, u32)> {
        self.state.lock().unwrap().scaled.clone()
    }

    pub fn created(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    /// (app, revision_suffix) pairs from `update_app` calls.
    pub fn updated(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().unwrap().updated.clone()
    }

    pub fn current_revisions(&self) -> Vec<Revision> {
        self.state.lock().unwrap().revisions.clone()
    }

    fn details_from_descriptor(descriptor: &AppDescriptor, name: &AppName) -> AppDetails {
        let config = &descriptor.properties.configuration;
        AppDetails {
            provisioning_state: ProvisioningState::Succeeded,
            fqdn: config
                .ingress
                .as_ref()
                .map(|_| format!("{}.env.example.io", name)),
            dapr_enabled: config.dapr.is_some(),
        }
    }
}

#[async_trait]
impl ControlPlaneClient for FakeControlPlane {
    async fn verify(&self) -> Result<(), ControlPlaneError> {
        Ok(())
    }

    async fn create_app(
        &self,
        name: &AppName,
        _group: &ResourceGroup,
        descriptor: &AppDescriptor,
    ) -> Result<AppDetails, ControlPlaneError> {
        let details = Self::details_from_descriptor(descriptor, name);
        let mut state = self.state.lock().unwrap();
        state.created.push(name.to_string());
        state.show_fallback = Some(details.clone());
        Ok(details)
    }

    async fn update_app(
        &self,
        name: &AppName,
        _group: &ResourceGroup,
        descriptor: &AppDescriptor,
        revision_suffix: Option<&str>,
    ) -> Result<AppDetails, ControlPlaneError> {
        let details = Self::details_from_descriptor(descriptor, name);
        let mut state = self.state.lock().unwrap();
        state
            .updated
            .push((name.to_string(), revision_suffix.map(str::to_string)));

        if let Some(suffix) = revision_suffix {
            state.revisions.push(Revision {
                name: RevisionName::new(format!("{}--{}", name, suffix)),
                created: Utc::now(),
                active: true,
                traffic_weight: TrafficWeight::ZERO,
                provisioning_state: ProvisioningState::Succeeded,
            });
        }
        // An update does not change how the app presents; only register
        // details when nothing has yet.
        if state.show_fallback.is_none() {
            state.show_fallback = Some(details.clone());
        }
        Ok(details)
    }

    async fn show_app(
        &self,
        name: &AppName,
        _group: &ResourceGroup,
    ) -> Result<AppDetails, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.show_calls += 1;

        if let Some(scripted) = state.show_script.pop_front() {
            return scripted.map_err(|output| ControlPlaneError::ExecutionFailed {
                command: format!("containerapp show {}", name),
                output,
            });
        }
        state
            .show_fallback
            .clone()
            .ok_or_else(|| ControlPlaneError::ExecutionFailed {
                command: format!("containerapp show {}", name),
                output: "ResourceNotFound".to_string(),
            })
    }

    async fn list_revisions(
        &self,
        _name: &AppName,
        _group: &ResourceGroup,
    ) -> Result<Vec<Revision>, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.revision_calls += 1;

        if let Some(list) = state.revision_script.pop_front() {
            return Ok(list);
        }
        Ok(state.revisions.clone())
    }

    async fn set_traffic(
        &self,
        _name: &AppName,
        _group: &ResourceGroup,
        assignments: &[TrafficAssignment],
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        let table: Vec<(String, u8)> = assignments
            .iter()
            .map(|a| (a.revision.to_string(), a.weight.value()))
            .collect();

        for (name, weight) in &table {
            if let Some(rev) = state
                .revisions
                .iter_mut()
                .find(|r| r.name.as_str() == name)
            {
                rev.traffic_weight = TrafficWeight::new(u32::from(*weight)).expect("weight valid");
            }
        }
        state.traffic_tables.push(table);
        Ok(())
    }

    async fn scale_app(
        &self,
        name: &AppName,
        _group: &ResourceGroup,
        min_replicas: u32,
        max_replicas: u32,
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_scale.contains(name.as_str()) {
            return Err(ControlPlaneError::ExecutionFailed {
                command: format!("containerapp update {}", name),
                output: "app is stuck".to_string(),
            });
        }
        state
            .scaled
            .push((name.to_string(), min_replicas, max_replicas));
        Ok(())
    }

    async fn deactivate_revision(
        &self,
        _name: &AppName,
        _group: &ResourceGroup,
        revision: &RevisionName,
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.deactivated.push(revision.to_string());
        if let Some(rev) = state.revisions.iter_mut().find(|r| &r.name == revision) {
            rev.active = false;
        }
        Ok(())
    }

    async fn show_logs(
        &self,
        _name: &AppName,
        _group: &ResourceGroup,
        _tail: u32,
    ) -> Result<String, ControlPlaneError> {
        Ok(self.state.lock().unwrap().logs.clone())
    }

    async fn list_apps(&self, _group: &ResourceGroup) -> Result<Vec<AppName>, ControlPlaneError> {
        Ok(self.state.lock().unwrap().apps.clone())
    }
}
