// ABOUTME: Control-plane client backed by the platform CLI.
// ABOUTME: Spawns az subprocesses with JSON output and parses the results.

use super::descriptor::AppDescriptor;
use super::error::ControlPlaneError;
use super::types::{AppDetails, Revision, TrafficAssignment};
use super::ControlPlaneClient;
use crate::types::{AppName, ResourceGroup, RevisionName};
use async_trait::async_trait;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tokio::process::Command;

/// Control-plane client that shells out to the `az` CLI.
///
/// Each call is one subprocess invocation; no state is kept between calls.
pub struct AzCli {
    binary: String,
}

impl AzCli {
    pub fn new() -> Self {
        Self::with_binary("az")
    }

    /// Override the CLI binary, e.g. for a wrapper script.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<String, ControlPlaneError> {
        let rendered = format!("{} {}", self.binary, args.join(" "));
        tracing::debug!(command = %rendered, "invoking control plane");

        let output = Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ControlPlaneError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ControlPlaneError::ExecutionFailed {
                command: rendered,
                output: combined.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn write_descriptor(descriptor: &AppDescriptor) -> Result<NamedTempFile, ControlPlaneError> {
        let file = tempfile::Builder::new()
            .prefix("polepole-")
            .suffix(".yml")
            .tempfile()
            .map_err(|e| ControlPlaneError::Descriptor(e.to_string()))?;
        serde_yaml::to_writer(file.as_file(), descriptor)
            .map_err(|e| ControlPlaneError::Descriptor(e.to_string()))?;
        Ok(file)
    }
}

impl Default for AzCli {
    fn default() -> Self {
        Self::new()
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl ControlPlaneClient for AzCli {
    async fn verify(&self) -> Result<(), ControlPlaneError> {
        self.run(&args(&["version", "-o", "json"])).await?;
        Ok(())
    }

    async fn create_app(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        descriptor: &AppDescriptor,
    ) -> Result<AppDetails, ControlPlaneError> {
        // The temp file must outlive the subprocess.
        let file = Self::write_descriptor(descriptor)?;
        let path = file.path().to_string_lossy().into_owned();
        let cmd = args(&[
            "containerapp", "create", "-n", name.as_str(), "-g", group.as_str(), "--yaml", path.as_str(),
            "-o", "json",
        ]);
        let raw = self.run(&cmd).await?;
        AppDetails::from_json(&raw).map_err(|source| ControlPlaneError::MalformedOutput {
            command: format!("containerapp create {}", name),
            source,
        })
    }

    async fn update_app(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        descriptor: &AppDescriptor,
        revision_suffix: Option<&str>,
    ) -> Result<AppDetails, ControlPlaneError> {
        let file = Self::write_descriptor(descriptor)?;
        let path = file.path().to_string_lossy().into_owned();
        let mut cmd = args(&[
            "containerapp", "update", "-n", name.as_str(), "-g", group.as_str(), "--yaml", path.as_str(),
        ]);
        if let Some(suffix) = revision_suffix {
            cmd.push("--revision-suffix".to_string());
            cmd.push(suffix.to_string());
        }
        cmd.push("-o".to_string());
        cmd.push("json".to_string());

        let raw = self.run(&cmd).await?;
        AppDetails::from_json(&raw).map_err(|source| ControlPlaneError::MalformedOutput {
            command: format!("containerapp update {}", name),
            source,
        })
    }

    async fn show_app(
        &self,
        name: &AppName,
        group: &ResourceGroup,
    ) -> Result<AppDetails, ControlPlaneError> {
        let cmd = args(&[
            "containerapp", "show", "-n", name.as_str(), "-g", group.as_str(), "-o", "json",
        ]);
        let raw = self.run(&cmd).await?;
        AppDetails::from_json(&raw).map_err(|source| ControlPlaneError::MalformedOutput {
            command: format!("containerapp show {}", name),
            source,
        })
    }

    async fn list_revisions(
        &self,
        name: &AppName,
        group: &ResourceGroup,
    ) -> Result<Vec<Revision>, ControlPlaneError> {
        let cmd = args(&[
            "containerapp", "revision", "list", "-n", name.as_str(), "-g", group.as_str(), "-o",
            "json",
        ]);
        let raw = self.run(&cmd).await?;
        Revision::list_from_json(&raw).map_err(|source| ControlPlaneError::MalformedOutput {
            command: format!("containerapp revision list {}", name),
            source,
        })
    }

    async fn set_traffic(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        assignments: &[TrafficAssignment],
    ) -> Result<(), ControlPlaneError> {
        let mut cmd = args(&[
            "containerapp", "ingress", "traffic", "set", "-n", name.as_str(), "-g",
            group.as_str(), "--revision-weight",
        ]);
        for assignment in assignments {
            cmd.push(format!("{}={}", assignment.revision, assignment.weight));
        }
        cmd.push("-o".to_string());
        cmd.push("json".to_string());

        self.run(&cmd).await?;
        Ok(())
    }

    async fn scale_app(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        min_replicas: u32,
        max_replicas: u32,
    ) -> Result<(), ControlPlaneError> {
        let min = min_replicas.to_string();
        let max = max_replicas.to_string();
        let cmd = args(&[
            "containerapp", "update", "-n", name.as_str(), "-g", group.as_str(),
            "--min-replicas", min.as_str(), "--max-replicas", max.as_str(), "-o", "json",
        ]);
        self.run(&cmd).await?;
        Ok(())
    }

    async fn deactivate_revision(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        revision: &RevisionName,
    ) -> Result<(), ControlPlaneError> {
        let cmd = args(&[
            "containerapp", "revision", "deactivate", "-n", name.as_str(), "-g", group.as_str(),
            "--revision", revision.as_str(),
        ]);
        self.run(&cmd).await?;
        Ok(())
    }

    async fn show_logs(
        &self,
        name: &AppName,
        group: &ResourceGroup,
        tail: u32,
    ) -> Result<String, ControlPlaneError> {
        let tail = tail.to_string();
        let cmd = args(&[
            "containerapp", "logs", "show", "-n", name.as_str(), "-g", group.as_str(), "--tail",
            tail.as_str(),
        ]);
        self.run(&cmd).await
    }

    async fn list_apps(&self, group: &ResourceGroup) -> Result<Vec<AppName>, ControlPlaneError> {
        let cmd = args(&["containerapp", "list", "-g", group.as_str(), "-o", "json"]);
        let raw = self.run(&cmd).await?;

        #[derive(Deserialize)]
        struct Entry {
            name: String,
        }

        let entries: Vec<Entry> =
            serde_json::from_str(&raw).map_err(|source| ControlPlaneError::MalformedOutput {
                command: "containerapp list".to_string(),
                source,
            })?;

        Ok(entries
            .into_iter()
            .filter_map(|e| match AppName::new(&e.name) {
                Ok(name) => Some(name),
                Err(err) => {
                    tracing::warn!(app = %e.name, %err, "skipping app with unusable name");
                    None
                }
            })
            .collect())
    }
}
