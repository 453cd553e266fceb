// ABOUTME: Lifecycle commands: promote, stop, cleanup.
// ABOUTME: Direct traffic assignment and best-effort scope cleanup.

use super::provider_for;
use polepole::config::Config;
use polepole::diagnostics::{Diagnostics, Warning};
use polepole::error::{Error, Result};
use polepole::output::Output;
use polepole::provider::{ContainerProvider, RevisionManager};
use polepole::types::{RevisionName, TrafficWeight};

/// Assign a traffic weight to a revision directly.
///
/// This is the manual escape hatch: a failed canary is drained by invoking
/// it with weight 0, and a verified one finalized with weight 100.
pub async fn promote(config: Config, revision: &str, weight: u32, output: Output) -> Result<()> {
    let weight = TrafficWeight::new(weight).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    let revision = RevisionName::new(revision);
    let provider = provider_for(&config);

    output.progress(&format!(
        "Routing {}% of {} traffic to {}",
        weight, config.app, revision
    ));
    provider
        .configure_traffic_splitting(&config.app, &revision, weight)
        .await?;

    output.success("Traffic updated");
    Ok(())
}

/// Stop the app by scaling it to zero. The app and its revisions remain.
pub async fn stop(config: Config, output: Output) -> Result<()> {
    let provider = provider_for(&config);

    output.progress(&format!("Scaling {} to zero...", config.app));
    provider.stop_container(&config.app).await?;

    output.success("App stopped");
    Ok(())
}

/// Stop every app in the resource group, best-effort per item.
pub async fn cleanup(config: Config, output: Output) -> Result<()> {
    let provider = provider_for(&config);
    let mut diag = Diagnostics::default();

    output.progress(&format!("Stopping all apps in group {}...", config.group));
    let result = provider.cleanup().await?;

    for failure in &result.failed {
        diag.warn(Warning::cleanup_stop(format!(
            "failed to stop {}: {}",
            failure.app, failure.error
        )));
    }
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    output.success(&format!(
        "Stopped {} app(s), {} failure(s)",
        result.stopped.len(),
        result.failed.len()
    ));
    Ok(())
}
