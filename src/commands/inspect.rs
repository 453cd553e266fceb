// ABOUTME: Read-only inspection commands: status, logs, revisions.
// ABOUTME: Each re-queries the control plane; nothing is cached locally.

use super::provider_for;
use polepole::config::Config;
use polepole::error::Result;
use polepole::output::Output;
use polepole::provider::{ContainerHealthChecker, ContainerProvider, RevisionManager};

/// Show app provisioning state and endpoint.
pub async fn status(config: Config, output: Output) -> Result<()> {
    let provider = provider_for(&config);

    let state = provider.check_container_status(&config.app).await?;

    output.progress(&format!("App:      {}", config.app));
    output.progress(&format!("Image:    {}", config.image));
    output.progress(&format!("Group:    {}", config.group));
    output.progress(&format!("State:    {:?}", state));

    match provider.container_endpoint(&config.app).await {
        Ok(endpoint) => output.progress(&format!("Endpoint: {}", endpoint)),
        Err(_) => output.progress("Endpoint: (none)"),
    }

    Ok(())
}

/// Show recent app logs.
pub async fn logs(config: Config, tail: u32, output: Output) -> Result<()> {
    let provider = provider_for(&config);
    let logs = provider.container_logs(&config.app, tail).await?;
    output.progress(&logs);
    Ok(())
}

/// List revisions and their traffic weights.
pub async fn revisions(config: Config, output: Output) -> Result<()> {
    let provider = provider_for(&config);
    let revisions = provider.list_app_revisions(&config.app).await?;

    if revisions.is_empty() {
        output.progress("No revisions found");
        return Ok(());
    }

    output.progress(&format!(
        "{:<44} {:>7} {:>7}  {}",
        "REVISION", "ACTIVE", "WEIGHT", "CREATED"
    ));
    for revision in revisions {
        output.progress(&format!(
            "{:<44} {:>7} {:>6}%  {}",
            revision.name.as_str(),
            revision.active,
            revision.traffic_weight.value(),
            revision.created.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    Ok(())
}
