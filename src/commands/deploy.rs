// ABOUTME: Deploy command implementation.
// ABOUTME: Runs the rollout state machine with the canary plan from config.

use super::provider_for;
use polepole::config::Config;
use polepole::controlplane::ControlPlaneClient;
use polepole::dapr::SidecarManager;
use polepole::diagnostics::{Diagnostics, Warning};
use polepole::error::Result;
use polepole::output::Output;
use polepole::provider::{ContainerProvider, ContainerSpec, ManagedProvider};
use polepole::rollout::{self, Rollout, Staged};
use polepole::types::TrafficWeight;

/// Deploy the app and run its rollout plan.
pub async fn deploy(config: Config, force: bool, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Deploying {} ({}) to group {}",
        config.app, config.image, config.group
    ));

    let mut spec = config.to_spec()?;
    if config.dapr.is_some() {
        // Enrichment always runs before the sidecar reaches the provider.
        SidecarManager::enrich_spec(&mut spec, &config.dapr_settings())?;
    }

    let provider = provider_for(&config);
    output.progress("  → Verifying control plane...");
    provider.initialize().await?;

    output.progress("  → Acquiring deploy lock...");
    let result = rollout::with_lock(
        &config.app,
        force,
        run_rollout(&provider, &config, spec, &output, &mut diag),
    )
    .await?;

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    result?;
    output.success("Rollout complete!");
    Ok(())
}

/// Run the rollout state machine (holding the deploy lock).
async fn run_rollout<C: ControlPlaneClient>(
    provider: &ManagedProvider<C>,
    config: &Config,
    spec: ContainerSpec,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<()> {
    let rollout = Rollout::new(spec);

    output.progress("  → Submitting spec...");
    let rollout = rollout.deploy(provider).await?;

    output.progress("  → Waiting for app health...");
    let rollout = match rollout.verify_health(provider, config.health_timeout).await {
        Ok(r) => r,
        Err((failed, err)) => {
            // Surface recent logs for diagnosis before bailing.
            if let Ok(logs) = provider.container_logs(failed.app(), 20).await {
                output.warning(&format!("last log lines from {}:\n{}", failed.app(), logs));
            }
            return Err(err.into());
        }
    };

    let Some(plan) = config.rollout.as_ref() else {
        output.progress("  ✓ Deployed (no rollout plan; platform routes the latest revision)");
        return Ok(());
    };

    // Canary: the first step creates the revision, later steps shift weight.
    // Every step is gated on revision readiness before traffic moves on.
    let first = *plan.steps.first();
    output.progress(&format!("  → Staging revision at {}%...", first));
    let mut staged = rollout.stage_revision(provider, first).await?;
    staged = verify_step(provider, staged, plan.step_timeout, output, diag).await?;

    for weight in plan.steps.iter().skip(1).copied() {
        if weight == TrafficWeight::FULL {
            // The final promote below shifts to 100 itself.
            continue;
        }
        output.progress(&format!("  → Shifting traffic to {}%...", weight));
        staged = match staged.shift(provider, weight).await {
            Ok(s) => s,
            Err((failed, err)) => {
                drain(provider, failed, output, diag).await;
                return Err(err.into());
            }
        };
        staged = verify_step(provider, staged, plan.step_timeout, output, diag).await?;
    }

    output.progress("  → Promoting to 100% and retiring superseded revisions...");
    let promoted = staged.promote(provider, &plan.retain).await?;
    output.progress(&format!(
        "  ✓ Promoted revision: {}",
        promoted.promoted_revision()
    ));
    promoted.finish();

    Ok(())
}

/// Gate one canary step on revision readiness, draining on failure.
async fn verify_step<C: ControlPlaneClient>(
    provider: &ManagedProvider<C>,
    staged: Rollout<Staged>,
    timeout: std::time::Duration,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<Rollout<Staged>> {
    output.progress("  → Waiting for revision readiness...");
    match staged.verify_revision(provider, timeout).await {
        Ok(s) => Ok(s),
        Err((failed, err)) => {
            drain(provider, failed, output, diag).await;
            Err(err.into())
        }
    }
}

/// Drain a failed canary to weight zero. The revision stays active for
/// diagnosis; prior revisions absorb the traffic again.
async fn drain<C: ControlPlaneClient>(
    provider: &ManagedProvider<C>,
    failed: Rollout<Staged>,
    output: &Output,
    diag: &mut Diagnostics,
) {
    let revision = failed
        .new_revision()
        .map(|r| r.to_string())
        .unwrap_or_default();
    output.warning(&format!("draining failed revision {} to 0%", revision));

    if let Err(err) = failed.demote(provider).await {
        diag.warn(Warning::deactivate(format!(
            "failed to drain revision {}: {}",
            revision, err
        )));
    }
}
