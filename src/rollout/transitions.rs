// ABOUTME: State transition methods for rollout orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::marker::PhantomData;
use std::time::Duration;

use crate::provider::{ContainerProvider, ContainerSpec, DaprProvider, RevisionManager};
use crate::types::{RevisionName, TrafficWeight};

use super::error::RolloutError;
use super::rollout::Rollout;
use super::state::{Demoted, Deployed, HealthVerified, Initialized, Promoted, Staged};

/// Result type for transitions where the caller may need the rollout back
/// on failure (to demote, fetch logs, or report).
pub type TransitionResult<T, S> = Result<Rollout<T>, (Rollout<S>, RolloutError)>;

impl<S> Rollout<S> {
    /// Internal helper to move to a new state.
    fn transition<T>(self) -> Rollout<T> {
        Rollout {
            spec: self.spec,
            new_revision: self.new_revision,
            _state: PhantomData,
        }
    }

    /// Internal helper to move to a new state carrying the staged revision.
    fn transition_with_revision<T>(self, revision: RevisionName) -> Rollout<T> {
        Rollout {
            spec: self.spec,
            new_revision: Some(revision),
            _state: PhantomData,
        }
    }
}

// =============================================================================
// Initialized -> Deployed
// =============================================================================

impl Rollout<Initialized> {
    /// Submit the spec to the platform.
    ///
    /// Specs carrying a sidecar block also get their attachment validated;
    /// enrichment must have run before the rollout was constructed.
    ///
    /// # Errors
    ///
    /// Returns `RolloutError::Deploy` or `RolloutError::Sidecar`.
    #[must_use = "rollout state must be used"]
    pub async fn deploy<P: ContainerProvider + DaprProvider>(
        self,
        provider: &P,
    ) -> Result<Rollout<Deployed>, RolloutError> {
        if let Err(source) = provider.deploy_container(&self.spec).await {
            return Err(RolloutError::Deploy {
                app: self.spec.name.clone(),
                source,
            });
        }

        if self.spec.dapr.is_some() {
            if let Err(source) = provider.deploy_dapr_sidecar(&self.spec).await {
                return Err(RolloutError::Sidecar {
                    app: self.spec.name.clone(),
                    source,
                });
            }
        }

        Ok(self.transition())
    }
}

// =============================================================================
// Deployed -> HealthVerified
// =============================================================================

impl Rollout<Deployed> {
    /// Wait for the app to provision and answer its health endpoint.
    ///
    /// # Errors
    ///
    /// Returns `(self, error)` so the caller can fetch logs or report.
    #[must_use = "rollout state must be used"]
    pub async fn verify_health<P: ContainerProvider>(
        self,
        provider: &P,
        timeout: Duration,
    ) -> TransitionResult<HealthVerified, Deployed> {
        match provider
            .wait_for_container_health(&self.spec.name, timeout)
            .await
        {
            Ok(probe) => {
                tracing::info!(app = %self.spec.name, endpoint = ?probe.endpoint, "app healthy");
                Ok(self.transition())
            }
            Err(source) => {
                let app = self.spec.name.clone();
                Err((self, RolloutError::Health { app, source }))
            }
        }
    }
}

// =============================================================================
// HealthVerified -> Staged
// =============================================================================

impl Rollout<HealthVerified> {
    /// Create a new revision of the app holding `weight` percent of traffic.
    ///
    /// # Errors
    ///
    /// Returns `RolloutError::Stage` if the revision cannot be created.
    #[must_use = "rollout state must be used"]
    pub async fn stage_revision<P: RevisionManager>(
        self,
        provider: &P,
        weight: TrafficWeight,
    ) -> Result<Rollout<Staged>, RolloutError> {
        match provider
            .update_container_app_revision(&self.spec, weight)
            .await
        {
            Ok(revision) => Ok(self.transition_with_revision(revision)),
            Err(source) => Err(RolloutError::Stage {
                app: self.spec.name.clone(),
                source,
            }),
        }
    }
}

// =============================================================================
// Staged: verify, shift, promote, demote
// =============================================================================

impl Rollout<Staged> {
    fn staged_revision(&self) -> &RevisionName {
        self.new_revision
            .as_ref()
            .expect("staged rollout has a revision")
    }

    /// Wait for the staged revision to be listed active and provisioned.
    ///
    /// # Errors
    ///
    /// Returns `(self, error)`; the caller decides whether to `demote()`.
    /// A failed canary is never rolled back automatically.
    #[must_use = "rollout state must be used"]
    pub async fn verify_revision<P: RevisionManager>(
        self,
        provider: &P,
        timeout: Duration,
    ) -> TransitionResult<Staged, Staged> {
        let revision = self.staged_revision().clone();
        match provider
            .wait_for_revision_ready(&self.spec.name, &revision, timeout)
            .await
        {
            Ok(()) => Ok(self),
            Err(source) => {
                let app = self.spec.name.clone();
                Err((
                    self,
                    RolloutError::RevisionHealth {
                        app,
                        revision,
                        source,
                    },
                ))
            }
        }
    }

    /// Move the staged revision to a new traffic weight.
    ///
    /// # Errors
    ///
    /// Returns `(self, error)` so a failed shift can still be demoted.
    #[must_use = "rollout state must be used"]
    pub async fn shift<P: RevisionManager>(
        self,
        provider: &P,
        weight: TrafficWeight,
    ) -> TransitionResult<Staged, Staged> {
        let revision = self.staged_revision().clone();
        match provider
            .configure_traffic_splitting(&self.spec.name, &revision, weight)
            .await
        {
            Ok(()) => Ok(self),
            Err(source) => {
                let app = self.spec.name.clone();
                Err((self, RolloutError::Traffic { app, source }))
            }
        }
    }

    /// Shift the staged revision to 100% and soft-retire the rest.
    ///
    /// Revisions in `retain` stay active at weight zero for fast rollback.
    /// Deactivation failures leave zero-weight revisions active, which is
    /// harmless; they are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `RolloutError::Traffic` if the final shift fails.
    #[must_use = "rollout state must be used"]
    pub async fn promote<P: RevisionManager>(
        self,
        provider: &P,
        retain: &[RevisionName],
    ) -> Result<Rollout<Promoted>, RolloutError> {
        let revision = self.staged_revision().clone();
        let app = self.spec.name.clone();

        provider
            .configure_traffic_splitting(&app, &revision, TrafficWeight::FULL)
            .await
            .map_err(|source| RolloutError::Traffic {
                app: app.clone(),
                source,
            })?;

        match provider.list_app_revisions(&app).await {
            Ok(revisions) => {
                let superseded = revisions
                    .iter()
                    .filter(|r| r.active && r.name != revision && !retain.contains(&r.name));
                for r in superseded {
                    if let Err(err) = provider.deactivate_revision(&app, &r.name).await {
                        tracing::warn!(
                            app = %app,
                            revision = %r.name,
                            %err,
                            "failed to deactivate superseded revision"
                        );
                    }
                }
            }
            Err(err) => {
                tracing::warn!(app = %app, %err, "could not list revisions for retirement");
            }
        }

        Ok(self.transition())
    }

    /// Drain the staged revision to weight zero after a failed canary.
    ///
    /// The revision stays active for diagnosis; prior revisions absorb the
    /// traffic.
    ///
    /// # Errors
    ///
    /// Returns `RolloutError::Traffic` if the drain fails.
    #[must_use = "rollout state must be used"]
    pub async fn demote<P: RevisionManager>(
        self,
        provider: &P,
    ) -> Result<Rollout<Demoted>, RolloutError> {
        let revision = self.staged_revision().clone();
        let app = self.spec.name.clone();

        provider
            .configure_traffic_splitting(&app, &revision, TrafficWeight::ZERO)
            .await
            .map_err(|source| RolloutError::Traffic {
                app: app.clone(),
                source,
            })?;

        tracing::info!(app = %app, revision = %revision, "revision drained to zero");
        Ok(self.transition())
    }
}

// =============================================================================
// Terminal states
// =============================================================================

impl Rollout<Promoted> {
    /// The revision now holding all traffic.
    pub fn promoted_revision(&self) -> &RevisionName {
        self.new_revision
            .as_ref()
            .expect("promoted rollout has a revision")
    }

    /// Consume the rollout and return the spec.
    pub fn finish(self) -> ContainerSpec {
        self.spec
    }
}

impl Rollout<Demoted> {
    /// The drained revision, kept active at weight zero.
    pub fn demoted_revision(&self) -> &RevisionName {
        self.new_revision
            .as_ref()
            .expect("demoted rollout has a revision")
    }

    /// Consume the rollout and return the spec.
    pub fn finish(self) -> ContainerSpec {
        self.spec
    }
}
