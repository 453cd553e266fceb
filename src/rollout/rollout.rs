// ABOUTME: Generic rollout struct parameterized by a state marker.
// ABOUTME: Carries the spec and, once staged, the new revision name.

use crate::provider::ContainerSpec;
use crate::types::{AppName, RevisionName};
use std::marker::PhantomData;

use super::state::Initialized;

/// A rollout in progress, parameterized by its current state.
///
/// Transition methods consume `self` and return the next state, so a step
/// cannot run before its predecessors have succeeded.
#[derive(Debug)]
pub struct Rollout<S> {
    pub(crate) spec: ContainerSpec,
    pub(crate) new_revision: Option<RevisionName>,
    pub(crate) _state: PhantomData<S>,
}

impl Rollout<Initialized> {
    /// Begin a rollout for an enriched, validated spec.
    pub fn new(spec: ContainerSpec) -> Self {
        Rollout {
            spec,
            new_revision: None,
            _state: PhantomData,
        }
    }
}

impl<S> Rollout<S> {
    /// The app this rollout targets.
    pub fn app(&self) -> &AppName {
        &self.spec.name
    }

    /// The spec being rolled out.
    pub fn spec(&self) -> &ContainerSpec {
        &self.spec
    }

    /// The staged revision name (None before `stage_revision`).
    pub fn new_revision(&self) -> Option<&RevisionName> {
        self.new_revision.as_ref()
    }
}
