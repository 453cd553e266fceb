// ABOUTME: Composable capability traits for deployment providers.
// ABOUTME: A provider implements the subset of capabilities it supports.

mod container;
mod dapr;
mod health;
mod revisions;
pub(crate) mod sealed;
mod shared_types;
mod sidecar;

pub use container::{ContainerError, ContainerProvider};
pub use dapr::{DaprError, DaprProvider};
pub use health::{ContainerHealthChecker, ProbeError};
pub use revisions::{RevisionError, RevisionManager};
pub use shared_types::*;
pub use sidecar::DaprSidecarInjector;
