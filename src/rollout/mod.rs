// ABOUTME: Rollout orchestration using the type state pattern.
// ABOUTME: Exports state markers and the Rollout struct for compile-time safe rollouts.

mod error;
mod lock;
mod rollout;
mod state;
mod transitions;

pub use error::{RolloutError, RolloutErrorKind};
pub use lock::{DeployLock, LockError, LockInfo, with_lock};
pub use rollout::Rollout;
pub use state::{Demoted, Deployed, HealthVerified, Initialized, Promoted, Staged};
pub use transitions::TransitionResult;
