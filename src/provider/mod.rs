// ABOUTME: Deployment provider abstraction and implementations.
// ABOUTME: Capability traits plus the managed-platform provider.

mod managed;
mod traits;

pub use managed::{ManagedProvider, health_path_for};
pub use traits::*;
