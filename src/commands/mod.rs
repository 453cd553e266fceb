// ABOUTME: Command module aggregator for the polepole CLI.
// ABOUTME: Re-exports deploy, inspection, and lifecycle command handlers.

mod deploy;
mod inspect;
mod ops;

pub use deploy::deploy;
pub use inspect::{logs, revisions, status};
pub use ops::{cleanup, promote, stop};

use polepole::config::Config;
use polepole::controlplane::AzCli;
use polepole::provider::ManagedProvider;

/// Build the managed provider for a loaded config.
fn provider_for(config: &Config) -> ManagedProvider<AzCli> {
    ManagedProvider::new(AzCli::with_binary(config.cli_binary()), config.group.clone())
}
