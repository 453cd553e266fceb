// ABOUTME: Error types for control-plane invocations.
// ABOUTME: Failed executions carry the raw CLI output for diagnosis.

use thiserror::Error;

/// Errors from control-plane calls.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' failed: {output}")]
    ExecutionFailed { command: String, output: String },

    #[error("'{command}' returned malformed output: {source}")]
    MalformedOutput {
        command: String,
        source: serde_json::Error,
    },

    #[error("failed to write deployment descriptor: {0}")]
    Descriptor(String),
}
