// ABOUTME: Sidecar configuration manager, shared by every provider.
// ABOUTME: Validates and enriches a spec with Dapr settings before deploy.

use crate::provider::{ContainerSpec, DaprError, DaprSidecarConfig};
use std::collections::HashMap;

/// Sidecar settings applied when the user does not set them.
const DEFAULT_SETTINGS: &[(&str, &str)] = &[("log-level", "info")];

/// Validates and enriches container specs with sidecar configuration.
///
/// Runs before a spec reaches any provider, so providers can assume the
/// sidecar block, when present, is well-formed.
pub struct SidecarManager;

impl SidecarManager {
    /// Populate the spec's sidecar block from its mesh app ID and port.
    ///
    /// `settings` are user-supplied sidecar settings; platform defaults are
    /// filled in underneath them. Returns the config that was attached.
    pub fn enrich_spec(
        spec: &mut ContainerSpec,
        settings: &HashMap<String, String>,
    ) -> Result<DaprSidecarConfig, DaprError> {
        let app_id = match spec.dapr_app_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(DaprError::MissingAppId),
        };
        if spec.port == 0 {
            return Err(DaprError::InvalidAppPort);
        }

        let mut merged: HashMap<String, String> = DEFAULT_SETTINGS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        merged.extend(settings.iter().map(|(k, v)| (k.clone(), v.clone())));

        let config = DaprSidecarConfig {
            app_id,
            app_port: spec.port,
            settings: merged,
        };
        spec.dapr = Some(config.clone());
        Ok(config)
    }

    /// Validate a sidecar configuration without touching the platform.
    pub fn validate_config(config: &DaprSidecarConfig) -> Result<(), DaprError> {
        if config.app_id.is_empty() {
            return Err(DaprError::MissingAppId);
        }
        if config.app_port == 0 {
            return Err(DaprError::InvalidAppPort);
        }
        Ok(())
    }

    /// Logical sidecar name for an app ID. Pure; no I/O.
    pub fn sidecar_name(app_id: &str) -> String {
        format!("{}-daprd", app_id)
    }
}
