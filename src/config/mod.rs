// ABOUTME: Configuration types and parsing for polepole.yml.
// ABOUTME: Handles YAML parsing, env interpolation, and destination merging.

mod env_value;

pub use env_value::{EnvValue, resolve_env_map};

use crate::error::{Error, Result};
use crate::provider::{ContainerSpec, ManagedExtensions, ProviderExtensions, ResourceLimits};
use crate::types::{AppName, ImageRef, ResourceGroup, RevisionName, TrafficWeight};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "polepole.yml";
pub const CONFIG_FILENAME_ALT: &str = "polepole.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".polepole/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_app_name")]
    pub app: AppName,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub image: ImageRef,

    pub port: u16,

    /// Resource group (platform scope) the app lives in.
    pub group: ResourceGroup,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,

    #[serde(default)]
    pub resources: Option<ResourcesConfig>,

    #[serde(default)]
    pub health_path: Option<String>,

    #[serde(default = "default_health_timeout", with = "humantime_serde")]
    pub health_timeout: Duration,

    #[serde(default)]
    pub dapr: Option<DaprConfig>,

    #[serde(default)]
    pub scale: Option<ScaleConfig>,

    #[serde(default)]
    pub rollout: Option<RolloutConfig>,

    #[serde(default)]
    pub platform: Option<PlatformConfig>,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

/// Per-destination overrides layered over the base config.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default)]
    pub group: Option<ResourceGroup>,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,

    #[serde(default)]
    pub scale: Option<ScaleConfig>,

    #[serde(default)]
    pub rollout: Option<RolloutConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourcesConfig {
    pub cpus: f64,
    pub memory: String,
}

/// Dapr sidecar block: the mesh app ID plus pass-through settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DaprConfig {
    pub app_id: String,
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScaleConfig {
    #[serde(default = "default_min_replicas")]
    pub min_replicas: u32,
    #[serde(default = "default_max_replicas")]
    pub max_replicas: u32,
    #[serde(default = "default_external_ingress")]
    pub external_ingress: bool,
}

fn default_min_replicas() -> u32 {
    1
}

fn default_max_replicas() -> u32 {
    1
}

fn default_external_ingress() -> bool {
    true
}

/// Canary rollout plan: traffic steps, per-step readiness timeout, and
/// revisions to retain (kept active at weight zero for fast rollback).
#[derive(Debug, Clone, Deserialize)]
pub struct RolloutConfig {
    #[serde(deserialize_with = "deserialize_steps")]
    pub steps: NonEmpty<TrafficWeight>,

    #[serde(default = "default_step_timeout", with = "humantime_serde")]
    pub step_timeout: Duration,

    #[serde(default)]
    pub retain: Vec<RevisionName>,
}

fn default_step_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_health_timeout() -> Duration {
    Duration::from_secs(120)
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_cli")]
    pub cli: String,
}

fn default_cli() -> String {
    "az".to_string()
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref group) = dest.group {
            merged.group = group.clone();
        }

        // Deep merge env; destination values win.
        for (k, v) in &dest.env {
            merged.env.insert(k.clone(), v.clone());
        }

        if dest.scale.is_some() {
            merged.scale = dest.scale.clone();
        }

        if dest.rollout.is_some() {
            merged.rollout = dest.rollout.clone();
        }

        Ok(merged)
    }

    /// Build the deployable spec from this config.
    ///
    /// Resolves the env map, so it fails on a missing environment variable
    /// before any platform call is made.
    pub fn to_spec(&self) -> Result<ContainerSpec> {
        let env = resolve_env_map(&self.env)?;

        let mut spec = ContainerSpec::new(self.app.clone(), self.image.clone(), self.port);
        spec.env = env;
        spec.dapr_app_id = self.dapr.as_ref().map(|d| d.app_id.clone());
        spec.resources = self.resources.as_ref().map(|r| ResourceLimits {
            cpus: r.cpus,
            memory: r.memory.clone(),
        });
        spec.health_path = self.health_path.clone();
        spec.extensions = ProviderExtensions::Managed(match &self.scale {
            Some(s) => ManagedExtensions {
                min_replicas: s.min_replicas,
                max_replicas: s.max_replicas,
                external_ingress: s.external_ingress,
            },
            None => ManagedExtensions::default(),
        });

        Ok(spec)
    }

    /// Sidecar settings for enrichment (empty when no dapr block).
    pub fn dapr_settings(&self) -> HashMap<String, String> {
        self.dapr
            .as_ref()
            .map(|d| d.settings.clone())
            .unwrap_or_default()
    }

    /// Control-plane CLI binary, honoring the platform override.
    pub fn cli_binary(&self) -> &str {
        self.platform
            .as_ref()
            .map(|p| p.cli.as_str())
            .unwrap_or("az")
    }

    pub fn template() -> Self {
        Config {
            app: AppName::new("my-app").expect("template app name is valid"),
            image: ImageRef::parse("my-registry/my-app:latest")
                .expect("template image ref is valid"),
            port: 8080,
            group: ResourceGroup::new("my-group"),
            env: HashMap::new(),
            resources: None,
            health_path: None,
            health_timeout: default_health_timeout(),
            dapr: None,
            scale: None,
            rollout: None,
            platform: None,
            destinations: HashMap::new(),
        }
    }
}

pub fn init_config(
    dir: &Path,
    app: Option<&str>,
    image: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(a) = app {
        config.app = AppName::new(a).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    if let Some(i) = image {
        config.image = ImageRef::parse(i).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"app: {}
image: {}
port: {}
group: {}
# rollout:
#   steps: [20, 50, 100]
#   step_timeout: 10m
"#,
        config.app, config.image, config.port, config.group
    )
}

// Custom deserializers

fn deserialize_app_name<'de, D>(deserializer: D) -> std::result::Result<AppName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    AppName::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_image_ref<'de, D>(deserializer: D) -> std::result::Result<ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse(&s).map_err(serde::de::Error::custom)
}

fn deserialize_steps<'de, D>(
    deserializer: D,
) -> std::result::Result<NonEmpty<TrafficWeight>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let weights: Vec<TrafficWeight> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(weights)
        .ok_or_else(|| serde::de::Error::custom("rollout needs at least one traffic step"))
}
