// ABOUTME: Tests for polepole.yml parsing, overlays, and spec construction.
// ABOUTME: Covers env interpolation, rollout plans, and validation failures.

use polepole::config::{Config, init_config};
use polepole::error::Error;
use polepole::provider::ProviderExtensions;
use std::time::Duration;

const FULL_YAML: &str = r#"
app: content-api
image: registry.example.com/content:v2
port: 8080
group: prod-rg
env:
  LOG_LEVEL: info
  DATABASE_URL:
    env: POLEPOLE_CONFIG_TEST_DB
    default: postgres://localhost/dev
resources:
  cpus: 0.5
  memory: 512Mi
health_path: /healthz
health_timeout: 3m
dapr:
  app_id: content
  settings:
    log-level: debug
scale:
  min_replicas: 1
  max_replicas: 3
  external_ingress: true
rollout:
  steps: [20, 50, 100]
  step_timeout: 10m
  retain:
    - content-api--rkeep
destinations:
  staging:
    group: staging-rg
    env:
      LOG_LEVEL: debug
"#;

#[test]
fn parses_full_config() {
    let config = Config::from_yaml(FULL_YAML).unwrap();

    assert_eq!(config.app.as_str(), "content-api");
    assert_eq!(config.image.to_string(), "registry.example.com/content:v2");
    assert_eq!(config.port, 8080);
    assert_eq!(config.group.as_str(), "prod-rg");
    assert_eq!(config.health_timeout, Duration::from_secs(180));
    assert_eq!(config.health_path.as_deref(), Some("/healthz"));

    let dapr = config.dapr.as_ref().unwrap();
    assert_eq!(dapr.app_id, "content");
    assert_eq!(dapr.settings.get("log-level").unwrap(), "debug");

    let rollout = config.rollout.as_ref().unwrap();
    assert_eq!(rollout.steps.len(), 3);
    assert_eq!(rollout.steps.first().value(), 20);
    assert_eq!(rollout.step_timeout, Duration::from_secs(600));
    assert_eq!(rollout.retain.len(), 1);
}

#[test]
fn health_timeout_defaults_when_omitted() {
    let config = Config::from_yaml(
        "app: x\nimage: registry/x:v1\nport: 8080\ngroup: g\n",
    )
    .unwrap();
    assert_eq!(config.health_timeout, Duration::from_secs(120));
    assert!(config.rollout.is_none());
    assert_eq!(config.cli_binary(), "az");
}

#[test]
fn destination_overlay_merges_group_and_env() {
    let config = Config::from_yaml(FULL_YAML).unwrap();
    let staging = config.for_destination("staging").unwrap();

    assert_eq!(staging.group.as_str(), "staging-rg");
    // Destination env wins; untouched keys survive.
    assert!(staging.env.contains_key("DATABASE_URL"));
    assert_eq!(
        staging.env.get("LOG_LEVEL").unwrap(),
        &polepole::config::EnvValue::Literal("debug".to_string())
    );
    // Base rollout plan is inherited.
    assert!(staging.rollout.is_some());
}

#[test]
fn unknown_destination_is_an_error() {
    let config = Config::from_yaml(FULL_YAML).unwrap();
    assert!(matches!(
        config.for_destination("nope"),
        Err(Error::UnknownDestination(_))
    ));
}

#[test]
fn to_spec_resolves_env_and_extensions() {
    temp_env::with_var_unset("POLEPOLE_CONFIG_TEST_DB", || {
        let config = Config::from_yaml(FULL_YAML).unwrap();
        let spec = config.to_spec().unwrap();

        assert_eq!(spec.name.as_str(), "content-api");
        assert_eq!(spec.port, 8080);
        assert_eq!(spec.dapr_app_id.as_deref(), Some("content"));
        assert_eq!(
            spec.env.get("DATABASE_URL").unwrap(),
            "postgres://localhost/dev"
        );

        let resources = spec.resources.as_ref().unwrap();
        assert_eq!(resources.memory, "512Mi");

        match &spec.extensions {
            ProviderExtensions::Managed(m) => {
                assert_eq!(m.max_replicas, 3);
                assert!(m.external_ingress);
            }
            other => panic!("expected managed extensions, got {:?}", other),
        }
    });
}

#[test]
fn to_spec_fails_on_missing_env_without_default() {
    temp_env::with_var_unset("POLEPOLE_CONFIG_TEST_REQUIRED", || {
        let yaml = r#"
app: x
image: registry/x:v1
port: 8080
group: g
env:
  SECRET:
    env: POLEPOLE_CONFIG_TEST_REQUIRED
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert!(matches!(
            config.to_spec(),
            Err(Error::MissingEnvVar(name)) if name == "POLEPOLE_CONFIG_TEST_REQUIRED"
        ));
    });
}

#[test]
fn rejects_invalid_app_name() {
    let yaml = "app: Content_API\nimage: registry/x:v1\nport: 8080\ngroup: g\n";
    assert!(Config::from_yaml(yaml).is_err());
}

#[test]
fn rejects_empty_rollout_steps() {
    let yaml = "app: x\nimage: registry/x:v1\nport: 8080\ngroup: g\nrollout:\n  steps: []\n";
    assert!(Config::from_yaml(yaml).is_err());
}

#[test]
fn rejects_out_of_range_step_weight() {
    let yaml = "app: x\nimage: registry/x:v1\nport: 8080\ngroup: g\nrollout:\n  steps: [150]\n";
    assert!(Config::from_yaml(yaml).is_err());
}

#[test]
fn discover_finds_config_in_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("polepole.yml"),
        "app: x\nimage: registry/x:v1\nport: 8080\ngroup: g\n",
    )
    .unwrap();

    let config = Config::discover(dir.path()).unwrap();
    assert_eq!(config.app.as_str(), "x");
}

#[test]
fn discover_errors_when_nothing_found() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Config::discover(dir.path()),
        Err(Error::ConfigNotFound(_))
    ));
}

#[test]
fn init_writes_template_and_respects_force() {
    let dir = tempfile::tempdir().unwrap();

    init_config(dir.path(), Some("content-api"), Some("registry/content:v2"), false).unwrap();
    let written = std::fs::read_to_string(dir.path().join("polepole.yml")).unwrap();
    assert!(written.contains("app: content-api"));
    assert!(written.contains("image: registry/content:v2"));

    // Second init without force refuses to overwrite.
    assert!(matches!(
        init_config(dir.path(), None, None, false),
        Err(Error::AlreadyExists(_))
    ));
    init_config(dir.path(), None, None, true).unwrap();
}

#[test]
fn init_rejects_invalid_seed_values() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        init_config(dir.path(), Some("Not Valid"), None, false),
        Err(Error::InvalidConfig(_))
    ));
}
