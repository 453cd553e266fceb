// ABOUTME: Environment variable value types with interpolation support.
// ABOUTME: Handles literal values and references to host environment variables.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// A configured environment value: either a literal, or an indirection
/// through the host environment (`env: VAR_NAME`), optionally defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) => Ok(val),
                Err(_) => default
                    .clone()
                    .ok_or_else(|| Error::MissingEnvVar(var.clone())),
            },
        }
    }
}

/// Resolve a whole env map to plain strings, failing on the first missing
/// variable without a default.
pub fn resolve_env_map(map: &HashMap<String, EnvValue>) -> Result<HashMap<String, String>> {
    map.iter()
        .map(|(k, v)| v.resolve().map(|resolved| (k.clone(), resolved)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_resolves_to_itself() {
        assert_eq!(
            EnvValue::Literal("info".to_string()).resolve().unwrap(),
            "info"
        );
    }

    #[test]
    fn from_env_reads_host_environment() {
        temp_env::with_var("POLEPOLE_TEST_DB", Some("postgres://x"), || {
            let value = EnvValue::FromEnv {
                var: "POLEPOLE_TEST_DB".to_string(),
                default: None,
            };
            assert_eq!(value.resolve().unwrap(), "postgres://x");
        });
    }

    #[test]
    fn missing_env_uses_default_or_errors() {
        temp_env::with_var_unset("POLEPOLE_TEST_MISSING", || {
            let with_default = EnvValue::FromEnv {
                var: "POLEPOLE_TEST_MISSING".to_string(),
                default: Some("fallback".to_string()),
            };
            assert_eq!(with_default.resolve().unwrap(), "fallback");

            let without_default = EnvValue::FromEnv {
                var: "POLEPOLE_TEST_MISSING".to_string(),
                default: None,
            };
            assert!(matches!(
                without_default.resolve(),
                Err(Error::MissingEnvVar(_))
            ));
        });
    }
}
