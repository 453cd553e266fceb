// ABOUTME: Structured results parsed from control-plane JSON output.
// ABOUTME: AppDetails, Revision, and traffic table entries.

use crate::provider::ProvisioningState;
use crate::types::{RevisionName, TrafficWeight};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Details of a deployed application, as reported by `show`.
#[derive(Debug, Clone)]
pub struct AppDetails {
    pub provisioning_state: ProvisioningState,
    /// Externally reachable hostname; absent without external ingress.
    pub fqdn: Option<String>,
    pub dapr_enabled: bool,
}

impl AppDetails {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let app: RawApp = serde_json::from_str(raw)?;
        Ok(app.into_details())
    }
}

/// An immutable, named deployment of a spec at a point in time.
///
/// Owned by the platform; never deleted by this tool, only deactivated.
#[derive(Debug, Clone)]
pub struct Revision {
    pub name: RevisionName,
    pub created: DateTime<Utc>,
    pub active: bool,
    pub traffic_weight: TrafficWeight,
    pub provisioning_state: ProvisioningState,
}

impl Revision {
    pub fn list_from_json(raw: &str) -> Result<Vec<Self>, serde_json::Error> {
        let revisions: Vec<RawRevision> = serde_json::from_str(raw)?;
        Ok(revisions.into_iter().map(RawRevision::into_revision).collect())
    }
}

/// One row of the traffic table submitted to the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficAssignment {
    pub revision: RevisionName,
    pub weight: TrafficWeight,
}

// Raw wire shapes. The control plane nests app state under `properties`.

#[derive(Debug, Deserialize)]
struct RawApp {
    #[serde(default)]
    properties: RawAppProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAppProperties {
    #[serde(default)]
    provisioning_state: String,
    #[serde(default)]
    configuration: RawConfiguration,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfiguration {
    #[serde(default)]
    ingress: Option<RawIngress>,
    #[serde(default)]
    dapr: Option<RawDapr>,
}

#[derive(Debug, Deserialize)]
struct RawIngress {
    #[serde(default)]
    fqdn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDapr {
    #[serde(default)]
    enabled: bool,
}

impl RawApp {
    fn into_details(self) -> AppDetails {
        let props = self.properties;
        AppDetails {
            provisioning_state: props
                .provisioning_state
                .parse()
                .unwrap_or(ProvisioningState::Unknown),
            fqdn: props.configuration.ingress.and_then(|i| i.fqdn),
            dapr_enabled: props
                .configuration
                .dapr
                .map(|d| d.enabled)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRevision {
    name: String,
    #[serde(default)]
    properties: RawRevisionProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRevisionProperties {
    #[serde(default)]
    created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    active: bool,
    #[serde(default = "zero_weight")]
    traffic_weight: TrafficWeight,
    #[serde(default)]
    provisioning_state: String,
}

fn zero_weight() -> TrafficWeight {
    TrafficWeight::ZERO
}

impl RawRevision {
    fn into_revision(self) -> Revision {
        Revision {
            name: RevisionName::new(self.name),
            created: self.properties.created_time.unwrap_or(DateTime::UNIX_EPOCH),
            active: self.properties.active,
            traffic_weight: self.properties.traffic_weight,
            provisioning_state: self
                .properties
                .provisioning_state
                .parse()
                .unwrap_or(ProvisioningState::Unknown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_app_details() {
        let raw = r#"{
            "name": "content-api",
            "properties": {
                "provisioningState": "Succeeded",
                "configuration": {
                    "ingress": {"fqdn": "content-api.env.example.io"},
                    "dapr": {"enabled": true, "appId": "content"}
                }
            }
        }"#;

        let details = AppDetails::from_json(raw).unwrap();
        assert_eq!(details.provisioning_state, ProvisioningState::Succeeded);
        assert_eq!(details.fqdn.as_deref(), Some("content-api.env.example.io"));
        assert!(details.dapr_enabled);
    }

    #[test]
    fn missing_ingress_and_dapr_default_off() {
        let raw = r#"{"properties": {"provisioningState": "Provisioning", "configuration": {}}}"#;

        let details = AppDetails::from_json(raw).unwrap();
        assert_eq!(details.provisioning_state, ProvisioningState::Provisioning);
        assert!(details.fqdn.is_none());
        assert!(!details.dapr_enabled);
    }

    #[test]
    fn unrecognized_state_maps_to_unknown() {
        let raw = r#"{"properties": {"provisioningState": "Upgrading"}}"#;
        let details = AppDetails::from_json(raw).unwrap();
        assert_eq!(details.provisioning_state, ProvisioningState::Unknown);
    }

    #[test]
    fn parses_revision_list() {
        let raw = r#"[
            {
                "name": "content-api--r20260807100000",
                "properties": {
                    "createdTime": "2026-08-07T10:00:00Z",
                    "active": true,
                    "trafficWeight": 100,
                    "provisioningState": "Provisioned"
                }
            },
            {
                "name": "content-api--r20260806090000",
                "properties": {"active": false}
            }
        ]"#;

        let revisions = Revision::list_from_json(raw).unwrap();
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[0].name.as_str(), "content-api--r20260807100000");
        assert!(revisions[0].active);
        assert_eq!(revisions[0].traffic_weight, TrafficWeight::FULL);
        assert_eq!(
            revisions[0].provisioning_state,
            ProvisioningState::Succeeded
        );
        assert!(!revisions[1].active);
        assert_eq!(revisions[1].traffic_weight, TrafficWeight::ZERO);
        assert_eq!(revisions[1].provisioning_state, ProvisioningState::Unknown);
    }
}
