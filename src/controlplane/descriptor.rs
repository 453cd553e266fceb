// ABOUTME: Deployment descriptor submitted to the control plane.
// ABOUTME: Serialized to YAML and handed to create/update as a file.

use serde::Serialize;

/// The full descriptor for a container app deployment.
#[derive(Debug, Clone, Serialize)]
pub struct AppDescriptor {
    pub properties: DescriptorProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptorProperties {
    pub configuration: DescriptorConfiguration,
    pub template: DescriptorTemplate,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptorConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<IngressSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dapr: Option<DaprSpec>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    pub external: bool,
    pub target_port: u16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaprSpec {
    pub enabled: bool,
    pub app_id: String,
    pub app_port: u16,
    /// Pass-through sidecar settings, sorted for stable output.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub settings: Vec<EnvVarEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorTemplate {
    pub containers: Vec<ContainerTemplate>,
    pub scale: ScaleSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerTemplate {
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVarEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub probes: Vec<ProbeSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnvVarEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourcesSpec {
    pub cpu: f64,
    pub memory: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub http_get: HttpGetSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct HttpGetSpec {
    pub path: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSpec {
    pub min_replicas: u32,
    pub max_replicas: u32,
}
