//! Domain Models - Request/response shapes exposed to callers
//!
//! Every value here is built for one request and dropped with the response.
//! Field names follow the wire format callers already use (camelCase JSON).

use crate::error::{Error, Result};
use kube::error::ErrorResponse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Tenancy Key
// =============================================================================

/// Identifies a resource as (tenant, group, resource name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenancyKey {
    /// Owning tenant; `None` selects the two-part naming scheme
    pub tenant: Option<String>,
    /// Group, mapped one-to-one to a namespace
    pub group: String,
    /// Caller-chosen resource name
    pub resource: String,
}

impl TenancyKey {
    /// Create a validated key
    ///
    /// An empty tenant is treated as absent. Empty group or resource names are
    /// rejected.
    pub fn new(tenant: Option<&str>, group: &str, resource: &str) -> Result<Self> {
        let group = group.trim();
        let resource = resource.trim();

        if group.is_empty() {
            return Err(Error::InvalidRequest("group name must not be empty".into()));
        }
        if resource.is_empty() {
            return Err(Error::InvalidRequest(
                "resource name must not be empty".into(),
            ));
        }

        let tenant = tenant
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(Self {
            tenant,
            group: group.to_string(),
            resource: resource.to_string(),
        })
    }

    /// Key for a group-level object (the namespace itself)
    pub fn for_group(group: &str) -> Result<Self> {
        Self::new(None, group, group)
    }

    /// Same tenant and group, different resource
    pub fn sibling(&self, resource: &str) -> Result<Self> {
        Self::new(self.tenant.as_deref(), &self.group, resource)
    }

    /// Tenant segment, if any
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }
}

impl std::fmt::Display for TenancyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tenant {
            Some(tenant) => write!(f, "{}/{}/{}", self.group, tenant, self.resource),
            None => write!(f, "{}/{}", self.group, self.resource),
        }
    }
}

// =============================================================================
// Resource Kinds
// =============================================================================

/// Kinds of cluster object this system provisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Namespace,
    Deployment,
    Service,
    HorizontalPodAutoscaler,
}

impl ResourceKind {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespace",
            ResourceKind::Deployment => "deployment",
            ResourceKind::Service => "service",
            ResourceKind::HorizontalPodAutoscaler => "hpa",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Controller verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Read,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Read => "read",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Request Models
// =============================================================================

/// Namespace as seen by callers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceModel {
    pub name: String,
}

/// Deployment request/response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
    /// Container ports; an empty list counts as "not supplied"
    #[serde(default)]
    pub ports: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    /// Environment; values are write-only and never projected back
    #[serde(default)]
    pub env: Vec<EnvVarModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesModel>,
    /// Output only; the container is always named after the resource
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

/// Single environment variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVarModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl EnvVarModel {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Container requests and limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceItem>,
}

/// CPU and memory quantities (e.g. "500m", "256Mi")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl ResourceItem {
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }
}

/// Service request/response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Service ports; an empty list counts as "not supplied"
    #[serde(default)]
    pub ports: Vec<ServicePortModel>,
    /// Pod selector, submitted exactly as given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<BTreeMap<String, String>>,
}

/// (port, protocol, targetPort) descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortModel {
    pub port: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<i32>,
}

/// Horizontal pod autoscaler request/response body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HpaModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Resource name of the target deployment, as the caller knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<i32>,
    /// Target average CPU utilization percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i32>,
}

// =============================================================================
// Operation Outcome
// =============================================================================

/// Failure reported by the orchestrator, forwarded verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorModel {
    pub message: String,
    pub reason: String,
    pub status: u16,
}

impl From<&ErrorResponse> for ErrorModel {
    fn from(response: &ErrorResponse) -> Self {
        Self {
            message: response.message.clone(),
            reason: response.reason.clone(),
            status: response.code,
        }
    }
}

impl std::fmt::Display for ErrorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status, self.reason, self.message)
    }
}

/// Outcome of one controller verb
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult<T> {
    Success(T),
    Failure(ErrorModel),
}

impl<T> OperationResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        match self {
            OperationResult::Success(value) => OperationResult::Success(f(value)),
            OperationResult::Failure(error) => OperationResult::Failure(error),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, ErrorModel> {
        match self {
            OperationResult::Success(value) => Ok(value),
            OperationResult::Failure(error) => Err(error),
        }
    }

    /// Split a cluster call into success, transport failure, or fault
    ///
    /// Only an API server `Status` becomes a [`OperationResult::Failure`];
    /// every other error is returned as `Err`.
    pub fn settle(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(OperationResult::Success(value)),
            Err(err) => match err.api_status() {
                Some(status) => Ok(OperationResult::Failure(ErrorModel::from(status))),
                None => Err(err),
            },
        }
    }
}
