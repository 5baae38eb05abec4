//! Name Resolver
//!
//! Every suffix rule lives here. A deployment's selector, its pod template
//! label and a service or autoscaler that points at it must all come out of
//! the same composition, otherwise a selector silently stops matching.

use crate::domain::models::TenancyKey;

/// Label key carrying the pod label value on selectors and pod templates
pub const POD_LABEL_KEY: &str = "app";

// =============================================================================
// Suffix Tokens
// =============================================================================

/// Suffix token appended to a composed name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suffix {
    Namespace,
    Deployment,
    Pod,
    Container,
    Service,
    Hpa,
}

impl Suffix {
    pub fn token(&self) -> &'static str {
        match self {
            Suffix::Namespace => "-ns",
            Suffix::Deployment => "-deploy",
            Suffix::Pod => "-pod",
            Suffix::Container => "-app",
            Suffix::Service => "-svc",
            Suffix::Hpa => "-hpa",
        }
    }
}

// =============================================================================
// Resolved Name Sets
// =============================================================================

/// Names that make up one deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentNames {
    pub namespace: String,
    pub deployment: String,
    /// Value of the `app` label on both the selector and the pod template
    pub pod_label: String,
    pub container: String,
}

/// Names that make up one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNames {
    pub namespace: String,
    pub service: String,
}

/// Names that make up one autoscaler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpaNames {
    pub namespace: String,
    pub hpa: String,
    /// Deployment name resolved with the deployment rule
    pub scale_target: String,
}

// =============================================================================
// Resolver
// =============================================================================

/// Naming rules for tenant-scoped objects
pub trait NameResolver: Send + Sync {
    /// Namespace for a group; shared by every tenant of that group
    fn namespace_name(&self, group: &str) -> String;

    /// Compose `resource` (and tenant, when present) with `suffix`
    fn compose(&self, key: &TenancyKey, suffix: Suffix) -> String;

    /// Recover the resource segment from a name built by [`compose`]
    ///
    /// Returns `canonical` unchanged if it was not composed for this tenant
    /// and suffix.
    ///
    /// [`compose`]: NameResolver::compose
    fn base_name(&self, tenant: Option<&str>, canonical: &str, suffix: Suffix) -> String;

    fn deployment_names(&self, key: &TenancyKey) -> DeploymentNames {
        DeploymentNames {
            namespace: self.namespace_name(&key.group),
            deployment: self.compose(key, Suffix::Deployment),
            pod_label: self.compose(key, Suffix::Pod),
            container: self.compose(key, Suffix::Container),
        }
    }

    fn service_names(&self, key: &TenancyKey) -> ServiceNames {
        ServiceNames {
            namespace: self.namespace_name(&key.group),
            service: self.compose(key, Suffix::Service),
        }
    }

    /// `deployment` is the target's resource name under the same tenant and
    /// group as `key`
    fn hpa_names(&self, key: &TenancyKey, deployment: &TenancyKey) -> HpaNames {
        HpaNames {
            namespace: self.namespace_name(&key.group),
            hpa: self.compose(key, Suffix::Hpa),
            scale_target: self.deployment_names(deployment).deployment,
        }
    }
}

/// The canonical scheme: `{resource}-{tenant}{suffix}`, `{group}-ns`
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantScopedNames;

impl TenantScopedNames {
    pub fn new() -> Self {
        Self
    }
}

impl NameResolver for TenantScopedNames {
    fn namespace_name(&self, group: &str) -> String {
        format!("{}{}", group, Suffix::Namespace.token())
    }

    fn compose(&self, key: &TenancyKey, suffix: Suffix) -> String {
        if suffix == Suffix::Namespace {
            return self.namespace_name(&key.group);
        }

        match key.tenant() {
            Some(tenant) => format!("{}-{}{}", key.resource, tenant, suffix.token()),
            None => format!("{}{}", key.resource, suffix.token()),
        }
    }

    fn base_name(&self, tenant: Option<&str>, canonical: &str, suffix: Suffix) -> String {
        let tail = match tenant {
            Some(tenant) => format!("-{}{}", tenant, suffix.token()),
            None => suffix.token().to_string(),
        };

        match canonical.strip_suffix(&tail) {
            Some(base) if !base.is_empty() => base.to_string(),
            _ => canonical.to_string(),
        }
    }
}
