//! Domain Ports - Boundaries between the provisioning core and the outside
//!
//! The core never talks to Kubernetes or the filesystem directly. Adapters in
//! [`crate::controlplane`] implement these traits.

use crate::domain::models::ResourceKind;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

// =============================================================================
// Cluster Port
// =============================================================================

/// Per-kind object operations against the orchestrator
///
/// `namespace` is `None` for cluster-scoped kinds. A rejection by the API
/// server comes back as `Error::Kube(kube::Error::Api(_))`; any other error is
/// a fault.
#[async_trait]
pub trait ClusterApi<K>: Send + Sync
where
    K: Send + Sync + 'static,
{
    /// Create the object
    async fn create(&self, namespace: Option<&str>, object: &K) -> Result<K>;

    /// Fetch the live object
    async fn get(&self, namespace: Option<&str>, name: &str) -> Result<K>;

    /// Submit `object` as a JSON merge patch
    async fn patch_merge(&self, namespace: Option<&str>, name: &str, object: &K) -> Result<K>;

    /// Delete the object
    async fn delete(&self, namespace: Option<&str>, name: &str) -> Result<()>;

    /// Name of the backing implementation
    fn backend_name(&self) -> &str;
}

// =============================================================================
// Template Port
// =============================================================================

/// Source of structural manifest templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Load the raw template for `kind`
    async fn load(&self, kind: ResourceKind) -> Result<serde_json::Value>;

    /// Name of the backing implementation
    fn store_name(&self) -> &str;
}

/// Load a template and parse it into its typed manifest
pub async fn load_template<K: DeserializeOwned>(
    store: &dyn TemplateStore,
    kind: ResourceKind,
) -> Result<K> {
    let raw = store.load(kind).await?;
    serde_json::from_value(raw).map_err(|e| Error::Template {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type ClusterApiRef<K> = Arc<dyn ClusterApi<K>>;
pub type TemplateStoreRef = Arc<dyn TemplateStore>;
