//! Namespace controller
//!
//! A namespace carries nothing but its name, so there is no patch verb.

use super::finish;
use crate::domain::models::{NamespaceModel, OperationResult, ResourceKind, TenancyKey, Verb};
use crate::domain::ports::ClusterApiRef;
use crate::error::Result;
use crate::naming::NameResolver;
use crate::projection::project_namespace;
use crate::synthesis::synthesize_namespace;
use k8s_openapi::api::core::v1::Namespace;
use std::sync::Arc;
use tracing::debug;

const KIND: ResourceKind = ResourceKind::Namespace;

pub struct NamespaceController {
    cluster: ClusterApiRef<Namespace>,
    names: Arc<dyn NameResolver>,
}

impl NamespaceController {
    pub fn new(cluster: ClusterApiRef<Namespace>, names: Arc<dyn NameResolver>) -> Self {
        Self { cluster, names }
    }

    fn resolve(&self, group: &str) -> Result<String> {
        let key = TenancyKey::for_group(group)?;
        Ok(self.names.namespace_name(&key.group))
    }

    /// Create the namespace for `group`
    pub async fn create(&self, group: &str) -> Result<OperationResult<NamespaceModel>> {
        let name = self.resolve(group)?;
        let manifest = synthesize_namespace(&name);
        debug!(?manifest, "Synthesized namespace");

        let result = self
            .cluster
            .create(None, &manifest)
            .await
            .map(|created| project_namespace(&created));
        finish(KIND, Verb::Create, &name, result)
    }

    pub async fn read(&self, group: &str) -> Result<OperationResult<NamespaceModel>> {
        let name = self.resolve(group)?;
        let result = self
            .cluster
            .get(None, &name)
            .await
            .map(|live| project_namespace(&live));
        finish(KIND, Verb::Read, &name, result)
    }

    /// Delete the namespace and everything in it
    pub async fn delete(&self, group: &str) -> Result<OperationResult<()>> {
        let name = self.resolve(group)?;
        let result = self.cluster.delete(None, &name).await;
        finish(KIND, Verb::Delete, &name, result)
    }
}
