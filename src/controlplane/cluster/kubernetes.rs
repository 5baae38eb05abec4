//! Kubernetes Cluster Adapter
//!
//! Forwards every call to the API server through `kube::Api`. Rejections come
//! back as `kube::Error::Api` and are left for the controllers to classify.

use crate::domain::ports::ClusterApi;
use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::debug;

// =============================================================================
// Scope Selection
// =============================================================================

/// Builds the `Api` handle for a kind, cluster-scoped or namespaced
pub trait KubeScope:
    Resource<DynamicType = ()> + Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn api(client: Client, namespace: Option<&str>) -> Api<Self>;
}

fn namespaced<K>(client: Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
{
    match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::default_namespaced(client),
    }
}

impl KubeScope for Namespace {
    fn api(client: Client, _namespace: Option<&str>) -> Api<Self> {
        Api::all(client)
    }
}

impl KubeScope for Deployment {
    fn api(client: Client, namespace: Option<&str>) -> Api<Self> {
        namespaced(client, namespace)
    }
}

impl KubeScope for Service {
    fn api(client: Client, namespace: Option<&str>) -> Api<Self> {
        namespaced(client, namespace)
    }
}

impl KubeScope for HorizontalPodAutoscaler {
    fn api(client: Client, namespace: Option<&str>) -> Api<Self> {
        namespaced(client, namespace)
    }
}

// =============================================================================
// Kube Cluster
// =============================================================================

/// Cluster adapter backed by a live API server
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using in-cluster config or the local kubeconfig
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl<K: KubeScope> ClusterApi<K> for KubeCluster {
    async fn create(&self, namespace: Option<&str>, object: &K) -> Result<K> {
        debug!(
            "POST {} {:?} in {:?}",
            K::kind(&()),
            object.meta().name,
            namespace
        );
        let api = K::api(self.client.clone(), namespace);
        Ok(api.create(&PostParams::default(), object).await?)
    }

    async fn get(&self, namespace: Option<&str>, name: &str) -> Result<K> {
        debug!("GET {} {} in {:?}", K::kind(&()), name, namespace);
        let api = K::api(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn patch_merge(&self, namespace: Option<&str>, name: &str, object: &K) -> Result<K> {
        debug!("PATCH {} {} in {:?}", K::kind(&()), name, namespace);
        let api = K::api(self.client.clone(), namespace);
        Ok(api
            .patch(name, &PatchParams::default(), &Patch::Merge(object))
            .await?)
    }

    async fn delete(&self, namespace: Option<&str>, name: &str) -> Result<()> {
        debug!("DELETE {} {} in {:?}", K::kind(&()), name, namespace);
        let api = K::api(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "kubernetes"
    }
}
