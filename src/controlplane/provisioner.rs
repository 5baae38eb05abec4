//! Provisioner
//!
//! Wires the four controllers to one cluster adapter, one template store and
//! the canonical naming scheme. Holds no per-request state.

use crate::controlplane::cluster::{ClusterBackend, InMemoryCluster, KubeCluster};
use crate::controlplane::controllers::{
    DeploymentController, HpaController, NamespaceController, ServiceController,
};
use crate::controlplane::templates::{BuiltinTemplateStore, FileTemplateStore};
use crate::domain::ports::{ClusterApi, TemplateStoreRef};
use crate::error::{Error, Result};
use crate::naming::{NameResolver, TenantScopedNames};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Namespace, Service};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

// =============================================================================
// Provisioner Configuration
// =============================================================================

/// Configuration for the provisioner
#[derive(Debug, Clone, Default)]
pub struct ProvisionerConfig {
    /// Cluster adapter to build
    pub backend: ClusterBackend,
    /// Directory holding `template-*.yaml`; builtin templates when unset
    pub template_dir: Option<PathBuf>,
}

/// What the provisioner is wired to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionerStatus {
    pub cluster_backend: String,
    pub template_store: String,
}

// =============================================================================
// Provisioner
// =============================================================================

pub struct Provisioner {
    namespaces: NamespaceController,
    deployments: DeploymentController,
    services: ServiceController,
    hpas: HpaController,
    status: ProvisionerStatus,
}

impl Provisioner {
    /// Build controllers over one cluster adapter
    pub fn new<C>(cluster: Arc<C>, templates: TemplateStoreRef) -> Arc<Self>
    where
        C: ClusterApi<Namespace>
            + ClusterApi<Deployment>
            + ClusterApi<Service>
            + ClusterApi<HorizontalPodAutoscaler>
            + 'static,
    {
        let names: Arc<dyn NameResolver> = Arc::new(TenantScopedNames::new());
        let status = ProvisionerStatus {
            cluster_backend: ClusterApi::<Namespace>::backend_name(cluster.as_ref()).to_string(),
            template_store: templates.store_name().to_string(),
        };

        Arc::new(Self {
            namespaces: NamespaceController::new(cluster.clone(), names.clone()),
            deployments: DeploymentController::new(
                cluster.clone(),
                templates.clone(),
                names.clone(),
            ),
            services: ServiceController::new(cluster.clone(), templates.clone(), names.clone()),
            hpas: HpaController::new(cluster, templates, names),
            status,
        })
    }

    /// Build the adapters named by `config`
    pub async fn from_config(config: &ProvisionerConfig) -> Result<Arc<Self>> {
        let templates: TemplateStoreRef = match &config.template_dir {
            Some(dir) if !dir.is_dir() => {
                return Err(Error::Configuration(format!(
                    "template directory {} does not exist",
                    dir.display()
                )));
            }
            Some(dir) => Arc::new(FileTemplateStore::new(dir)),
            None => Arc::new(BuiltinTemplateStore),
        };

        info!(
            "Initializing provisioner: backend={}, templates={}",
            config.backend,
            templates.store_name()
        );

        let provisioner = match config.backend {
            ClusterBackend::Kubernetes => {
                Self::new(Arc::new(KubeCluster::try_default().await?), templates)
            }
            ClusterBackend::InMemory => Self::new(Arc::new(InMemoryCluster::new()), templates),
        };

        Ok(provisioner)
    }

    pub fn namespaces(&self) -> &NamespaceController {
        &self.namespaces
    }

    pub fn deployments(&self) -> &DeploymentController {
        &self.deployments
    }

    pub fn services(&self) -> &ServiceController {
        &self.services
    }

    pub fn hpas(&self) -> &HpaController {
        &self.hpas
    }

    pub fn status(&self) -> &ProvisionerStatus {
        &self.status
    }
}
