//! Service controller

use super::finish;
use crate::domain::models::{OperationResult, ResourceKind, ServiceModel, TenancyKey, Verb};
use crate::domain::ports::{load_template, ClusterApiRef, TemplateStoreRef};
use crate::error::Result;
use crate::naming::{NameResolver, ServiceNames};
use crate::projection::project_service;
use crate::synthesis::{overlay_service_patch, synthesize_service};
use k8s_openapi::api::core::v1::Service;
use std::sync::Arc;
use tracing::debug;

const KIND: ResourceKind = ResourceKind::Service;

pub struct ServiceController {
    cluster: ClusterApiRef<Service>,
    templates: TemplateStoreRef,
    names: Arc<dyn NameResolver>,
}

impl ServiceController {
    pub fn new(
        cluster: ClusterApiRef<Service>,
        templates: TemplateStoreRef,
        names: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            cluster,
            templates,
            names,
        }
    }

    pub async fn create(
        &self,
        key: &TenancyKey,
        request: &ServiceModel,
    ) -> Result<OperationResult<ServiceModel>> {
        let names = self.names.service_names(key);
        let result = self.submit(&names, request).await;
        finish(KIND, Verb::Create, &names.service, result)
    }

    pub async fn read(&self, key: &TenancyKey) -> Result<OperationResult<ServiceModel>> {
        let names = self.names.service_names(key);
        let result = self
            .cluster
            .get(Some(&names.namespace), &names.service)
            .await
            .map(|live| project_service(&live));
        finish(KIND, Verb::Read, &names.service, result)
    }

    /// Overlay ports and selectors onto the live service
    pub async fn patch(
        &self,
        key: &TenancyKey,
        request: &ServiceModel,
    ) -> Result<OperationResult<ServiceModel>> {
        let names = self.names.service_names(key);
        let result = self.overlay(&names, request).await;
        finish(KIND, Verb::Patch, &names.service, result)
    }

    pub async fn delete(&self, key: &TenancyKey) -> Result<OperationResult<()>> {
        let names = self.names.service_names(key);
        let result = self
            .cluster
            .delete(Some(&names.namespace), &names.service)
            .await;
        finish(KIND, Verb::Delete, &names.service, result)
    }

    async fn submit(&self, names: &ServiceNames, request: &ServiceModel) -> Result<ServiceModel> {
        let template: Service = load_template(self.templates.as_ref(), KIND).await?;
        let manifest = synthesize_service(&template, names, request);
        debug!(?manifest, "Synthesized service");

        let created = self
            .cluster
            .create(Some(&names.namespace), &manifest)
            .await?;
        Ok(project_service(&created))
    }

    async fn overlay(&self, names: &ServiceNames, request: &ServiceModel) -> Result<ServiceModel> {
        let live = self
            .cluster
            .get(Some(&names.namespace), &names.service)
            .await?;
        let manifest = overlay_service_patch(live, request);

        let patched = self
            .cluster
            .patch_merge(Some(&names.namespace), &names.service, &manifest)
            .await?;
        Ok(project_service(&patched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controlplane::controllers::testing::cluster_with_namespace;
    use crate::controlplane::templates::BuiltinTemplateStore;
    use crate::domain::models::ServicePortModel;
    use crate::naming::TenantScopedNames;
    use assert_matches::assert_matches;
    use std::collections::BTreeMap;

    fn web() -> TenancyKey {
        TenancyKey::new(Some("teamA"), "acme", "web").unwrap()
    }

    fn selector() -> BTreeMap<String, String> {
        [("app".to_string(), "web-teamA-pod".to_string())].into()
    }

    #[tokio::test]
    async fn test_service_lifecycle() {
        let cluster = cluster_with_namespace("acme-ns").await;
        let services = ServiceController::new(
            cluster,
            Arc::new(BuiltinTemplateStore),
            Arc::new(TenantScopedNames::new()),
        );

        let request = ServiceModel {
            selectors: Some(selector()),
            ports: vec![ServicePortModel {
                port: 80,
                protocol: Some("TCP".into()),
                target_port: Some(8080),
            }],
            ..Default::default()
        };
        let created = services
            .create(&web(), &request)
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(created.name.as_deref(), Some("web-teamA-svc"));
        assert_eq!(created.selectors, Some(selector()));
        assert_eq!(created.ports[0].target_port, Some(8080));

        // Selector only: ports stay as they are
        let mut other = BTreeMap::new();
        other.insert("app".to_string(), "api-teamA-pod".to_string());
        let patch = ServiceModel {
            selectors: Some(other.clone()),
            ..Default::default()
        };
        let patched = services
            .patch(&web(), &patch)
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(patched.selectors, Some(other));
        assert_eq!(patched.ports, created.ports);

        assert!(services.delete(&web()).await.unwrap().is_success());
        assert_matches!(
            services.read(&web()).await.unwrap(),
            OperationResult::Failure(f) if f.status == 404
        );
    }
}
