//! Horizontal pod autoscaler controller
//!
//! The caller names the target deployment by its resource name. It is run
//! through the deployment naming rule under the autoscaler's own tenant and
//! group, and read back the same way.

use super::finish;
use crate::domain::models::{HpaModel, OperationResult, ResourceKind, TenancyKey, Verb};
use crate::domain::ports::{load_template, ClusterApiRef, TemplateStoreRef};
use crate::error::{Error, Result};
use crate::naming::{HpaNames, NameResolver, Suffix};
use crate::projection::project_hpa;
use crate::synthesis::{overlay_hpa_patch, synthesize_hpa};
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use std::sync::Arc;
use tracing::debug;

const KIND: ResourceKind = ResourceKind::HorizontalPodAutoscaler;

pub struct HpaController {
    cluster: ClusterApiRef<HorizontalPodAutoscaler>,
    templates: TemplateStoreRef,
    names: Arc<dyn NameResolver>,
}

impl HpaController {
    pub fn new(
        cluster: ClusterApiRef<HorizontalPodAutoscaler>,
        templates: TemplateStoreRef,
        names: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            cluster,
            templates,
            names,
        }
    }

    /// Create an autoscaler for `request.deployment`
    ///
    /// A request without a target deployment is rejected as invalid.
    pub async fn create(
        &self,
        key: &TenancyKey,
        request: &HpaModel,
    ) -> Result<OperationResult<HpaModel>> {
        let hpa = self.names.compose(key, Suffix::Hpa);
        let result = self.submit(key, request).await;
        finish(KIND, Verb::Create, &hpa, result)
    }

    pub async fn read(&self, key: &TenancyKey) -> Result<OperationResult<HpaModel>> {
        let namespace = self.names.namespace_name(&key.group);
        let hpa = self.names.compose(key, Suffix::Hpa);
        let result = self
            .cluster
            .get(Some(&namespace), &hpa)
            .await
            .map(|live| project_hpa(&live, self.names.as_ref(), key));
        finish(KIND, Verb::Read, &hpa, result)
    }

    /// Overlay replica bounds and CPU target onto the live autoscaler
    ///
    /// The scale target is not mutable through a patch.
    pub async fn patch(
        &self,
        key: &TenancyKey,
        request: &HpaModel,
    ) -> Result<OperationResult<HpaModel>> {
        let namespace = self.names.namespace_name(&key.group);
        let hpa = self.names.compose(key, Suffix::Hpa);
        let result = self.overlay(key, &namespace, &hpa, request).await;
        finish(KIND, Verb::Patch, &hpa, result)
    }

    pub async fn delete(&self, key: &TenancyKey) -> Result<OperationResult<()>> {
        let namespace = self.names.namespace_name(&key.group);
        let hpa = self.names.compose(key, Suffix::Hpa);
        let result = self.cluster.delete(Some(&namespace), &hpa).await;
        finish(KIND, Verb::Delete, &hpa, result)
    }

    fn resolve(&self, key: &TenancyKey, request: &HpaModel) -> Result<HpaNames> {
        let deployment = request
            .deployment
            .as_deref()
            .ok_or_else(|| Error::InvalidRequest("deployment must be set".into()))?;
        let target = key.sibling(deployment)?;
        Ok(self.names.hpa_names(key, &target))
    }

    async fn submit(&self, key: &TenancyKey, request: &HpaModel) -> Result<HpaModel> {
        let names = self.resolve(key, request)?;
        let template: HorizontalPodAutoscaler =
            load_template(self.templates.as_ref(), KIND).await?;
        let manifest = synthesize_hpa(&template, &names, request)?;
        debug!(?manifest, "Synthesized autoscaler");

        let created = self
            .cluster
            .create(Some(&names.namespace), &manifest)
            .await?;
        Ok(project_hpa(&created, self.names.as_ref(), key))
    }

    async fn overlay(
        &self,
        key: &TenancyKey,
        namespace: &str,
        hpa: &str,
        request: &HpaModel,
    ) -> Result<HpaModel> {
        let live = self.cluster.get(Some(namespace), hpa).await?;
        let manifest = overlay_hpa_patch(live, request)?;

        let patched = self
            .cluster
            .patch_merge(Some(namespace), hpa, &manifest)
            .await?;
        Ok(project_hpa(&patched, self.names.as_ref(), key))
    }
}
