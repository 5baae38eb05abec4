//! Deployment controller

use super::finish;
use crate::domain::models::{
    DeploymentModel, OperationResult, ResourceKind, TenancyKey, Verb,
};
use crate::domain::ports::{load_template, ClusterApiRef, TemplateStoreRef};
use crate::error::Result;
use crate::naming::{DeploymentNames, NameResolver};
use crate::projection::project_deployment;
use crate::synthesis::{overlay_deployment_patch, synthesize_deployment};
use k8s_openapi::api::apps::v1::Deployment;
use std::sync::Arc;
use tracing::debug;

const KIND: ResourceKind = ResourceKind::Deployment;

pub struct DeploymentController {
    cluster: ClusterApiRef<Deployment>,
    templates: TemplateStoreRef,
    names: Arc<dyn NameResolver>,
}

impl DeploymentController {
    pub fn new(
        cluster: ClusterApiRef<Deployment>,
        templates: TemplateStoreRef,
        names: Arc<dyn NameResolver>,
    ) -> Self {
        Self {
            cluster,
            templates,
            names,
        }
    }

    /// Synthesize from the deployment template and create
    pub async fn create(
        &self,
        key: &TenancyKey,
        request: &DeploymentModel,
    ) -> Result<OperationResult<DeploymentModel>> {
        let names = self.names.deployment_names(key);
        let result = self.submit(&names, request).await;
        finish(KIND, Verb::Create, &names.deployment, result)
    }

    pub async fn read(&self, key: &TenancyKey) -> Result<OperationResult<DeploymentModel>> {
        let names = self.names.deployment_names(key);
        let result = self
            .cluster
            .get(Some(&names.namespace), &names.deployment)
            .await
            .map(|live| project_deployment(&live));
        finish(KIND, Verb::Read, &names.deployment, result)
    }

    /// Overlay env and ports onto the live deployment
    ///
    /// Empty lists leave the live values alone.
    pub async fn patch(
        &self,
        key: &TenancyKey,
        request: &DeploymentModel,
    ) -> Result<OperationResult<DeploymentModel>> {
        let names = self.names.deployment_names(key);
        let result = self.overlay(&names, request).await;
        finish(KIND, Verb::Patch, &names.deployment, result)
    }

    pub async fn delete(&self, key: &TenancyKey) -> Result<OperationResult<()>> {
        let names = self.names.deployment_names(key);
        let result = self
            .cluster
            .delete(Some(&names.namespace), &names.deployment)
            .await;
        finish(KIND, Verb::Delete, &names.deployment, result)
    }

    async fn submit(
        &self,
        names: &DeploymentNames,
        request: &DeploymentModel,
    ) -> Result<DeploymentModel> {
        let template: Deployment = load_template(self.templates.as_ref(), KIND).await?;
        let manifest = synthesize_deployment(&template, names, request)?;
        debug!(?manifest, "Synthesized deployment");

        let created = self
            .cluster
            .create(Some(&names.namespace), &manifest)
            .await?;
        Ok(project_deployment(&created))
    }

    async fn overlay(
        &self,
        names: &DeploymentNames,
        request: &DeploymentModel,
    ) -> Result<DeploymentModel> {
        let live = self
            .cluster
            .get(Some(&names.namespace), &names.deployment)
            .await?;
        let manifest = overlay_deployment_patch(live, names, request)?;

        let patched = self
            .cluster
            .patch_merge(Some(&names.namespace), &names.deployment, &manifest)
            .await?;
        Ok(project_deployment(&patched))
    }
}
