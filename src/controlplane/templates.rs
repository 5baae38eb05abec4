//! Template Stores
//!
//! Structural manifest templates, one YAML file per kind. Only the first
//! document of each file is used. Namespaces have no template; they are built
//! from their name alone.

use crate::domain::models::ResourceKind;
use crate::domain::ports::TemplateStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

pub const DEPLOYMENT_TEMPLATE: &str = "template-deploy.yaml";
pub const SERVICE_TEMPLATE: &str = "template-svc.yaml";
pub const HPA_TEMPLATE: &str = "template-hpa.yaml";

/// File name holding the template for `kind`
pub fn template_file(kind: ResourceKind) -> Option<&'static str> {
    match kind {
        ResourceKind::Deployment => Some(DEPLOYMENT_TEMPLATE),
        ResourceKind::Service => Some(SERVICE_TEMPLATE),
        ResourceKind::HorizontalPodAutoscaler => Some(HPA_TEMPLATE),
        ResourceKind::Namespace => None,
    }
}

fn not_found(kind: ResourceKind) -> Error {
    Error::TemplateNotFound {
        kind: kind.to_string(),
    }
}

/// Parse the first non-empty YAML document of `source`
pub fn parse_first_document(kind: ResourceKind, source: &str) -> Result<serde_json::Value> {
    for document in serde_yaml::Deserializer::from_str(source) {
        let value = serde_json::Value::deserialize(document)?;
        if !value.is_null() {
            return Ok(value);
        }
    }

    Err(Error::Template {
        kind: kind.to_string(),
        reason: "no YAML document found".into(),
    })
}

// =============================================================================
// Builtin Templates
// =============================================================================

/// Templates compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplateStore;

impl BuiltinTemplateStore {
    /// Parsed template for `kind`, without going through the async port
    pub fn template(kind: ResourceKind) -> Result<serde_json::Value> {
        let source = match kind {
            ResourceKind::Deployment => include_str!("../../templates/template-deploy.yaml"),
            ResourceKind::Service => include_str!("../../templates/template-svc.yaml"),
            ResourceKind::HorizontalPodAutoscaler => {
                include_str!("../../templates/template-hpa.yaml")
            }
            ResourceKind::Namespace => return Err(not_found(kind)),
        };
        parse_first_document(kind, source)
    }
}

#[async_trait]
impl TemplateStore for BuiltinTemplateStore {
    async fn load(&self, kind: ResourceKind) -> Result<serde_json::Value> {
        Self::template(kind)
    }

    fn store_name(&self) -> &str {
        "builtin"
    }
}

// =============================================================================
// File Templates
// =============================================================================

/// Templates read from a directory on every load
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    dir: PathBuf,
}

impl FileTemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn load(&self, kind: ResourceKind) -> Result<serde_json::Value> {
        let file = template_file(kind).ok_or_else(|| not_found(kind))?;
        let path = self.dir.join(file);

        debug!("Loading {} template from {}", kind, path.display());
        let source = match fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found(kind)),
            Err(e) => return Err(e.into()),
        };
        parse_first_document(kind, &source)
    }

    fn store_name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::load_template;
    use assert_matches::assert_matches;
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::core::v1::Service;

    #[tokio::test]
    async fn test_builtin_templates_parse() {
        let deployment: Deployment = load_template(&BuiltinTemplateStore, ResourceKind::Deployment)
            .await
            .unwrap();
        let containers = &deployment.spec.unwrap().template.spec.unwrap().containers;
        assert_eq!(containers.len(), 1);

        let raw = BuiltinTemplateStore
            .load(ResourceKind::HorizontalPodAutoscaler)
            .await
            .unwrap();
        assert_eq!(raw["apiVersion"], "autoscaling/v1");

        assert_matches!(
            BuiltinTemplateStore.load(ResourceKind::Namespace).await,
            Err(Error::TemplateNotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_file_store_uses_first_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SERVICE_TEMPLATE),
            "---\napiVersion: v1\nkind: Service\nmetadata:\n  name: first\n---\n\
             apiVersion: v1\nkind: Service\nmetadata:\n  name: second\n",
        )
        .unwrap();

        let store = FileTemplateStore::new(dir.path());
        let service: Service = load_template(&store, ResourceKind::Service).await.unwrap();
        assert_eq!(service.metadata.name.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_file_store_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTemplateStore::new(dir.path());

        assert_matches!(
            store.load(ResourceKind::Deployment).await,
            Err(Error::TemplateNotFound { .. })
        );
    }

    #[tokio::test]
    async fn test_file_store_malformed_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(HPA_TEMPLATE), "spec: [unclosed").unwrap();

        let store = FileTemplateStore::new(dir.path());
        assert_matches!(
            store.load(ResourceKind::HorizontalPodAutoscaler).await,
            Err(Error::YamlParse(_))
        );
    }

    #[tokio::test]
    async fn test_file_store_reads_edits_between_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SERVICE_TEMPLATE);
        let store = FileTemplateStore::new(dir.path());

        fs::write(&path, "apiVersion: v1\nkind: Service\nmetadata:\n  name: before\n")
            .await
            .unwrap();
        let before: Service = load_template(&store, ResourceKind::Service).await.unwrap();
        assert_eq!(before.metadata.name.as_deref(), Some("before"));

        fs::write(&path, "apiVersion: v1\nkind: Service\nmetadata:\n  name: after\n")
            .await
            .unwrap();
        let after: Service = load_template(&store, ResourceKind::Service).await.unwrap();
        assert_eq!(after.metadata.name.as_deref(), Some("after"));
    }
}
