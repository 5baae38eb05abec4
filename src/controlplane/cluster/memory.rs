//! In-Memory Cluster
//!
//! Stands in for the API server in standalone mode and in tests. Objects are
//! kept as JSON and the same `Status` rejections a real API server would send
//! are produced: 404 for unknown objects or namespaces, 409 for duplicate
//! names and stale `resourceVersion`s.

use crate::domain::ports::ClusterApi;
use crate::error::{Error, Result};
use async_trait::async_trait;
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Plural resource name for namespaces, used for existence checks
const NAMESPACES: &str = "namespaces";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ObjectKey {
    resource: String,
    namespace: Option<String>,
    name: String,
}

/// In-process object store with API-server error semantics
#[derive(Default)]
pub struct InMemoryCluster {
    objects: RwLock<BTreeMap<ObjectKey, Value>>,
    resource_version: AtomicU64,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects across all kinds
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn next_version(&self) -> String {
        (self.resource_version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn key<K>(namespace: Option<&str>, name: &str) -> ObjectKey
    where
        K: Resource<DynamicType = ()>,
    {
        ObjectKey {
            resource: K::plural(&()).into_owned(),
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// `deployments.apps`, `services`, ...
    fn label<K>() -> String
    where
        K: Resource<DynamicType = ()>,
    {
        let group = K::group(&());
        if group.is_empty() {
            K::plural(&()).into_owned()
        } else {
            format!("{}.{}", K::plural(&()), group)
        }
    }

    fn ensure_namespace(
        objects: &BTreeMap<ObjectKey, Value>,
        namespace: Option<&str>,
    ) -> Result<()> {
        let Some(ns) = namespace else {
            return Ok(());
        };

        let key = ObjectKey {
            resource: NAMESPACES.to_string(),
            namespace: None,
            name: ns.to_string(),
        };
        if objects.contains_key(&key) {
            Ok(())
        } else {
            Err(Error::not_found(NAMESPACES, ns))
        }
    }
}

#[async_trait]
impl<K> ClusterApi<K> for InMemoryCluster
where
    K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn create(&self, namespace: Option<&str>, object: &K) -> Result<K> {
        let name = object.meta().name.clone().ok_or_else(|| {
            Error::api(
                422,
                "Invalid",
                format!("{} is invalid: metadata.name: Required value", Self::label::<K>()),
            )
        })?;

        let mut objects = self.objects.write().await;
        Self::ensure_namespace(&objects, namespace)?;

        let key = Self::key::<K>(namespace, &name);
        if objects.contains_key(&key) {
            return Err(Error::already_exists(&Self::label::<K>(), &name));
        }

        let mut created = object.clone();
        let meta = created.meta_mut();
        meta.namespace = namespace.map(str::to_string);
        meta.resource_version = Some(self.next_version());

        objects.insert(key, serde_json::to_value(&created)?);
        debug!("Stored {} {}", Self::label::<K>(), name);

        Ok(created)
    }

    async fn get(&self, namespace: Option<&str>, name: &str) -> Result<K> {
        let objects = self.objects.read().await;
        let stored = objects
            .get(&Self::key::<K>(namespace, name))
            .ok_or_else(|| Error::not_found(&Self::label::<K>(), name))?;

        Ok(serde_json::from_value(stored.clone())?)
    }

    async fn patch_merge(&self, namespace: Option<&str>, name: &str, object: &K) -> Result<K> {
        let mut objects = self.objects.write().await;
        let stored = objects
            .get_mut(&Self::key::<K>(namespace, name))
            .ok_or_else(|| Error::not_found(&Self::label::<K>(), name))?;

        let patch = serde_json::to_value(object)?;
        let current_version = stored
            .pointer("/metadata/resourceVersion")
            .and_then(Value::as_str);
        let patch_version = patch
            .pointer("/metadata/resourceVersion")
            .and_then(Value::as_str);

        if let (Some(current), Some(requested)) = (current_version, patch_version) {
            if current != requested {
                return Err(Error::api(
                    409,
                    "Conflict",
                    format!(
                        "Operation cannot be fulfilled on {} \"{}\": the object has been modified; \
                         please apply your changes to the latest version and try again",
                        Self::label::<K>(),
                        name
                    ),
                ));
            }
        }

        let mut merged = stored.clone();
        merge_patch(&mut merged, &patch);

        let mut patched: K = serde_json::from_value(merged)?;
        patched.meta_mut().resource_version = Some(self.next_version());
        *stored = serde_json::to_value(&patched)?;

        Ok(patched)
    }

    async fn delete(&self, namespace: Option<&str>, name: &str) -> Result<()> {
        let mut objects = self.objects.write().await;
        let key = Self::key::<K>(namespace, name);

        if objects.remove(&key).is_none() {
            return Err(Error::not_found(&Self::label::<K>(), name));
        }

        // Namespace deletion takes its contents with it
        if key.resource == NAMESPACES && key.namespace.is_none() {
            objects.retain(|k, _| k.namespace.as_deref() != Some(name));
        }

        Ok(())
    }

    fn backend_name(&self) -> &str {
        "in-memory"
    }
}

/// Apply a JSON merge patch (RFC 7386) to `target`
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::synthesize_namespace;
    use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
    use kube::api::ObjectMeta;
    use serde_json::json;

    fn config_map(name: &str, data: &[(&str, &str)]) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: Some(
                data.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    async fn cluster_with_namespace(ns: &str) -> InMemoryCluster {
        let cluster = InMemoryCluster::new();
        ClusterApi::<Namespace>::create(&cluster, None, &synthesize_namespace(ns))
            .await
            .unwrap();
        cluster
    }

    #[tokio::test]
    async fn test_create_requires_namespace() {
        let cluster = InMemoryCluster::new();
        let err = cluster
            .create(Some("missing-ns"), &config_map("cm", &[]))
            .await
            .unwrap_err();

        let status = err.api_status().unwrap();
        assert_eq!(status.code, 404);
        assert_eq!(status.message, "namespaces \"missing-ns\" not found");
    }

    #[tokio::test]
    async fn test_create_get_and_duplicate() {
        let cluster = cluster_with_namespace("acme-ns").await;

        let created = cluster
            .create(Some("acme-ns"), &config_map("cm", &[("a", "1")]))
            .await
            .unwrap();
        assert_eq!(created.metadata.namespace.as_deref(), Some("acme-ns"));
        assert!(created.metadata.resource_version.is_some());

        let fetched: ConfigMap = cluster.get(Some("acme-ns"), "cm").await.unwrap();
        assert_eq!(fetched, created);

        let err = cluster
            .create(Some("acme-ns"), &config_map("cm", &[]))
            .await
            .unwrap_err();
        assert_eq!(err.api_status().unwrap().code, 409);
        assert_eq!(err.api_status().unwrap().reason, "AlreadyExists");
    }

    #[tokio::test]
    async fn test_patch_merges_and_detects_stale_versions() {
        let cluster = cluster_with_namespace("acme-ns").await;
        let created = cluster
            .create(Some("acme-ns"), &config_map("cm", &[("a", "1")]))
            .await
            .unwrap();

        let mut update = created.clone();
        update.data = Some([("b".to_string(), "2".to_string())].into());
        let patched = cluster
            .patch_merge(Some("acme-ns"), "cm", &update)
            .await
            .unwrap();

        let data = patched.data.unwrap();
        assert_eq!(data["a"], "1");
        assert_eq!(data["b"], "2");

        // `update` still carries the old resourceVersion
        let err = cluster
            .patch_merge(Some("acme-ns"), "cm", &update)
            .await
            .unwrap_err();
        assert_eq!(err.api_status().unwrap().code, 409);
    }

    #[tokio::test]
    async fn test_delete_namespace_cascades() {
        let cluster = cluster_with_namespace("acme-ns").await;
        cluster
            .create(Some("acme-ns"), &config_map("cm", &[]))
            .await
            .unwrap();
        assert_eq!(cluster.len().await, 2);

        ClusterApi::<Namespace>::delete(&cluster, None, "acme-ns")
            .await
            .unwrap();
        assert!(cluster.is_empty().await);

        let err = ClusterApi::<ConfigMap>::delete(&cluster, Some("acme-ns"), "cm")
            .await
            .unwrap_err();
        assert_eq!(err.api_status().unwrap().code, 404);
    }

    #[test]
    fn test_merge_patch_semantics() {
        let mut target = json!({"a": 1, "b": {"c": 2, "d": 3}, "list": [1, 2]});
        merge_patch(&mut target, &json!({"b": {"c": null, "e": 4}, "list": [9], "f": "x"}));
        assert_eq!(
            target,
            json!({"a": 1, "b": {"d": 3, "e": 4}, "list": [9], "f": "x"})
        );
    }
}
