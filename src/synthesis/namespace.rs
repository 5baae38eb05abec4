//! Namespace synthesis

use k8s_openapi::api::core::v1::Namespace;
use kube::api::ObjectMeta;

/// A namespace carries nothing but its canonical name
pub fn synthesize_namespace(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_name_is_set() {
        let ns = synthesize_namespace("acme-ns");
        assert_eq!(ns.metadata.name.as_deref(), Some("acme-ns"));
        assert!(ns.metadata.labels.is_none());
        assert!(ns.spec.is_none());
    }
}
