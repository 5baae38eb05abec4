//! Parsed builtin templates for tests

use crate::controlplane::templates::BuiltinTemplateStore;
use crate::domain::models::ResourceKind;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::Service;
use serde::de::DeserializeOwned;

fn parsed<K: DeserializeOwned>(kind: ResourceKind) -> K {
    serde_json::from_value(BuiltinTemplateStore::template(kind).unwrap()).unwrap()
}

pub fn deployment_template() -> Deployment {
    parsed(ResourceKind::Deployment)
}

pub fn service_template() -> Service {
    parsed(ResourceKind::Service)
}

pub fn hpa_template() -> HorizontalPodAutoscaler {
    parsed(ResourceKind::HorizontalPodAutoscaler)
}
