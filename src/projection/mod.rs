//! State Projection
//!
//! Converts objects returned by the orchestrator back into the request-model
//! shape callers see. Environment values are never echoed back; only the
//! variable names survive a read.

use crate::domain::models::{
    DeploymentModel, EnvVarModel, HpaModel, NamespaceModel, ResourceItem, ResourcesModel,
    ServiceModel, ServicePortModel, TenancyKey,
};
use crate::naming::{NameResolver, Suffix};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{Container, Namespace, ResourceRequirements, Service};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube_quantity::ParsedQuantity;
use std::collections::BTreeMap;

pub fn project_namespace(namespace: &Namespace) -> NamespaceModel {
    NamespaceModel {
        name: namespace.metadata.name.clone().unwrap_or_default(),
    }
}

pub fn project_deployment(deployment: &Deployment) -> DeploymentModel {
    let mut model = DeploymentModel {
        name: deployment.metadata.name.clone(),
        namespace: deployment.metadata.namespace.clone(),
        annotations: deployment.metadata.annotations.clone(),
        labels: deployment.metadata.labels.clone(),
        ..Default::default()
    };

    let Some(spec) = &deployment.spec else {
        return model;
    };
    model.replicas = spec.replicas;

    let container = spec
        .template
        .spec
        .as_ref()
        .and_then(|pod| pod.containers.first());

    if let Some(container) = container {
        project_container(container, &mut model);
    }

    model
}

fn project_container(container: &Container, model: &mut DeploymentModel) {
    model.container_name = Some(container.name.clone());
    model.image = container.image.clone();
    model.image_pull_policy = container.image_pull_policy.clone();

    model.ports = container
        .ports
        .iter()
        .flatten()
        .map(|port| port.container_port)
        .collect();

    model.env = container
        .env
        .iter()
        .flatten()
        .map(|var| EnvVarModel {
            name: var.name.clone(),
            value: None,
        })
        .collect();

    model.resources = container.resources.as_ref().and_then(project_resources);
}

fn project_resources(requirements: &ResourceRequirements) -> Option<ResourcesModel> {
    let requests = requirements.requests.as_ref().and_then(quantities);
    let limits = requirements.limits.as_ref().and_then(quantities);

    if requests.is_none() && limits.is_none() {
        return None;
    }
    Some(ResourcesModel { requests, limits })
}

fn quantities(map: &BTreeMap<String, Quantity>) -> Option<ResourceItem> {
    let item = ResourceItem {
        cpu: map.get("cpu").map(canonical_cpu),
        memory: map.get("memory").map(canonical_memory),
    };
    (!item.is_empty()).then_some(item)
}

const BINARY_SUFFIXES: [(&str, i64); 6] = [
    ("Ei", 1 << 60),
    ("Pi", 1 << 50),
    ("Ti", 1 << 40),
    ("Gi", 1 << 30),
    ("Mi", 1 << 20),
    ("Ki", 1 << 10),
];

const DECIMAL_SUFFIXES: [(&str, i64); 6] = [
    ("E", 1_000_000_000_000_000_000),
    ("P", 1_000_000_000_000_000),
    ("T", 1_000_000_000_000),
    ("G", 1_000_000_000),
    ("M", 1_000_000),
    ("k", 1_000),
];

/// Base-unit value of a quantity, `None` when it does not parse
fn base_value(quantity: &Quantity) -> Option<f64> {
    ParsedQuantity::try_from(quantity.clone())
        .ok()
        .and_then(|parsed| parsed.to_bytes_f64())
        .filter(|value| value.is_finite())
}

/// Whole cores when exact, millicores otherwise ("0.5" -> "500m")
pub fn canonical_cpu(quantity: &Quantity) -> String {
    let Some(cores) = base_value(quantity) else {
        return quantity.0.clone();
    };

    let millis = (cores * 1000.0).round() as i64;
    if millis % 1000 == 0 {
        (millis / 1000).to_string()
    } else {
        format!("{}m", millis)
    }
}

/// Largest exact binary suffix, then decimal, then plain bytes
/// ("268435456" -> "256Mi", "1G" -> "1G")
pub fn canonical_memory(quantity: &Quantity) -> String {
    let Some(bytes) = base_value(quantity) else {
        return quantity.0.clone();
    };

    let bytes = bytes.round() as i64;
    if bytes == 0 {
        return "0".into();
    }

    BINARY_SUFFIXES
        .iter()
        .chain(DECIMAL_SUFFIXES.iter())
        .find(|(_, factor)| bytes % factor == 0)
        .map(|(suffix, factor)| format!("{}{}", bytes / factor, suffix))
        .unwrap_or_else(|| bytes.to_string())
}

pub fn project_service(service: &Service) -> ServiceModel {
    let spec = service.spec.as_ref();

    ServiceModel {
        name: service.metadata.name.clone(),
        namespace: service.metadata.namespace.clone(),
        selectors: spec.and_then(|s| s.selector.clone()),
        ports: spec
            .and_then(|s| s.ports.as_ref())
            .into_iter()
            .flatten()
            .map(|port| ServicePortModel {
                port: port.port,
                protocol: port.protocol.clone(),
                target_port: match &port.target_port {
                    Some(IntOrString::Int(target)) => Some(*target),
                    _ => None,
                },
            })
            .collect(),
    }
}

/// `key` is the autoscaler's own key; its tenant is used to report the scale
/// target by the resource name the caller knows it under
pub fn project_hpa(
    hpa: &HorizontalPodAutoscaler,
    names: &dyn NameResolver,
    key: &TenancyKey,
) -> HpaModel {
    let mut model = HpaModel {
        name: hpa.metadata.name.clone(),
        namespace: hpa.metadata.namespace.clone(),
        ..Default::default()
    };

    if let Some(spec) = &hpa.spec {
        model.deployment = Some(names.base_name(
            key.tenant(),
            &spec.scale_target_ref.name,
            Suffix::Deployment,
        ));
        model.min_replicas = spec.min_replicas;
        model.max_replicas = Some(spec.max_replicas);
        model.cpu = spec.target_cpu_utilization_percentage;
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::TenantScopedNames;
    use crate::synthesis::fixtures::{deployment_template, hpa_template, service_template};
    use crate::synthesis::{synthesize_deployment, synthesize_hpa, synthesize_service};

    fn key(resource: &str) -> TenancyKey {
        TenancyKey::new(Some("teamA"), "acme", resource).unwrap()
    }

    #[test]
    fn test_deployment_round_trip() {
        let request = DeploymentModel {
            replicas: Some(2),
            image: Some("nginx:1.25".into()),
            image_pull_policy: Some("Always".into()),
            ports: vec![80, 443],
            annotations: Some(BTreeMap::from([("owner".into(), "team-a".into())])),
            labels: Some(BTreeMap::from([("tier".into(), "web".into())])),
            env: vec![EnvVarModel::new("MODE", "prod"), EnvVarModel::new("DEBUG", "0")],
            resources: Some(ResourcesModel {
                requests: Some(ResourceItem {
                    cpu: Some("500m".into()),
                    memory: Some("256Mi".into()),
                }),
                limits: Some(ResourceItem {
                    cpu: Some("1".into()),
                    memory: Some("512Mi".into()),
                }),
            }),
            ..Default::default()
        };

        let names = TenantScopedNames.deployment_names(&key("web"));
        let manifest = synthesize_deployment(&deployment_template(), &names, &request).unwrap();
        let projected = project_deployment(&manifest);

        assert_eq!(projected.name.as_deref(), Some("web-teamA-deploy"));
        assert_eq!(projected.namespace.as_deref(), Some("acme-ns"));
        assert_eq!(projected.container_name.as_deref(), Some("web-teamA-app"));
        assert_eq!(projected.replicas, request.replicas);
        assert_eq!(projected.image, request.image);
        assert_eq!(projected.image_pull_policy, request.image_pull_policy);
        assert_eq!(projected.ports, request.ports);
        assert_eq!(projected.annotations, request.annotations);
        assert_eq!(projected.labels, request.labels);
        assert_eq!(projected.resources, request.resources);

        // Names survive, values do not
        let env: Vec<_> = projected.env.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(env, vec!["MODE", "DEBUG"]);
        assert!(projected.env.iter().all(|v| v.value.is_none()));
    }

    #[test]
    fn test_unset_fields_reflect_template_defaults() {
        let names = TenantScopedNames.deployment_names(&key("web"));
        let manifest =
            synthesize_deployment(&deployment_template(), &names, &DeploymentModel::default())
                .unwrap();
        let projected = project_deployment(&manifest);

        assert_eq!(projected.replicas, Some(1));
        assert_eq!(projected.image.as_deref(), Some("nginx:stable"));
        assert_eq!(projected.ports, vec![80]);

        let limits = projected.resources.unwrap().limits.unwrap();
        assert_eq!(limits.cpu.as_deref(), Some("500m"));
        assert_eq!(limits.memory.as_deref(), Some("256Mi"));
    }

    #[test]
    fn test_service_round_trip() {
        let request = ServiceModel {
            ports: vec![ServicePortModel {
                port: 80,
                protocol: Some("TCP".into()),
                target_port: Some(8080),
            }],
            selectors: Some(BTreeMap::from([("app".into(), "web-teamA-pod".into())])),
            ..Default::default()
        };

        let names = TenantScopedNames.service_names(&key("web"));
        let projected = project_service(&synthesize_service(&service_template(), &names, &request));

        assert_eq!(projected.name.as_deref(), Some("web-teamA-svc"));
        assert_eq!(projected.ports, request.ports);
        assert_eq!(projected.selectors, request.selectors);
    }

    #[test]
    fn test_hpa_round_trip() {
        let request = HpaModel {
            deployment: Some("web".into()),
            min_replicas: Some(2),
            max_replicas: Some(5),
            cpu: Some(70),
            ..Default::default()
        };

        let hpa_key = key("scaler");
        let names = TenantScopedNames.hpa_names(&hpa_key, &hpa_key.sibling("web").unwrap());
        let manifest = synthesize_hpa(&hpa_template(), &names, &request).unwrap();
        let projected = project_hpa(&manifest, &TenantScopedNames, &hpa_key);

        assert_eq!(projected.name.as_deref(), Some("scaler-teamA-hpa"));
        assert_eq!(projected.deployment, request.deployment);
        assert_eq!(projected.min_replicas, request.min_replicas);
        assert_eq!(projected.max_replicas, request.max_replicas);
        assert_eq!(projected.cpu, request.cpu);
    }

    #[test]
    fn test_quantities_are_canonicalized() {
        let cpu = |s: &str| canonical_cpu(&Quantity(s.into()));
        let memory = |s: &str| canonical_memory(&Quantity(s.into()));

        assert_eq!(cpu("0.5"), "500m");
        assert_eq!(cpu("500m"), "500m");
        assert_eq!(cpu("1"), "1");
        assert_eq!(cpu("1000m"), "1");
        assert_eq!(cpu("250m"), "250m");

        assert_eq!(memory("268435456"), "256Mi");
        assert_eq!(memory("256Mi"), "256Mi");
        assert_eq!(memory("0.5Gi"), "512Mi");
        assert_eq!(memory("1G"), "1G");
        assert_eq!(memory("1500"), "1500");
        assert_eq!(memory("0"), "0");

        // Unparseable values pass through untouched
        assert_eq!(cpu("lots"), "lots");
        assert_eq!(memory("lots"), "lots");
    }

    #[test]
    fn test_deployment_projects_canonical_quantities() {
        let request = DeploymentModel {
            resources: Some(ResourcesModel {
                requests: Some(ResourceItem {
                    cpu: Some("0.5".into()),
                    memory: Some("268435456".into()),
                }),
                limits: None,
            }),
            ..Default::default()
        };

        let names = TenantScopedNames.deployment_names(&key("web"));
        let manifest = synthesize_deployment(&deployment_template(), &names, &request).unwrap();
        let requests = project_deployment(&manifest)
            .resources
            .and_then(|r| r.requests)
            .unwrap();

        assert_eq!(requests.cpu.as_deref(), Some("500m"));
        assert_eq!(requests.memory.as_deref(), Some("256Mi"));
    }

    #[test]
    fn test_namespace_projection() {
        let ns = crate::synthesis::synthesize_namespace("acme-ns");
        assert_eq!(project_namespace(&ns).name, "acme-ns");
    }
}
