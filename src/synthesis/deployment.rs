//! Deployment synthesis and patch overlay

use super::{first_container_mut, missing};
use crate::domain::models::{DeploymentModel, EnvVarModel, ResourceItem, ResourcesModel};
use crate::error::Result;
use crate::naming::{DeploymentNames, POD_LABEL_KEY};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Container, ContainerPort, EnvVar, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

const KIND: &str = "Deployment";

/// Build a deployment manifest from `template`
///
/// The selector label and the pod template label are both written from
/// `names.pod_label`, so they can never disagree.
pub fn synthesize_deployment(
    template: &Deployment,
    names: &DeploymentNames,
    request: &DeploymentModel,
) -> Result<Deployment> {
    let mut manifest = template.clone();

    manifest.metadata.name = Some(names.deployment.clone());
    manifest.metadata.namespace = Some(names.namespace.clone());

    if let Some(annotations) = &request.annotations {
        manifest.metadata.annotations = Some(annotations.clone());
    }
    if let Some(labels) = &request.labels {
        manifest.metadata.labels = Some(labels.clone());
    }

    let spec = manifest.spec.as_mut().ok_or_else(|| missing(KIND, "spec"))?;

    if let Some(replicas) = request.replicas {
        spec.replicas = Some(replicas);
    }

    let pod_label = names.pod_label.clone();
    spec.selector
        .match_labels
        .get_or_insert_with(BTreeMap::new)
        .insert(POD_LABEL_KEY.to_string(), pod_label.clone());
    spec.template
        .metadata
        .get_or_insert_with(Default::default)
        .labels
        .get_or_insert_with(BTreeMap::new)
        .insert(POD_LABEL_KEY.to_string(), pod_label);

    let container = first_container_mut(&mut spec.template, KIND)?;
    container.name = names.container.clone();

    if let Some(image) = &request.image {
        container.image = Some(image.clone());
    }
    if let Some(policy) = &request.image_pull_policy {
        container.image_pull_policy = Some(policy.clone());
    }
    if let Some(resources) = &request.resources {
        apply_resources(container, resources);
    }
    apply_env(container, &request.env);
    apply_ports(container, &request.ports);

    Ok(manifest)
}

/// Overlay the mutable fields of `request` (env, ports) onto a live deployment
///
/// The result keeps the live `resourceVersion`, so submitting it as a merge
/// patch fails with a conflict if someone else wrote in between.
pub fn overlay_deployment_patch(
    live: Deployment,
    names: &DeploymentNames,
    request: &DeploymentModel,
) -> Result<Deployment> {
    let mut manifest = live;
    manifest.metadata.managed_fields = None;
    manifest.status = None;

    let spec = manifest.spec.as_mut().ok_or_else(|| missing(KIND, "spec"))?;
    let container = first_container_mut(&mut spec.template, KIND)?;
    container.name = names.container.clone();

    apply_env(container, &request.env);
    apply_ports(container, &request.ports);

    Ok(manifest)
}

fn apply_resources(container: &mut Container, resources: &ResourcesModel) {
    let requests = resources.requests.as_ref().filter(|item| !item.is_empty());
    let limits = resources.limits.as_ref().filter(|item| !item.is_empty());

    if requests.is_none() && limits.is_none() {
        return;
    }

    let requirements = container
        .resources
        .get_or_insert_with(ResourceRequirements::default);

    if let Some(item) = requests {
        set_quantities(requirements.requests.get_or_insert_with(BTreeMap::new), item);
    }
    if let Some(item) = limits {
        set_quantities(requirements.limits.get_or_insert_with(BTreeMap::new), item);
    }
}

fn set_quantities(target: &mut BTreeMap<String, Quantity>, item: &ResourceItem) {
    if let Some(cpu) = &item.cpu {
        target.insert("cpu".to_string(), Quantity(cpu.clone()));
    }
    if let Some(memory) = &item.memory {
        target.insert("memory".to_string(), Quantity(memory.clone()));
    }
}

fn apply_env(container: &mut Container, env: &[EnvVarModel]) {
    if env.is_empty() {
        return;
    }

    container.env = Some(
        env.iter()
            .map(|var| EnvVar {
                name: var.name.clone(),
                value: var.value.clone(),
                ..Default::default()
            })
            .collect(),
    );
}

fn apply_ports(container: &mut Container, ports: &[i32]) {
    if ports.is_empty() {
        return;
    }

    container.ports = Some(
        ports
            .iter()
            .map(|port| ContainerPort {
                container_port: *port,
                ..Default::default()
            })
            .collect(),
    );
}
