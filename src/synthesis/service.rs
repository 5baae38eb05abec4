//! Service synthesis and patch overlay

use crate::domain::models::{ServiceModel, ServicePortModel};
use crate::naming::ServiceNames;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

/// Build a service manifest from `template`
///
/// The selector is submitted exactly as the caller wrote it. Matching it
/// against a deployment's pod label is the caller's business.
pub fn synthesize_service(
    template: &Service,
    names: &ServiceNames,
    request: &ServiceModel,
) -> Service {
    let mut manifest = template.clone();

    manifest.metadata.name = Some(names.service.clone());
    manifest.metadata.namespace = Some(names.namespace.clone());
    apply_selector_and_ports(&mut manifest, request);

    manifest
}

/// Overlay selector and ports onto a live service
pub fn overlay_service_patch(live: Service, request: &ServiceModel) -> Service {
    let mut manifest = live;
    manifest.metadata.managed_fields = None;
    manifest.status = None;
    apply_selector_and_ports(&mut manifest, request);

    manifest
}

fn apply_selector_and_ports(manifest: &mut Service, request: &ServiceModel) {
    if request.selectors.is_none() && request.ports.is_empty() {
        return;
    }

    let spec = manifest.spec.get_or_insert_with(ServiceSpec::default);

    if let Some(selectors) = &request.selectors {
        spec.selector = Some(selectors.clone());
    }
    if !request.ports.is_empty() {
        spec.ports = Some(request.ports.iter().map(service_port).collect());
    }
}

fn service_port(port: &ServicePortModel) -> ServicePort {
    ServicePort {
        port: port.port,
        protocol: port.protocol.clone(),
        target_port: port.target_port.map(IntOrString::Int),
        ..Default::default()
    }
}
