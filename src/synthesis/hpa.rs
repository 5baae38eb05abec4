//! Horizontal pod autoscaler synthesis and patch overlay

use super::missing;
use crate::domain::models::HpaModel;
use crate::error::Result;
use crate::naming::HpaNames;
use k8s_openapi::api::autoscaling::v1::{HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec};

const KIND: &str = "HorizontalPodAutoscaler";

/// Build an autoscaler manifest from `template`
///
/// The scale target always comes from `names.scale_target`; the caller's raw
/// deployment string has already been run through the deployment rule.
pub fn synthesize_hpa(
    template: &HorizontalPodAutoscaler,
    names: &HpaNames,
    request: &HpaModel,
) -> Result<HorizontalPodAutoscaler> {
    let mut manifest = template.clone();

    manifest.metadata.name = Some(names.hpa.clone());
    manifest.metadata.namespace = Some(names.namespace.clone());

    let spec = manifest.spec.as_mut().ok_or_else(|| missing(KIND, "spec"))?;
    spec.scale_target_ref.name = names.scale_target.clone();
    apply_bounds(spec, request);

    Ok(manifest)
}

/// Overlay replica bounds and CPU target onto a live autoscaler
pub fn overlay_hpa_patch(
    live: HorizontalPodAutoscaler,
    request: &HpaModel,
) -> Result<HorizontalPodAutoscaler> {
    let mut manifest = live;
    manifest.metadata.managed_fields = None;
    manifest.status = None;

    let spec = manifest.spec.as_mut().ok_or_else(|| missing(KIND, "spec"))?;
    apply_bounds(spec, request);

    Ok(manifest)
}

fn apply_bounds(spec: &mut HorizontalPodAutoscalerSpec, request: &HpaModel) {
    if let Some(min) = request.min_replicas {
        spec.min_replicas = Some(min);
    }
    if let Some(max) = request.max_replicas {
        spec.max_replicas = max;
    }
    if let Some(cpu) = request.cpu {
        spec.target_cpu_utilization_percentage = Some(cpu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TenancyKey;
    use crate::naming::{NameResolver, TenantScopedNames};
    use crate::synthesis::fixtures::hpa_template;

    fn request() -> HpaModel {
        HpaModel {
            deployment: Some("web".into()),
            min_replicas: Some(2),
            max_replicas: Some(5),
            cpu: Some(70),
            ..Default::default()
        }
    }

    #[test]
    fn test_scale_target_uses_deployment_rule() {
        let key = TenancyKey::new(Some("teamA"), "acme", "frontend").unwrap();
        let target = key.sibling("web").unwrap();
        let names = TenantScopedNames.hpa_names(&key, &target);

        let manifest = synthesize_hpa(&hpa_template(), &names, &request()).unwrap();
        let spec = manifest.spec.unwrap();

        assert_eq!(manifest.metadata.name.as_deref(), Some("frontend-teamA-hpa"));
        assert_eq!(manifest.metadata.namespace.as_deref(), Some("acme-ns"));
        assert_eq!(spec.scale_target_ref.name, "web-teamA-deploy");
        assert_eq!(spec.min_replicas, Some(2));
        assert_eq!(spec.max_replicas, 5);
        assert_eq!(spec.target_cpu_utilization_percentage, Some(70));
    }

    #[test]
    fn test_unset_bounds_keep_template() {
        let key = TenancyKey::new(None, "acme", "frontend").unwrap();
        let names = TenantScopedNames.hpa_names(&key, &key.sibling("web").unwrap());
        let template = hpa_template();

        let manifest = synthesize_hpa(&template, &names, &HpaModel::default()).unwrap();
        let (got, want) = (manifest.spec.unwrap(), template.spec.unwrap());

        assert_eq!(got.scale_target_ref.name, "web-deploy");
        assert_eq!(got.min_replicas, want.min_replicas);
        assert_eq!(got.max_replicas, want.max_replicas);
        assert_eq!(
            got.target_cpu_utilization_percentage,
            want.target_cpu_utilization_percentage
        );
    }

    #[test]
    fn test_patch_keeps_scale_target() {
        let mut live = hpa_template();
        live.spec.as_mut().unwrap().scale_target_ref.name = "web-teamA-deploy".into();

        let patched = overlay_hpa_patch(
            live,
            &HpaModel {
                max_replicas: Some(10),
                ..Default::default()
            },
        )
        .unwrap();

        let spec = patched.spec.unwrap();
        assert_eq!(spec.scale_target_ref.name, "web-teamA-deploy");
        assert_eq!(spec.max_replicas, 10);
    }
}
