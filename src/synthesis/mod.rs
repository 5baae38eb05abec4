//! Manifest Synthesis
//!
//! Builds submission-ready manifests from a structural template, the resolved
//! names and the caller's request. Templates are borrowed and cloned, never
//! mutated, so a cached template can not leak one request into the next.
//!
//! Overlay rules shared by every kind:
//! - a field the caller did not supply keeps the template (or live) value;
//! - list fields (env, ports) are replaced wholesale, and an empty list counts
//!   as "not supplied".

pub mod deployment;
pub mod hpa;
pub mod namespace;
pub mod service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use deployment::*;
pub use hpa::*;
pub use namespace::*;
pub use service::*;

use crate::error::Error;
use k8s_openapi::api::core::v1::{Container, PodTemplateSpec};

/// Template lacks structure the overlay writes into
pub(crate) fn missing(kind: &str, what: &str) -> Error {
    Error::Template {
        kind: kind.to_string(),
        reason: format!("missing {}", what),
    }
}

/// First container of a pod template
pub(crate) fn first_container_mut<'a>(
    template: &'a mut PodTemplateSpec,
    kind: &str,
) -> Result<&'a mut Container, Error> {
    template
        .spec
        .as_mut()
        .and_then(|spec| spec.containers.first_mut())
        .ok_or_else(|| missing(kind, "spec.template.spec.containers[0]"))
}
