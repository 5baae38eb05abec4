//! Cluster Adapters
//!
//! Implementations of the [`ClusterApi`] port:
//! - Kubernetes: a live API server through `kube`
//! - InMemory: standalone mode and tests
//!
//! [`ClusterApi`]: crate::domain::ports::ClusterApi

pub mod kubernetes;
pub mod memory;

pub use kubernetes::*;
pub use memory::*;

use serde::{Deserialize, Serialize};

/// Which cluster adapter to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterBackend {
    #[default]
    Kubernetes,
    InMemory,
}

impl std::fmt::Display for ClusterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterBackend::Kubernetes => write!(f, "kubernetes"),
            ClusterBackend::InMemory => write!(f, "in-memory"),
        }
    }
}
