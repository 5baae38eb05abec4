//! Tenant Provisioner - Multi-tenant Kubernetes provisioning surface
//!
//! Callers address objects by (tenant, group, resource). The provisioner
//! turns that triple into canonical names, fills a structural template with
//! the request, submits it and answers with a model built from what the
//! orchestrator returned.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        REST API (axum)                              │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                          Provisioner                                │
//! │  ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌────────────────┐    │
//! │  │ Namespace  │ │ Deployment │ │  Service   │ │  Autoscaler    │    │
//! │  │ controller │ │ controller │ │ controller │ │  controller    │    │
//! │  └─────┬──────┘ └─────┬──────┘ └─────┬──────┘ └───────┬────────┘    │
//! │        └──────────────┴──────┬───────┴────────────────┘             │
//! │        NameResolver · ManifestSynthesis · StateProjection           │
//! ├──────────────────────────────┴──────────────────────────────────────┤
//! │   ClusterApi (kube / in-memory)     TemplateStore (file / builtin)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`controlplane`]: Controllers, adapters and the REST API
//! - [`domain`]: Request models and port traits
//! - [`naming`]: Canonical naming rules
//! - [`synthesis`]: Template overlay
//! - [`projection`]: Orchestrator objects back to request models
//! - [`metrics`]: Prometheus counters
//! - [`error`]: Error types and handling

pub mod controlplane;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod naming;
pub mod projection;
pub mod synthesis;

// Re-export commonly used types
pub use controlplane::{
    ApiServer, ApiServerConfig, BuiltinTemplateStore, ClusterBackend, FileTemplateStore,
    InMemoryCluster, KubeCluster, Provisioner, ProvisionerConfig, ProvisionerStatus,
};

pub use domain::models::{
    DeploymentModel, EnvVarModel, ErrorModel, HpaModel, NamespaceModel, OperationResult,
    ResourceItem, ResourceKind, ResourcesModel, ServiceModel, ServicePortModel, TenancyKey, Verb,
};

pub use domain::ports::{ClusterApi, TemplateStore};

pub use error::{Error, Result};

pub use naming::{NameResolver, TenantScopedNames};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
