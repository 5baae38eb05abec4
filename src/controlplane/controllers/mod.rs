//! Resource Controllers
//!
//! One controller per kind. Each verb resolves names, runs the cluster call
//! and projects the answer back into the request model. A `Status` from the
//! API server becomes a [`OperationResult::Failure`]; anything else is a fault
//! and is returned as `Err`.

pub mod deployment;
pub mod hpa;
pub mod namespace;
pub mod service;

pub use deployment::*;
pub use hpa::*;
pub use namespace::*;
pub use service::*;

use crate::domain::models::{OperationResult, ResourceKind, Verb};
use crate::error::{Error, Result};
use crate::metrics::{self, Outcome};
use tracing::{error, info, warn};

/// Settle, log and count one finished verb
pub(crate) fn finish<T>(
    kind: ResourceKind,
    verb: Verb,
    target: &str,
    result: Result<T>,
) -> Result<OperationResult<T>> {
    match OperationResult::settle(result) {
        Ok(OperationResult::Success(value)) => {
            info!(kind = %kind, verb = %verb, "{} {} {}", verb, kind, target);
            metrics::record(kind, verb, Outcome::Success);
            Ok(OperationResult::Success(value))
        }
        Ok(OperationResult::Failure(failure)) => {
            warn!(
                kind = %kind,
                verb = %verb,
                status = failure.status,
                "{} {} {} rejected: {}",
                verb,
                kind,
                target,
                failure.message
            );
            metrics::record(kind, verb, Outcome::Rejected);
            Ok(OperationResult::Failure(failure))
        }
        Err(err) => {
            if matches!(err, Error::InvalidRequest(_)) {
                warn!(kind = %kind, verb = %verb, "{} {} {}: {}", verb, kind, target, err);
            } else {
                error!(kind = %kind, verb = %verb, "{} {} {} failed: {}", verb, kind, target, err);
            }
            metrics::record(kind, verb, Outcome::Fault);
            Err(err)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::controlplane::cluster::InMemoryCluster;
    use crate::domain::ports::ClusterApi;
    use crate::synthesis::synthesize_namespace;
    use k8s_openapi::api::core::v1::Namespace;
    use std::sync::Arc;

    /// In-memory cluster that already holds `namespace`
    pub async fn cluster_with_namespace(namespace: &str) -> Arc<InMemoryCluster> {
        let cluster = Arc::new(InMemoryCluster::new());
        ClusterApi::<Namespace>::create(cluster.as_ref(), None, &synthesize_namespace(namespace))
            .await
            .unwrap();
        cluster
    }
}
