//! Operation Metrics
//!
//! Prometheus counters for controller verbs, registered on the default
//! registry and gathered by the metrics server.

use crate::domain::models::{ResourceKind, Verb};
use prometheus::IntCounterVec;
use std::sync::OnceLock;

/// How a verb ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The orchestrator accepted the call
    Success,
    /// The orchestrator answered with a `Status`
    Rejected,
    /// The call never produced an orchestrator answer
    Fault,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Rejected => "rejected",
            Outcome::Fault => "fault",
        }
    }
}

static OPERATIONS: OnceLock<Option<IntCounterVec>> = OnceLock::new();

fn operations() -> Option<&'static IntCounterVec> {
    OPERATIONS
        .get_or_init(|| {
            prometheus::register_int_counter_vec!(
                "tenant_provisioner_operations_total",
                "Controller operations by kind, verb and outcome",
                &["kind", "verb", "outcome"]
            )
            .ok()
        })
        .as_ref()
}

/// Register the counters before the first request
pub fn init() {
    let _ = operations();
}

/// Count one finished verb
pub fn record(kind: ResourceKind, verb: Verb, outcome: Outcome) {
    if let Some(counter) = operations() {
        counter
            .with_label_values(&[kind.as_str(), verb.as_str(), outcome.as_str()])
            .inc();
    }
}

/// Current count, for tests and diagnostics
pub fn count(kind: ResourceKind, verb: Verb, outcome: Outcome) -> u64 {
    operations()
        .map(|counter| {
            counter
                .with_label_values(&[kind.as_str(), verb.as_str(), outcome.as_str()])
                .get()
        })
        .unwrap_or(0)
}
