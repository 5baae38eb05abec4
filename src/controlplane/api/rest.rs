//! REST API Handlers
//!
//! Group, deployment, service and autoscaler endpoints. Every resource route
//! exists twice: with a `/tenant/:tenant` segment and without one.
//!
//! An orchestrator rejection is answered with its own status code and an
//! [`ErrorModel`] body. Faults become an [`ApiErrorResponse`].

use crate::controlplane::Provisioner;
use crate::domain::models::{
    DeploymentModel, ErrorModel, HpaModel, OperationResult, ServiceModel, TenancyKey,
};
use crate::error::{Error, Result};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

// =============================================================================
// Request/Response Types
// =============================================================================

/// `/groups/:group`
#[derive(Debug, Clone, Deserialize)]
pub struct GroupPath {
    pub group: String,
}

/// `/{kind}/:name[/tenant/:tenant]/groups/:group`
#[derive(Debug, Clone, Deserialize)]
pub struct ResourcePath {
    pub name: String,
    #[serde(default)]
    pub tenant: Option<String>,
    pub group: String,
}

impl ResourcePath {
    pub fn key(&self) -> Result<TenancyKey> {
        TenancyKey::new(self.tenant.as_deref(), &self.group, &self.name)
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    provisioner: Arc<Provisioner>,
}

impl RestRouter {
    pub fn new(provisioner: Arc<Provisioner>) -> Self {
        Self { provisioner }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            provisioner: self.provisioner,
        };

        let deployment = || {
            put(create_deployment)
                .get(read_deployment)
                .patch(patch_deployment)
                .delete(delete_deployment)
        };
        let service = || {
            put(create_service)
                .get(read_service)
                .patch(patch_service)
                .delete(delete_service)
        };
        let hpa = || {
            put(create_hpa)
                .get(read_hpa)
                .patch(patch_hpa)
                .delete(delete_hpa)
        };

        Router::new()
            // Group (namespace) endpoints
            .route(
                "/groups/:group",
                put(create_group).get(read_group).delete(delete_group),
            )
            // Deployment endpoints
            .route("/deploy/:name/tenant/:tenant/groups/:group", deployment())
            .route("/deploy/:name/groups/:group", deployment())
            // Service endpoints
            .route("/service/:name/tenant/:tenant/groups/:group", service())
            .route("/service/:name/groups/:group", service())
            // Autoscaler endpoints
            .route("/hpa/:name/tenant/:tenant/groups/:group", hpa())
            .route("/hpa/:name/groups/:group", hpa())
            // Health endpoints
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    provisioner: Arc<Provisioner>,
}

// =============================================================================
// Response Mapping
// =============================================================================

fn respond<T: Serialize>(success: StatusCode, result: Result<OperationResult<T>>) -> Response {
    match result {
        Ok(OperationResult::Success(model)) => (success, Json(model)).into_response(),
        Ok(OperationResult::Failure(failure)) => rejection(failure),
        Err(err) => fault(err),
    }
}

fn respond_no_content(result: Result<OperationResult<()>>) -> Response {
    match result {
        Ok(OperationResult::Success(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(OperationResult::Failure(failure)) => rejection(failure),
        Err(err) => fault(err),
    }
}

fn rejection(failure: ErrorModel) -> Response {
    let status =
        StatusCode::from_u16(failure.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(failure)).into_response()
}

fn fault(err: Error) -> Response {
    let (status, code) = match &err {
        Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        _ => {
            error!("Request failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };

    (
        status,
        Json(ApiErrorResponse {
            error: code.into(),
            message: err.to_string(),
            details: None,
        }),
    )
        .into_response()
}

// =============================================================================
// Group Handlers
// =============================================================================

async fn create_group(State(state): State<AppState>, Path(path): Path<GroupPath>) -> Response {
    let result = state.provisioner.namespaces().create(&path.group).await;
    respond(StatusCode::CREATED, result)
}

async fn read_group(State(state): State<AppState>, Path(path): Path<GroupPath>) -> Response {
    let result = state.provisioner.namespaces().read(&path.group).await;
    respond(StatusCode::OK, result)
}

async fn delete_group(State(state): State<AppState>, Path(path): Path<GroupPath>) -> Response {
    respond_no_content(state.provisioner.namespaces().delete(&path.group).await)
}

// =============================================================================
// Deployment Handlers
// =============================================================================

async fn create_deployment(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
    Json(request): Json<DeploymentModel>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.deployments().create(&key, &request).await
    }
    .await;
    respond(StatusCode::CREATED, result)
}

async fn read_deployment(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.deployments().read(&key).await
    }
    .await;
    respond(StatusCode::OK, result)
}

async fn patch_deployment(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
    Json(request): Json<DeploymentModel>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.deployments().patch(&key, &request).await
    }
    .await;
    respond(StatusCode::OK, result)
}

async fn delete_deployment(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.deployments().delete(&key).await
    }
    .await;
    respond_no_content(result)
}

// =============================================================================
// Service Handlers
// =============================================================================

async fn create_service(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
    Json(request): Json<ServiceModel>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.services().create(&key, &request).await
    }
    .await;
    respond(StatusCode::CREATED, result)
}

async fn read_service(State(state): State<AppState>, Path(path): Path<ResourcePath>) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.services().read(&key).await
    }
    .await;
    respond(StatusCode::OK, result)
}

async fn patch_service(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
    Json(request): Json<ServiceModel>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.services().patch(&key, &request).await
    }
    .await;
    respond(StatusCode::OK, result)
}

async fn delete_service(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.services().delete(&key).await
    }
    .await;
    respond_no_content(result)
}

// =============================================================================
// Autoscaler Handlers
// =============================================================================

async fn create_hpa(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
    Json(request): Json<HpaModel>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.hpas().create(&key, &request).await
    }
    .await;
    respond(StatusCode::CREATED, result)
}

async fn read_hpa(State(state): State<AppState>, Path(path): Path<ResourcePath>) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.hpas().read(&key).await
    }
    .await;
    respond(StatusCode::OK, result)
}

async fn patch_hpa(
    State(state): State<AppState>,
    Path(path): Path<ResourcePath>,
    Json(request): Json<HpaModel>,
) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.hpas().patch(&key, &request).await
    }
    .await;
    respond(StatusCode::OK, result)
}

async fn delete_hpa(State(state): State<AppState>, Path(path): Path<ResourcePath>) -> Response {
    let result = async {
        let key = path.key()?;
        state.provisioner.hpas().delete(&key).await
    }
    .await;
    respond_no_content(result)
}

// =============================================================================
// Health Handlers
// =============================================================================

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "version": crate::VERSION
        })),
    )
}

async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.provisioner.status().clone()))
}
