//! Error types for the Tenant Provisioner
//!
//! Exactly one class of failure is recoverable: a `Status` returned by the
//! Kubernetes API server. Controllers turn it into an [`ErrorModel`] for the
//! caller. Every other variant is an environment or programming fault and
//! propagates to the request boundary untouched.
//!
//! [`ErrorModel`]: crate::domain::models::ErrorModel

use kube::error::ErrorResponse;
use thiserror::Error;

/// Unified error type for the provisioner
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Kubernetes Errors
    // =========================================================================
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    // =========================================================================
    // Template Errors
    // =========================================================================
    #[error("No template available for kind: {kind}")]
    TemplateNotFound { kind: String },

    #[error("Template for {kind} is unusable: {reason}")]
    Template { kind: String, reason: String },

    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The API server's `Status` if this is a recoverable transport failure
    pub fn api_status(&self) -> Option<&ErrorResponse> {
        match self {
            Error::Kube(kube::Error::Api(response)) => Some(response),
            _ => None,
        }
    }

    /// Check if this error came back from the API server as a `Status`
    pub fn is_transport_failure(&self) -> bool {
        self.api_status().is_some()
    }

    /// Build the error the API server would send for a rejected request
    pub fn api(code: u16, reason: &str, message: impl Into<String>) -> Self {
        Error::Kube(kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: message.into(),
            reason: reason.to_string(),
            code,
        }))
    }

    /// `404 NotFound` for `kind`/`name`
    pub fn not_found(kind: &str, name: &str) -> Self {
        Self::api(404, "NotFound", format!("{} \"{}\" not found", kind, name))
    }

    /// `409 AlreadyExists` for `kind`/`name`
    pub fn already_exists(kind: &str, name: &str) -> Self {
        Self::api(
            409,
            "AlreadyExists",
            format!("{} \"{}\" already exists", kind, name),
        )
    }
}

/// Result type alias for the provisioner
pub type Result<T> = std::result::Result<T, Error>;
