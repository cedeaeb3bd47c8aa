//! Error types and error handling for porttrack.
//!
//! This module defines the error type shared by the store, the secret
//! loader, configuration loading and the HTTP layer, together with the
//! JSON error body returned to clients and the process exit codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// General error
    pub const GENERAL_ERROR: i32 = 1;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 2;
}

/// Message returned by the fault injection endpoint.
pub const SIMULATED_FAILURE: &str = "simulated failure";

/// The main error type for porttrack.
#[derive(Debug, Error)]
pub enum PortTrackError {
    /// Request payload failed a presence check.
    #[error("{message}")]
    Validation { message: String },

    /// Deliberately triggered failure.
    #[error("simulated failure")]
    Simulated,

    /// The startup secret could not be fetched or parsed.
    #[error("{message}")]
    SecretLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration is invalid or cannot be loaded.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The HTTP server failed to bind or crashed.
    #[error("Server error: {message}")]
    Server {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PortTrackError {
    /// Returns the HTTP status code for this error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            PortTrackError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PortTrackError::Config { .. } | PortTrackError::Yaml(_) => exit_code::CONFIG_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        PortTrackError::Validation {
            message: message.into(),
        }
    }

    /// Creates a secret load error with a message.
    pub fn secret_load(message: impl Into<String>) -> Self {
        PortTrackError::SecretLoad {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a secret load error with a message and source.
    pub fn secret_load_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortTrackError::SecretLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        PortTrackError::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error with a message and source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortTrackError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a server error with a message and source.
    pub fn server_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortTrackError::Server {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        PortTrackError::Internal {
            message: message.into(),
        }
    }

    /// Message exposed to HTTP clients.
    ///
    /// Internal failures are reported generically so that nothing about the
    /// process leaks into a response body.
    pub fn public_message(&self) -> String {
        match self {
            PortTrackError::Validation { message } => message.clone(),
            PortTrackError::Simulated => SIMULATED_FAILURE.to_string(),
            _ => "internal server error".to_string(),
        }
    }
}

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Creates an error body from a PortTrackError.
    pub fn from_error(err: &PortTrackError) -> Self {
        Self::new(err.public_message())
    }
}

impl IntoResponse for PortTrackError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() && !matches!(self, PortTrackError::Simulated) {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(ErrorResponse::from_error(&self))).into_response()
    }
}

/// Result type alias for porttrack operations.
pub type Result<T> = std::result::Result<T, PortTrackError>;
