//! Error handling for the Circle API
//!
//! Datastore and loader failures are folded into [`ApiError`], which knows
//! how to present itself as a GraphQL field error: the response entry gets a
//! message plus a stable `extensions.code` for client-side handling.

use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::datastore::StoreError;
use crate::graphql::loaders::BatchError;

/// Message returned in place of internal failure details
const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Resource Errors ==========
    /// Requested resource not found
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Resource already exists (unique constraint)
    #[error("{resource_type} already exists: {id}")]
    Conflict {
        resource_type: &'static str,
        id: String,
    },

    /// Write referenced a row that does not exist
    #[error("{resource_type} references a missing {target}: {id}")]
    InvalidReference {
        resource_type: &'static str,
        target: &'static str,
        id: String,
    },

    // ========== Data Access Errors ==========
    /// Batched relation load failed
    #[error("relation load failed: {0}")]
    Loader(#[from] BatchError),

    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::InvalidReference { .. } => "INVALID_REFERENCE",
            Self::Loader(_) => "LOADER_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Whether the failure is the caller's fault rather than the server's
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Conflict { .. } | Self::InvalidReference { .. }
        )
    }

    /// Create a not found error for a specific resource
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Log the error with appropriate severity
    pub fn log(&self) {
        if self.is_client_error() {
            tracing::debug!(error = %self, code = self.error_code(), "Client error");
        } else {
            tracing::error!(error = %self, code = self.error_code(), "Server error occurred");
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound {
                resource_type: entity,
                id,
            },
            StoreError::Conflict { entity, key } => Self::Conflict {
                resource_type: entity,
                id: key,
            },
            StoreError::ForeignKey { entity, target, id } => Self::InvalidReference {
                resource_type: entity,
                target,
                id,
            },
            StoreError::Database(err) => Self::Database(err),
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        // Server-side failures keep their details in the logs only
        let message = if self.is_client_error() {
            self.to_string()
        } else {
            INTERNAL_MESSAGE.to_string()
        };
        let code = self.error_code();
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// Convert any API-level failure into a GraphQL field error, logging it first
pub fn to_graphql_error(error: impl Into<ApiError>) -> async_graphql::Error {
    let error = error.into();
    error.log();
    error.extend()
}
