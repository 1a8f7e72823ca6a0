//! Error types for the strata operator

use thiserror::Error;

/// Main error type for strata operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// A named record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// No available capacity satisfies an allocation request
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Unrecoverable orchestration failure (stuck creation, agent-reported
    /// failure, or a volume in a terminal failed state)
    #[error("internal error: {0}")]
    Internal(String),

    /// Validation error for CRD specs
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create a not-found error naming the missing record
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a resource-exhausted error with the given message
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Create an internal error with the given message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Returns true if this error reports an absent record.
    ///
    /// Covers both our own `NotFound` variant and a raw Kubernetes 404, so
    /// callers can branch on absence without caring which layer produced it.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Kube(kube::Error::Api(ae)) => ae.code == 404,
            _ => false,
        }
    }
}
