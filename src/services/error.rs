use thiserror::Error;

use crate::database::store::StoreError;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

/// Failures surfaced by the service layer to handlers
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("celestial object {object_id} is already linked to a map")]
    AlreadyLinked { object_id: i64 },

    #[error("celestial object {object_id} is not linked to map {map_id}")]
    NotLinked { map_id: i64, object_id: i64 },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("upstream service failed: {0}")]
    Upstream(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ServiceError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ServiceError::Unauthorized(message.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ServiceError::StoreUnavailable(msg),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Query(msg) => ServiceError::Unexpected(msg),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
