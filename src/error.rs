// src/error.rs
use thiserror::Error;

/// Failure of the backing participant or household store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(String),

    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store write failed: {0}")]
    Write(String),

    #[error("identifier already in use: {0}")]
    Conflict(String),
}

/// Errors surfaced to the caller of a duplicate check.
#[derive(Debug, Error)]
pub enum DuplicateCheckError {
    #[error("invalid candidate: {0}")]
    InvalidCandidate(String),

    #[error("unable to verify duplicates, participant data unavailable: {0}")]
    DataUnavailable(String),
}

impl From<StoreError> for DuplicateCheckError {
    fn from(err: StoreError) -> Self {
        DuplicateCheckError::DataUnavailable(err.to_string())
    }
}

/// A single stored record that cannot be scored. Never propagated past the scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("record {id}: malformed field `{field}`: {reason}")]
    MalformedField {
        id: String,
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Check(#[from] DuplicateCheckError),

    #[error("registration cancelled after duplicate review")]
    Cancelled,

    #[error("failed to create participant: {0}")]
    StoreWrite(#[source] StoreError),
}
