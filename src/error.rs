//! # Errors
//!
//! Error types returned by registry operations. Structural validation issues
//! are collected into a [`ValidationError`](crate::validation::ValidationError)
//! so that callers see every failing field at once, while lifecycle and
//! authorization failures use dedicated variants.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by registry operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No DID document (or document version) exists for the requested DID.
    #[error("DID document not found: {0}")]
    NotFound(String),

    /// A DID document (or document version) already exists for the DID.
    #[error("DID document exists: {0}")]
    AlreadyExists(String),

    /// The DID document has been deactivated and can no longer change.
    #[error("DID document already deactivated: {0}")]
    Deactivated(String),

    /// A signature references a verification method that cannot be used to
    /// authenticate the signing DID.
    #[error("authentication method not found: {0}")]
    AuthenticationMethodNotFound(String),

    /// A required signature is missing.
    #[error("signature is required but not found: {0}")]
    SignatureNotFound(String),

    /// A signature failed cryptographic verification.
    #[error("invalid signature detected: {0}")]
    InvalidSignature(String),

    /// One or more fields failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A payload could not be serialized into signing bytes.
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// An invariant that should have been established by prior validation did
    /// not hold.
    #[error("internal error: {0}")]
    Internal(String),
}
