//! # DID Registry
//!
//! A versioned registry of DID documents. Documents are validated
//! structurally (DID syntax, verification methods and relationships,
//! services), writes are authorized by controller signatures over the
//! payload's canonical JSON, and every write stores a new, linked version.
//!
//! The registry supports the `Ed25519VerificationKey2020`,
//! `Ed25519VerificationKey2018`, `Bls12381G2Key2020` and `JsonWebKey2020`
//! verification method types.

pub mod crypto;
pub mod did;
pub mod document;
mod error;
pub mod jwk;
pub mod registry;
pub mod store;
pub mod validation;

pub use self::error::{Error, Result};
pub use self::registry::{
    CreateDidDocPayload, DeactivateDidDocPayload, DidDocPayload, DidRegistry, RegistryConfig,
    UpdateDidDocPayload,
};
