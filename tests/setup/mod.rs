//! Shared fixtures for registry integration tests.

#![allow(dead_code)]

use did_registry::document::{
    DidDocument, DidDocumentBuilder, MethodType, SignInfo, VerificationMethod,
    VerificationMethodBuilder,
};
use did_registry::store::InMemoryDidDocStore;
use did_registry::{DidDocPayload, DidRegistry, RegistryConfig};
use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;
use uuid::Uuid;

/// A registry restricted to `did:example:testnet` identifiers.
pub fn registry() -> DidRegistry<InMemoryDidDocStore> {
    let config = RegistryConfig::new("example").with_namespaces(["testnet"]);
    DidRegistry::new(InMemoryDidDocStore::new(), config)
}

pub fn new_did() -> String {
    format!("did:example:testnet:{}", Uuid::new_v4())
}

pub fn new_version_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn new_key() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// An `Ed25519VerificationKey2020` method `{did}#key-{index}` controlled by
/// the subject.
pub fn ed25519_method(did: &str, index: usize, key: &SigningKey) -> VerificationMethod {
    let encoded =
        multibase::encode(multibase::Base::Base58Btc, key.verifying_key().as_bytes());
    VerificationMethodBuilder::new(format!("{did}#key-{index}"))
        .method_type(MethodType::Ed25519VerificationKey2020)
        .controller(did)
        .multibase(encoded)
        .build()
}

/// A document with a single key listed in `verificationMethod` and referenced
/// from `authentication`.
pub fn single_key_doc(did: &str, key: &SigningKey) -> DidDocument {
    let vm = ed25519_method(did, 1, key);
    DidDocumentBuilder::new(did)
        .verification_method(vm)
        .authentication(format!("{did}#key-1"))
        .build()
}

/// A payload carrying `doc` under a fresh version identifier.
pub fn payload(doc: &DidDocument) -> DidDocPayload {
    DidDocPayload::from_did_doc(doc.clone(), new_version_id())
}

pub fn sign(message: &[u8], method_id: &str, key: &SigningKey) -> SignInfo {
    SignInfo {
        verification_method_id: method_id.to_string(),
        signature: key.sign(message).to_bytes().to_vec(),
    }
}

/// Signs a create/update payload's canonical bytes with `key`.
pub fn sign_payload(payload: &DidDocPayload, method_id: &str, key: &SigningKey) -> SignInfo {
    let message = payload.sign_bytes().expect("should serialize");
    sign(&message, method_id, key)
}
