//! Tests for the creation of DID documents.

mod setup;

use did_registry::document::{DidDocumentBuilder, SignInfo, VerificationRelationship};
use did_registry::{DeactivateDidDocPayload, Error};

// Test the happy path of creating a new DID document signed by the subject's
// own authentication key.
#[test]
fn create_success() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();

    let doc = setup::single_key_doc(&did, &key);
    let payload = setup::payload(&doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);

    let created =
        registry.create_did_doc(payload.clone(), &[signature]).expect("should create");
    assert_eq!(created.did_doc, doc);
    assert_eq!(created.metadata.version_id, payload.version_id);
    assert!(!created.metadata.deactivated);
    assert!(created.metadata.updated.is_none());
    assert!(created.metadata.previous_version_id.is_none());

    let resolved = registry.did_doc(&did).expect("should resolve");
    assert_eq!(resolved, created);
}

// A key listed only in `verificationMethod`, with no `authentication` entry,
// can still authorize: resolution falls back to the method list.
#[test]
fn create_with_method_list_fallback() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();

    let doc = DidDocumentBuilder::new(&did)
        .verification_method(setup::ed25519_method(&did, 1, &key))
        .build();
    let payload = setup::payload(&doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);

    registry.create_did_doc(payload, &[signature]).expect("should create");
}

// A method embedded in a relationship other than `authentication` cannot
// authorize a write.
#[test]
fn embedded_assertion_method_cannot_authenticate() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();
    let assertion_key = setup::new_key();

    let embedded = setup::ed25519_method(&did, 2, &assertion_key);
    let doc = DidDocumentBuilder::new(&did)
        .verification_method(setup::ed25519_method(&did, 1, &key))
        .authentication(format!("{did}#key-1"))
        .assertion_method(VerificationRelationship::from(embedded))
        .build();
    let payload = setup::payload(&doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-2"), &assertion_key);

    let err = registry.create_did_doc(payload, &[signature]).expect_err("should not authorize");
    assert_eq!(
        err,
        Error::InvalidSignature(format!("there should be at least one valid signature by {did}"))
    );
}

// A signer with one bad and one good signature still authorizes.
#[test]
fn one_valid_signature_is_enough() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();
    let stray_key = setup::new_key();

    let doc = setup::single_key_doc(&did, &key);
    let payload = setup::payload(&doc);
    let message = payload.sign_bytes().expect("should serialize");

    let bad = setup::sign(&message, &format!("{did}#key-1"), &stray_key);
    let good = setup::sign(&message, &format!("{did}#key-1"), &key);

    registry.create_did_doc(payload, &[bad, good]).expect("should create");
}

// Creating the same DID twice fails.
#[test]
fn create_is_rejected_for_existing_did() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();

    let doc = setup::single_key_doc(&did, &key);
    let payload = setup::payload(&doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);
    registry.create_did_doc(payload, &[signature]).expect("should create");

    let payload = setup::payload(&doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);
    let err = registry.create_did_doc(payload, &[signature]).expect_err("should reject");
    assert_eq!(err, Error::AlreadyExists(did));
}

// A missing signature from the subject is reported as not found, not invalid.
#[test]
fn create_without_signatures_fails() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();

    let doc = setup::single_key_doc(&did, &key);
    let payload = setup::payload(&doc);

    let err = registry.create_did_doc(payload, &[]).expect_err("should reject");
    assert_eq!(
        err,
        Error::SignatureNotFound(format!("there should be at least one signature by {did}"))
    );
}

// An external controller must sign and must already be registered.
#[test]
fn create_with_external_controller() {
    let mut registry = setup::registry();

    // register the controller first
    let controller_did = setup::new_did();
    let controller_key = setup::new_key();
    let controller_doc = setup::single_key_doc(&controller_did, &controller_key);
    let payload = setup::payload(&controller_doc);
    let signature = setup::sign_payload(&payload, &format!("{controller_did}#key-1"), &controller_key);
    registry.create_did_doc(payload, &[signature]).expect("should create controller");

    // the controlled document carries no keys of its own
    let did = setup::new_did();
    let doc = DidDocumentBuilder::new(&did).controller(&controller_did).build();
    let payload = setup::payload(&doc);
    let signature =
        setup::sign_payload(&payload, &format!("{controller_did}#key-1"), &controller_key);
    registry.create_did_doc(payload, &[signature]).expect("should create controlled doc");
}

// An unregistered controller fails the existence check.
#[test]
fn create_with_unknown_controller_fails() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let controller_did = setup::new_did();
    let key = setup::new_key();

    let doc = DidDocumentBuilder::new(&did).controller(&controller_did).build();
    let payload = setup::payload(&doc);
    let signature = setup::sign(b"irrelevant", &format!("{did}#key-1"), &key);

    let err = registry.create_did_doc(payload, &[signature]).expect_err("should reject");
    assert_eq!(err, Error::NotFound(controller_did));
}

// Structural validation runs before anything touches the store.
#[test]
fn create_with_invalid_document_fails() {
    let mut registry = setup::registry();
    let key = setup::new_key();

    // wrong namespace
    let did = format!("did:example:mainnet:{}", uuid::Uuid::new_v4());
    let doc = setup::single_key_doc(&did, &key);
    let payload = setup::payload(&doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);

    let err = registry.create_did_doc(payload, &[signature]).expect_err("should reject");
    assert!(err.to_string().contains("did namespace must be one of: testnet"));
}

// Deactivating a never-created DID fails.
#[test]
fn deactivate_unknown_did_fails() {
    let mut registry = setup::registry();
    let did = setup::new_did();

    let payload =
        DeactivateDidDocPayload { id: did.clone(), version_id: setup::new_version_id() };
    let signature = SignInfo {
        verification_method_id: format!("{did}#key-1"),
        signature: vec![1, 2, 3],
    };

    let err = registry.deactivate_did_doc(payload, &[signature]).expect_err("should reject");
    assert_eq!(err, Error::NotFound(did));
}
