//! Tests for deactivating DID documents.

mod setup;

use did_registry::{DeactivateDidDocPayload, Error};

fn deactivate_payload(did: &str) -> DeactivateDidDocPayload {
    DeactivateDidDocPayload { id: did.to_string(), version_id: setup::new_version_id() }
}

// Test the happy path of deactivating a document: every stored version is
// flagged and the contents stay resolvable.
#[test]
fn deactivate_success() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();

    let doc = setup::single_key_doc(&did, &key);
    let payload = setup::payload(&doc);
    let first_version = payload.version_id.clone();
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);
    registry.create_did_doc(payload, &[signature]).expect("should create");

    let mut updated_doc = doc.clone();
    updated_doc.also_known_as = vec!["https://example.com/subject".to_string()];
    let payload = setup::payload(&updated_doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);
    registry.update_did_doc(payload, &[signature]).expect("should update");

    let payload = deactivate_payload(&did);
    let message = payload.sign_bytes().expect("should serialize");
    let signature = setup::sign(&message, &format!("{did}#key-1"), &key);

    let deactivated = registry.deactivate_did_doc(payload, &[signature]).expect("should deactivate");
    assert!(deactivated.metadata.deactivated);
    assert_eq!(deactivated.did_doc, updated_doc);

    // every version is flagged, contents included
    let versions = registry.all_did_doc_versions_metadata(&did).expect("should list");
    assert_eq!(versions.len(), 2);
    assert!(versions.iter().all(|m| m.deactivated));

    let first = registry.did_doc_version(&did, &first_version).expect("should resolve");
    assert!(first.metadata.deactivated);
    assert_eq!(first.did_doc, doc);
}

// Deactivation is terminal: no further updates or deactivations.
#[test]
fn deactivation_is_terminal() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();

    let doc = setup::single_key_doc(&did, &key);
    let payload = setup::payload(&doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);
    registry.create_did_doc(payload, &[signature]).expect("should create");

    let payload = deactivate_payload(&did);
    let message = payload.sign_bytes().expect("should serialize");
    let signature = setup::sign(&message, &format!("{did}#key-1"), &key);
    registry.deactivate_did_doc(payload, &[signature]).expect("should deactivate");

    // further updates are rejected
    let mut updated_doc = doc;
    updated_doc.also_known_as = vec!["https://example.com/subject".to_string()];
    let payload = setup::payload(&updated_doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);
    let err = registry.update_did_doc(payload, &[signature]).expect_err("should reject");
    assert_eq!(err, Error::Deactivated(did.clone()));

    // a second deactivation is rejected
    let payload = deactivate_payload(&did);
    let message = payload.sign_bytes().expect("should serialize");
    let signature = setup::sign(&message, &format!("{did}#key-1"), &key);
    let err = registry.deactivate_did_doc(payload, &[signature]).expect_err("should reject");
    assert_eq!(err, Error::Deactivated(did));
}

// Deactivation needs a valid signature by the document's controller set.
#[test]
fn deactivate_requires_authorization() {
    let mut registry = setup::registry();
    let did = setup::new_did();
    let key = setup::new_key();
    let stray_key = setup::new_key();

    let doc = setup::single_key_doc(&did, &key);
    let payload = setup::payload(&doc);
    let signature = setup::sign_payload(&payload, &format!("{did}#key-1"), &key);
    registry.create_did_doc(payload, &[signature]).expect("should create");

    let payload = deactivate_payload(&did);
    let message = payload.sign_bytes().expect("should serialize");
    let signature = setup::sign(&message, &format!("{did}#key-1"), &stray_key);

    let err = registry.deactivate_did_doc(payload, &[signature]).expect_err("should reject");
    assert_eq!(
        err,
        Error::InvalidSignature(format!("there should be at least one valid signature by {did}"))
    );

    // the document is untouched
    let resolved = registry.did_doc(&did).expect("should resolve");
    assert!(!resolved.metadata.deactivated);
}

// The deactivation payload itself is validated.
#[test]
fn deactivate_validates_the_payload() {
    let mut registry = setup::registry();

    let payload = DeactivateDidDocPayload {
        id: setup::new_did(),
        version_id: "not-a-uuid".to_string(),
    };
    let err = registry.deactivate_did_doc(payload, &[]).expect_err("should reject");
    assert_eq!(err.to_string(), "version_id: must be a valid UUID.");
}
