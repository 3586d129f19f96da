//! # Write Authorization
//!
//! Every write to the registry must carry signatures over the payload's
//! canonical bytes. Each expected signer (a controller DID) must have at
//! least one signature made with a key usable for authentication on its
//! document. Documents are looked up through an overlay so an operation can
//! be authorized by a document it is itself introducing (create) or by the
//! stored documents only (update, deactivate).

use std::collections::HashMap;

use crate::did;
use crate::document::{DidDocumentWithMetadata, SignInfo, VerificationMethod};
use crate::error::{Error, Result};
use crate::store::DidDocStore;

/// Documents visible to authorization: in-flight documents first, then the
/// latest stored version.
pub struct DocOverlay<'a, S: DidDocStore> {
    store: &'a S,
    docs: HashMap<String, DidDocumentWithMetadata>,
}

impl<'a, S: DidDocStore> DocOverlay<'a, S> {
    /// Creates an overlay over `store` with no in-flight documents.
    pub fn new(store: &'a S) -> Self {
        Self { store, docs: HashMap::new() }
    }

    /// Adds an in-flight document, shadowing any stored version of the same
    /// DID.
    pub fn insert(&mut self, doc: DidDocumentWithMetadata) {
        self.docs.insert(doc.did_doc.id.clone(), doc);
    }

    /// Looks up a DID: in-flight documents first, then the latest stored
    /// version.
    #[must_use]
    pub fn find(&self, did: &str) -> Option<DidDocumentWithMetadata> {
        self.docs.get(did).cloned().or_else(|| self.store.get_latest(did))
    }

    /// Looks up a DID that must be visible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when neither the overlay nor the store
    /// holds a document for the DID.
    pub fn must_find(&self, did: &str) -> Result<DidDocumentWithMetadata> {
        self.find(did).ok_or_else(|| Error::NotFound(did.to_string()))
    }
}

/// Resolves a verification method usable for authentication from the signer's
/// document.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when the signer's document is not visible, and
/// [`Error::AuthenticationMethodNotFound`] when the document has no matching
/// method in its `authentication` entries or `verificationMethod` list.
pub fn find_authentication_method<S: DidDocStore>(
    overlay: &DocOverlay<'_, S>, did_url: &str,
) -> Result<VerificationMethod> {
    let (signer_did, ..) = did::must_split_did_url(did_url)?;
    let doc = overlay.must_find(&signer_did)?;

    doc.did_doc
        .find_authentication_method(did_url)
        .cloned()
        .ok_or_else(|| Error::AuthenticationMethodNotFound(did_url.to_string()))
}

/// Verifies a single signature against the method it names.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] naming the method when verification
/// fails, or a resolution error when the method cannot be found.
pub fn verify_signature<S: DidDocStore>(
    overlay: &DocOverlay<'_, S>, message: &[u8], sign_info: &SignInfo,
) -> Result<()> {
    let method = find_authentication_method(overlay, &sign_info.verification_method_id)?;

    method.verify_signature(message, &sign_info.signature).map_err(|e| match e {
        Error::InvalidSignature(_) => Error::InvalidSignature(format!(
            "method id: {}",
            sign_info.verification_method_id
        )),
        other => other,
    })
}

/// Signatures whose verification method belongs to `signer`.
///
/// # Errors
///
/// Returns [`Error::Internal`] when a verification method id does not split,
/// which indicates signature validation was skipped.
pub fn find_sign_infos_by_signer<'s>(
    signatures: &'s [SignInfo], signer: &str,
) -> Result<Vec<&'s SignInfo>> {
    let mut found = vec![];
    for sign_info in signatures {
        let (did, ..) = did::must_split_did_url(&sign_info.verification_method_id)?;
        if did == signer {
            found.push(sign_info);
        }
    }
    Ok(found)
}

/// Checks that every expected signer produced at least one valid signature
/// over `message`.
///
/// # Errors
///
/// Returns [`Error::SignatureNotFound`] when a signer has no signature at
/// all, and [`Error::InvalidSignature`] when none of a signer's signatures
/// verify.
pub fn verify_all_signers_have_at_least_one_valid_signature<S: DidDocStore>(
    overlay: &DocOverlay<'_, S>, message: &[u8], signers: &[String], signatures: &[SignInfo],
    did_to_be_updated: &str, updated_did: &str,
) -> Result<()> {
    for signer in signers {
        let sign_infos = find_sign_infos_by_signer(signatures, signer)?;
        if sign_infos.is_empty() {
            let label = signer_label(signer, did_to_be_updated, updated_did);
            return Err(Error::SignatureNotFound(format!(
                "there should be at least one signature by {label}"
            )));
        }

        let valid = sign_infos
            .iter()
            .any(|sign_info| verify_signature(overlay, message, sign_info).is_ok());
        if !valid {
            let label = signer_label(signer, did_to_be_updated, updated_did);
            return Err(Error::InvalidSignature(format!(
                "there should be at least one valid signature by {label}"
            )));
        }
    }

    Ok(())
}

/// Checks that every expected signer produced at least one signature and that
/// all of each signer's signatures verify. Stricter than the
/// at-least-one-valid rule; intended for operations that must not carry any
/// stray signature.
///
/// # Errors
///
/// Returns [`Error::SignatureNotFound`] when a signer has no signature at
/// all, and the verification error for the first signature that fails.
pub fn verify_all_signers_have_all_valid_signatures<S: DidDocStore>(
    overlay: &DocOverlay<'_, S>, message: &[u8], signers: &[String], signatures: &[SignInfo],
) -> Result<()> {
    for signer in signers {
        let sign_infos = find_sign_infos_by_signer(signatures, signer)?;
        if sign_infos.is_empty() {
            return Err(Error::SignatureNotFound(format!("signer: {signer}")));
        }

        for sign_info in sign_infos {
            verify_signature(overlay, message, sign_info)?;
        }
    }

    Ok(())
}

// Distinguishes the document being replaced from its replacement in error
// messages. For create and deactivate both sides are the same DID and the
// bare identifier is used.
fn signer_label(signer: &str, did_to_be_updated: &str, updated_did: &str) -> String {
    if did_to_be_updated == updated_did {
        return signer.to_string();
    }
    if signer == did_to_be_updated {
        return format!("{signer} (old version)");
    }
    if signer == updated_did {
        return format!("{signer} (new version)");
    }
    signer.to_string()
}
