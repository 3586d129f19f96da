//! # DID Registry
//!
//! The registry owns the write path for DID documents: create, update and
//! deactivate, each authorized by controller signatures over the payload's
//! canonical bytes, plus the read path for resolving documents by version.
//! Documents are versioned: each write stores a new version under a
//! client-chosen UUID and links it to its predecessor.

mod auth;
mod payload;

use chrono::Utc;

pub use self::auth::*;
pub use self::payload::*;
use crate::did;
use crate::document::{
    DidDocument, DidDocumentWithMetadata, DocumentMetadata, SignInfo, is_unique_sign_infos,
};
use crate::error::{Error, Result};
use crate::store::DidDocStore;
use crate::validation::ValidationError;

/// Method and namespace restrictions applied to every DID handled by a
/// registry. An empty method or namespace list disables the respective
/// check.
#[derive(Clone, Debug, Default)]
pub struct RegistryConfig {
    /// The DID method this registry serves, e.g. `example`.
    pub method: String,

    /// Namespaces DIDs may carry, e.g. `mainnet` and `testnet`.
    pub allowed_namespaces: Vec<String>,
}

impl RegistryConfig {
    /// Creates a configuration restricted to `method` with no namespace
    /// restriction.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self { method: method.into(), allowed_namespaces: vec![] }
    }

    /// Restricts DIDs to the given namespaces.
    #[must_use]
    pub fn with_namespaces(mut self, namespaces: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }
}

/// A versioned registry of DID documents over a pluggable store.
pub struct DidRegistry<S: DidDocStore> {
    store: S,
    config: RegistryConfig,
}

impl<S: DidDocStore> DidRegistry<S> {
    /// Creates a registry over `store`.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self { store, config }
    }

    /// The registry's method and namespace restrictions.
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Stores the first version of a DID document.
    ///
    /// The document's subject (or its controllers, when set) must each
    /// produce at least one valid signature over the payload's canonical
    /// bytes. Signatures may be made with keys from the document being
    /// created.
    ///
    /// # Errors
    ///
    /// Fails validation errors through, and returns [`Error::AlreadyExists`]
    /// when the DID is already registered, [`Error::NotFound`] when an
    /// external controller is not registered, or a signature error when
    /// authorization fails.
    pub fn create_did_doc(
        &mut self, payload: CreateDidDocPayload, signatures: &[SignInfo],
    ) -> Result<DidDocumentWithMetadata> {
        let (payload, signatures) = self.check_and_normalize(payload, signatures)?;

        let did = payload.id.clone();
        if self.store.has(&did) {
            return Err(Error::AlreadyExists(did));
        }

        let doc = payload.to_did_doc();
        let created = DidDocumentWithMetadata {
            did_doc: doc.clone(),
            metadata: DocumentMetadata {
                created: Utc::now(),
                updated: None,
                deactivated: false,
                version_id: payload.version_id.clone(),
                next_version_id: None,
                previous_version_id: None,
            },
        };

        // the new document participates in its own authorization
        let mut overlay = DocOverlay::new(&self.store);
        overlay.insert(created.clone());

        self.check_controllers(&overlay, &doc)?;

        let signers = doc.controllers_or_subject();
        let message = payload.sign_bytes()?;
        verify_all_signers_have_at_least_one_valid_signature(
            &overlay, &message, &signers, &signatures, &did, &did,
        )?;

        self.store.set_version(created.clone());
        self.store.set_latest_version(&did, &payload.version_id);
        tracing::info!(%did, version_id = %payload.version_id, "created DID document");

        Ok(created)
    }

    /// Stores a new version of an existing DID document and makes it the
    /// latest.
    ///
    /// Authorization is anchored in the stored document: the controllers (or
    /// subject) of the version being replaced must sign, with keys resolved
    /// against stored documents. Keys present only in the incoming version
    /// cannot authorize the update that introduces them.
    ///
    /// # Errors
    ///
    /// Fails validation errors through, and returns [`Error::NotFound`] when
    /// the DID is not registered, [`Error::Deactivated`] when it has been
    /// deactivated, [`Error::AlreadyExists`] when the version id is already
    /// taken, or a signature error when authorization fails.
    pub fn update_did_doc(
        &mut self, payload: UpdateDidDocPayload, signatures: &[SignInfo],
    ) -> Result<DidDocumentWithMetadata> {
        let (payload, signatures) = self.check_and_normalize(payload, signatures)?;

        let did = payload.id.clone();
        let existing =
            self.store.get_latest(&did).ok_or_else(|| Error::NotFound(did.clone()))?;
        if existing.metadata.deactivated {
            return Err(Error::Deactivated(did));
        }
        if self.store.get_version(&did, &payload.version_id).is_some() {
            return Err(Error::AlreadyExists(format!("{did} version {}", payload.version_id)));
        }

        let doc = payload.to_did_doc();
        let updated = DidDocumentWithMetadata {
            did_doc: doc.clone(),
            metadata: DocumentMetadata {
                created: existing.metadata.created,
                updated: Some(Utc::now()),
                deactivated: false,
                version_id: payload.version_id.clone(),
                next_version_id: None,
                previous_version_id: Some(existing.metadata.version_id.clone()),
            },
        };

        // resolution against stored documents only: the version being
        // replaced anchors trust for its replacement
        let overlay = DocOverlay::new(&self.store);

        self.check_controllers(&overlay, &doc)?;

        let signers = existing.did_doc.controllers_or_subject();
        let message = payload.sign_bytes()?;
        verify_all_signers_have_at_least_one_valid_signature(
            &overlay, &message, &signers, &signatures, &existing.did_doc.id, &doc.id,
        )?;

        let mut previous = existing;
        previous.metadata.next_version_id = Some(payload.version_id.clone());
        self.store.set_version(previous);
        self.store.set_version(updated.clone());
        self.store.set_latest_version(&did, &payload.version_id);
        tracing::info!(%did, version_id = %payload.version_id, "updated DID document");

        Ok(updated)
    }

    /// Marks every version of a DID document as deactivated. Deactivation is
    /// terminal: no further writes to the DID are accepted.
    ///
    /// # Errors
    ///
    /// Fails validation errors through, and returns [`Error::NotFound`] when
    /// the DID is not registered, [`Error::Deactivated`] when it already is,
    /// or a signature error when authorization fails.
    pub fn deactivate_did_doc(
        &mut self, payload: DeactivateDidDocPayload, signatures: &[SignInfo],
    ) -> Result<DidDocumentWithMetadata> {
        self.validate_signatures(signatures)?;
        payload.validate(&self.config.method, &self.config.allowed_namespaces)?;

        let mut payload = payload;
        payload.normalize()?;
        let mut signatures = signatures.to_vec();
        for sign_info in &mut signatures {
            sign_info.normalize()?;
        }

        let did = payload.id.clone();
        let latest = self.store.get_latest(&did).ok_or_else(|| Error::NotFound(did.clone()))?;
        if latest.metadata.deactivated {
            return Err(Error::Deactivated(did));
        }

        let overlay = DocOverlay::new(&self.store);
        let signers = latest.did_doc.controllers_or_subject();
        let message = payload.sign_bytes()?;
        verify_all_signers_have_at_least_one_valid_signature(
            &overlay, &message, &signers, &signatures, &did, &did,
        )?;

        // document contents are kept; only metadata changes
        for metadata in self.store.all_versions_metadata(&did) {
            if let Some(mut version) = self.store.get_version(&did, &metadata.version_id) {
                version.metadata.deactivated = true;
                self.store.set_version(version);
            }
        }

        let deactivated = self
            .store
            .get_latest(&did)
            .ok_or_else(|| Error::Internal(format!("latest version missing for {did}")))?;
        tracing::info!(%did, "deactivated DID document");

        Ok(deactivated)
    }

    /// The latest version of a DID document.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the DID is malformed and
    /// [`Error::NotFound`] when it is not registered.
    pub fn did_doc(&self, did: &str) -> Result<DidDocumentWithMetadata> {
        let did = self.checked_did(did)?;
        self.store.get_latest(&did).ok_or(Error::NotFound(did))
    }

    /// A specific version of a DID document.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the DID is malformed and
    /// [`Error::NotFound`] when the DID or the version is not registered.
    pub fn did_doc_version(&self, did: &str, version_id: &str) -> Result<DidDocumentWithMetadata> {
        let did = self.checked_did(did)?;
        let version_id = did::normalize_uuid(version_id);
        self.store
            .get_version(&did, &version_id)
            .ok_or_else(|| Error::NotFound(format!("{did} version {version_id}")))
    }

    /// Metadata for every version of a DID document, in storage order.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the DID is malformed and
    /// [`Error::NotFound`] when it is not registered.
    pub fn all_did_doc_versions_metadata(&self, did: &str) -> Result<Vec<DocumentMetadata>> {
        let did = self.checked_did(did)?;
        if !self.store.has(&did) {
            return Err(Error::NotFound(did));
        }
        Ok(self.store.all_versions_metadata(&did))
    }

    fn checked_did(&self, did: &str) -> Result<String> {
        did::validate_did(did, &self.config.method, &self.config.allowed_namespaces)
            .map_err(|msg| Error::Validation(ValidationError::for_field("id", msg)))?;
        did::normalize_did(did)
    }

    fn check_and_normalize(
        &self, payload: DidDocPayload, signatures: &[SignInfo],
    ) -> Result<(DidDocPayload, Vec<SignInfo>)> {
        self.validate_signatures(signatures)?;
        payload.validate(&self.config.method, &self.config.allowed_namespaces)?;

        let mut payload = payload;
        payload.normalize()?;
        let mut signatures = signatures.to_vec();
        for sign_info in &mut signatures {
            sign_info.normalize()?;
        }

        Ok((payload, signatures))
    }

    fn validate_signatures(&self, signatures: &[SignInfo]) -> Result<()> {
        let mut err = ValidationError::new();
        if is_unique_sign_infos(signatures) {
            for (i, sign_info) in signatures.iter().enumerate() {
                err.add_indexed(
                    "signatures",
                    i,
                    sign_info.validate(&self.config.method, &self.config.allowed_namespaces),
                );
            }
        } else {
            err.add("signatures", "there should be no duplicates");
        }
        err.finish().map_err(Error::from)
    }

    // Every controller named by the document or its verification methods must
    // resolve to an active document.
    fn check_controllers(&self, overlay: &DocOverlay<'_, S>, doc: &DidDocument) -> Result<()> {
        for controller in doc.all_controller_dids() {
            let found = overlay.must_find(&controller)?;
            if found.metadata.deactivated {
                return Err(Error::Deactivated(controller));
            }
        }
        Ok(())
    }
}
