//! # Operation Payloads
//!
//! Signable payloads for the create, update and deactivate operations. A
//! payload's signing bytes are its JCS (RFC 8785) canonical JSON, computed
//! after normalization so signer and registry agree on the exact bytes.

use serde::{Deserialize, Serialize};

use crate::did;
use crate::document::{
    DidDocument, Service, VerificationMethod, VerificationRelationship,
};
use crate::error::{Error, Result};
use crate::validation::ValidationError;

/// Payload carrying a full DID document plus the version identifier to store
/// it under. Used by both the create and update operations.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DidDocPayload {
    /// JSON-LD contexts.
    #[serde(rename = "@context", skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,

    /// The DID of the document's subject.
    pub id: String,

    /// Controller DIDs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub controller: Vec<String>,

    /// Verification methods.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    /// Authentication relationship entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<VerificationRelationship>,

    /// Assertion method relationship entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<VerificationRelationship>,

    /// Capability invocation relationship entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capability_invocation: Vec<VerificationRelationship>,

    /// Capability delegation relationship entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capability_delegation: Vec<VerificationRelationship>,

    /// Key agreement relationship entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_agreement: Vec<VerificationRelationship>,

    /// Other URIs identifying the subject.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub also_known_as: Vec<String>,

    /// Services.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<Service>,

    /// Identifier (a UUID) for the document version this payload produces.
    pub version_id: String,
}

/// Payload for the create operation.
pub type CreateDidDocPayload = DidDocPayload;

/// Payload for the update operation.
pub type UpdateDidDocPayload = DidDocPayload;

impl DidDocPayload {
    /// Builds a payload from a document and the version identifier to store
    /// it under.
    #[must_use]
    pub fn from_did_doc(doc: DidDocument, version_id: impl Into<String>) -> Self {
        Self {
            context: doc.context,
            id: doc.id,
            controller: doc.controller,
            verification_method: doc.verification_method,
            authentication: doc.authentication,
            assertion_method: doc.assertion_method,
            capability_invocation: doc.capability_invocation,
            capability_delegation: doc.capability_delegation,
            key_agreement: doc.key_agreement,
            also_known_as: doc.also_known_as,
            service: doc.service,
            version_id: version_id.into(),
        }
    }

    /// The DID document this payload carries.
    #[must_use]
    pub fn to_did_doc(&self) -> DidDocument {
        DidDocument {
            context: self.context.clone(),
            id: self.id.clone(),
            controller: self.controller.clone(),
            verification_method: self.verification_method.clone(),
            authentication: self.authentication.clone(),
            assertion_method: self.assertion_method.clone(),
            capability_invocation: self.capability_invocation.clone(),
            capability_delegation: self.capability_delegation.clone(),
            key_agreement: self.key_agreement.clone(),
            also_known_as: self.also_known_as.clone(),
            service: self.service.clone(),
        }
    }

    /// Validates the carried document and the version identifier.
    ///
    /// # Errors
    ///
    /// Returns every failing field keyed by name.
    pub fn validate(
        &self, method: &str, allowed_namespaces: &[String],
    ) -> std::result::Result<(), ValidationError> {
        let mut err = match self.to_did_doc().validate(method, allowed_namespaces) {
            Ok(()) => ValidationError::new(),
            Err(doc_err) => doc_err,
        };

        if self.version_id.is_empty() {
            err.add("version_id", "cannot be blank");
        } else if !did::is_valid_uuid(&self.version_id) {
            err.add("version_id", "must be a valid UUID");
        }

        err.finish()
    }

    /// Normalizes every identifier in the payload, including the version
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when an identifier does not split, which
    /// indicates validation was skipped.
    pub fn normalize(&mut self) -> Result<()> {
        let mut doc = self.to_did_doc();
        doc.normalize()?;
        *self = Self::from_did_doc(doc, did::normalize_uuid(&self.version_id));
        Ok(())
    }

    /// The canonical signing bytes for this payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] when canonicalization fails.
    pub fn sign_bytes(&self) -> Result<Vec<u8>> {
        sign_bytes(self)
    }
}

/// Payload for the deactivate operation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DeactivateDidDocPayload {
    /// The DID to deactivate.
    pub id: String,

    /// Version identifier (a UUID) for the deactivation.
    pub version_id: String,
}

impl DeactivateDidDocPayload {
    /// Validates the DID and version identifier.
    ///
    /// # Errors
    ///
    /// Returns every failing field keyed by name.
    pub fn validate(
        &self, method: &str, allowed_namespaces: &[String],
    ) -> std::result::Result<(), ValidationError> {
        let mut err = ValidationError::new();

        if self.id.is_empty() {
            err.add("id", "cannot be blank");
        } else if let Err(msg) = did::validate_did(&self.id, method, allowed_namespaces) {
            err.add("id", msg);
        }

        if self.version_id.is_empty() {
            err.add("version_id", "cannot be blank");
        } else if !did::is_valid_uuid(&self.version_id) {
            err.add("version_id", "must be a valid UUID");
        }

        err.finish()
    }

    /// Normalizes the DID and version identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when the DID does not split, which
    /// indicates validation was skipped.
    pub fn normalize(&mut self) -> Result<()> {
        self.id = did::normalize_did(&self.id)?;
        self.version_id = did::normalize_uuid(&self.version_id);
        Ok(())
    }

    /// The canonical signing bytes for this payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] when canonicalization fails.
    pub fn sign_bytes(&self) -> Result<Vec<u8>> {
        sign_bytes(self)
    }
}

fn sign_bytes<T: Serialize>(payload: &T) -> Result<Vec<u8>> {
    serde_json_canonicalizer::to_string(payload)
        .map(String::into_bytes)
        .map_err(|e| Error::Serialize(e.to_string()))
}
