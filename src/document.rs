//! # DID Document
//!
//! The DID document model: verification methods, verification relationships,
//! services and version metadata, together with structural validation and
//! normalization.
//!
//! Validation aggregates per-field errors so a caller sees every problem at
//! once. Identifier normalization lowercases UUID-style unique identifiers
//! and is applied after validation, before a document is stored or compared.

mod builders;
mod method;
mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use self::builders::*;
pub use self::method::*;
pub use self::service::*;
use crate::did;
use crate::error::Result;
use crate::validation::{ValidationError, is_unique};

/// The base JSON-LD context for DID documents.
pub const CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// A DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DidDocument {
    /// JSON-LD contexts.
    #[serde(rename = "@context", skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,

    /// The DID of the document's subject.
    pub id: String,

    /// DIDs authorized to make changes to this document. When empty, the
    /// subject controls the document.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub controller: Vec<String>,

    /// Verification methods available for reference from the verification
    /// relationships.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,

    /// Methods usable to authenticate as the DID subject. Only methods in
    /// this relationship (or the `verification_method` list) can authorize
    /// registry operations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<VerificationRelationship>,

    /// Methods usable to express claims on behalf of the subject.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<VerificationRelationship>,

    /// Methods usable to invoke cryptographic capabilities.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capability_invocation: Vec<VerificationRelationship>,

    /// Methods usable to delegate cryptographic capabilities.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capability_delegation: Vec<VerificationRelationship>,

    /// Methods usable to establish encrypted channels with the subject.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub key_agreement: Vec<VerificationRelationship>,

    /// Other URIs identifying the subject.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub also_known_as: Vec<String>,

    /// Services for communicating with the subject.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<Service>,
}

/// An entry in a verification relationship list: either a reference (by DID
/// URL) to a method in the document's `verification_method` list, or a method
/// embedded directly in the relationship.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRelationship {
    /// Reference to a method in the `verification_method` list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method_id: Option<String>,

    /// A method embedded in (and scoped to) this relationship.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<VerificationMethod>,
}

impl From<&str> for VerificationRelationship {
    fn from(id: &str) -> Self {
        Self { verification_method_id: Some(id.to_string()), verification_method: None }
    }
}

impl From<String> for VerificationRelationship {
    fn from(id: String) -> Self {
        Self { verification_method_id: Some(id), verification_method: None }
    }
}

impl From<VerificationMethod> for VerificationRelationship {
    fn from(vm: VerificationMethod) -> Self {
        Self { verification_method_id: None, verification_method: Some(vm) }
    }
}

impl VerificationRelationship {
    /// The effective method identifier: the reference, or the embedded
    /// method's id.
    #[must_use]
    pub fn method_id(&self) -> Option<&str> {
        self.verification_method_id
            .as_deref()
            .or_else(|| self.verification_method.as_ref().map(|vm| vm.id.as_str()))
    }

    /// Validates the relationship entry. References must be fragment-only
    /// DID URLs prefixed by the document's DID and must resolve against the
    /// document's `verification_method` list; embedded methods are validated
    /// in full.
    ///
    /// # Errors
    ///
    /// Returns every failing field keyed by name.
    pub fn validate(
        &self, base_did: &str, method: &str, allowed_namespaces: &[String],
        known_method_ids: &[&str],
    ) -> std::result::Result<(), ValidationError> {
        match (&self.verification_method_id, &self.verification_method) {
            (Some(_), Some(_)) | (None, None) => Err(ValidationError::message(
                "exactly one of verification_method_id and verification_method must be set",
            )),
            (Some(id), None) => {
                if let Err(msg) = did::validate_specific_did_url(
                    id, method, allowed_namespaces, did::Presence::Empty, did::Presence::Empty,
                    did::Presence::Required,
                ) {
                    return Err(ValidationError::for_field("verification_method_id", msg));
                }
                if !base_did.is_empty() && !id.starts_with(base_did) {
                    return Err(ValidationError::for_field(
                        "verification_method_id",
                        format!("must have prefix: {base_did}"),
                    ));
                }
                if !known_method_ids.contains(&id.as_str()) {
                    return Err(ValidationError::message(format!(
                        "can't resolve verification method reference: {id}"
                    )));
                }
                Ok(())
            }
            (None, Some(vm)) => {
                let mut err = ValidationError::new();
                if let Err(nested) = vm.validate(base_did, method, allowed_namespaces) {
                    err.add_nested("verification_method", nested);
                }
                err.finish()
            }
        }
    }

    /// Normalizes the reference or embedded method identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`](crate::Error::Internal) when an identifier
    /// does not split, which indicates validation was skipped.
    pub fn normalize(&mut self) -> Result<()> {
        if let Some(id) = &self.verification_method_id {
            self.verification_method_id = Some(did::normalize_did_url(id)?);
        }
        if let Some(vm) = &mut self.verification_method {
            vm.normalize()?;
        }
        Ok(())
    }
}

impl DidDocument {
    /// The DIDs whose signatures authorize changes to this document: its
    /// controllers, or the subject itself when no controller is listed.
    #[must_use]
    pub fn controllers_or_subject(&self) -> Vec<String> {
        if self.controller.is_empty() { vec![self.id.clone()] } else { self.controller.clone() }
    }

    /// Every controller DID referenced by the document: document controllers
    /// plus the controllers of each verification method, deduplicated.
    #[must_use]
    pub fn all_controller_dids(&self) -> Vec<String> {
        let mut dids = self.controller.clone();
        for vm in &self.verification_method {
            dids.push(vm.controller.clone());
        }
        dids.sort();
        dids.dedup();
        dids
    }

    /// Finds a method in the `verification_method` list by its identifier.
    #[must_use]
    pub fn find_verification_method(&self, method_id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == method_id)
    }

    /// Finds a method usable for authentication: methods embedded in the
    /// `authentication` relationship take precedence, then the full
    /// `verification_method` list. Methods embedded solely in other
    /// relationships cannot authenticate.
    #[must_use]
    pub fn find_authentication_method(&self, method_id: &str) -> Option<&VerificationMethod> {
        self.authentication
            .iter()
            .filter_map(|rel| rel.verification_method.as_ref())
            .find(|vm| vm.id == method_id)
            .or_else(|| self.find_verification_method(method_id))
    }

    fn relationships(&self) -> [(&'static str, &Vec<VerificationRelationship>); 5] {
        [
            ("authentication", &self.authentication),
            ("assertion_method", &self.assertion_method),
            ("capability_invocation", &self.capability_invocation),
            ("capability_delegation", &self.capability_delegation),
            ("key_agreement", &self.key_agreement),
        ]
    }

    fn relationships_mut(&mut self) -> [&mut Vec<VerificationRelationship>; 5] {
        [
            &mut self.authentication,
            &mut self.assertion_method,
            &mut self.capability_invocation,
            &mut self.capability_delegation,
            &mut self.key_agreement,
        ]
    }

    /// Validates the document against the registry method name and allowed
    /// namespaces.
    ///
    /// Field errors are aggregated; when all fields pass, method identifiers
    /// must additionally be globally unique across the `verification_method`
    /// list and every embedded relationship method.
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

        if is_unique(&self.controller) {
            for (i, controller) in self.controller.iter().enumerate() {
                err.add_indexed(
                    "controller",
                    i,
                    did::validate_did(controller, method, allowed_namespaces)
                        .map_err(ValidationError::message),
                );
            }
        } else {
            err.add("controller", "there should be no duplicates");
        }

        let method_ids: Vec<&str> =
            self.verification_method.iter().map(|vm| vm.id.as_str()).collect();
        if is_unique(&method_ids) {
            for (i, vm) in self.verification_method.iter().enumerate() {
                err.add_indexed(
                    "verification_method",
                    i,
                    vm.validate(&self.id, method, allowed_namespaces),
                );
            }
        } else {
            err.add("verification_method", "there are verification method duplicates");
        }

        for (field, relationships) in self.relationships() {
            let before = err.clone();
            for (i, rel) in relationships.iter().enumerate() {
                err.add_indexed(
                    field,
                    i,
                    rel.validate(&self.id, method, allowed_namespaces, &method_ids),
                );
            }
            if err == before {
                let ids: Vec<&str> = relationships.iter().filter_map(|r| r.method_id()).collect();
                if !is_unique(&ids) {
                    err.add(field, "there are verification relationships with same IDs");
                }
            }
        }

        if is_unique(&self.also_known_as) {
            for (i, uri) in self.also_known_as.iter().enumerate() {
                err.add_indexed(
                    "also_known_as",
                    i,
                    did::validate_uri(uri).map_err(ValidationError::message),
                );
            }
        } else {
            err.add("also_known_as", "there should be no duplicates");
        }

        let service_ids: Vec<&str> = self.service.iter().map(|s| s.id.as_str()).collect();
        if is_unique(&service_ids) {
            for (i, svc) in self.service.iter().enumerate() {
                err.add_indexed("service", i, svc.validate(&self.id, method, allowed_namespaces));
            }
        } else {
            err.add("service", "there are service duplicates");
        }

        err.finish()?;

        // method ids must be globally unique, embedded methods included
        let mut all_ids = method_ids;
        for (_, relationships) in self.relationships() {
            for rel in relationships {
                if let Some(vm) = &rel.verification_method {
                    all_ids.push(vm.id.as_str());
                }
            }
        }
        if !is_unique(&all_ids) {
            return Err(ValidationError::message("there are verification method duplicates"));
        }

        Ok(())
    }

    /// Normalizes every identifier in the document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`](crate::Error::Internal) when an identifier
    /// does not split, which indicates validation was skipped.
    pub fn normalize(&mut self) -> Result<()> {
        self.id = did::normalize_did(&self.id)?;
        self.controller = did::normalize_did_list(&self.controller)?;
        for vm in &mut self.verification_method {
            vm.normalize()?;
        }
        for relationships in self.relationships_mut() {
            for rel in relationships.iter_mut() {
                rel.normalize()?;
            }
        }
        for svc in &mut self.service {
            svc.normalize()?;
        }
        Ok(())
    }
}

/// A signature over a registry payload together with the DID URL of the
/// verification method that produced it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignInfo {
    /// DID URL of the signing verification method.
    pub verification_method_id: String,

    /// The signature bytes.
    pub signature: Vec<u8>,
}

impl SignInfo {
    /// Validates the signing method identifier and signature presence.
    ///
    /// # Errors
    ///
    /// Returns every failing field keyed by name.
    pub fn validate(
        &self, method: &str, allowed_namespaces: &[String],
    ) -> std::result::Result<(), ValidationError> {
        let mut err = ValidationError::new();

        if self.verification_method_id.is_empty() {
            err.add("verification_method_id", "cannot be blank");
        } else if let Err(msg) = did::validate_specific_did_url(
            &self.verification_method_id,
            method,
            allowed_namespaces,
            did::Presence::Empty,
            did::Presence::Empty,
            did::Presence::Required,
        ) {
            err.add("verification_method_id", msg);
        }

        if self.signature.is_empty() {
            err.add("signature", "cannot be blank");
        }

        err.finish()
    }

    /// Normalizes the signing method identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`](crate::Error::Internal) when the
    /// identifier does not split, which indicates validation was skipped.
    pub fn normalize(&mut self) -> Result<()> {
        self.verification_method_id = did::normalize_did_url(&self.verification_method_id)?;
        Ok(())
    }
}

/// True when no two entries carry the same method identifier and signature.
/// The same method may legitimately contribute several signatures, so only
/// exact duplicates are rejected.
#[must_use]
pub fn is_unique_sign_infos(sign_infos: &[SignInfo]) -> bool {
    let pairs: Vec<(&str, &[u8])> = sign_infos
        .iter()
        .map(|si| (si.verification_method_id.as_str(), si.signature.as_slice()))
        .collect();
    is_unique(&pairs)
}

/// Version metadata attached to each stored DID document version.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Timestamp of the create operation.
    pub created: DateTime<Utc>,

    /// Timestamp of the most recent update, absent on the initial version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,

    /// True once the document has been deactivated.
    pub deactivated: bool,

    /// Identifier of this version.
    pub version_id: String,

    /// Identifier of the following version, absent on the latest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_version_id: Option<String>,

    /// Identifier of the preceding version, absent on the first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_version_id: Option<String>,
}

/// A DID document version paired with its metadata: the unit of storage and
/// the result of registry queries.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidDocumentWithMetadata {
    /// The document.
    pub did_doc: DidDocument,

    /// Version metadata.
    pub metadata: DocumentMetadata,
}
