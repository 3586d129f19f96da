//! # Services
//!
//! A service expresses a way of communicating with the DID subject or a
//! related entity, such as a DIDComm mediator or a credential endpoint.

use serde::{Deserialize, Serialize};

use crate::did::{self, Presence};
use crate::error::Result;
use crate::validation::{ValidationError, is_unique};

/// A service entry within a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Identifier: a DID URL with a fragment and no path or query, prefixed
    /// by the document's DID.
    pub id: String,

    /// The service type, e.g. "DIDCommMessaging".
    #[serde(rename = "type")]
    pub service_type: String,

    /// One or more endpoint URIs.
    pub service_endpoint: Vec<String>,

    /// Media types the endpoint accepts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accept: Vec<String>,

    /// Routing keys (DID URLs) for mediated delivery.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routing_keys: Vec<String>,
}

impl Service {
    /// Validates the service's identifier, type, endpoints and routing keys
    /// against the document's DID, the registry method name and allowed
    /// namespaces.
    ///
    /// # Errors
    ///
    /// Returns every failing field keyed by name.
    pub fn validate(
        &self, base_did: &str, method: &str, allowed_namespaces: &[String],
    ) -> std::result::Result<(), ValidationError> {
        let mut err = ValidationError::new();

        if self.id.is_empty() {
            err.add("id", "cannot be blank");
        } else if let Err(msg) = did::validate_specific_did_url(
            &self.id, method, allowed_namespaces, Presence::Empty, Presence::Empty,
            Presence::Required,
        ) {
            err.add("id", msg);
        } else if !base_did.is_empty() && !self.id.starts_with(base_did) {
            err.add("id", format!("must have prefix: {base_did}"));
        }

        if self.service_type.is_empty() {
            err.add("service_type", "cannot be blank");
        }

        if self.service_endpoint.is_empty() {
            err.add("service_endpoint", "cannot be blank");
        } else {
            for (i, endpoint) in self.service_endpoint.iter().enumerate() {
                if endpoint.is_empty() {
                    err.add_indexed(
                        "service_endpoint",
                        i,
                        Err(ValidationError::message("cannot be blank")),
                    );
                }
            }
        }

        if !is_unique(&self.accept) {
            err.add("accept", "there should be no duplicates");
        }

        if is_unique(&self.routing_keys) {
            for (i, key) in self.routing_keys.iter().enumerate() {
                err.add_indexed(
                    "routing_keys",
                    i,
                    did::validate_did_url(key, method, allowed_namespaces)
                        .map_err(ValidationError::message),
                );
            }
        } else {
            err.add("routing_keys", "there should be no duplicates");
        }

        err.finish()
    }

    /// Normalizes the service's identifier and routing keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`](crate::Error::Internal) when an identifier
    /// does not split, which indicates validation was skipped.
    pub fn normalize(&mut self) -> Result<()> {
        self.id = did::normalize_did_url(&self.id)?;
        for key in &mut self.routing_keys {
            *key = did::normalize_did_url(key)?;
        }
        Ok(())
    }
}
