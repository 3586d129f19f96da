//! # Document Builders
//!
//! Fluent construction of DID documents, verification methods and services.
//! Builders assemble structure only; validation happens when a document is
//! submitted to the registry.

use super::{
    CONTEXT, DidDocument, MethodType, Service, VerificationMaterial, VerificationMethod,
    VerificationRelationship,
};
use crate::jwk::Jwk;

/// A builder for creating a DID document.
#[derive(Clone, Debug, Default)]
pub struct DidDocumentBuilder {
    doc: DidDocument,
}

impl DidDocumentBuilder {
    /// Creates a new builder for the given DID, seeded with the base
    /// DID context.
    #[must_use]
    pub fn new(did: impl Into<String>) -> Self {
        let doc = DidDocument {
            context: vec![CONTEXT.to_string()],
            id: did.into(),
            ..DidDocument::default()
        };
        Self { doc }
    }

    /// Add a JSON-LD context.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.doc.context.push(context.into());
        self
    }

    /// Add a controller DID.
    ///
    /// Chain to add multiple controllers.
    #[must_use]
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.doc.controller.push(controller.into());
        self
    }

    /// Add a verification method to the `verification_method` list.
    #[must_use]
    pub fn verification_method(mut self, vm: VerificationMethod) -> Self {
        self.doc.verification_method.push(vm);
        self
    }

    /// Add an entry to the `authentication` relationship.
    #[must_use]
    pub fn authentication(mut self, entry: impl Into<VerificationRelationship>) -> Self {
        self.doc.authentication.push(entry.into());
        self
    }

    /// Add an entry to the `assertion_method` relationship.
    #[must_use]
    pub fn assertion_method(mut self, entry: impl Into<VerificationRelationship>) -> Self {
        self.doc.assertion_method.push(entry.into());
        self
    }

    /// Add an entry to the `capability_invocation` relationship.
    #[must_use]
    pub fn capability_invocation(mut self, entry: impl Into<VerificationRelationship>) -> Self {
        self.doc.capability_invocation.push(entry.into());
        self
    }

    /// Add an entry to the `capability_delegation` relationship.
    #[must_use]
    pub fn capability_delegation(mut self, entry: impl Into<VerificationRelationship>) -> Self {
        self.doc.capability_delegation.push(entry.into());
        self
    }

    /// Add an entry to the `key_agreement` relationship.
    #[must_use]
    pub fn key_agreement(mut self, entry: impl Into<VerificationRelationship>) -> Self {
        self.doc.key_agreement.push(entry.into());
        self
    }

    /// Add an also-known-as URI.
    #[must_use]
    pub fn also_known_as(mut self, uri: impl Into<String>) -> Self {
        self.doc.also_known_as.push(uri.into());
        self
    }

    /// Add a service.
    #[must_use]
    pub fn service(mut self, service: Service) -> Self {
        self.doc.service.push(service);
        self
    }

    /// Build the document.
    #[must_use]
    pub fn build(self) -> DidDocument {
        self.doc
    }
}

/// A builder for creating a verification method.
#[derive(Clone, Debug, Default)]
pub struct VerificationMethodBuilder {
    vm: VerificationMethod,
}

impl VerificationMethodBuilder {
    /// Creates a new builder for the given method identifier (a DID URL with
    /// a fragment).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let vm = VerificationMethod { id: id.into(), ..VerificationMethod::default() };
        Self { vm }
    }

    /// Set the method type.
    #[must_use]
    pub const fn method_type(mut self, method_type: MethodType) -> Self {
        self.vm.method_type = method_type;
        self
    }

    /// Set the controller DID.
    #[must_use]
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.vm.controller = controller.into();
        self
    }

    /// Use multibase-encoded key material.
    #[must_use]
    pub fn multibase(mut self, public_key_multibase: impl Into<String>) -> Self {
        self.vm.verification_material =
            VerificationMaterial::Multibase { public_key_multibase: public_key_multibase.into() };
        self
    }

    /// Use base58-encoded key material.
    #[must_use]
    pub fn base58(mut self, public_key_base58: impl Into<String>) -> Self {
        self.vm.verification_material =
            VerificationMaterial::Base58 { public_key_base58: public_key_base58.into() };
        self
    }

    /// Use a JWK as key material.
    #[must_use]
    pub fn jwk(mut self, public_key_jwk: Jwk) -> Self {
        self.vm.verification_material = VerificationMaterial::Jwk { public_key_jwk };
        self
    }

    /// Build the verification method.
    #[must_use]
    pub fn build(self) -> VerificationMethod {
        self.vm
    }
}

/// A builder for creating a service.
#[derive(Clone, Debug, Default)]
pub struct ServiceBuilder {
    svc: Service,
}

impl ServiceBuilder {
    /// Creates a new builder for the given service identifier (a DID URL
    /// with a fragment).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let svc = Service { id: id.into(), ..Service::default() };
        Self { svc }
    }

    /// Set the service type.
    #[must_use]
    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.svc.service_type = service_type.into();
        self
    }

    /// Add an endpoint URI.
    ///
    /// Chain to add multiple endpoints.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.svc.service_endpoint.push(endpoint.into());
        self
    }

    /// Add an accepted media type.
    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.svc.accept.push(accept.into());
        self
    }

    /// Add a routing key (a DID URL).
    #[must_use]
    pub fn routing_key(mut self, key: impl Into<String>) -> Self {
        self.svc.routing_keys.push(key.into());
        self
    }

    /// Build the service.
    #[must_use]
    pub fn build(self) -> Service {
        self.svc
    }
}
