//! # Document Storage
//!
//! Versioned storage for DID documents. Each DID maps to an ordered set of
//! document versions plus a pointer to the latest version; the registry
//! maintains the version chain links in metadata.
//!
//! [`InMemoryDidDocStore`] is the bundled implementation, suitable for tests
//! and embedding. Persistent backends implement [`DidDocStore`].

use std::collections::HashMap;

use crate::document::{DidDocumentWithMetadata, DocumentMetadata};

/// Versioned storage for DID documents, keyed by normalized DID and version
/// identifier.
pub trait DidDocStore {
    /// True when at least one version exists for the DID.
    fn has(&self, did: &str) -> bool;

    /// The version identifier the latest-version pointer names.
    fn latest_version_id(&self, did: &str) -> Option<String>;

    /// A specific document version.
    fn get_version(&self, did: &str, version_id: &str) -> Option<DidDocumentWithMetadata>;

    /// The latest document version.
    fn get_latest(&self, did: &str) -> Option<DidDocumentWithMetadata>;

    /// Metadata for every version of the DID, in insertion order.
    fn all_versions_metadata(&self, did: &str) -> Vec<DocumentMetadata>;

    /// Inserts a version, or overwrites the version with the same identifier.
    fn set_version(&mut self, value: DidDocumentWithMetadata);

    /// Points the DID's latest-version pointer at the given version.
    fn set_latest_version(&mut self, did: &str, version_id: &str);
}

#[derive(Clone, Debug, Default)]
struct VersionSet {
    latest: String,
    // insertion order is query order
    versions: Vec<DidDocumentWithMetadata>,
}

/// An in-memory [`DidDocStore`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryDidDocStore {
    docs: HashMap<String, VersionSet>,
}

impl InMemoryDidDocStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DidDocStore for InMemoryDidDocStore {
    fn has(&self, did: &str) -> bool {
        self.docs.contains_key(did)
    }

    fn latest_version_id(&self, did: &str) -> Option<String> {
        self.docs.get(did).map(|set| set.latest.clone())
    }

    fn get_version(&self, did: &str, version_id: &str) -> Option<DidDocumentWithMetadata> {
        let set = self.docs.get(did)?;
        set.versions.iter().find(|v| v.metadata.version_id == version_id).cloned()
    }

    fn get_latest(&self, did: &str) -> Option<DidDocumentWithMetadata> {
        let set = self.docs.get(did)?;
        set.versions.iter().find(|v| v.metadata.version_id == set.latest).cloned()
    }

    fn all_versions_metadata(&self, did: &str) -> Vec<DocumentMetadata> {
        self.docs
            .get(did)
            .map(|set| set.versions.iter().map(|v| v.metadata.clone()).collect())
            .unwrap_or_default()
    }

    fn set_version(&mut self, value: DidDocumentWithMetadata) {
        let set = self.docs.entry(value.did_doc.id.clone()).or_default();
        let id = &value.metadata.version_id;
        match set.versions.iter().position(|v| &v.metadata.version_id == id) {
            Some(pos) => set.versions[pos] = value,
            None => set.versions.push(value),
        }
    }

    fn set_latest_version(&mut self, did: &str, version_id: &str) {
        let set = self.docs.entry(did.to_string()).or_default();
        set.latest = version_id.to_string();
    }
}
