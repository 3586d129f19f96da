//! # DID Syntax
//!
//! Parsing, validation and normalization for DIDs of the form
//! `did:<method>:[<namespace>:]<id>` and for DID URLs which extend a DID with
//! an optional path, query and fragment.
//!
//! The unique identifier portion of a DID is either a base58btc string
//! decoding to exactly 16 bytes or a UUID. Normalization lowercases UUID-style
//! identifiers and leaves base58 identifiers untouched (base58 is
//! case-sensitive).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static SPLIT_DID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^did:([^:]+?)(?::([^:]+?))?:([^:]+)$").expect("regex compiles")
});

static SPLIT_DID_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(did:[^/?#]+)(/[^?#]*)?(?:\?([^#]*))?(?:#(.*))?$").expect("regex compiles")
});

static PATH_ABEMPTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:/(?:%[0-9A-Fa-f]{2}|[a-zA-Z0-9\-._~!$&'()*+,;=:@])*)*$")
        .expect("regex compiles")
});

static QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:%[0-9A-Fa-f]{2}|[a-zA-Z0-9\-._~!$&'()*+,;=:@/?])*$").expect("regex compiles")
});

static FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:%[0-9A-Fa-f]{2}|[a-zA-Z0-9\-._~!$&'()*+,;=:@/?])*$").expect("regex compiles")
});

/// Presence rule for a DID URL component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// The component must be present and non-empty.
    Required,

    /// The component must be absent.
    Empty,

    /// The component may or may not be present.
    Optional,
}

impl Presence {
    fn check(self, name: &str, value: &str) -> std::result::Result<(), String> {
        match self {
            Self::Required if value.is_empty() => Err(format!("{name} is required")),
            Self::Empty if !value.is_empty() => Err(format!("{name} must be empty")),
            _ => Ok(()),
        }
    }
}

/// Splits a DID into its method, optional namespace and unique identifier.
///
/// # Errors
///
/// Returns a message when the value does not match DID syntax.
pub fn split_did(did: &str) -> std::result::Result<(String, Option<String>, String), String> {
    let captures = SPLIT_DID
        .captures(did)
        .ok_or_else(|| "unable to split did into method, namespace and id".to_string())?;

    let method = captures[1].to_string();
    let namespace = captures.get(2).map(|m| m.as_str().to_string());
    let id = captures[3].to_string();

    Ok((method, namespace, id))
}

/// Reassembles a DID from its parts.
#[must_use]
pub fn join_did(method: &str, namespace: Option<&str>, id: &str) -> String {
    match namespace {
        Some(ns) => format!("did:{method}:{ns}:{id}"),
        None => format!("did:{method}:{id}"),
    }
}

/// Splits a DID URL into its DID, path, query and fragment.
///
/// The path retains its leading `/`; the query and fragment are returned
/// without their `?` and `#` markers.
///
/// # Errors
///
/// Returns a message when the value does not match DID URL syntax.
pub fn split_did_url(
    did_url: &str,
) -> std::result::Result<(String, String, String, String), String> {
    let captures = SPLIT_DID_URL
        .captures(did_url)
        .ok_or_else(|| "unable to split did url into did, path, query and fragment".to_string())?;

    let did = captures[1].to_string();
    let path = captures.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
    let query = captures.get(3).map(|m| m.as_str().to_string()).unwrap_or_default();
    let fragment = captures.get(4).map(|m| m.as_str().to_string()).unwrap_or_default();

    Ok((did, path, query, fragment))
}

/// Reassembles a DID URL from its parts. The inverse of [`split_did_url`].
#[must_use]
pub fn join_did_url(did: &str, path: &str, query: &str, fragment: &str) -> String {
    let mut did_url = format!("{did}{path}");
    if !query.is_empty() {
        did_url = format!("{did_url}?{query}");
    }
    if !fragment.is_empty() {
        did_url = format!("{did_url}#{fragment}");
    }
    did_url
}

/// Validates a DID's unique identifier: either a base58btc string decoding to
/// exactly 16 bytes or a UUID.
///
/// # Errors
///
/// Returns a message when the identifier is neither form.
pub fn validate_id(id: &str) -> std::result::Result<(), String> {
    let is_base58_16_bytes = bs58::decode(id).into_vec().is_ok_and(|bytes| bytes.len() == 16);

    if is_base58_16_bytes || is_valid_uuid(id) {
        Ok(())
    } else {
        Err("unique id must be one of: 16 bytes of decoded base58 string or UUID".to_string())
    }
}

/// Validates a DID against the expected method and the set of allowed
/// namespaces. An empty `method` or empty namespace list disables the
/// respective check.
///
/// # Errors
///
/// Returns a message describing the first failing rule.
pub fn validate_did(
    did: &str, method: &str, allowed_namespaces: &[String],
) -> std::result::Result<(), String> {
    let (did_method, namespace, id) = split_did(did)?;

    if !method.is_empty() && did_method != method {
        return Err(format!("did method must be: {method}"));
    }

    let namespace = namespace.unwrap_or_default();
    if !allowed_namespaces.is_empty() && !allowed_namespaces.contains(&namespace) {
        return Err(format!("did namespace must be one of: {}", allowed_namespaces.join(", ")));
    }

    validate_id(&id)
}

/// Validates a DID URL: the DID portion against method and namespaces, and
/// the path, query and fragment against their RFC 3986 character sets.
///
/// # Errors
///
/// Returns a message describing the first failing rule.
pub fn validate_did_url(
    did_url: &str, method: &str, allowed_namespaces: &[String],
) -> std::result::Result<(), String> {
    let (did, path, query, fragment) = split_did_url(did_url)?;

    validate_did(&did, method, allowed_namespaces)?;

    if !PATH_ABEMPTY.is_match(&path) {
        return Err(format!(
            "did url path abempty must match the following regexp: {}",
            PATH_ABEMPTY.as_str()
        ));
    }
    if !QUERY.is_match(&query) {
        return Err(format!("did url query must match the following regexp: {}", QUERY.as_str()));
    }
    if !FRAGMENT.is_match(&fragment) {
        return Err(format!(
            "did url fragment must match the following regexp: {}",
            FRAGMENT.as_str()
        ));
    }

    Ok(())
}

/// Validates a DID URL and applies presence rules to its path, query and
/// fragment. Verification method and service identifiers use this to demand,
/// for example, a fragment with no path or query.
///
/// # Errors
///
/// Returns a message describing the first failing rule.
pub fn validate_specific_did_url(
    did_url: &str, method: &str, allowed_namespaces: &[String], path: Presence, query: Presence,
    fragment: Presence,
) -> std::result::Result<(), String> {
    validate_did_url(did_url, method, allowed_namespaces)?;

    let (_, url_path, url_query, url_fragment) = split_did_url(did_url)?;
    path.check("path", &url_path)?;
    query.check("query", &url_query)?;
    fragment.check("fragment", &url_fragment)?;

    Ok(())
}

/// Validates that a value is a well-formed URI.
///
/// # Errors
///
/// Returns a message when the value cannot be parsed as a URI.
pub fn validate_uri(uri: &str) -> std::result::Result<(), String> {
    url::Url::parse(uri).map(|_| ()).map_err(|_| "must be a valid URI".to_string())
}

/// True when the value parses as a UUID in any of its accepted encodings.
#[must_use]
pub fn is_valid_uuid(value: &str) -> bool {
    uuid::Uuid::try_parse(value).is_ok()
}

/// Lowercases UUID-style identifiers; other values pass through unchanged.
#[must_use]
pub fn normalize_uuid(id: &str) -> String {
    if is_valid_uuid(id) { id.to_lowercase() } else { id.to_string() }
}

/// Normalizes a previously validated DID by lowercasing a UUID-style unique
/// identifier.
///
/// # Errors
///
/// Returns [`Error::Internal`] when the DID does not split, which indicates
/// validation was skipped.
pub fn normalize_did(did: &str) -> Result<String> {
    let (method, namespace, id) = must_split_did(did)?;
    Ok(join_did(&method, namespace.as_deref(), &normalize_uuid(&id)))
}

/// Normalizes the DID portion of a previously validated DID URL.
///
/// # Errors
///
/// Returns [`Error::Internal`] when the DID URL does not split, which
/// indicates validation was skipped.
pub fn normalize_did_url(did_url: &str) -> Result<String> {
    let (did, path, query, fragment) = must_split_did_url(did_url)?;
    Ok(join_did_url(&normalize_did(&did)?, &path, &query, &fragment))
}

/// Normalizes each DID in a list. See [`normalize_did`].
///
/// # Errors
///
/// Returns [`Error::Internal`] when any entry does not split.
pub fn normalize_did_list(dids: &[String]) -> Result<Vec<String>> {
    dids.iter().map(|did| normalize_did(did)).collect()
}

/// Splits a DID that prior validation guarantees to be well-formed.
///
/// # Errors
///
/// Returns [`Error::Internal`] when the guarantee does not hold.
pub fn must_split_did(did: &str) -> Result<(String, Option<String>, String)> {
    split_did(did).map_err(|e| Error::Internal(format!("{e}: {did}")))
}

/// Splits a DID URL that prior validation guarantees to be well-formed.
///
/// # Errors
///
/// Returns [`Error::Internal`] when the guarantee does not hold.
pub fn must_split_did_url(did_url: &str) -> Result<(String, String, String, String)> {
    split_did_url(did_url).map_err(|e| Error::Internal(format!("{e}: {did_url}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base58_id() -> String {
        bs58::encode([
            0x8b, 0x5c, 0x12, 0xe1, 0x70, 0x43, 0x9a, 0x2f, 0xd4, 0x06, 0xbb, 0x91, 0x38, 0xaf,
            0x5d, 0x77,
        ])
        .into_string()
    }

    #[test]
    fn split_and_join_roundtrip() {
        let did = format!("did:example:testnet:{}", base58_id());
        let (method, namespace, id) = split_did(&did).expect("should split");
        assert_eq!(method, "example");
        assert_eq!(namespace.as_deref(), Some("testnet"));
        assert_eq!(join_did(&method, namespace.as_deref(), &id), did);

        let (method, namespace, id) =
            split_did("did:example:c96d5f32-bd95-4bd3-8b1f-e284312bb4f7").expect("should split");
        assert_eq!(method, "example");
        assert_eq!(namespace, None);
        assert_eq!(
            join_did(&method, None, &id),
            "did:example:c96d5f32-bd95-4bd3-8b1f-e284312bb4f7"
        );
    }

    #[test]
    fn split_rejects_malformed_dids() {
        for did in ["", "did:", "did:example", "not-a-did", "did:example:a:b:c", "did::id"] {
            let err = split_did(did).expect_err("should not split");
            assert_eq!(err, "unable to split did into method, namespace and id");
        }
    }

    #[test]
    fn validate_did_checks_method_namespace_and_id() {
        let namespaces = vec!["testnet".to_string()];
        let did = format!("did:example:testnet:{}", base58_id());

        validate_did(&did, "example", &namespaces).expect("should be valid");

        let err = validate_did(&did, "other", &namespaces).expect_err("wrong method");
        assert_eq!(err, "did method must be: other");

        let did = format!("did:example:mainnet:{}", base58_id());
        let err = validate_did(&did, "example", &namespaces).expect_err("wrong namespace");
        assert_eq!(err, "did namespace must be one of: testnet");

        let err = validate_did("did:example:testnet:shortid", "example", &namespaces)
            .expect_err("bad id");
        assert_eq!(err, "unique id must be one of: 16 bytes of decoded base58 string or UUID");
    }

    #[test]
    fn empty_rules_disable_checks() {
        let did = format!("did:anything:anyns:{}", base58_id());
        validate_did(&did, "", &[]).expect("method and namespace unchecked");
    }

    #[test]
    fn uuid_ids_are_accepted() {
        validate_id("c96d5f32-bd95-4bd3-8b1f-e284312bb4f7").expect("lowercase uuid");
        validate_id("C96D5F32-BD95-4BD3-8B1F-E284312BB4F7").expect("uppercase uuid");
        validate_id("not-an-id").expect_err("should be rejected");
    }

    #[test]
    fn did_url_split_and_join() {
        let did_url = "did:example:testnet:c96d5f32-bd95-4bd3-8b1f-e284312bb4f7/path?query#key-1";
        let (did, path, query, fragment) = split_did_url(did_url).expect("should split");
        assert_eq!(did, "did:example:testnet:c96d5f32-bd95-4bd3-8b1f-e284312bb4f7");
        assert_eq!(path, "/path");
        assert_eq!(query, "query");
        assert_eq!(fragment, "key-1");
        assert_eq!(join_did_url(&did, &path, &query, &fragment), did_url);

        let (did, path, query, fragment) =
            split_did_url("did:example:abc#key-1").expect("should split");
        assert_eq!((path.as_str(), query.as_str(), fragment.as_str()), ("", "", "key-1"));
        assert_eq!(join_did_url(&did, &path, &query, &fragment), "did:example:abc#key-1");
    }

    #[test]
    fn specific_did_url_presence_rules() {
        let namespaces = vec!["testnet".to_string()];
        let key_id = format!("did:example:testnet:{}#key-1", base58_id());

        validate_specific_did_url(
            &key_id, "example", &namespaces, Presence::Empty, Presence::Empty, Presence::Required,
        )
        .expect("fragment-only did url");

        let did = format!("did:example:testnet:{}", base58_id());
        let err = validate_specific_did_url(
            &did, "example", &namespaces, Presence::Empty, Presence::Empty, Presence::Required,
        )
        .expect_err("missing fragment");
        assert_eq!(err, "fragment is required");

        let with_path = format!("did:example:testnet:{}/path#key-1", base58_id());
        let err = validate_specific_did_url(
            &with_path, "example", &namespaces, Presence::Empty, Presence::Empty,
            Presence::Required,
        )
        .expect_err("path not allowed");
        assert_eq!(err, "path must be empty");
    }

    #[test]
    fn normalization_lowercases_uuids_only() {
        let did = "did:example:testnet:C96D5F32-BD95-4BD3-8B1F-E284312BB4F7";
        let normalized = normalize_did(did).expect("should normalize");
        assert_eq!(normalized, "did:example:testnet:c96d5f32-bd95-4bd3-8b1f-e284312bb4f7");
        assert_eq!(normalize_did(&normalized).expect("idempotent"), normalized);

        let did = format!("did:example:testnet:{}", base58_id());
        assert_eq!(normalize_did(&did).expect("should normalize"), did);

        let did_url = "did:example:C96D5F32-BD95-4BD3-8B1F-E284312BB4F7/path#key-1";
        assert_eq!(
            normalize_did_url(did_url).expect("should normalize"),
            "did:example:c96d5f32-bd95-4bd3-8b1f-e284312bb4f7/path#key-1"
        );
    }

    #[test]
    fn must_split_flags_internal_misuse() {
        let err = must_split_did("not-a-did").expect_err("should fail");
        assert!(matches!(err, crate::Error::Internal(_)));
    }
}
