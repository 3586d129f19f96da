//! # Verification Methods
//!
//! A verification method binds public key material to a DID document under a
//! fragment identifier. Four method types are supported, each constraining
//! the representation its key material may take:
//!
//! | method type                  | material                          |
//! |------------------------------|-----------------------------------|
//! | `Ed25519VerificationKey2020` | multibase (raw 32 bytes)          |
//! | `Ed25519VerificationKey2018` | base58 (raw 32 bytes)             |
//! | `Bls12381G2Key2020`          | multibase (multicodec) or OKP JWK |
//! | `JsonWebKey2020`             | JWK (RSA, EC or OKP)              |

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::did::{self, Presence};
use crate::error::{Error, Result};
use crate::jwk::{CRV_BLS12381_G2, Jwk, KTY_OKP};
use crate::validation::ValidationError;

/// The type of a verification method, determining how its key material is
/// encoded and which signature algorithm applies.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum MethodType {
    /// Ed25519 public key, multibase-encoded raw bytes.
    #[default]
    Ed25519VerificationKey2020,

    /// Ed25519 public key, plain base58-encoded raw bytes.
    Ed25519VerificationKey2018,

    /// BLS12-381 G2 public key for BBS+ signatures.
    Bls12381G2Key2020,

    /// JSON Web Key carrying an RSA, EC or OKP public key.
    JsonWebKey2020,
}

impl Display for MethodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ed25519VerificationKey2020 => "Ed25519VerificationKey2020",
            Self::Ed25519VerificationKey2018 => "Ed25519VerificationKey2018",
            Self::Bls12381G2Key2020 => "Bls12381G2Key2020",
            Self::JsonWebKey2020 => "JsonWebKey2020",
        };
        write!(f, "{s}")
    }
}

/// Public key material in one of its three supported representations. The
/// enum is closed: a verification method carries exactly one representation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum VerificationMaterial {
    /// Multibase-encoded key material.
    #[serde(rename_all = "camelCase")]
    Multibase {
        /// The multibase string.
        public_key_multibase: String,
    },

    /// Plain base58-encoded key material.
    #[serde(rename_all = "camelCase")]
    Base58 {
        /// The base58 string.
        public_key_base58: String,
    },

    /// A JSON Web Key.
    #[serde(rename_all = "camelCase")]
    Jwk {
        /// The public key JWK.
        public_key_jwk: Jwk,
    },
}

impl Default for VerificationMaterial {
    fn default() -> Self {
        Self::Multibase { public_key_multibase: String::new() }
    }
}

/// A verification method within a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Identifier: a DID URL with a fragment and no path or query, prefixed
    /// by the document's DID.
    pub id: String,

    /// The method type.
    #[serde(rename = "type")]
    pub method_type: MethodType,

    /// The DID of the controller of this key.
    pub controller: String,

    /// The public key material.
    #[serde(flatten)]
    pub verification_material: VerificationMaterial,
}

impl VerificationMethod {
    /// Validates the method's identifier, controller and key material against
    /// the document's DID, the registry method name and allowed namespaces.
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

        if self.controller.is_empty() {
            err.add("controller", "cannot be blank");
        } else if let Err(msg) = did::validate_did(&self.controller, method, allowed_namespaces) {
            err.add("controller", msg);
        }

        if let Err(msg) = self.validate_material() {
            err.add("verification_material", msg);
        }

        err.finish()
    }

    fn validate_material(&self) -> std::result::Result<(), String> {
        match (self.method_type, &self.verification_material) {
            (MethodType::Ed25519VerificationKey2020, VerificationMaterial::Multibase { public_key_multibase }) => {
                let key = crypto::decode_multibase(public_key_multibase)?;
                crypto::validate_ed25519_key(&key)
            }
            (MethodType::Ed25519VerificationKey2018, VerificationMaterial::Base58 { public_key_base58 }) => {
                let key = bs58::decode(public_key_base58)
                    .into_vec()
                    .map_err(|e| format!("can't decode base58 string: {e}"))?;
                crypto::validate_ed25519_key(&key)
            }
            (MethodType::Bls12381G2Key2020, VerificationMaterial::Multibase { public_key_multibase }) => {
                let key = crypto::decode_bls12381_g2_material(public_key_multibase)?;
                crypto::validate_bls12381_g2_key(&key)
            }
            (MethodType::Bls12381G2Key2020, VerificationMaterial::Jwk { public_key_jwk }) => {
                if public_key_jwk.kty != KTY_OKP {
                    return Err(format!("jwk key type must be: {KTY_OKP}"));
                }
                if public_key_jwk.crv.as_deref() != Some(CRV_BLS12381_G2) {
                    return Err(format!("jwk crv must be: {CRV_BLS12381_G2}"));
                }
                let key = public_key_jwk.decode_param("x")?;
                crypto::validate_bls12381_g2_key(&key)
            }
            (MethodType::JsonWebKey2020, VerificationMaterial::Jwk { public_key_jwk }) => {
                crypto::validate_jwk(public_key_jwk)
            }
            (method_type, _) => {
                Err(format!("verification material does not match method type: {method_type}"))
            }
        }
    }

    /// Verifies a signature over a message using this method's key material.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] when verification fails, or
    /// [`Error::Internal`] for a type/material combination that validation
    /// should have rejected.
    pub fn verify_signature(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        match (self.method_type, &self.verification_material) {
            (MethodType::Ed25519VerificationKey2020, VerificationMaterial::Multibase { public_key_multibase }) => {
                let key =
                    crypto::decode_multibase(public_key_multibase).map_err(Error::InvalidSignature)?;
                crypto::verify_ed25519(&key, message, signature)
            }
            (MethodType::Ed25519VerificationKey2018, VerificationMaterial::Base58 { public_key_base58 }) => {
                let key = bs58::decode(public_key_base58)
                    .into_vec()
                    .map_err(|e| Error::InvalidSignature(format!("can't decode base58 string: {e}")))?;
                crypto::verify_ed25519(&key, message, signature)
            }
            (MethodType::Bls12381G2Key2020, VerificationMaterial::Multibase { public_key_multibase }) => {
                let key = crypto::decode_bls12381_g2_material(public_key_multibase)
                    .map_err(Error::InvalidSignature)?;
                crypto::verify_bbs(&key, message, signature)
            }
            (MethodType::Bls12381G2Key2020, VerificationMaterial::Jwk { public_key_jwk }) => {
                let key = public_key_jwk.decode_param("x").map_err(Error::InvalidSignature)?;
                crypto::verify_bbs(&key, message, signature)
            }
            (MethodType::JsonWebKey2020, VerificationMaterial::Jwk { public_key_jwk }) => {
                crypto::verify_jwk(public_key_jwk, message, signature)
            }
            (method_type, _) => Err(Error::Internal(format!(
                "verification material does not match method type: {method_type}"
            ))),
        }
    }

    /// Normalizes the method's identifier and controller DID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] when either does not split, which
    /// indicates validation was skipped.
    pub fn normalize(&mut self) -> Result<()> {
        self.id = did::normalize_did_url(&self.id)?;
        self.controller = did::normalize_did(&self.controller)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;
    use multibase::Base;
    use rand::rngs::OsRng;

    use super::*;

    const DID: &str = "did:example:testnet:c96d5f32-bd95-4bd3-8b1f-e284312bb4f7";

    fn namespaces() -> Vec<String> {
        vec!["testnet".to_string()]
    }

    fn ed25519_multibase() -> String {
        let key = SigningKey::generate(&mut OsRng).verifying_key();
        multibase::encode(Base::Base58Btc, key.to_bytes())
    }

    fn method() -> VerificationMethod {
        VerificationMethod {
            id: format!("{DID}#key-1"),
            method_type: MethodType::Ed25519VerificationKey2020,
            controller: DID.to_string(),
            verification_material: VerificationMaterial::Multibase {
                public_key_multibase: ed25519_multibase(),
            },
        }
    }

    #[test]
    fn valid_method_passes() {
        method().validate(DID, "example", &namespaces()).expect("should be valid");
    }

    #[test]
    fn id_requires_document_prefix() {
        let mut vm = method();
        vm.id = "did:example:testnet:7df9a6bc-bee7-4dd6-a9a9-ae6e3d5b0b3c#key-1".to_string();
        let err = vm.validate(DID, "example", &namespaces()).expect_err("wrong prefix");
        assert_eq!(err.to_string(), format!("id: must have prefix: {DID}."));
    }

    #[test]
    fn id_requires_fragment() {
        let mut vm = method();
        vm.id = DID.to_string();
        let err = vm.validate(DID, "example", &namespaces()).expect_err("missing fragment");
        assert_eq!(err.to_string(), "id: fragment is required.");
    }

    #[test]
    fn material_must_match_method_type() {
        let mut vm = method();
        vm.method_type = MethodType::JsonWebKey2020;
        let err = vm.validate(DID, "example", &namespaces()).expect_err("mismatch");
        assert_eq!(
            err.to_string(),
            "verification_material: verification material does not match method type: \
             JsonWebKey2020."
        );
    }

    #[test]
    fn ed25519_2018_uses_plain_base58() {
        let key = SigningKey::generate(&mut OsRng).verifying_key();
        let vm = VerificationMethod {
            id: format!("{DID}#key-1"),
            method_type: MethodType::Ed25519VerificationKey2018,
            controller: DID.to_string(),
            verification_material: VerificationMaterial::Base58 {
                public_key_base58: bs58::encode(key.to_bytes()).into_string(),
            },
        };
        vm.validate(DID, "example", &namespaces()).expect("should be valid");
    }

    #[test]
    fn ed25519_signature_roundtrip() {
        use ed25519_dalek::Signer as _;

        let signing_key = SigningKey::generate(&mut OsRng);
        let vm = VerificationMethod {
            id: format!("{DID}#key-1"),
            method_type: MethodType::Ed25519VerificationKey2020,
            controller: DID.to_string(),
            verification_material: VerificationMaterial::Multibase {
                public_key_multibase: multibase::encode(
                    Base::Base58Btc,
                    signing_key.verifying_key().to_bytes(),
                ),
            },
        };

        let message = b"payload bytes";
        let signature = signing_key.sign(message).to_bytes();
        vm.verify_signature(message, &signature).expect("should verify");

        let err = vm.verify_signature(b"tampered", &signature).expect_err("bad message");
        assert!(matches!(err, Error::InvalidSignature(_)));
    }

    #[test]
    fn mismatched_combination_is_internal_at_verify_time() {
        let mut vm = method();
        vm.method_type = MethodType::JsonWebKey2020;
        let err = vm.verify_signature(b"m", &[0u8; 64]).expect_err("mismatch");
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn serialization_uses_did_core_field_names() {
        let vm = VerificationMethod {
            id: format!("{DID}#key-1"),
            method_type: MethodType::Ed25519VerificationKey2020,
            controller: DID.to_string(),
            verification_material: VerificationMaterial::Multibase {
                public_key_multibase: "zKey".to_string(),
            },
        };
        let json = serde_json::to_value(&vm).expect("should serialize");
        assert_eq!(json["type"], "Ed25519VerificationKey2020");
        assert_eq!(json["publicKeyMultibase"], "zKey");

        let back: VerificationMethod = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(back, vm);
    }
}
