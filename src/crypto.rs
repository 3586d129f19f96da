//! # Key Material and Signature Verification
//!
//! Decoding and validation of public key material, and signature verification
//! for the supported algorithms:
//!
//! - Ed25519 (raw 32-byte keys, multibase or base58 encoded)
//! - BLS12-381 G2 / BBS+ (multicodec-prefixed multibase or OKP JWK)
//! - RSASSA-PSS over SHA-256 (RSA JWK)
//! - ECDSA over SHA-256 with ASN.1/DER signatures (EC JWK, P-256 and
//!   secp256k1)
//!
//! Validation functions return plain messages for aggregation into field
//! errors; verification functions return [`Error::InvalidSignature`] on
//! failure and [`Error::Internal`] for type/material combinations that prior
//! validation should have rejected.

use ed25519_dalek::{Signature as Ed25519Signature, Verifier as _, VerifyingKey};
use p256::ecdsa::signature::Verifier as _;
use rsa::pss::Pss;
use rsa::{BigUint, RsaPublicKey};
use sha2::{Digest as _, Sha256};
use zkryptium::bbsplus::ciphersuites::Bls12381Sha256;
use zkryptium::bbsplus::keys::BBSplusPublicKey;
use zkryptium::schemes::algorithms::BBSplus;
use zkryptium::schemes::generics::Signature as BbsSignature;

use crate::error::{Error, Result};
use crate::jwk::{CRV_BLS12381_G2, CRV_ED25519, Jwk, KTY_EC, KTY_OKP, KTY_RSA};

/// Multicodec code for BLS12-381 G2 public keys.
pub const BLS12381_G2_CODEC: u64 = 0xeb;

const ED25519_KEY_LEN: usize = 32;
const BBS_SIGNATURE_LEN: usize = 80;

/// Validates a raw Ed25519 public key by decoding the compressed point.
///
/// # Errors
///
/// Returns a message when the key is not 32 bytes or does not decode to a
/// curve point.
pub fn validate_ed25519_key(key: &[u8]) -> std::result::Result<(), String> {
    let key: &[u8; ED25519_KEY_LEN] =
        key.try_into().map_err(|_| format!("ed25519: bad public key length: {}", key.len()))?;
    VerifyingKey::from_bytes(key)
        .map(|_| ())
        .map_err(|e| format!("ed25519: invalid public key: {e}"))
}

/// Validates a raw BLS12-381 G2 public key by decoding the compressed point.
///
/// # Errors
///
/// Returns a message when the bytes are not a valid G2 point.
pub fn validate_bls12381_g2_key(key: &[u8]) -> std::result::Result<(), String> {
    BBSplusPublicKey::from_bytes(key)
        .map(|_| ())
        .map_err(|e| format!("invalid bls12381 g2 public key: {e}"))
}

/// Decodes a multibase string into raw bytes.
///
/// # Errors
///
/// Returns a message when the string is not valid multibase.
pub fn decode_multibase(material: &str) -> std::result::Result<Vec<u8>, String> {
    multibase::decode(material)
        .map(|(_, bytes)| bytes)
        .map_err(|e| format!("can't decode multibase string: {e}"))
}

/// Decodes multibase-wrapped, multicodec-prefixed BLS12-381 G2 key material,
/// returning the raw key bytes with the codec prefix stripped.
///
/// # Errors
///
/// Returns a message when the string is not valid multibase or the codec
/// prefix is not `0xeb`.
pub fn decode_bls12381_g2_material(material: &str) -> std::result::Result<Vec<u8>, String> {
    let bytes = decode_multibase(material)?;
    let (code, key) = unsigned_varint::decode::u64(&bytes)
        .map_err(|e| format!("can't decode multicodec prefix: {e}"))?;
    if code != BLS12381_G2_CODEC {
        return Err(format!("invalid multicodec prefix: {code:#x}"));
    }
    Ok(key.to_vec())
}

/// Verifies an Ed25519 signature over a message.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] when the key, signature or message do
/// not verify.
pub fn verify_ed25519(key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    let key: &[u8; ED25519_KEY_LEN] = key
        .try_into()
        .map_err(|_| Error::InvalidSignature(format!("ed25519: bad public key length: {}", key.len())))?;
    let verifying_key = VerifyingKey::from_bytes(key)
        .map_err(|e| Error::InvalidSignature(format!("ed25519: {e}")))?;
    let signature = Ed25519Signature::from_slice(signature)
        .map_err(|e| Error::InvalidSignature(format!("ed25519: {e}")))?;

    verifying_key
        .verify(message, &signature)
        .map_err(|e| Error::InvalidSignature(format!("ed25519: {e}")))
}

/// Verifies a BBS+ signature over a single-message list using the
/// BLS12-381-SHA-256 ciphersuite with no header.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] when the key, signature or message do
/// not verify.
pub fn verify_bbs(key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    let public_key = BBSplusPublicKey::from_bytes(key)
        .map_err(|e| Error::InvalidSignature(format!("bbs: {e}")))?;
    let signature: &[u8; BBS_SIGNATURE_LEN] = signature
        .try_into()
        .map_err(|_| Error::InvalidSignature(format!("bbs: bad signature length: {}", signature.len())))?;
    let signature = BbsSignature::<BBSplus<Bls12381Sha256>>::from_bytes(signature)
        .map_err(|e| Error::InvalidSignature(format!("bbs: {e}")))?;

    signature
        .verify(&public_key, Some(&[message.to_vec()]), None)
        .map_err(|e| Error::InvalidSignature(format!("bbs: {e}")))
}

/// Verifies an RSASSA-PSS signature over the SHA-256 digest of a message.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] when the key, signature or message do
/// not verify.
pub fn verify_rsa_pss(jwk: &Jwk, message: &[u8], signature: &[u8]) -> Result<()> {
    let n = jwk.decode_param("n").map_err(Error::InvalidSignature)?;
    let e = jwk.decode_param("e").map_err(Error::InvalidSignature)?;
    let key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
        .map_err(|e| Error::InvalidSignature(format!("rsa: {e}")))?;

    let digest = Sha256::digest(message);
    key.verify(Pss::new::<Sha256>(), &digest, signature)
        .map_err(|e| Error::InvalidSignature(format!("rsa: {e}")))
}

/// Verifies an ECDSA signature (ASN.1/DER encoded) over the SHA-256 digest of
/// a message. P-256 and secp256k1 curves are supported.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] when the key, signature or message do
/// not verify, or [`Error::Internal`] for a curve that validation should have
/// rejected.
pub fn verify_ecdsa(jwk: &Jwk, message: &[u8], signature: &[u8]) -> Result<()> {
    let x = jwk.decode_param("x").map_err(Error::InvalidSignature)?;
    let y = jwk.decode_param("y").map_err(Error::InvalidSignature)?;

    match jwk.crv.as_deref().unwrap_or_default() {
        "P-256" => {
            if x.len() != 32 || y.len() != 32 {
                return Err(Error::InvalidSignature("ecdsa: bad coordinate length".to_string()));
            }
            let point = p256::EncodedPoint::from_affine_coordinates(
                p256::FieldBytes::from_slice(&x),
                p256::FieldBytes::from_slice(&y),
                false,
            );
            let key = p256::ecdsa::VerifyingKey::from_encoded_point(&point)
                .map_err(|e| Error::InvalidSignature(format!("ecdsa: {e}")))?;
            let signature = p256::ecdsa::Signature::from_der(signature)
                .map_err(|e| Error::InvalidSignature(format!("ecdsa: {e}")))?;
            key.verify(message, &signature)
                .map_err(|e| Error::InvalidSignature(format!("ecdsa: {e}")))
        }
        "secp256k1" => {
            if x.len() != 32 || y.len() != 32 {
                return Err(Error::InvalidSignature("ecdsa: bad coordinate length".to_string()));
            }
            let point = k256::EncodedPoint::from_affine_coordinates(
                k256::FieldBytes::from_slice(&x),
                k256::FieldBytes::from_slice(&y),
                false,
            );
            let key = k256::ecdsa::VerifyingKey::from_encoded_point(&point)
                .map_err(|e| Error::InvalidSignature(format!("ecdsa: {e}")))?;
            let signature = k256::ecdsa::Signature::from_der(signature)
                .map_err(|e| Error::InvalidSignature(format!("ecdsa: {e}")))?;
            key.verify(message, &signature)
                .map_err(|e| Error::InvalidSignature(format!("ecdsa: {e}")))
        }
        crv => Err(Error::Internal(format!("unsupported jwk elliptic curve: {crv}"))),
    }
}

/// Validates a JWK structurally: required parameters present and decodable,
/// and OKP keys on a supported curve with a valid public key.
///
/// # Errors
///
/// Returns a message describing the first failing rule.
pub fn validate_jwk(jwk: &Jwk) -> std::result::Result<(), String> {
    match jwk.kty.as_str() {
        KTY_RSA => {
            jwk.decode_param("n")?;
            jwk.decode_param("e")?;
            Ok(())
        }
        KTY_EC => {
            if jwk.crv.as_deref().unwrap_or_default().is_empty() {
                return Err("can't parse jwk: crv is missing".to_string());
            }
            jwk.decode_param("x")?;
            jwk.decode_param("y")?;
            Ok(())
        }
        KTY_OKP => {
            let x = jwk.decode_param("x")?;
            match jwk.crv.as_deref().unwrap_or_default() {
                CRV_ED25519 => validate_ed25519_key(&x),
                CRV_BLS12381_G2 => validate_bls12381_g2_key(&x),
                crv => Err(format!("can't parse jwk: unsupported okp curve: {crv}")),
            }
        }
        kty => Err(format!("can't parse jwk: unsupported key type: {kty}")),
    }
}

/// Verifies a signature using the algorithm implied by a JWK.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] when verification fails, or
/// [`Error::Internal`] for a key type that validation should have rejected.
pub fn verify_jwk(jwk: &Jwk, message: &[u8], signature: &[u8]) -> Result<()> {
    match jwk.kty.as_str() {
        KTY_RSA => verify_rsa_pss(jwk, message, signature),
        KTY_EC => verify_ecdsa(jwk, message, signature),
        KTY_OKP => {
            let x = jwk.decode_param("x").map_err(Error::InvalidSignature)?;
            match jwk.crv.as_deref().unwrap_or_default() {
                CRV_ED25519 => verify_ed25519(&x, message, signature),
                CRV_BLS12381_G2 => verify_bbs(&x, message, signature),
                crv => Err(Error::Internal(format!("unsupported jwk okp curve: {crv}"))),
            }
        }
        kty => Err(Error::Internal(format!("unsupported jwk key type: {kty}"))),
    }
}
