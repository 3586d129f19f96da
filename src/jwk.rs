//! # JSON Web Key
//!
//! A minimal JWK representation covering the key types carried in
//! `JsonWebKey2020` and `Bls12381G2Key2020` verification material: RSA, EC
//! and OKP keys. Binary parameters are base64url-encoded without padding.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};

/// RSA key type.
pub const KTY_RSA: &str = "RSA";

/// Elliptic curve key type.
pub const KTY_EC: &str = "EC";

/// Octet key pair key type.
pub const KTY_OKP: &str = "OKP";

/// Ed25519 curve (OKP).
pub const CRV_ED25519: &str = "Ed25519";

/// BLS12-381 G2 curve (OKP).
pub const CRV_BLS12381_G2: &str = "Bls12381G2";

/// JSON Web Key as defined in RFC 7517, limited to public key parameters.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Jwk {
    /// Key type, e.g. "RSA", "EC" or "OKP".
    pub kty: String,

    /// Cryptographic curve for EC and OKP keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// X coordinate (EC) or public key bytes (OKP).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// Y coordinate for EC keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    /// Modulus for RSA keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// Exponent for RSA keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl Jwk {
    /// Decodes the named base64url parameter.
    ///
    /// # Errors
    ///
    /// Returns a message when the parameter is absent or not valid base64url.
    pub fn decode_param(&self, name: &str) -> Result<Vec<u8>, String> {
        let value = match name {
            "x" => &self.x,
            "y" => &self.y,
            "n" => &self.n,
            "e" => &self.e,
            _ => &None,
        };
        let value = value.as_ref().ok_or_else(|| format!("can't parse jwk: {name} is missing"))?;
        Base64UrlUnpadded::decode_vec(value)
            .map_err(|e| format!("can't parse jwk: can't decode {name}: {e}"))
    }

    /// Encodes bytes as a base64url parameter value.
    #[must_use]
    pub fn encode_param(bytes: &[u8]) -> String {
        Base64UrlUnpadded::encode_string(bytes)
    }
}
