//! Audit keypairs: a BLS12-381 scalar and its G2 public point

use std::fmt;

use ark_bls12_381::{Fr, G2Affine};
use ark_ec::CurveGroup;
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};

use super::params::PairingParams;
use super::scalar::{random_scalar, scalar_from_bytes, scalar_to_bytes, EntropyError};

/// Size of an encoded private key (big-endian scalar) in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of a compressed G2 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 96;
/// Size of an uncompressed G2 public key in bytes
pub const PUBLIC_KEY_UNCOMPRESSED_SIZE: usize = 192;

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key decode error: {0}")]
    Decode(#[from] anyhow::Error),
    #[error(transparent)]
    Entropy(#[from] EntropyError),
}

/// Generate a fresh audit keypair
///
/// Only fails when the OS entropy source is unavailable.
pub fn generate_keypair(params: &PairingParams) -> Result<(PrivateKey, PublicKey), KeyError> {
    let private_key = PrivateKey::generate()?;
    let public_key = private_key.public(params);
    tracing::debug!("generated audit keypair");
    Ok((private_key, public_key))
}

/// Public audit key, `sk · g2`
///
/// Publishable. Anyone holding it (plus a challenge and a proof) can run the
/// pairing check, nobody can forge tags with it.
///
/// # Examples
///
/// ```ignore
/// let params = PairingParams::new();
/// let (secret_key, public_key) = generate_keypair(&params)?;
///
/// let hex = public_key.to_hex();
/// let recovered = PublicKey::from_hex(&hex)?;
/// assert_eq!(public_key, recovered);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub(crate) G2Affine);

impl From<G2Affine> for PublicKey {
    fn from(point: G2Affine) -> Self {
        PublicKey(point)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl PublicKey {
    /// Parse a public key from either the compressed or uncompressed point
    /// encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the length matches neither encoding, or if the
    /// bytes are not a point of the prime-order subgroup of G2.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let point = match bytes.len() {
            PUBLIC_KEY_SIZE => G2Affine::deserialize_compressed(bytes),
            PUBLIC_KEY_UNCOMPRESSED_SIZE => G2Affine::deserialize_uncompressed(bytes),
            len => {
                return Err(anyhow::anyhow!(
                    "invalid public key size, expected {} or {}, got {}",
                    PUBLIC_KEY_SIZE,
                    PUBLIC_KEY_UNCOMPRESSED_SIZE,
                    len
                )
                .into())
            }
        }
        .map_err(|e| anyhow::anyhow!("invalid public key point: {}", e))?;
        Ok(PublicKey(point))
    }

    /// Parse a public key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex).map_err(|_| anyhow::anyhow!("public key hex decode error"))?;
        Self::from_bytes(&bytes)
    }

    /// Compressed point encoding
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        let mut buff = [0u8; PUBLIC_KEY_SIZE];
        // writing a valid point into a correctly sized buffer cannot fail
        let _ = self.0.serialize_compressed(&mut buff[..]);
        buff
    }

    /// Uncompressed point encoding
    pub fn to_uncompressed_bytes(&self) -> Vec<u8> {
        let mut buff = Vec::with_capacity(PUBLIC_KEY_UNCOMPRESSED_SIZE);
        let _ = self.0.serialize_uncompressed(&mut buff);
        buff
    }

    /// Convert public key to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The underlying G2 point
    pub fn point(&self) -> &G2Affine {
        &self.0
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        PublicKey::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Private audit key: one non-zero scalar below the group order
///
/// Owned by the data owner. Needed to compute tags and round masks, never
/// needed by the holder or the auditor.
///
/// # Security Considerations
///
/// - Never send this key to a storage holder
/// - `Debug` output is redacted so the key cannot leak into logs
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(pub(crate) Fr);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl PrivateKey {
    /// Generate a new random private key from the OS entropy source
    pub fn generate() -> Result<Self, KeyError> {
        loop {
            let scalar: Fr = random_scalar()?;
            if !scalar.is_zero() {
                return Ok(PrivateKey(scalar));
            }
        }
    }

    /// Derive the public key `sk · g2`
    pub fn public(&self, params: &PairingParams) -> PublicKey {
        PublicKey((*params.g2() * self.0).into_affine())
    }

    /// Parse a private key from big-endian bytes
    ///
    /// Minimal encodings (fewer than `PRIVATE_KEY_SIZE` bytes) are accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty, longer than
    /// `PRIVATE_KEY_SIZE`, or encodes zero or a value not below the group
    /// order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.is_empty() || bytes.len() > PRIVATE_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid private key size, expected 1..={}, got {}",
                PRIVATE_KEY_SIZE,
                bytes.len()
            )
            .into());
        }
        let scalar: Fr = scalar_from_bytes(bytes)?;
        if scalar.is_zero() {
            return Err(anyhow::anyhow!("private key must not be zero").into());
        }
        Ok(PrivateKey(scalar))
    }

    /// Parse a private key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes =
            hex::decode(hex).map_err(|_| anyhow::anyhow!("private key hex decode error"))?;
        Self::from_bytes(&bytes)
    }

    /// Fixed-width big-endian encoding
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        let mut buff = [0u8; PRIVATE_KEY_SIZE];
        buff.copy_from_slice(&scalar_to_bytes(&self.0));
        buff
    }

    /// Convert private key to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub(crate) fn scalar(&self) -> &Fr {
        &self.0
    }
}

impl Serialize for PrivateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        PrivateKey::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}
