//! Homomorphic authentication tags
//!
//! The data owner computes one tag per stored segment before handing the
//! segments to a holder:
//!
//! ```text
//! sigma_i = sk · ( H(V ‖ i) + SHA256(m_i ‖ r_j) · U · g1 )
//! ```
//!
//! - `H(V ‖ i)`: the decimal strings of `V` and `i` concatenated, reduced
//!   modulo the group order, SHA-256'd and mapped onto G1 by scalar
//!   multiplication of `g1`
//! - `r_j`: the round mask, derived from `(round · sk) · g1` so that tags of
//!   one round cannot be replayed in another
//! - `U`: a public random scalar blinding the content point
//!
//! Because each tag is linear in `sk`, a coefficient-weighted sum of tags is
//! itself a tag over the weighted sum of the inputs. That is what lets a
//! holder answer a challenge over many segments with a single point.
//! Computation is deterministic: the same inputs always give the same tag.

use ark_bls12_381::{Fr, G1Affine, G1Projective};
use ark_ec::CurveGroup;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::keys::{KeyError, PrivateKey};
use super::params::PairingParams;
use super::scalar::{
    concat_decimal, hash_to_scalar, minimal_be_bytes, scalar_from_bytes, to_biguint,
};

/// Size of a compressed G1 point in bytes
pub const TAG_SIZE: usize = 48;

/// Errors that can occur while computing or decoding tags
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("tag error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
}

/// Authentication tag of one stored segment (a G1 point)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(pub(crate) G1Affine);

impl From<G1Affine> for Tag {
    fn from(point: G1Affine) -> Self {
        Tag(point)
    }
}

impl Tag {
    /// Parse a tag from its compressed point encoding
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TagError> {
        Ok(Tag(g1_from_bytes(bytes)?))
    }

    /// Parse a tag from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, TagError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex).map_err(|_| anyhow::anyhow!("tag hex decode error"))?;
        Self::from_bytes(&bytes)
    }

    /// Compressed point encoding
    pub fn to_bytes(&self) -> [u8; TAG_SIZE] {
        g1_to_bytes(&self.0)
    }

    /// Convert tag to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The underlying G1 point
    pub fn point(&self) -> &G1Affine {
        &self.0
    }
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        Tag::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Per-round mask `r_j`, as minimal big-endian bytes
///
/// Only the owner can derive it (it needs the private key); the owner hands it
/// to the holder together with the round's challenge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundMask(pub(crate) Vec<u8>);

impl From<Vec<u8>> for RoundMask {
    fn from(bytes: Vec<u8>) -> Self {
        RoundMask(bytes)
    }
}

impl RoundMask {
    /// Get a reference to the raw mask bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert mask to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a mask from a hexadecimal string
    pub fn from_hex(hex: &str) -> Result<Self, TagError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex).map_err(|_| anyhow::anyhow!("round mask hex decode error"))?;
        Ok(RoundMask(bytes))
    }
}

impl Serialize for RoundMask {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RoundMask {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        RoundMask::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Inputs needed to tag one segment
#[derive(Debug, Clone)]
pub struct TagParams<'a> {
    /// Segment content
    pub content: &'a [u8],
    /// Segment index within the file
    pub index: u64,
    /// Round-independent random `V`, fixed per file
    pub random_v: Fr,
    /// Public random `U`
    pub random_u: Fr,
    /// Owner's private key
    pub private_key: PrivateKey,
    /// Challenge round the tag is bound to
    pub round: u64,
}

impl<'a> TagParams<'a> {
    /// Build tag parameters from big-endian byte buffers
    ///
    /// # Errors
    ///
    /// Returns an error if any scalar is out of range, the index does not
    /// fit in 64 bits, or the private key is invalid.
    pub fn from_bytes(
        content: &'a [u8],
        index: &[u8],
        random_v: &[u8],
        random_u: &[u8],
        private_key: &[u8],
        round: u64,
    ) -> Result<Self, TagError> {
        Ok(Self {
            content,
            index: index_from_bytes(index)?,
            random_v: scalar_from_bytes(random_v)?,
            random_u: scalar_from_bytes(random_u)?,
            private_key: PrivateKey::from_bytes(private_key)?,
            round,
        })
    }
}

/// Compute the authentication tag of one segment
pub fn compute_tag(params: &PairingParams, tag_params: &TagParams<'_>) -> Result<Tag, TagError> {
    let sk = tag_params.private_key.scalar();

    // 1. H(V ‖ i)
    let hvi = hash_index_to_g1(params, &tag_params.random_v, tag_params.index)?;

    // 2. SHA256(m_i ‖ r_j) · g1 · U
    let mask = round_mask(params, tag_params.round, &tag_params.private_key);
    let blinded = content_point(params, tag_params.content, &mask) * tag_params.random_u;

    // 3. sk · (H(V ‖ i) + SHA256(m_i ‖ r_j) · U · g1)
    let sigma = (hvi + blinded) * *sk;

    tracing::trace!(
        index = tag_params.index,
        round = tag_params.round,
        "computed segment tag"
    );
    Ok(Tag(sigma.into_affine()))
}

/// Derive the mask `r_j` for a challenge round
///
/// `r_j = SHA256(dec(P.x) ‖ dec(P.y)) mod order` where `P = (round · sk) · g1`.
pub fn round_mask(params: &PairingParams, round: u64, private_key: &PrivateKey) -> RoundMask {
    let exponent = Fr::from(round) * private_key.scalar();
    let point = (*params.g1() * exponent).into_affine();

    // the identity is encoded with zero coordinates
    let (x, y) = if point.infinity {
        (BigUint::zero(), BigUint::zero())
    } else {
        (to_biguint(&point.x), to_biguint(&point.y))
    };
    let xy = format!("{}{}", x, y);
    let digest = BigUint::from_bytes_be(&Sha256::digest(xy.as_bytes()));
    RoundMask(minimal_be_bytes(&(digest % params.order())))
}

/// `H(V ‖ i)`: decimal concatenation of `V` and the index, reduced, hashed
/// and mapped onto G1.
pub(crate) fn hash_index_to_g1(
    params: &PairingParams,
    random_v: &Fr,
    index: u64,
) -> Result<G1Projective, TagError> {
    let v = to_biguint(random_v);
    let i = BigUint::from(index);
    let vi = concat_decimal(&[&v, &i], params.order())?;
    let scalar: Fr = hash_to_scalar(&minimal_be_bytes(&vi));
    Ok(*params.g1() * scalar)
}

/// `SHA256(m_i ‖ r_j) · g1`, the content point before blinding by `U`
pub(crate) fn content_point(params: &PairingParams, content: &[u8], mask: &RoundMask) -> G1Projective {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher.update(mask.bytes());
    let scalar = Fr::from_be_bytes_mod_order(&hasher.finalize());
    *params.g1() * scalar
}

/// Decode a big-endian segment index
pub(crate) fn index_from_bytes(bytes: &[u8]) -> Result<u64, anyhow::Error> {
    let value = BigUint::from_bytes_be(bytes);
    let digits = value.to_u64_digits();
    match digits.as_slice() {
        [] => Ok(0),
        [index] => Ok(*index),
        _ => Err(anyhow::anyhow!(
            "segment index out of range: {} does not fit in 64 bits",
            value
        )),
    }
}

/// Minimal big-endian encoding of a segment index
pub(crate) fn index_to_bytes(index: u64) -> Vec<u8> {
    minimal_be_bytes(&BigUint::from(index))
}

pub(crate) fn g1_to_bytes(point: &G1Affine) -> [u8; TAG_SIZE] {
    let mut buff = [0u8; TAG_SIZE];
    // writing a valid point into a correctly sized buffer cannot fail
    let _ = point.serialize_compressed(&mut buff[..]);
    buff
}

pub(crate) fn g1_from_bytes(bytes: &[u8]) -> Result<G1Affine, anyhow::Error> {
    if bytes.len() != TAG_SIZE {
        return Err(anyhow::anyhow!(
            "invalid G1 point size, expected {}, got {}",
            TAG_SIZE,
            bytes.len()
        ));
    }
    G1Affine::deserialize_compressed(bytes)
        .map_err(|e| anyhow::anyhow!("invalid G1 point: {}", e))
}

/// `#[serde(with = "serde_g1")]` helpers: compressed points as hex strings
pub(crate) mod serde_g1 {
    use super::*;

    pub fn serialize<S>(point: &G1Affine, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(g1_to_bytes(point)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<G1Affine, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        let bytes = hex::decode(hex.strip_prefix("0x").unwrap_or(&hex))
            .map_err(serde::de::Error::custom)?;
        g1_from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}
