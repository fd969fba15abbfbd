//! Scalar helpers shared by the PDP and secret sharing code
//!
//! Scalars travel as big-endian integers (the same layout a big-integer
//! library would emit), so the helpers here convert between arkworks field
//! elements, `BigUint` and byte buffers.

use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

/// Number of random bytes drawn per scalar. Twice the field size keeps the
/// modular reduction bias negligible.
const WIDE_SCALAR_BYTES: usize = 64;

/// The OS entropy source failed. Never retried with a weaker source.
#[derive(Debug, thiserror::Error)]
#[error("entropy source failure: {0}")]
pub struct EntropyError(pub getrandom::Error);

/// Draw a uniformly random field element from the OS entropy source
pub fn random_scalar<F: PrimeField>() -> Result<F, EntropyError> {
    let mut wide = [0u8; WIDE_SCALAR_BYTES];
    getrandom::getrandom(&mut wide).map_err(EntropyError)?;
    Ok(F::from_le_bytes_mod_order(&wide))
}

/// Draw a uniformly random field element from a caller supplied RNG
pub fn random_scalar_from_rng<F, R>(rng: &mut R) -> F
where
    F: PrimeField,
    R: RngCore + CryptoRng,
{
    let mut wide = [0u8; WIDE_SCALAR_BYTES];
    rng.fill_bytes(&mut wide);
    F::from_le_bytes_mod_order(&wide)
}

/// Size in bytes of a fixed-width big-endian encoding of `F`
pub fn scalar_size<F: PrimeField>() -> usize {
    F::MODULUS_BIT_SIZE.div_ceil(8) as usize
}

/// Modulus of `F` as a `BigUint`
pub fn modulus<F: PrimeField>() -> BigUint {
    BigUint::from_bytes_be(&F::MODULUS.to_bytes_be())
}

/// Canonical integer value of a field element
pub fn to_biguint<F: PrimeField>(scalar: &F) -> BigUint {
    BigUint::from_bytes_be(&scalar.into_bigint().to_bytes_be())
}

/// Reduce an arbitrary integer into `F`
pub fn from_biguint<F: PrimeField>(value: &BigUint) -> F {
    F::from_be_bytes_mod_order(&value.to_bytes_be())
}

/// Fixed-width big-endian encoding (`scalar_size::<F>()` bytes)
pub fn scalar_to_bytes<F: PrimeField>(scalar: &F) -> Vec<u8> {
    let bytes = scalar.into_bigint().to_bytes_be();
    let size = scalar_size::<F>();
    // BigInt limbs may be wider than the modulus
    bytes[bytes.len() - size..].to_vec()
}

/// Big-endian encoding without leading zero bytes; zero encodes as an empty
/// buffer.
pub fn minimal_be_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    value.to_bytes_be()
}

/// Decode a big-endian scalar, rejecting values outside `[0, modulus)`
///
/// Any length is accepted as long as the value is in range, so both
/// fixed-width and minimal encodings decode.
pub fn scalar_from_bytes<F: PrimeField>(bytes: &[u8]) -> Result<F, anyhow::Error> {
    let value = BigUint::from_bytes_be(bytes);
    if value >= modulus::<F>() {
        return Err(anyhow::anyhow!(
            "scalar out of range: {} bytes encode a value not below the field modulus",
            bytes.len()
        ));
    }
    Ok(from_biguint(&value))
}

/// SHA-256 the input and reduce the digest into `F`
pub fn hash_to_scalar<F: PrimeField>(data: &[u8]) -> F {
    let digest = Sha256::digest(data);
    F::from_be_bytes_mod_order(&digest)
}

/// Fold integers together by concatenating their decimal representations,
/// reducing modulo `modulus` after each step.
///
/// `concat_decimal([a, b], m) == parse(dec(parse(dec(0) ‖ dec(a)) mod m) ‖ dec(b)) mod m`.
/// Tags deposited by other implementations depend on this exact convention.
pub fn concat_decimal(values: &[&BigUint], modulus: &BigUint) -> Result<BigUint, anyhow::Error> {
    let mut acc = BigUint::zero();
    for value in values {
        let joined = format!("{}{}", acc, value);
        let parsed = BigUint::parse_bytes(joined.as_bytes(), 10)
            .ok_or_else(|| anyhow::anyhow!("failed to parse decimal integer: {}", joined))?;
        acc = parsed % modulus;
    }
    Ok(acc)
}

/// `#[serde(with = "serde_scalar")]` helpers: fixed-width big-endian hex
/// strings
pub mod serde_scalar {
    use super::*;

    pub fn serialize<F, S>(scalar: &F, serializer: S) -> Result<S::Ok, S::Error>
    where
        F: PrimeField,
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(scalar_to_bytes(scalar)))
    }

    pub fn deserialize<'de, F, D>(deserializer: D) -> Result<F, D::Error>
    where
        F: PrimeField,
        D: serde::Deserializer<'de>,
    {
        let hex = <String as serde::Deserialize>::deserialize(deserializer)?;
        let bytes = hex::decode(hex.strip_prefix("0x").unwrap_or(&hex))
            .map_err(serde::de::Error::custom)?;
        scalar_from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}
