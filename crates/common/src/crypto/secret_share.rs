//! Verifiable (Feldman) secret sharing
//!
//! A secret below the scalar field modulus is split into `total` shares of
//! which any `threshold` recover it:
//!
//! 1. **Split**: hide the secret as the constant term of a random polynomial
//!    of degree `threshold - 1` and evaluate it at `x = 1..=total`.
//! 2. **Commit** (optional): publish `C_j = coefficient_j · G`. Anyone can
//!    then check a share without learning anything about the secret.
//! 3. **Reconstruct**: Lagrange-interpolate the shares at `x = 0`.
//!
//! # Security Properties
//!
//! - Fewer than `threshold` shares reveal nothing about the secret
//! - Reconstruction does not check the threshold: too few shares silently
//!   yield an unrelated value. Check shares against the commitments and count
//!   them before trusting the result.
//! - The secret is treated as a big-endian integer, so leading zero bytes
//!   are not preserved
//!
//! # Examples
//!
//! ```ignore
//! let (shares, commitments) =
//!     split_with_commitments::<G1Projective>(b"top secret", 5, 3)?;
//!
//! for (index, value) in shares.iter() {
//!     assert!(commitments.verify_share(index, value));
//! }
//!
//! let subset = shares.subset(&[1, 3, 5])?;
//! assert_eq!(reconstruct(&subset)?, b"top secret");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{Field, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};

use super::polynomial::Polynomial;
use super::scalar::{minimal_be_bytes, scalar_from_bytes, scalar_to_bytes, serde_scalar, to_biguint, EntropyError};

/// Errors that can occur while splitting or reconstructing a secret
#[derive(Debug, thiserror::Error)]
pub enum SecretShareError {
    #[error("share error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("invalid total share number: need at least 2 shares, got {0}")]
    InvalidTotalShareNumber(usize),
    #[error("invalid share number: threshold {threshold} must be between 1 and {total}")]
    InvalidShareNumber { threshold: usize, total: usize },
    #[error("secret is not below the scalar field modulus")]
    SecretOutOfRange,
    #[error("invalid share: {0}")]
    InvalidShare(String),
    #[error(transparent)]
    Entropy(#[from] EntropyError),
}

/// One participant's share: the polynomial evaluated at `index`
///
/// Renders as `index:hex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "F: PrimeField")]
pub struct Share<F: PrimeField> {
    pub index: u64,
    #[serde(with = "serde_scalar")]
    pub value: F,
}

impl<F: PrimeField> fmt::Display for Share<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, hex::encode(scalar_to_bytes(&self.value)))
    }
}

impl<F: PrimeField> FromStr for Share<F> {
    type Err = SecretShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (index, value) = s
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("expected <index>:<hex>, got {}", s))?;
        let index = index
            .trim()
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("invalid share index {}: {}", index, e))?;
        let value = value.trim();
        let bytes = hex::decode(value.strip_prefix("0x").unwrap_or(value))
            .map_err(|_| anyhow::anyhow!("share hex decode error"))?;
        Ok(Share {
            index,
            value: scalar_from_bytes(&bytes)?,
        })
    }
}

/// A set of shares keyed by index
///
/// Indices are unique and non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    bound = "F: PrimeField",
    into = "Vec<Share<F>>",
    try_from = "Vec<Share<F>>"
)]
pub struct ShareSet<F: PrimeField> {
    shares: BTreeMap<u64, F>,
}

impl<F: PrimeField> ShareSet<F> {
    pub fn new() -> Self {
        Self {
            shares: BTreeMap::new(),
        }
    }

    /// Add a share, refusing index 0 and repeated indices
    pub fn insert(&mut self, index: u64, value: F) -> Result<(), SecretShareError> {
        if index == 0 {
            return Err(SecretShareError::InvalidShare(
                "share index must not be 0".to_string(),
            ));
        }
        if self.shares.contains_key(&index) {
            return Err(SecretShareError::InvalidShare(format!(
                "share index {} given more than once",
                index
            )));
        }
        self.shares.insert(index, value);
        Ok(())
    }

    pub fn get(&self, index: u64) -> Option<&F> {
        self.shares.get(&index)
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &F)> {
        self.shares.iter().map(|(index, value)| (*index, value))
    }

    pub fn to_shares(&self) -> Vec<Share<F>> {
        self.iter()
            .map(|(index, value)| Share {
                index,
                value: *value,
            })
            .collect()
    }

    /// The shares at `indices`, e.g. the ones a quorum of participants
    /// brings back
    pub fn subset(&self, indices: &[u64]) -> Result<Self, SecretShareError> {
        let mut subset = Self::new();
        for index in indices {
            let value = self.shares.get(index).ok_or_else(|| {
                SecretShareError::InvalidShare(format!("no share with index {}", index))
            })?;
            subset.insert(*index, *value)?;
        }
        Ok(subset)
    }
}

impl<F: PrimeField> TryFrom<Vec<Share<F>>> for ShareSet<F> {
    type Error = SecretShareError;

    fn try_from(shares: Vec<Share<F>>) -> Result<Self, Self::Error> {
        let mut set = Self::new();
        for share in shares {
            set.insert(share.index, share.value)?;
        }
        Ok(set)
    }
}

impl<F: PrimeField> From<ShareSet<F>> for Vec<Share<F>> {
    fn from(set: ShareSet<F>) -> Self {
        set.to_shares()
    }
}

/// Feldman commitments to every polynomial coefficient, constant term first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentSet<C: CurveGroup> {
    points: Vec<C::Affine>,
}

impl<C: CurveGroup> CommitmentSet<C> {
    pub fn new(points: Vec<C::Affine>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[C::Affine] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Commitment to the secret (`C_0`)
    pub fn secret_commitment(&self) -> Option<&C::Affine> {
        self.points.first()
    }

    /// Check `value · G == Σ C_j · index^j`
    pub fn verify_share(&self, index: u64, value: &C::ScalarField) -> bool {
        if index == 0 || self.points.is_empty() {
            return false;
        }
        let x = C::ScalarField::from(index);
        let expected = self
            .points
            .iter()
            .rev()
            .fold(C::zero(), |acc, point| acc * x + point.into_group());
        C::generator() * value == expected
    }

    /// Compressed point encodings as hex strings
    pub fn to_hex(&self) -> Vec<String> {
        self.points
            .iter()
            .map(|point| {
                let mut buff = Vec::with_capacity(point.compressed_size());
                // serializing into a Vec cannot fail
                let _ = point.serialize_compressed(&mut buff);
                hex::encode(buff)
            })
            .collect()
    }

    /// Parse compressed point encodings from hex strings
    pub fn from_hex<S: AsRef<str>>(points: &[S]) -> Result<Self, SecretShareError> {
        let points = points
            .iter()
            .map(|hex| -> Result<C::Affine, SecretShareError> {
                let hex = hex.as_ref();
                let bytes = hex::decode(hex.strip_prefix("0x").unwrap_or(hex))
                    .map_err(|_| anyhow::anyhow!("commitment hex decode error"))?;
                let point = C::Affine::deserialize_compressed(bytes.as_slice())
                    .map_err(|e| anyhow::anyhow!("invalid commitment point: {}", e))?;
                Ok(point)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { points })
    }
}

impl<C: CurveGroup> Serialize for CommitmentSet<C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_hex().serialize(serializer)
    }
}

impl<'de, C: CurveGroup> Deserialize<'de> for CommitmentSet<C> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<String>::deserialize(deserializer)?;
        CommitmentSet::from_hex(&points).map_err(serde::de::Error::custom)
    }
}

/// Split `secret` into `total` shares, any `threshold` of which recover it
///
/// # Errors
///
/// See [`Polynomial::random`].
#[tracing::instrument(skip(secret), fields(secret_len = secret.len()))]
pub fn split<C: CurveGroup>(
    secret: &[u8],
    total: usize,
    threshold: usize,
) -> Result<ShareSet<C::ScalarField>, SecretShareError> {
    let polynomial = Polynomial::<C::ScalarField>::random(total, threshold, secret)?;
    shares_from_polynomial(&polynomial, total)
}

/// [`split`], additionally returning the Feldman commitments
#[tracing::instrument(skip(secret), fields(secret_len = secret.len()))]
pub fn split_with_commitments<C: CurveGroup>(
    secret: &[u8],
    total: usize,
    threshold: usize,
) -> Result<(ShareSet<C::ScalarField>, CommitmentSet<C>), SecretShareError> {
    let polynomial = Polynomial::<C::ScalarField>::random(total, threshold, secret)?;
    let shares = shares_from_polynomial(&polynomial, total)?;
    Ok((shares, polynomial.commitments::<C>()))
}

fn shares_from_polynomial<F: PrimeField>(
    polynomial: &Polynomial<F>,
    total: usize,
) -> Result<ShareSet<F>, SecretShareError> {
    let mut shares = ShareSet::new();
    for index in 1..=total as u64 {
        shares.insert(index, polynomial.share_for_index(index)?)?;
    }
    tracing::debug!(
        total,
        threshold = polynomial.coefficients().len(),
        "split secret"
    );
    Ok(shares)
}

/// Recover the secret from a set of shares by Lagrange interpolation at 0
///
/// Returns the secret as minimal big-endian bytes; the zero secret is an
/// empty buffer.
///
/// # Errors
///
/// Returns [`SecretShareError::InvalidShare`] for an empty set.
pub fn reconstruct<F: PrimeField>(shares: &ShareSet<F>) -> Result<Vec<u8>, SecretShareError> {
    if shares.is_empty() {
        return Err(SecretShareError::InvalidShare(
            "cannot reconstruct from an empty share set".to_string(),
        ));
    }

    let xs = shares
        .iter()
        .map(|(index, _)| F::from(index))
        .collect::<Vec<_>>();

    let mut secret = F::zero();
    for (i, (_, y)) in shares.iter().enumerate() {
        let mut numerator = F::one();
        let mut denominator = F::one();
        for (j, x) in xs.iter().enumerate() {
            if i == j {
                continue;
            }
            numerator *= x;
            denominator *= *x - xs[i];
        }
        let inverse = denominator.inverse().ok_or_else(|| {
            SecretShareError::InvalidShare("share indices collide modulo the field order".to_string())
        })?;
        secret += *y * numerator * inverse;
    }

    tracing::debug!(shares = shares.len(), "reconstructed secret");
    Ok(minimal_be_bytes(&to_biguint(&secret)))
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_bls12_381::{Fr, G1Projective};

    #[test]
    fn test_split_and_reconstruct_every_quorum() {
        let secret = b"feldman secret";
        let shares = split::<G1Projective>(secret, 5, 3).unwrap();
        assert_eq!(shares.len(), 5);

        for a in 1..=5u64 {
            for b in (a + 1)..=5 {
                for c in (b + 1)..=5 {
                    let subset = shares.subset(&[a, b, c]).unwrap();
                    assert_eq!(reconstruct(&subset).unwrap(), secret.to_vec());
                }
            }
        }
    }

    #[test]
    fn test_below_threshold_gives_unrelated_value() {
        let secret = b"feldman secret";
        let shares = split::<G1Projective>(secret, 5, 3).unwrap();
        let subset = shares.subset(&[2, 4]).unwrap();
        assert_ne!(reconstruct(&subset).unwrap(), secret.to_vec());
    }

    #[test]
    fn test_leading_zeros_are_dropped() {
        let shares = split::<G1Projective>(&[0, 0, 7], 3, 2).unwrap();
        assert_eq!(reconstruct(&shares).unwrap(), vec![7]);

        let shares = split::<G1Projective>(&[], 3, 2).unwrap();
        assert!(reconstruct(&shares).unwrap().is_empty());
    }

    #[test]
    fn test_reconstruct_rejects_empty_set() {
        let shares = ShareSet::<Fr>::new();
        assert!(matches!(
            reconstruct(&shares),
            Err(SecretShareError::InvalidShare(_))
        ));
    }

    #[test]
    fn test_share_set_rejects_bad_indices() {
        let mut shares = ShareSet::<Fr>::new();
        assert!(shares.insert(0, Fr::from(1u64)).is_err());
        shares.insert(1, Fr::from(1u64)).unwrap();
        assert!(shares.insert(1, Fr::from(2u64)).is_err());
        // a rejected insert leaves the stored share untouched
        assert_eq!(shares.get(1), Some(&Fr::from(1u64)));
        assert_eq!(shares.len(), 1);
        assert!(shares.subset(&[2]).is_err());
    }

    #[test]
    fn test_verify_share_with_commitments() {
        let (shares, commitments) =
            split_with_commitments::<G1Projective>(b"committed", 5, 3).unwrap();
        assert_eq!(commitments.len(), 3);

        for (index, value) in shares.iter() {
            assert!(commitments.verify_share(index, value));
        }

        let tampered = *shares.get(2).unwrap() + Fr::from(1u64);
        assert!(!commitments.verify_share(2, &tampered));
        assert!(!commitments.verify_share(3, shares.get(2).unwrap()));
        assert!(!commitments.verify_share(0, shares.get(2).unwrap()));
    }

    #[test]
    fn test_split_errors() {
        assert!(matches!(
            split::<G1Projective>(b"x", 1, 1),
            Err(SecretShareError::InvalidTotalShareNumber(1))
        ));
        assert!(matches!(
            split::<G1Projective>(b"x", 3, 4),
            Err(SecretShareError::InvalidShareNumber { .. })
        ));
        assert!(matches!(
            split::<G1Projective>(&[0xff; 40], 3, 2),
            Err(SecretShareError::SecretOutOfRange)
        ));
    }

    #[test]
    fn test_share_string_roundtrip() {
        let share = Share {
            index: 3,
            value: Fr::from(258u64),
        };
        let rendered = share.to_string();
        assert!(rendered.starts_with("3:"));
        assert!(rendered.ends_with("0102"));
        assert_eq!(rendered.parse::<Share<Fr>>().unwrap(), share);
        assert!("3".parse::<Share<Fr>>().is_err());
        assert!("x:01".parse::<Share<Fr>>().is_err());
        assert!("3:zz".parse::<Share<Fr>>().is_err());
    }

    #[test]
    fn test_share_set_serde() {
        let (shares, commitments) =
            split_with_commitments::<G1Projective>(b"serde", 4, 2).unwrap();

        let json = serde_json::to_string(&shares).unwrap();
        let recovered: ShareSet<Fr> = serde_json::from_str(&json).unwrap();
        assert_eq!(shares, recovered);

        let encoded = bincode::serialize(&shares).unwrap();
        let recovered: ShareSet<Fr> = bincode::deserialize(&encoded).unwrap();
        assert_eq!(shares, recovered);

        let json = serde_json::to_string(&commitments).unwrap();
        let recovered: CommitmentSet<G1Projective> = serde_json::from_str(&json).unwrap();
        assert_eq!(commitments, recovered);
    }

    #[test]
    fn test_share_set_deserialize_rejects_duplicates() {
        let share = Share {
            index: 1,
            value: Fr::from(5u64),
        };
        let json = serde_json::to_string(&vec![share, share]).unwrap();
        let result: Result<ShareSet<Fr>, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }
}
