//! Provable Data Possession audit rounds
//!
//! One audit round between a data owner (who holds the private key), a
//! storage holder (who holds segments and their tags) and an auditor (who
//! holds only public data):
//!
//! 1. **Challenge**: the owner picks the segment indices to audit, draws a
//!    fresh non-zero coefficient `v_i` for each of them, and derives the round
//!    mask `r_j` the holder needs. Coefficients must never be reused across
//!    rounds.
//! 2. **Proof**: the holder folds the challenged tags and content into two G1
//!    points, `sigma = Σ v_i·sigma_i` and `mu = Σ v_i·SHA256(m_i ‖ r_j)·g1`.
//!    It cannot answer for a segment it no longer has.
//! 3. **Verify**: the auditor recomputes `Σ v_i·H(V ‖ i)` from public data and
//!    checks `e(sigma, g2) == e(Σ v_i·H(V ‖ i) + U·mu, pk)`.
//!
//! A failed pairing check is an expected protocol outcome and is returned as
//! [`Verdict::Rejected`], not as an error.

mod challenge;
mod proof;
mod verify;

pub use challenge::{Challenge, ChallengeItem};
pub use proof::{build_proof, Proof, ProofParams, SegmentStore, StoredSegment};
pub use verify::{verify, Verdict, VerifyParams};

use super::keys::KeyError;
use super::tag::TagError;

/// Errors raised while building challenges, proofs or running verification
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    #[error("decode error: {0}")]
    Decode(#[from] anyhow::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("no segment stored for challenged index {0}")]
    MissingSegment(u64),
    #[error("proof rejected: pairing check failed")]
    Rejected,
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("tag error: {0}")]
    Tag(#[from] TagError),
}

/// Encode a list of scalars as independent big-endian buffers
pub fn scalars_to_bytes<F: ark_ff::PrimeField>(scalars: &[F]) -> Vec<Vec<u8>> {
    scalars
        .iter()
        .map(super::scalar::scalar_to_bytes)
        .collect()
}

/// Decode a list of independent big-endian scalar buffers
pub fn scalars_from_bytes<F: ark_ff::PrimeField>(buffers: &[Vec<u8>]) -> Result<Vec<F>, ProofError> {
    buffers
        .iter()
        .map(|b| super::scalar::scalar_from_bytes(b).map_err(ProofError::from))
        .collect()
}

/// Decode a list of compressed tags
pub fn tags_from_bytes(buffers: &[Vec<u8>]) -> Result<Vec<super::tag::Tag>, ProofError> {
    buffers
        .iter()
        .map(|b| super::tag::Tag::from_bytes(b).map_err(ProofError::from))
        .collect()
}

/// Reject empty or repeated index lists
pub(crate) fn check_indices(indices: &[u64]) -> Result<(), ProofError> {
    if indices.is_empty() {
        return Err(ProofError::Protocol(
            "challenge must cover at least one segment".to_string(),
        ));
    }
    let mut seen = std::collections::HashSet::with_capacity(indices.len());
    for index in indices {
        if !seen.insert(*index) {
            return Err(ProofError::Protocol(format!(
                "segment index {} challenged more than once",
                index
            )));
        }
    }
    Ok(())
}

/// Zero coefficients would silently drop a segment from the audit
pub(crate) fn check_coefficients(coefficients: &[ark_bls12_381::Fr]) -> Result<(), ProofError> {
    use ark_ff::Zero;
    if let Some(position) = coefficients.iter().position(|c| c.is_zero()) {
        return Err(ProofError::Protocol(format!(
            "challenge coefficient at position {} is zero",
            position
        )));
    }
    Ok(())
}

/// Decode aligned index and coefficient buffers into challenge items
pub(crate) fn items_from_bytes(
    indices: &[Vec<u8>],
    coefficients: &[Vec<u8>],
) -> Result<Vec<ChallengeItem>, ProofError> {
    if indices.len() != coefficients.len() {
        return Err(ProofError::Protocol(format!(
            "got {} indices but {} coefficients",
            indices.len(),
            coefficients.len()
        )));
    }
    let indices = indices
        .iter()
        .map(|b| {
            super::tag::index_from_bytes(b).map_err(|e| ProofError::Protocol(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_indices(&indices)?;
    let coefficients = scalars_from_bytes(coefficients)?;
    check_coefficients(&coefficients)?;
    Ok(indices
        .into_iter()
        .zip(coefficients)
        .map(|(index, coefficient)| ChallengeItem { index, coefficient })
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_bls12_381::Fr;

    #[test]
    fn test_check_indices() {
        assert!(check_indices(&[1, 2, 3]).is_ok());
        assert!(matches!(check_indices(&[]), Err(ProofError::Protocol(_))));
        assert!(matches!(
            check_indices(&[1, 2, 1]),
            Err(ProofError::Protocol(_))
        ));
    }

    #[test]
    fn test_scalar_lists_stay_separate_buffers() {
        let scalars = vec![Fr::from(3u64), Fr::from(5u64)];
        let buffers = scalars_to_bytes(&scalars);
        assert_eq!(buffers.len(), 2);
        assert!(buffers.iter().all(|b| b.len() == 32));
        assert_eq!(scalars_from_bytes::<Fr>(&buffers).unwrap(), scalars);
    }

    #[test]
    fn test_items_from_bytes_length_mismatch() {
        let result = items_from_bytes(&[vec![1], vec![2]], &[vec![3]]);
        assert!(matches!(result, Err(ProofError::Protocol(_))));
    }

    #[test]
    fn test_items_from_bytes_rejects_zero_coefficient() {
        let result = items_from_bytes(&[vec![1], vec![2]], &[vec![3], vec![]]);
        assert!(matches!(result, Err(ProofError::Protocol(_))));
    }

    #[test]
    fn test_items_from_bytes() {
        let items = items_from_bytes(&[vec![1], vec![0, 2]], &[vec![3], vec![5]]).unwrap();
        assert_eq!(items[0].index, 1);
        assert_eq!(items[1].index, 2);
        assert_eq!(items[1].coefficient, Fr::from(5u64));
    }

    #[test]
    fn test_items_from_bytes_out_of_range_index() {
        let result = items_from_bytes(&[vec![0xff; 9]], &[vec![3]]);
        assert!(matches!(result, Err(ProofError::Protocol(_))));
    }
}
