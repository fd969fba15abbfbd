use ark_bls12_381::{Bls12_381, Fr, G1Projective};
use ark_ec::pairing::Pairing;
use ark_ec::AffineRepr;
use ark_ff::Zero;
use serde::{Deserialize, Serialize};

use super::{
    check_coefficients, check_indices, items_from_bytes, Challenge, ChallengeItem, Proof, ProofError,
};
use crate::crypto::keys::PublicKey;
use crate::crypto::params::PairingParams;
use crate::crypto::scalar::{scalar_from_bytes, serde_scalar};
use crate::crypto::tag::hash_index_to_g1;

/// Outcome of a pairing check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// Turn a rejection into [`ProofError::Rejected`]
    pub fn into_result(self) -> Result<(), ProofError> {
        match self {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected => Err(ProofError::Rejected),
        }
    }
}

/// Everything an auditor needs to check a proof; all of it is public
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyParams {
    pub proof: Proof,
    #[serde(with = "serde_scalar")]
    pub random_v: Fr,
    #[serde(with = "serde_scalar")]
    pub random_u: Fr,
    pub items: Vec<ChallengeItem>,
    pub public_key: PublicKey,
}

impl VerifyParams {
    pub fn new(public_key: PublicKey, challenge: &Challenge, random_u: Fr, proof: Proof) -> Self {
        Self {
            proof,
            random_v: *challenge.random_v(),
            random_u,
            items: challenge.items().to_vec(),
            public_key,
        }
    }

    /// Build verification inputs from raw buffers
    ///
    /// `indices` and `coefficients` are aligned lists of independent
    /// big-endian buffers.
    pub fn from_bytes(
        sigma: &[u8],
        mu: &[u8],
        random_v: &[u8],
        random_u: &[u8],
        public_key: &[u8],
        indices: &[Vec<u8>],
        coefficients: &[Vec<u8>],
    ) -> Result<Self, ProofError> {
        Ok(Self {
            proof: Proof::from_bytes(sigma, mu)?,
            random_v: scalar_from_bytes(random_v)?,
            random_u: scalar_from_bytes(random_u)?,
            items: items_from_bytes(indices, coefficients)?,
            public_key: PublicKey::from_bytes(public_key)?,
        })
    }
}

/// Check `e(sigma, g2) == e(Σ v_i·H(V ‖ i) + U·mu, pk)`
///
/// # Errors
///
/// Only malformed inputs error: an empty or repeated index list, or a zero
/// coefficient, is a [`ProofError::Protocol`]. A proof that does not match is
/// reported as [`Verdict::Rejected`].
///
/// An identity `sigma` or an identity right-hand aggregate is rejected
/// outright. Both sides of the equation collapse to one in that case, and a
/// holder can reach it from public values alone.
#[tracing::instrument(skip_all, fields(segments = verify_params.items.len()))]
pub fn verify(params: &PairingParams, verify_params: &VerifyParams) -> Result<Verdict, ProofError> {
    let indices = verify_params
        .items
        .iter()
        .map(|item| item.index)
        .collect::<Vec<_>>();
    check_indices(&indices)?;
    let coefficients = verify_params
        .items
        .iter()
        .map(|item| item.coefficient)
        .collect::<Vec<_>>();
    check_coefficients(&coefficients)?;

    if verify_params.proof.sigma.is_zero() {
        tracing::debug!("proof sigma is the identity");
        return Ok(Verdict::Rejected);
    }

    let mut aggregate = G1Projective::zero();
    for item in &verify_params.items {
        aggregate += hash_index_to_g1(params, &verify_params.random_v, item.index)? * item.coefficient;
    }
    aggregate += verify_params.proof.mu * verify_params.random_u;
    if aggregate.is_zero() {
        tracing::debug!("aggregated point is the identity");
        return Ok(Verdict::Rejected);
    }

    let lhs = Bls12_381::pairing(verify_params.proof.sigma, *params.g2());
    let rhs = Bls12_381::pairing(aggregate, *verify_params.public_key.point());

    let verdict = if lhs == rhs {
        Verdict::Accepted
    } else {
        Verdict::Rejected
    };
    tracing::debug!(?verdict, "pairing check finished");
    Ok(verdict)
}
