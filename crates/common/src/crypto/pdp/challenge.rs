use ark_bls12_381::Fr;
use ark_ff::Zero;
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{check_coefficients, check_indices, scalars_to_bytes, ProofError};
use crate::crypto::keys::PrivateKey;
use crate::crypto::params::PairingParams;
use crate::crypto::scalar::{random_scalar_from_rng, serde_scalar};
use crate::crypto::tag::{index_to_bytes, round_mask, RoundMask};

/// One challenged segment and the coefficient it is weighted by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeItem {
    pub index: u64,
    #[serde(with = "serde_scalar")]
    pub coefficient: Fr,
}

/// The owner's request for one audit round
///
/// Carries everything the holder needs to build a proof (the items and the
/// round mask) and everything the auditor needs besides the proof itself
/// (the items and the file's `V`). The private key never leaves the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChallengeFields")]
pub struct Challenge {
    round: u64,
    #[serde(with = "serde_scalar")]
    random_v: Fr,
    items: Vec<ChallengeItem>,
    round_mask: RoundMask,
}

/// Unchecked wire form; decoding a [`Challenge`] goes through
/// [`Challenge::from_parts`]
#[derive(Deserialize)]
struct ChallengeFields {
    round: u64,
    #[serde(with = "serde_scalar")]
    random_v: Fr,
    items: Vec<ChallengeItem>,
    round_mask: RoundMask,
}

impl TryFrom<ChallengeFields> for Challenge {
    type Error = ProofError;

    fn try_from(fields: ChallengeFields) -> Result<Self, Self::Error> {
        Self::from_parts(fields.round, fields.random_v, fields.items, fields.round_mask)
    }
}

impl Challenge {
    /// Build a challenge over `indices`, drawing one fresh non-zero
    /// coefficient per index from `rng`.
    pub fn build<R>(
        params: &PairingParams,
        round: u64,
        random_v: Fr,
        private_key: &PrivateKey,
        indices: &[u64],
        rng: &mut R,
    ) -> Result<Self, ProofError>
    where
        R: RngCore + CryptoRng,
    {
        check_indices(indices)?;

        let items = indices
            .iter()
            .map(|&index| ChallengeItem {
                index,
                coefficient: nonzero_coefficient(rng),
            })
            .collect::<Vec<_>>();

        tracing::debug!(round, segments = items.len(), "built audit challenge");
        Ok(Self {
            round,
            random_v,
            items,
            round_mask: round_mask(params, round, private_key),
        })
    }

    /// Deterministic variant of [`Challenge::build`]: the coefficients are
    /// drawn from a CSPRNG seeded with `seed`.
    ///
    /// Reusing a seed across rounds reuses coefficients, which lets a holder
    /// that dropped data combine old proofs. Seeds must be fresh per round.
    pub fn from_seed(
        params: &PairingParams,
        round: u64,
        random_v: Fr,
        private_key: &PrivateKey,
        indices: &[u64],
        seed: [u8; 32],
    ) -> Result<Self, ProofError> {
        let mut rng = StdRng::from_seed(seed);
        Self::build(params, round, random_v, private_key, indices, &mut rng)
    }

    /// Assemble a challenge from already chosen items
    pub fn from_parts(
        round: u64,
        random_v: Fr,
        items: Vec<ChallengeItem>,
        round_mask: RoundMask,
    ) -> Result<Self, ProofError> {
        let indices = items.iter().map(|item| item.index).collect::<Vec<_>>();
        check_indices(&indices)?;
        let coefficients = items.iter().map(|item| item.coefficient).collect::<Vec<_>>();
        check_coefficients(&coefficients)?;
        Ok(Self {
            round,
            random_v,
            items,
            round_mask,
        })
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn random_v(&self) -> &Fr {
        &self.random_v
    }

    pub fn items(&self) -> &[ChallengeItem] {
        &self.items
    }

    pub fn round_mask(&self) -> &RoundMask {
        &self.round_mask
    }

    /// Challenged indices in order
    pub fn indices(&self) -> Vec<u64> {
        self.items.iter().map(|item| item.index).collect()
    }

    /// Indices as minimal big-endian buffers, aligned with
    /// [`Challenge::coefficients_to_bytes`]
    pub fn indices_to_bytes(&self) -> Vec<Vec<u8>> {
        self.items
            .iter()
            .map(|item| index_to_bytes(item.index))
            .collect()
    }

    /// Coefficients as fixed-width big-endian buffers
    pub fn coefficients_to_bytes(&self) -> Vec<Vec<u8>> {
        let coefficients = self
            .items
            .iter()
            .map(|item| item.coefficient)
            .collect::<Vec<_>>();
        scalars_to_bytes(&coefficients)
    }
}

fn nonzero_coefficient<R: RngCore + CryptoRng>(rng: &mut R) -> Fr {
    loop {
        let coefficient: Fr = random_scalar_from_rng(rng);
        if !coefficient.is_zero() {
            return coefficient;
        }
    }
}
