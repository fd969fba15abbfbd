use std::collections::{BTreeMap, HashMap};

use ark_bls12_381::{G1Affine, G1Projective};
use ark_ec::CurveGroup;
use ark_ff::Zero;
use serde::{Deserialize, Serialize};

use super::{items_from_bytes, tags_from_bytes, Challenge, ChallengeItem, ProofError};
use crate::crypto::params::PairingParams;
use crate::crypto::tag::{content_point, g1_from_bytes, g1_to_bytes, serde_g1, RoundMask, Tag, TAG_SIZE};

/// A segment as kept by the storage holder: its content and the tag the
/// owner computed for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSegment {
    pub tag: Tag,
    pub content: Vec<u8>,
}

/// Read access to the segments a holder keeps, keyed by segment index
pub trait SegmentStore {
    fn segment(&self, index: u64) -> Option<&StoredSegment>;
}

impl SegmentStore for BTreeMap<u64, StoredSegment> {
    fn segment(&self, index: u64) -> Option<&StoredSegment> {
        self.get(&index)
    }
}

impl SegmentStore for HashMap<u64, StoredSegment> {
    fn segment(&self, index: u64) -> Option<&StoredSegment> {
        self.get(&index)
    }
}

/// A holder's answer to a challenge: `sigma` aggregates the tags, `mu` the
/// blinded content points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "serde_g1")]
    pub sigma: G1Affine,
    #[serde(with = "serde_g1")]
    pub mu: G1Affine,
}

impl Proof {
    /// Parse a proof from its two compressed points
    pub fn from_bytes(sigma: &[u8], mu: &[u8]) -> Result<Self, ProofError> {
        Ok(Self {
            sigma: g1_from_bytes(sigma)?,
            mu: g1_from_bytes(mu)?,
        })
    }

    pub fn sigma_bytes(&self) -> [u8; TAG_SIZE] {
        g1_to_bytes(&self.sigma)
    }

    pub fn mu_bytes(&self) -> [u8; TAG_SIZE] {
        g1_to_bytes(&self.mu)
    }
}

/// Answer `challenge` from the segments in `store`
///
/// # Errors
///
/// Returns [`ProofError::MissingSegment`] for the first challenged index the
/// store does not hold.
#[tracing::instrument(skip_all, fields(round = challenge.round(), segments = challenge.items().len()))]
pub fn build_proof<S>(
    params: &PairingParams,
    challenge: &Challenge,
    store: &S,
) -> Result<Proof, ProofError>
where
    S: SegmentStore + ?Sized,
{
    aggregate(params, challenge.items(), challenge.round_mask(), store)
}

/// Byte-level proof inputs, for holders that keep tags and content as raw
/// buffers
#[derive(Debug, Clone)]
pub struct ProofParams {
    items: Vec<ChallengeItem>,
    round_mask: RoundMask,
    segments: BTreeMap<u64, StoredSegment>,
}

impl ProofParams {
    /// `contents`, `indices`, `coefficients` and `sigmas` are aligned lists;
    /// `round_mask` is the mask the owner sent with the challenge.
    ///
    /// # Errors
    ///
    /// Returns a protocol error on mismatched lengths or bad indices, and a
    /// decode error on malformed scalars or points.
    pub fn from_bytes(
        contents: &[Vec<u8>],
        indices: &[Vec<u8>],
        coefficients: &[Vec<u8>],
        sigmas: &[Vec<u8>],
        round_mask: &[u8],
    ) -> Result<Self, ProofError> {
        if contents.len() != indices.len() || sigmas.len() != indices.len() {
            return Err(ProofError::Protocol(format!(
                "got {} indices, {} contents and {} tags",
                indices.len(),
                contents.len(),
                sigmas.len()
            )));
        }
        let items = items_from_bytes(indices, coefficients)?;
        let tags = tags_from_bytes(sigmas)?;

        let segments = items
            .iter()
            .zip(tags)
            .zip(contents)
            .map(|((item, tag), content)| {
                (
                    item.index,
                    StoredSegment {
                        tag,
                        content: content.clone(),
                    },
                )
            })
            .collect();

        Ok(Self {
            items,
            round_mask: RoundMask::from(round_mask.to_vec()),
            segments,
        })
    }

    pub fn prove(&self, params: &PairingParams) -> Result<Proof, ProofError> {
        aggregate(params, &self.items, &self.round_mask, &self.segments)
    }
}

fn aggregate<S>(
    params: &PairingParams,
    items: &[ChallengeItem],
    mask: &RoundMask,
    store: &S,
) -> Result<Proof, ProofError>
where
    S: SegmentStore + ?Sized,
{
    let mut sigma = G1Projective::zero();
    let mut mu = G1Projective::zero();

    for item in items {
        let segment = store
            .segment(item.index)
            .ok_or(ProofError::MissingSegment(item.index))?;
        sigma += *segment.tag.point() * item.coefficient;
        mu += content_point(params, &segment.content, mask) * item.coefficient;
    }

    tracing::debug!(segments = items.len(), "aggregated proof");
    Ok(Proof {
        sigma: sigma.into_affine(),
        mu: mu.into_affine(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_bls12_381::Fr;
    use ark_ec::AffineRepr;

    use crate::crypto::keys::generate_keypair;
    use crate::crypto::pdp::scalars_to_bytes;
    use crate::crypto::tag::{compute_tag, index_to_bytes, TagParams};

    fn store(params: &PairingParams, round: u64) -> (Challenge, BTreeMap<u64, StoredSegment>) {
        let (private_key, _) = generate_keypair(params).unwrap();
        let v = Fr::from(11u64);
        let u = Fr::from(13u64);
        let mut segments = BTreeMap::new();
        for (index, content) in [(1u64, b"alpha".to_vec()), (2, b"beta".to_vec())] {
            let tag = compute_tag(
                params,
                &TagParams {
                    content: &content,
                    index,
                    random_v: v,
                    random_u: u,
                    private_key: private_key.clone(),
                    round,
                },
            )
            .unwrap();
            segments.insert(index, StoredSegment { tag, content });
        }
        let challenge =
            Challenge::from_seed(params, round, v, &private_key, &[1, 2], [3u8; 32]).unwrap();
        (challenge, segments)
    }

    #[test]
    fn test_build_proof_is_linear_in_tags() {
        let params = PairingParams::new();
        let (challenge, segments) = store(&params, 1);
        let proof = build_proof(&params, &challenge, &segments).unwrap();

        let expected = segments[&1].tag.point().into_group() * challenge.items()[0].coefficient
            + segments[&2].tag.point().into_group() * challenge.items()[1].coefficient;
        assert_eq!(proof.sigma, expected.into_affine());
    }

    #[test]
    fn test_build_proof_missing_segment() {
        let params = PairingParams::new();
        let (challenge, mut segments) = store(&params, 1);
        segments.remove(&2);
        let result = build_proof(&params, &challenge, &segments);
        assert!(matches!(result, Err(ProofError::MissingSegment(2))));
    }

    #[test]
    fn test_hash_map_store_matches_btree_store() {
        let params = PairingParams::new();
        let (challenge, segments) = store(&params, 1);
        let hashed: HashMap<u64, StoredSegment> = segments.clone().into_iter().collect();
        assert_eq!(
            build_proof(&params, &challenge, &segments).unwrap(),
            build_proof(&params, &challenge, &hashed).unwrap()
        );
    }

    #[test]
    fn test_proof_params_from_bytes_matches_build_proof() {
        let params = PairingParams::new();
        let (challenge, segments) = store(&params, 1);

        let contents = vec![segments[&1].content.clone(), segments[&2].content.clone()];
        let sigmas = vec![
            segments[&1].tag.to_bytes().to_vec(),
            segments[&2].tag.to_bytes().to_vec(),
        ];
        let proof_params = ProofParams::from_bytes(
            &contents,
            &[index_to_bytes(1), index_to_bytes(2)],
            &challenge.coefficients_to_bytes(),
            &sigmas,
            challenge.round_mask().bytes(),
        )
        .unwrap();

        assert_eq!(
            proof_params.prove(&params).unwrap(),
            build_proof(&params, &challenge, &segments).unwrap()
        );
    }

    #[test]
    fn test_proof_params_rejects_mismatched_lists() {
        let coefficients = scalars_to_bytes(&[Fr::from(3u64), Fr::from(5u64)]);
        let result = ProofParams::from_bytes(
            &[b"alpha".to_vec()],
            &[vec![1], vec![2]],
            &coefficients,
            &[vec![0u8; TAG_SIZE], vec![0u8; TAG_SIZE]],
            &[1],
        );
        assert!(matches!(result, Err(ProofError::Protocol(_))));
    }

    #[test]
    fn test_proof_bytes_roundtrip() {
        let params = PairingParams::new();
        let (challenge, segments) = store(&params, 1);
        let proof = build_proof(&params, &challenge, &segments).unwrap();
        let recovered = Proof::from_bytes(&proof.sigma_bytes(), &proof.mu_bytes()).unwrap();
        assert_eq!(proof, recovered);
        assert!(matches!(
            Proof::from_bytes(&[1, 2, 3], &proof.mu_bytes()),
            Err(ProofError::Decode(_))
        ));

        let encoded = bincode::serialize(&proof).unwrap();
        let decoded: Proof = bincode::deserialize(&encoded).unwrap();
        assert_eq!(proof, decoded);
    }
}
