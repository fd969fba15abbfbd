/**
 * Cryptographic types and operations.
 *  - Pairing parameters and audit keypairs
 *  - Homomorphic segment tags
 *  - PDP challenge, proof and verification
 *  - Feldman verifiable secret sharing
 */
pub mod crypto;

/// Curves the crate is used with, re-exported so callers do not need to
/// pin their own arkworks versions.
pub mod curves {
    pub use ark_bls12_381::{Bls12_381, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
}

pub mod prelude {
    pub use crate::crypto::pdp::{
        build_proof, verify, Challenge, ChallengeItem, Proof, ProofError, SegmentStore,
        StoredSegment, Verdict, VerifyParams,
    };
    pub use crate::crypto::{
        compute_tag, generate_keypair, reconstruct, split, split_with_commitments,
        CommitmentSet, PairingParams, PrivateKey, PublicKey, Share, ShareSet, Tag, TagParams,
    };
    pub use crate::curves::{Fr, G1Projective};
}
