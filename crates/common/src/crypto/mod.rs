//! Cryptographic primitives for DTX storage trust
//!
//! Two independent building blocks:
//!
//! - **Provable Data Possession**: a data owner tags every segment it hands
//!   to a storage holder, then periodically challenges the holder to prove it
//!   still has a random subset of them. Any auditor holding the owner's
//!   public key can check the proof with one pairing equation.
//! - **Verifiable secret sharing**: split a secret into `n` shares with a
//!   `t`-of-`n` recovery threshold, optionally publishing Feldman commitments
//!   so each share can be checked on its own.
//!
//! # Security Model
//!
//! ## Audit keys
//! The owner holds a BLS12-381 scalar `sk`; its public key is `sk · g2`. Tags
//! are G1 points linear in `sk`, so only the owner can produce them, while
//! anyone can verify a coefficient-weighted sum of them.
//!
//! ## Rounds
//! Each challenge round derives a mask `r_j` from `(round · sk) · g1`. Tags
//! and proofs bound to one round do not verify in another.
//!
//! ## Shares
//! Shares are field elements evaluated at `x = 1..=n`. Commitments are
//! points on any prime-order curve group (`ark_ec::CurveGroup`).

mod keys;
mod params;
mod polynomial;
mod scalar;
mod secret_share;
mod tag;

pub mod pdp;

pub use keys::{
    generate_keypair, KeyError, PrivateKey, PublicKey, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE,
    PUBLIC_KEY_UNCOMPRESSED_SIZE,
};
pub use params::PairingParams;
pub use polynomial::Polynomial;
pub use scalar::{
    concat_decimal, hash_to_scalar, minimal_be_bytes, random_scalar, scalar_from_bytes,
    scalar_to_bytes, serde_scalar, EntropyError,
};
pub use secret_share::{
    reconstruct, split, split_with_commitments, CommitmentSet, SecretShareError, Share, ShareSet,
};
pub use tag::{compute_tag, round_mask, RoundMask, Tag, TagError, TagParams, TAG_SIZE};
