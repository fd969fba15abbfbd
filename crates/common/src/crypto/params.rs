//! Pairing group parameters
//!
//! Every PDP operation works over BLS12-381. Instead of a process-wide
//! mutable setup, callers build a [`PairingParams`] once at start-up and pass
//! it by reference into key, tag, challenge, proof and verification calls.
//! The context is immutable after construction and is `Send + Sync`, so it can
//! be shared freely across threads (directly or behind an `Arc`).

use ark_bls12_381::{Fr, G1Affine, G2Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;

use super::scalar::{random_scalar, EntropyError};

/// Immutable BLS12-381 group setup: both source-group generators and the
/// order of the scalar field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingParams {
    g1: G1Affine,
    g2: G2Affine,
    order: BigUint,
}

impl Default for PairingParams {
    fn default() -> Self {
        Self::new()
    }
}

impl PairingParams {
    /// Build the BLS12-381 context.
    pub fn new() -> Self {
        let order = BigUint::from_bytes_be(&Fr::MODULUS.to_bytes_be());
        tracing::trace!(order_bits = order.bits(), "pairing parameters initialised");
        Self {
            g1: G1Affine::generator(),
            g2: G2Affine::generator(),
            order,
        }
    }

    /// Generator of the first source group (G1)
    pub fn g1(&self) -> &G1Affine {
        &self.g1
    }

    /// Generator of the second source group (G2)
    pub fn g2(&self) -> &G2Affine {
        &self.g2
    }

    /// Order of the scalar field shared by G1 and G2
    pub fn order(&self) -> &BigUint {
        &self.order
    }

    /// Draw a uniformly random scalar below the group order from the OS
    /// entropy source.
    pub fn random_within_order(&self) -> Result<Fr, EntropyError> {
        random_scalar::<Fr>()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_ec::PrimeGroup;

    #[test]
    fn test_generators_match_curve() {
        let params = PairingParams::new();
        assert_eq!(
            params.g1().into_group(),
            ark_bls12_381::G1Projective::generator()
        );
        assert_eq!(
            params.g2().into_group(),
            ark_bls12_381::G2Projective::generator()
        );
    }

    #[test]
    fn test_order_is_scalar_modulus() {
        let params = PairingParams::new();
        // r = 0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001
        let expected = BigUint::parse_bytes(
            b"73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001",
            16,
        )
        .unwrap();
        assert_eq!(params.order(), &expected);
    }

    #[test]
    fn test_random_within_order() {
        let params = PairingParams::new();
        let a = params.random_within_order().unwrap();
        let b = params.random_within_order().unwrap();
        assert_ne!(a, b);
    }
}
