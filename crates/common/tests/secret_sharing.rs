//! Integration tests for verifiable secret sharing over different curves

use ark_ec::{CurveGroup, PrimeGroup};
use ark_ff::{BigInteger, PrimeField};

use ::common::crypto::{
    reconstruct, split, split_with_commitments, CommitmentSet, Polynomial, SecretShareError,
    Share, ShareSet,
};

fn every_quorum_recovers<C: CurveGroup>(secret: &[u8]) {
    let (shares, commitments) = split_with_commitments::<C>(secret, 5, 3).unwrap();

    for (index, value) in shares.iter() {
        assert!(commitments.verify_share(index, value));
    }

    for a in 1..=5u64 {
        for b in (a + 1)..=5 {
            assert_ne!(
                reconstruct(&shares.subset(&[a, b]).unwrap()).unwrap(),
                secret.to_vec()
            );
            for c in (b + 1)..=5 {
                let quorum = shares.subset(&[a, b, c]).unwrap();
                assert_eq!(reconstruct(&quorum).unwrap(), secret.to_vec());
            }
        }
    }

    // more than the threshold works too
    assert_eq!(reconstruct(&shares).unwrap(), secret.to_vec());
}

#[test]
fn test_bls12_381_g1() {
    every_quorum_recovers::<ark_bls12_381::G1Projective>(b"bls12-381 secret");
}

#[test]
fn test_bls12_381_g2() {
    every_quorum_recovers::<ark_bls12_381::G2Projective>(b"bls12-381 g2 secret");
}

#[test]
fn test_bn254_g1() {
    every_quorum_recovers::<ark_bn254::G1Projective>(b"bn254 secret");
}

#[test]
fn test_commitments_match_polynomial() {
    type G = ark_bn254::G1Projective;
    let polynomial = Polynomial::<ark_bn254::Fr>::random(4, 3, b"poly").unwrap();
    let commitments: CommitmentSet<G> = polynomial.commitments();

    for (point, coefficient) in commitments.points().iter().zip(polynomial.coefficients()) {
        assert_eq!(*point, (G::generator() * coefficient).into_affine());
    }
    assert_eq!(
        commitments.secret_commitment(),
        Some(&polynomial.secret_commitment::<G>())
    );
}

#[test]
fn test_secret_range_depends_on_curve() {
    // 2^254 is below the BLS12-381 scalar modulus but above BN254's
    let mut secret = vec![0u8; 32];
    secret[0] = 0x40;
    assert!(split::<ark_bls12_381::G1Projective>(&secret, 3, 2).is_ok());
    assert!(matches!(
        split::<ark_bn254::G1Projective>(&secret, 3, 2),
        Err(SecretShareError::SecretOutOfRange)
    ));
}

#[test]
fn test_shares_travel_as_strings() {
    type F = ark_bls12_381::Fr;
    let shares = split::<ark_bls12_381::G1Projective>(b"over the wire", 4, 2).unwrap();

    let rendered: Vec<String> = shares.to_shares().iter().map(|s| s.to_string()).collect();
    let mut received = ShareSet::<F>::new();
    for line in rendered.iter().skip(2) {
        let share: Share<F> = line.parse().unwrap();
        received.insert(share.index, share.value).unwrap();
    }
    assert_eq!(reconstruct(&received).unwrap(), b"over the wire".to_vec());
}

#[test]
fn test_max_secret_below_modulus() {
    type F = ark_bls12_381::Fr;
    let mut secret = F::MODULUS.to_bytes_be();
    // modulus - 1
    if let Some(last) = secret.last_mut() {
        *last -= 1;
    }
    let shares = split::<ark_bls12_381::G1Projective>(&secret, 3, 3).unwrap();
    assert_eq!(reconstruct(&shares).unwrap(), secret);
}
