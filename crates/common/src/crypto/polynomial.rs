//! Random polynomials over a prime field
//!
//! A polynomial of degree `threshold - 1` whose constant term is the secret.
//! Evaluating it at `x = 1..=total` gives the shares; multiplying each
//! coefficient by the group generator gives the Feldman commitments.

use ark_ec::CurveGroup;
use ark_ff::{PrimeField, Zero};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use super::scalar::{from_biguint, modulus, random_scalar, random_scalar_from_rng};
use super::secret_share::{CommitmentSet, SecretShareError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial<F: PrimeField> {
    /// `coefficients[0]` is the secret
    coefficients: Vec<F>,
}

impl<F: PrimeField> Polynomial<F> {
    /// Build a random polynomial hiding `secret` for a `threshold`-of-`total`
    /// split, drawing coefficients from the OS entropy source.
    ///
    /// # Errors
    ///
    /// - [`SecretShareError::InvalidTotalShareNumber`] if `total < 2`
    /// - [`SecretShareError::InvalidShareNumber`] unless `1 <= threshold <= total`
    /// - [`SecretShareError::SecretOutOfRange`] if the big-endian secret is not
    ///   below the field modulus
    pub fn random(total: usize, threshold: usize, secret: &[u8]) -> Result<Self, SecretShareError> {
        let constant = validate(total, threshold, secret)?;
        let mut coefficients = Vec::with_capacity(threshold);
        coefficients.push(constant);
        for _ in 1..threshold {
            coefficients.push(random_scalar::<F>()?);
        }
        Ok(Self { coefficients })
    }

    /// Same as [`Polynomial::random`] with coefficients drawn from `rng`
    pub fn random_with_rng<R>(
        total: usize,
        threshold: usize,
        secret: &[u8],
        rng: &mut R,
    ) -> Result<Self, SecretShareError>
    where
        R: RngCore + CryptoRng,
    {
        let constant = validate(total, threshold, secret)?;
        let mut coefficients = Vec::with_capacity(threshold);
        coefficients.push(constant);
        for _ in 1..threshold {
            coefficients.push(random_scalar_from_rng::<F, R>(rng));
        }
        Ok(Self { coefficients })
    }

    pub fn from_coefficients(coefficients: Vec<F>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[F] {
        &self.coefficients
    }

    pub fn secret(&self) -> F {
        self.coefficients.first().copied().unwrap_or_else(F::zero)
    }

    /// Horner evaluation at `x`
    pub fn evaluate(&self, x: &F) -> F {
        self.coefficients
            .iter()
            .rev()
            .fold(F::zero(), |acc, coefficient| acc * x + coefficient)
    }

    /// The share handed to participant `index`
    ///
    /// Index 0 would reveal the secret and is refused.
    pub fn share_for_index(&self, index: u64) -> Result<F, SecretShareError> {
        if index == 0 {
            return Err(SecretShareError::InvalidShare(
                "share index 0 is the secret itself".to_string(),
            ));
        }
        Ok(self.evaluate(&F::from(index)))
    }

    /// Feldman commitments `C_j = coefficient_j · G`
    pub fn commitments<C>(&self) -> CommitmentSet<C>
    where
        C: CurveGroup<ScalarField = F>,
    {
        let generator = C::generator();
        let points = self
            .coefficients
            .iter()
            .map(|coefficient| generator * coefficient)
            .collect::<Vec<C>>();
        CommitmentSet::new(C::normalize_batch(&points))
    }

    /// Commitment to the secret alone, `secret · G`
    pub fn secret_commitment<C>(&self) -> C::Affine
    where
        C: CurveGroup<ScalarField = F>,
    {
        (C::generator() * self.secret()).into_affine()
    }
}

fn validate<F: PrimeField>(total: usize, threshold: usize, secret: &[u8]) -> Result<F, SecretShareError> {
    if total < 2 {
        return Err(SecretShareError::InvalidTotalShareNumber(total));
    }
    if threshold == 0 || threshold > total {
        return Err(SecretShareError::InvalidShareNumber { threshold, total });
    }
    let value = BigUint::from_bytes_be(secret);
    if value >= modulus::<F>() {
        return Err(SecretShareError::SecretOutOfRange);
    }
    Ok(from_biguint(&value))
}
