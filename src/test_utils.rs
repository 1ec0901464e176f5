//! Helpers shared by the unit tests: an exact toy group and reference MSMs
use crate::traits::MsmAffine;
use rand::{Rng, RngCore};

/// The Mersenne prime `2^61 - 1`
pub(crate) const TOY_MODULUS: u64 = (1 << 61) - 1;

/// The additive group of integers modulo `TOY_MODULUS`, generated by `1`.
///
/// Points are "scalars of the generator", so every group operation can be
/// checked against plain integer arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ToyPoint(pub u64);

impl ToyPoint {
  pub fn generator() -> Self {
    ToyPoint(1)
  }

  pub fn random(rng: &mut impl Rng) -> Self {
    ToyPoint(rng.gen_range(0..TOY_MODULUS))
  }
}

impl MsmAffine for ToyPoint {
  type Point = ToyPoint;

  fn zero() -> ToyPoint {
    ToyPoint(0)
  }

  fn add_assign(acc: &mut ToyPoint, base: &ToyPoint) {
    acc.0 = (acc.0 + base.0) % TOY_MODULUS;
  }

  fn sub_assign(acc: &mut ToyPoint, base: &ToyPoint) {
    acc.0 = (acc.0 + TOY_MODULUS - base.0) % TOY_MODULUS;
  }

  fn add_points(a: &ToyPoint, b: &ToyPoint) -> ToyPoint {
    ToyPoint((a.0 + b.0) % TOY_MODULUS)
  }

  fn double(p: &ToyPoint) -> ToyPoint {
    ToyPoint((p.0 << 1) % TOY_MODULUS)
  }
}

/// Reduces a little-endian scalar of `scalar_bits` bits modulo `TOY_MODULUS`
pub(crate) fn toy_scalar(scalar: &[u8], scalar_bits: usize) -> u64 {
  (0..scalar_bits)
    .rev()
    .filter(|bit| bit / 8 < scalar.len())
    .fold(0u64, |acc, bit| {
      let b = u64::from((scalar[bit / 8] >> (bit % 8)) & 1);
      ((acc << 1) + b) % TOY_MODULUS
    })
}

/// Computes `sum_i s_i * x_i` directly in the integers modulo `TOY_MODULUS`
pub(crate) fn toy_msm(bases: &[ToyPoint], scalars: &[u8], scalar_bits: usize) -> ToyPoint {
  let stride = scalar_bits.div_ceil(8);
  let sum = bases
    .iter()
    .zip(scalars.chunks(stride))
    .fold(0u128, |acc, (base, s)| {
      let term = u128::from(base.0) * u128::from(toy_scalar(s, scalar_bits));
      (acc + term) % u128::from(TOY_MODULUS)
    });
  ToyPoint(sum as u64)
}

/// Reference MSM: one double-and-add per term, summed left to right
pub(crate) fn naive_msm<A: MsmAffine>(bases: &[A], scalars: &[u8], scalar_bits: usize) -> A::Point {
  let stride = scalar_bits.div_ceil(8);
  bases
    .iter()
    .zip(scalars.chunks(stride))
    .fold(A::zero(), |acc, (base, s)| {
      A::add_points(&acc, &base.mul_by_scalar(s, scalar_bits))
    })
}

/// Random packed scalars of `scalar_bits` bits, with the unused high bits cleared
pub(crate) fn random_scalars(rng: &mut impl RngCore, n: usize, scalar_bits: usize) -> Vec<u8> {
  let stride = scalar_bits.div_ceil(8);
  let mut scalars = vec![0u8; n * stride];
  rng.fill_bytes(&mut scalars);
  if scalar_bits % 8 != 0 {
    let mask = (1u8 << (scalar_bits % 8)) - 1;
    scalars
      .chunks_mut(stride)
      .for_each(|s| s[stride - 1] &= mask);
  }
  scalars
}
