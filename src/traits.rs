//! This module defines the group capability the MSM engine is generic over
use core::fmt::Debug;
use halo2curves::{group::Group, CurveAffine};

/// An affine group element that can be accumulated into a `Point`.
///
/// The engine only ever adds, subtracts and doubles; it never inspects
/// coordinates. Implementations must be an exact abelian group so that the
/// result does not depend on the order in which terms are accumulated.
pub trait MsmAffine: Copy + Send + Sync {
  /// The accumulator representation (e.g. projective coordinates)
  type Point: Copy + Send + Sync + Eq + Debug;

  /// Returns the group identity
  fn zero() -> Self::Point;

  /// Sets `acc = acc + base`
  fn add_assign(acc: &mut Self::Point, base: &Self);

  /// Sets `acc = acc - base`
  fn sub_assign(acc: &mut Self::Point, base: &Self);

  /// Returns `a + b`
  fn add_points(a: &Self::Point, b: &Self::Point) -> Self::Point;

  /// Returns `2 * p`
  fn double(p: &Self::Point) -> Self::Point;

  /// Multiplies `self` by a little-endian scalar of `scalar_bits` bits.
  ///
  /// Bits past `scalar_bits` are ignored, as are bytes past the end of `scalar`.
  fn mul_by_scalar(&self, scalar: &[u8], scalar_bits: usize) -> Self::Point {
    (0..scalar_bits)
      .rev()
      .filter(|bit| bit / 8 < scalar.len())
      .fold(Self::zero(), |acc, bit| {
        let mut acc = Self::double(&acc);
        if (scalar[bit / 8] >> (bit % 8)) & 1 == 1 {
          Self::add_assign(&mut acc, self);
        }
        acc
      })
  }
}

impl<C: CurveAffine> MsmAffine for C {
  type Point = C::Curve;

  fn zero() -> C::Curve {
    C::Curve::identity()
  }

  fn add_assign(acc: &mut C::Curve, base: &C) {
    *acc += base;
  }

  fn sub_assign(acc: &mut C::Curve, base: &C) {
    *acc -= base;
  }

  fn add_points(a: &C::Curve, b: &C::Curve) -> C::Curve {
    *a + b
  }

  fn double(p: &C::Curve) -> C::Curve {
    p.double()
  }
}
