//! Front ends that pack typed scalars into the byte layout `msm` consumes
use super::msm;
use crate::{config::MsmConfig, errors::MsmError, traits::MsmAffine};
use ff::PrimeField;
use halo2curves::CurveAffine;

fn num_bits(n: u64) -> usize {
  if n == 0 {
    0
  } else {
    (n.ilog2() + 1) as usize
  }
}

fn check_lengths(n_scalars: usize, n_bases: usize) -> Result<(), MsmError> {
  if n_scalars != n_bases {
    return Err(MsmError::InvalidInputLength {
      what: "bases".to_string(),
      expected: n_scalars,
      actual: n_bases,
    });
  }
  Ok(())
}

/// Multi-scalar multiplication over field-element scalars.
///
/// Scalars are read through their canonical little-endian representation,
/// so the width is the field's `NUM_BITS`.
pub fn msm_field<C: CurveAffine>(
  scalars: &[C::Scalar],
  bases: &[C],
  config: &MsmConfig,
) -> Result<C::Curve, MsmError> {
  check_lengths(scalars.len(), bases.len())?;

  let scalar_bits = C::Scalar::NUM_BITS as usize;
  let stride = scalar_bits.div_ceil(8);
  let repr_len = <C::Scalar as PrimeField>::Repr::default().as_ref().len();
  if stride > repr_len {
    return Err(MsmError::InvalidScalarWidth {
      scalar_bits,
      stride: repr_len,
    });
  }

  let mut bytes = vec![0u8; scalars.len() * stride];
  bytes
    .chunks_mut(stride)
    .zip(scalars)
    .for_each(|(dst, s)| dst.copy_from_slice(&s.to_repr().as_ref()[..stride]));

  msm(bases, &bytes, scalar_bits, scalars.len(), config)
}

/// Multi-scalar multiplication over small unsigned integer scalars.
///
/// The width is that of the largest scalar, so e.g. bit-valued scalars are
/// sliced into a single chunk.
pub fn msm_small<A: MsmAffine, T: Into<u64> + Copy>(
  scalars: &[T],
  bases: &[A],
  config: &MsmConfig,
) -> Result<A::Point, MsmError> {
  check_lengths(scalars.len(), bases.len())?;

  let max_num_bits = scalars
    .iter()
    .map(|s| num_bits((*s).into()))
    .max()
    .unwrap_or(0);
  if max_num_bits == 0 {
    return Ok(A::zero());
  }

  let bytes = pack_le(scalars, max_num_bits.div_ceil(8));
  msm(bases, &bytes, max_num_bits, scalars.len(), config)
}

/// Packs integers as consecutive little-endian `stride`-byte scalars
fn pack_le<T: Into<u64> + Copy>(scalars: &[T], stride: usize) -> Vec<u8> {
  let mut bytes = vec![0u8; scalars.len() * stride];
  bytes
    .chunks_mut(stride)
    .zip(scalars)
    .for_each(|(dst, s)| {
      let s: u64 = (*s).into();
      dst.copy_from_slice(&s.to_le_bytes()[..stride]);
    });
  bytes
}
