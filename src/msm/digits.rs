//! Signed-digit decomposition of packed scalars
use super::{try_vec, Workers};
use crate::errors::MsmError;
use rayon::prelude::*;

/// `n_points x n_chunks` signed digits, row-major by point.
///
/// A digit `d > 0` adds its point to bucket `d - 1`, `d < 0` subtracts it from
/// bucket `-d - 1`, and `0` skips it.
pub(crate) struct DigitMatrix {
  digits: Vec<i16>,
  n_chunks: usize,
}

impl DigitMatrix {
  /// Slices `n_points` packed little-endian scalars of `stride` bytes into
  /// balanced `bits_per_chunk`-bit digits, one row per point.
  pub fn new(
    scalars: &[u8],
    stride: usize,
    scalar_bits: usize,
    n_points: usize,
    n_chunks: usize,
    bits_per_chunk: usize,
    workers: Workers,
  ) -> Result<Self, MsmError> {
    let len = n_points.checked_mul(n_chunks).unwrap_or(usize::MAX);
    let mut digits = try_vec("digit matrix", 0i16, len)?;
    let scalars = &scalars[..n_points * stride];
    let slice = |(row, scalar): (&mut [i16], &[u8])| {
      slice_scalar(row, scalar, scalar_bits, bits_per_chunk)
    };

    match workers {
      Workers::Pool(_) => digits
        .par_chunks_mut(n_chunks)
        .zip(scalars.par_chunks(stride))
        .for_each(slice),
      Workers::Sequential => digits
        .chunks_mut(n_chunks)
        .zip(scalars.chunks(stride))
        .for_each(slice),
    }

    Ok(DigitMatrix { digits, n_chunks })
  }

  /// Returns the digits of all points in chunk `j`
  pub fn column(&self, j: usize) -> impl Iterator<Item = i16> + '_ {
    self.digits.iter().skip(j).step_by(self.n_chunks).copied()
  }

  /// Returns the digits of point `i`, least significant chunk first
  #[cfg(test)]
  pub fn row(&self, i: usize) -> &[i16] {
    &self.digits[i * self.n_chunks..(i + 1) * self.n_chunks]
  }
}

/// Fills `row` with the balanced digits of one scalar.
///
/// Each raw window `v` (plus the incoming carry) in `[nBuckets, 2^w]` is
/// replaced by `v - 2^w` and a carry of one moves to the next chunk.
fn slice_scalar(row: &mut [i16], scalar: &[u8], scalar_bits: usize, bits_per_chunk: usize) {
  let n_buckets = 1u32 << (bits_per_chunk - 1);
  let mut carry = 0u32;

  for (j, digit) in row.iter_mut().enumerate() {
    let v = window(scalar, scalar_bits, j * bits_per_chunk, bits_per_chunk) + carry;

    *digit = if v >= n_buckets {
      carry = 1;
      (v as i32 - 2 * n_buckets as i32) as i16
    } else {
      carry = 0;
      v as i16
    };
  }

  debug_assert_eq!(carry, 0, "carry out of the most significant chunk");
}

/// Reads bits `[start, start + width)` of a little-endian scalar, treating bits
/// at or above `scalar_bits` as zero. `width` is at most 16, so the window
/// spans at most three bytes.
fn window(scalar: &[u8], scalar_bits: usize, start: usize, width: usize) -> u32 {
  if start >= scalar_bits {
    return 0;
  }
  let end = (start + width).min(scalar_bits);
  let bytes = &scalar[start / 8..=(end - 1) / 8];

  let raw = bytes
    .iter()
    .enumerate()
    .fold(0u32, |acc, (k, b)| acc | (u32::from(*b) << (8 * k)));

  (raw >> (start % 8)) & ((1u32 << (end - start)) - 1)
}
