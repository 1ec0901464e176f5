//! Bucket accumulation and the running-sum bucket reduction
use super::try_vec;
use crate::{errors::MsmError, traits::MsmAffine};
use rayon::{prelude::*, slice::ChunksMut as ParChunksMut};
use std::slice::ChunksMut;

/// One private row of `n_buckets` accumulators per worker.
///
/// Rows are handed out with `par_rows_mut` or `rows_mut`, so a row is only
/// ever touched by the worker that owns it and needs no synchronization. A row
/// is reused across every chunk its worker handles and is reset at the start
/// of each one.
pub(crate) struct BucketMatrix<A: MsmAffine> {
  buckets: Vec<A::Point>,
  n_buckets: usize,
}

impl<A: MsmAffine> BucketMatrix<A> {
  pub fn new(n_workers: usize, n_buckets: usize) -> Result<Self, MsmError> {
    let len = n_workers.checked_mul(n_buckets).unwrap_or(usize::MAX);
    Ok(BucketMatrix {
      buckets: try_vec("bucket matrix", A::zero(), len)?,
      n_buckets,
    })
  }

  /// Splits the matrix into disjoint per-worker rows
  pub fn par_rows_mut(&mut self) -> ParChunksMut<'_, A::Point> {
    self.buckets.par_chunks_mut(self.n_buckets)
  }

  /// Same as `par_rows_mut`, for the calling thread
  pub fn rows_mut(&mut self) -> ChunksMut<'_, A::Point> {
    self.buckets.chunks_mut(self.n_buckets)
  }
}

/// Resets `buckets` and sorts every base into the bucket its digit names.
///
/// `digits` yields one digit per base, in the same order as `bases`.
pub(crate) fn accumulate<A: MsmAffine>(
  buckets: &mut [A::Point],
  digits: impl Iterator<Item = i16>,
  bases: &[A],
) {
  buckets.iter_mut().for_each(|b| *b = A::zero());

  for (digit, base) in digits.zip(bases) {
    match digit {
      d if d > 0 => A::add_assign(&mut buckets[d as usize - 1], base),
      d if d < 0 => A::sub_assign(&mut buckets[(-(d as i32)) as usize - 1], base),
      _ => {}
    }
  }
}

/// Computes `sum_{k=1..n} k * buckets[k-1]` with `2n` additions.
///
/// `running_sum` holds `sum_{m >= k} buckets[m-1]` while walking from the top
/// bucket down; adding it once per step weighs bucket `k` exactly `k` times.
pub(crate) fn reduce<A: MsmAffine>(buckets: &[A::Point]) -> A::Point {
  let Some((top, rest)) = buckets.split_last() else {
    return A::zero();
  };

  let mut running_sum = *top;
  let mut res = *top;
  rest.iter().rev().for_each(|b| {
    running_sum = A::add_points(&running_sum, b);
    res = A::add_points(&res, &running_sum);
  });
  res
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{ToyPoint, TOY_MODULUS};
  use proptest::{collection::vec, prelude::*};

  #[test]
  fn test_accumulate_signed_digits() {
    let bases = [ToyPoint(10), ToyPoint(20), ToyPoint(30), ToyPoint(40)];
    // garbage from a previous chunk must be cleared
    let mut buckets = vec![ToyPoint(7); 4];
    accumulate(&mut buckets, [1i16, -4, 0, 1].into_iter(), &bases);

    assert_eq!(
      buckets,
      vec![
        ToyPoint(50),
        ToyPoint(0),
        ToyPoint(0),
        ToyPoint(TOY_MODULUS - 20)
      ]
    );
  }

  #[test]
  fn test_reduce_small() {
    // 1*3 + 2*5 + 3*7 = 34
    let buckets = [ToyPoint(3), ToyPoint(5), ToyPoint(7)];
    assert_eq!(reduce::<ToyPoint>(&buckets), ToyPoint(34));
    assert_eq!(reduce::<ToyPoint>(&buckets[..1]), ToyPoint(3));
    assert_eq!(reduce::<ToyPoint>(&[]), ToyPoint(0));
  }

  #[test]
  fn test_bucket_matrix_rows_are_disjoint() {
    let expected = vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2];

    let mut matrix = BucketMatrix::<ToyPoint>::new(3, 4).unwrap();
    matrix
      .par_rows_mut()
      .enumerate()
      .for_each(|(w, row)| row.iter_mut().for_each(|b| b.0 = w as u64));
    assert_eq!(matrix.buckets.iter().map(|b| b.0).collect::<Vec<_>>(), expected);

    let mut matrix = BucketMatrix::<ToyPoint>::new(3, 4).unwrap();
    matrix
      .rows_mut()
      .enumerate()
      .for_each(|(w, row)| row.iter_mut().for_each(|b| b.0 = w as u64));
    assert_eq!(matrix.buckets.iter().map(|b| b.0).collect::<Vec<_>>(), expected);
  }

  #[test]
  fn test_bucket_matrix_too_large() {
    assert!(matches!(
      BucketMatrix::<ToyPoint>::new(usize::MAX, 2),
      Err(MsmError::AllocationFailed { len: usize::MAX, .. })
    ));
  }

  proptest! {
    #[test]
    fn test_reduce_matches_weighted_sum(values in vec(0..TOY_MODULUS, 1..64)) {
      let buckets: Vec<_> = values.iter().map(|v| ToyPoint(*v)).collect();
      let expected = values
        .iter()
        .enumerate()
        .fold(0u128, |acc, (k, v)| {
          (acc + (k as u128 + 1) * u128::from(*v)) % u128::from(TOY_MODULUS)
        });
      prop_assert_eq!(reduce::<ToyPoint>(&buckets), ToyPoint(expected as u64));
    }
  }
}
