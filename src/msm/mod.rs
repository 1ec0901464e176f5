//! This module provides the multi-scalar multiplication engine.
//!
//! Scalars are cut into balanced signed digits of `w` bits, so each chunk only
//! needs `2^(w-1)` buckets. Chunks are processed in parallel on a pool private
//! to the call; each worker owns one bucket row which it resets and reuses for
//! every chunk assigned to it. The per-chunk sums are then folded together
//! with `w` doublings between consecutive chunks.
use crate::{
  config::{bucket_count, chunk_count, MsmConfig},
  errors::MsmError,
  traits::MsmAffine,
};
use rayon::prelude::*;
use tracing::{debug, info_span, warn};

mod buckets;
mod digits;
mod small;

use buckets::{accumulate, reduce, BucketMatrix};
use digits::DigitMatrix;
pub use small::{msm_field, msm_small};

/// Where the slicing and bucket phases run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Workers {
  /// rayon iterators inside an installed pool of this many threads
  Pool(usize),
  /// plain loops on the calling thread, used when no pool can be built
  Sequential,
}

impl Workers {
  fn count(self) -> usize {
    match self {
      Workers::Pool(n) => n,
      Workers::Sequential => 1,
    }
  }
}

/// Allocates `len` copies of `value`, reporting failure instead of aborting
fn try_vec<T: Clone>(what: &str, value: T, len: usize) -> Result<Vec<T>, MsmError> {
  let mut v = Vec::new();
  v.try_reserve_exact(len)
    .map_err(|_| MsmError::AllocationFailed {
      what: what.to_string(),
      len,
    })?;
  v.resize(len, value);
  Ok(v)
}

/// Computes `sum_{i < n} s_i * bases[i]`.
///
/// `scalars` holds `n` little-endian integers of `scalar_bits` bits, each
/// packed into `ceil(scalar_bits / 8)` bytes. Trailing entries of `bases` or
/// `scalars` beyond the first `n` are ignored.
///
/// The result does not depend on `config`: worker count and window width
/// only affect speed.
#[tracing::instrument(skip_all, name = "msm", fields(n = n, scalar_bits = scalar_bits))]
pub fn msm<A: MsmAffine>(
  bases: &[A],
  scalars: &[u8],
  scalar_bits: usize,
  n: usize,
  config: &MsmConfig,
) -> Result<A::Point, MsmError> {
  let stride = validate_inputs(bases, scalars, scalar_bits, n)?;
  let bits_per_chunk = config.bits_per_chunk(n, scalar_bits)?;

  match n {
    0 => return Ok(A::zero()),
    1 => return Ok(bases[0].mul_by_scalar(&scalars[..stride], scalar_bits)),
    _ => {}
  }

  let bases = &bases[..n];
  let scalars = &scalars[..n * stride];
  let run = |workers: Workers| {
    pippenger(
      bases,
      scalars,
      stride,
      scalar_bits,
      bits_per_chunk,
      workers,
    )
  };

  match config.build_pool() {
    Ok(pool) => {
      let workers = Workers::Pool(pool.current_num_threads());
      pool.install(|| run(workers))
    }
    Err(e) => {
      warn!("{e}; falling back to the calling thread");
      run(Workers::Sequential)
    }
  }
}

/// Same as [`msm`], but stores the result in `out`.
///
/// `out` is left untouched when an error is returned.
pub fn msm_into<A: MsmAffine>(
  out: &mut A::Point,
  bases: &[A],
  scalars: &[u8],
  scalar_bits: usize,
  n: usize,
  config: &MsmConfig,
) -> Result<(), MsmError> {
  *out = msm(bases, scalars, scalar_bits, n, config)?;
  Ok(())
}

/// Checks buffer lengths and returns the per-scalar stride in bytes
fn validate_inputs<A>(
  bases: &[A],
  scalars: &[u8],
  scalar_bits: usize,
  n: usize,
) -> Result<usize, MsmError> {
  let stride = scalar_bits.div_ceil(8);
  if scalar_bits == 0 {
    return Err(MsmError::InvalidScalarWidth {
      scalar_bits,
      stride,
    });
  }

  if bases.len() < n {
    return Err(MsmError::InvalidInputLength {
      what: "bases".to_string(),
      expected: n,
      actual: bases.len(),
    });
  }

  let expected = n.checked_mul(stride).unwrap_or(usize::MAX);
  if scalars.len() < expected {
    return Err(MsmError::InvalidInputLength {
      what: "scalars".to_string(),
      expected,
      actual: scalars.len(),
    });
  }

  Ok(stride)
}

fn pippenger<A: MsmAffine>(
  bases: &[A],
  scalars: &[u8],
  stride: usize,
  scalar_bits: usize,
  bits_per_chunk: usize,
  workers: Workers,
) -> Result<A::Point, MsmError> {
  let n_points = bases.len();
  let n_chunks = chunk_count(scalar_bits, bits_per_chunk);
  let n_buckets = bucket_count(bits_per_chunk);
  debug!(
    n_points,
    scalar_bits,
    bits_per_chunk,
    n_chunks,
    n_buckets,
    n_workers = workers.count(),
    "starting msm"
  );

  let digits = info_span!("msm::slice").in_scope(|| {
    DigitMatrix::new(
      scalars,
      stride,
      scalar_bits,
      n_points,
      n_chunks,
      bits_per_chunk,
      workers,
    )
  })?;

  let chunk_sums = info_span!("msm::buckets")
    .in_scope(|| chunk_sums(&digits, bases, n_chunks, n_buckets, workers))?;

  Ok(info_span!("msm::combine").in_scope(|| combine::<A>(&chunk_sums, bits_per_chunk)))
}

/// Computes the weighted bucket sum of every chunk.
///
/// Chunk indices are split into at most `workers.count()` contiguous runs;
/// each run is paired with its own bucket row and its own slice of the output,
/// so no two workers share mutable state.
fn chunk_sums<A: MsmAffine>(
  digits: &DigitMatrix,
  bases: &[A],
  n_chunks: usize,
  n_buckets: usize,
  workers: Workers,
) -> Result<Vec<A::Point>, MsmError> {
  let n_rows = workers.count().clamp(1, n_chunks);
  let per_worker = n_chunks.div_ceil(n_rows);

  let mut sums = try_vec("chunk sums", A::zero(), n_chunks)?;
  let mut matrix = BucketMatrix::<A>::new(n_rows, n_buckets)?;

  let run = |(buckets, (worker, out)): (&mut [A::Point], (usize, &mut [A::Point]))| {
    for (k, sum) in out.iter_mut().enumerate() {
      let j = worker * per_worker + k;
      accumulate(buckets, digits.column(j), bases);
      *sum = reduce::<A>(buckets);
    }
  };

  match workers {
    Workers::Pool(_) => matrix
      .par_rows_mut()
      .zip(sums.par_chunks_mut(per_worker).enumerate())
      .for_each(run),
    Workers::Sequential => matrix
      .rows_mut()
      .zip(sums.chunks_mut(per_worker).enumerate())
      .for_each(run),
  }

  Ok(sums)
}

/// Horner's rule over chunks: `sum_j sums[j] * 2^(j * w)`
fn combine<A: MsmAffine>(sums: &[A::Point], bits_per_chunk: usize) -> A::Point {
  let Some((top, rest)) = sums.split_last() else {
    return A::zero();
  };

  rest.iter().rev().fold(*top, |acc, sum| {
    let acc = (0..bits_per_chunk).fold(acc, |acc, _| A::double(&acc));
    A::add_points(&acc, sum)
  })
}
