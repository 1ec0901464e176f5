//! Per-call configuration: worker count and window width
use crate::{
  constants::{
    CARRY_HEADROOM_BITS, MAX_BITS_PER_CHUNK, MIN_BITS_PER_CHUNK, SMALL_MSM_BITS_PER_CHUNK,
    SMALL_MSM_THRESHOLD,
  },
  errors::MsmError,
};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::thread;

/// Tunable parameters of a single MSM call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsmConfig {
  /// number of workers; `0` uses every available hardware thread
  pub num_threads: usize,
  /// window width in bits; `None` picks one from the input size
  pub bits_per_chunk: Option<usize>,
}

impl MsmConfig {
  /// Sets the number of workers
  pub fn with_num_threads(mut self, num_threads: usize) -> Self {
    self.num_threads = num_threads;
    self
  }

  /// Pins the window width
  pub fn with_bits_per_chunk(mut self, bits: usize) -> Self {
    self.bits_per_chunk = Some(bits);
    self
  }

  /// Resolves `num_threads`, replacing `0` by the available parallelism
  pub fn worker_count(&self) -> usize {
    if self.num_threads != 0 {
      return self.num_threads;
    }
    thread::available_parallelism()
      .map(|n| n.get())
      .unwrap_or_else(|_| rayon::current_num_threads())
  }

  /// Builds a private worker pool sized by `worker_count`
  pub fn build_pool(&self) -> Result<ThreadPool, MsmError> {
    let requested = self.worker_count();
    ThreadPoolBuilder::new()
      .num_threads(requested)
      .thread_name(|i| format!("msm-worker-{i}"))
      .build()
      .map_err(|e| MsmError::WorkerCountUnavailable {
        requested,
        reason: e.to_string(),
      })
  }

  /// Returns the window width for `n_points` scalars of `scalar_bits` bits
  pub fn bits_per_chunk(&self, n_points: usize, scalar_bits: usize) -> Result<usize, MsmError> {
    match self.bits_per_chunk {
      Some(bits) if (MIN_BITS_PER_CHUNK..=MAX_BITS_PER_CHUNK).contains(&bits) => Ok(bits),
      Some(bits) => Err(MsmError::InvalidBitsPerChunk { bits }),
      None => Ok(default_bits_per_chunk(n_points, scalar_bits)),
    }
  }
}

/// log2(a) * ln(2), without floats
fn compute_ln(a: usize) -> usize {
  if a == 0 {
    0
  } else {
    a.ilog2() as usize * 69 / 100
  }
}

/// Picks a window so that bucket setup (`2^w` per chunk) and chunk count
/// (`scalar_bits / w`) stay balanced; larger inputs get wider windows.
pub(crate) fn default_bits_per_chunk(n_points: usize, scalar_bits: usize) -> usize {
  let c = if n_points < SMALL_MSM_THRESHOLD {
    SMALL_MSM_BITS_PER_CHUNK
  } else {
    compute_ln(n_points) + 2
  };
  c.min(scalar_bits + CARRY_HEADROOM_BITS)
    .clamp(MIN_BITS_PER_CHUNK, MAX_BITS_PER_CHUNK)
}

/// Number of signed digits needed for `scalar_bits`-bit scalars with `w`-bit windows
pub(crate) fn chunk_count(scalar_bits: usize, bits_per_chunk: usize) -> usize {
  (scalar_bits + CARRY_HEADROOM_BITS).div_ceil(bits_per_chunk)
}

/// Number of buckets per chunk, `2^(w-1)`
pub(crate) fn bucket_count(bits_per_chunk: usize) -> usize {
  1 << (bits_per_chunk - 1)
}
