//! This module defines errors returned by the library.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the multi-scalar multiplication routines
#[derive(Clone, Debug, Eq, PartialEq, Error, Serialize, Deserialize)]
pub enum MsmError {
  /// returned if a points or scalars buffer is too short for the requested number of terms
  #[error("InvalidInputLength: {what} has {actual} entries, expected at least {expected}")]
  InvalidInputLength {
    /// which input was short
    what: String,
    /// the minimum length required
    expected: usize,
    /// the length supplied
    actual: usize,
  },
  /// returned if the scalar bit width is zero or exceeds its byte stride
  #[error("InvalidScalarWidth: {scalar_bits} bits do not fit a stride of {stride} bytes")]
  InvalidScalarWidth {
    /// the requested scalar width in bits
    scalar_bits: usize,
    /// the per-scalar stride in bytes
    stride: usize,
  },
  /// returned if the window width is outside the supported range
  #[error("InvalidBitsPerChunk: {bits}")]
  InvalidBitsPerChunk {
    /// the rejected window width
    bits: usize,
  },
  /// returned if a worker pool of the requested size cannot be built
  #[error("WorkerCountUnavailable: {requested} workers ({reason})")]
  WorkerCountUnavailable {
    /// the requested number of workers
    requested: usize,
    /// why the pool could not be built
    reason: String,
  },
  /// returned if scratch memory for the digit or bucket matrices cannot be reserved
  #[error("AllocationFailed: could not reserve {len} entries for {what}")]
  AllocationFailed {
    /// which scratch buffer failed
    what: String,
    /// the number of entries requested
    len: usize,
  },
}
