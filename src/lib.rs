//! This library implements multi-scalar multiplication (MSM) with the
//! Pippenger bucket method over balanced signed digits.
#![deny(
  warnings,
  unused,
  future_incompatible,
  nonstandard_style,
  rust_2018_idioms,
  missing_docs
)]
#![allow(non_snake_case)]
#![forbid(unsafe_code)]

// private modules
mod constants;

// public modules
pub mod config;
pub mod errors;
pub mod msm;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::MsmConfig;
pub use errors::MsmError;
pub use msm::{msm, msm_field, msm_into, msm_small};
pub use traits::MsmAffine;
