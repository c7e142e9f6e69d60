// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// Errors produced by the primitive crypto operations.
///
/// These map directly onto the taxonomy in the design: callers one layer
/// up (`web5_jose`, `web5_kms`) re-wrap these as needed but never invent
/// a new crypto failure mode of their own.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
  #[error("unsupported algorithm: {0}")]
  UnsupportedAlgorithm(&'static str),

  #[error("invalid key: {0}")]
  InvalidKey(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("operation failed: {0}")]
  OperationFailed(String),
}
