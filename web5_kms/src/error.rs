// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// Errors produced by a [`crate::Kms`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum KmsError {
  #[error("key not found: {0}")]
  NotFound(String),

  #[error("unsupported algorithm: {0}")]
  UnsupportedAlgorithm(String),

  #[error("key is not exportable")]
  NotExportable,

  #[error("bad key: {0}")]
  BadKey(String),

  #[error(transparent)]
  Crypto(#[from] web5_crypto::CryptoError),

  #[error(transparent)]
  Jose(#[from] web5_jose::JoseError),
}

pub type Result<T> = core::result::Result<T, KmsError>;
