// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// Errors produced while parsing, resolving, or signing with DIDs.
#[derive(Debug, thiserror::Error)]
pub enum DidError {
  #[error("invalid did: {0}")]
  InvalidDid(String),

  #[error("did not found: {0}")]
  NotFound(String),

  #[error("unsupported did method: {0}")]
  MethodNotSupported(String),

  #[error("network error: {0}")]
  NetworkError(String),

  #[error("not supported: {0}")]
  NotSupported(String),

  #[error("no signing method available")]
  NoSigningMethod,

  #[error("bad key: {0}")]
  BadKey(String),

  #[error("invalid cache key")]
  InvalidKey,

  #[error(transparent)]
  Kms(#[from] web5_kms::KmsError),

  #[error(transparent)]
  Jose(#[from] web5_jose::JoseError),

  #[error(transparent)]
  Crypto(#[from] web5_crypto::CryptoError),
}

pub type Result<T> = core::result::Result<T, DidError>;
