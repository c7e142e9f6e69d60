// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// Errors produced while working with JWKs, key URIs, and JWE.
#[derive(Debug, thiserror::Error)]
pub enum JoseError {
  #[error("invalid key: {0}")]
  InvalidKey(String),

  #[error("invalid jwe: {0}")]
  InvalidJwe(String),

  #[error("unsupported algorithm: {0}")]
  UnsupportedAlg(String),

  #[error("decryption failed")]
  Decrypt,

  #[error(transparent)]
  Crypto(#[from] web5_crypto::CryptoError),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error("base64 decode error: {0}")]
  Base64(#[from] base64::DecodeError),
}

pub type Result<T> = core::result::Result<T, JoseError>;
