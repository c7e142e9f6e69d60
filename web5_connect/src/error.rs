// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// Errors produced by the wallet-connect handshake (C9). Spec §7:
/// wallet-connect must not throw uncaught errors into the calling
/// context once `init_client` has returned; every failure mode here is
/// surfaced through `Result`, and the facade maps these onto the
/// `on_error`/`on_timeout`/`on_denied` application callbacks.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
  #[error("polling deadline reached before a response arrived")]
  Timeout,

  #[error("network error: {0}")]
  NetworkError(String),

  #[error("pushed authorization request was rejected: HTTP {0}")]
  HttpStatus(u16),

  #[error("decryption failed")]
  Decrypt,

  #[error("signature verification failed")]
  SignatureInvalid,

  #[error("invalid response: {0}")]
  InvalidResponse(String),

  #[error(transparent)]
  Crypto(#[from] web5_crypto::CryptoError),

  #[error(transparent)]
  Jose(#[from] web5_jose::JoseError),

  #[error(transparent)]
  Kms(#[from] web5_kms::KmsError),

  #[error(transparent)]
  Did(#[from] web5_dids::DidError),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, ConnectError>;
