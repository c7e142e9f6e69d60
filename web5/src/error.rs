// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// The error type application code sees: every crate's error wrapped by
/// `#[from]`, so a caller of [`crate::Agent`] matches one type instead of
/// threading each sub-crate's error through its own call sites.
#[derive(Debug, thiserror::Error)]
pub enum Web5Error {
  #[error(transparent)]
  Crypto(#[from] web5_crypto::CryptoError),

  #[error(transparent)]
  Jose(#[from] web5_jose::JoseError),

  #[error(transparent)]
  Kms(#[from] web5_kms::KmsError),

  #[error(transparent)]
  Did(#[from] web5_dids::DidError),

  #[error(transparent)]
  Store(#[from] web5_identity::StoreError),

  #[error(transparent)]
  Permission(#[from] web5_identity::PermissionError),

  #[error(transparent)]
  Connect(#[from] web5_connect::ConnectError),

  #[error(transparent)]
  Rpc(#[from] web5_rpc::RpcError),
}

pub type Result<T> = core::result::Result<T, Web5Error>;
