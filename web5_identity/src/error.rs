// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// Errors produced by the tenanted record store (C6) and the identity
/// and permissions APIs built on top of it (C7).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("a record already exists for this logical id")]
  DuplicateEntry,

  #[error("write rejected with status {0}")]
  WriteRejected(u16),

  #[error("record has no data")]
  RecordMissing,

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StoreError>;

/// Permission-specific failures (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
  #[error("grant has been revoked")]
  GrantRevoked,

  #[error("grant expired")]
  GrantExpired,

  #[error("scope mismatch")]
  ScopeMismatch,

  #[error(transparent)]
  Store(#[from] StoreError),
}

pub type PermissionResult<T> = core::result::Result<T, PermissionError>;
