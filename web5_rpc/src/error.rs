// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

/// Errors from the JSON-RPC transport (C10): standard JSON-RPC codes
/// (spec §6), the application-specific codes record-nodes return, and
/// the usual transport failure modes.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
  #[error("JSON-RPC error {code}: {message}")]
  Remote { code: i64, message: String },

  #[error("request timed out after {0:?}")]
  Timeout(std::time::Duration),

  #[error("network error: {0}")]
  NetworkError(String),

  #[error("unexpected HTTP status: {0}")]
  HttpStatus(u16),

  #[error("malformed JSON-RPC response: {0}")]
  MalformedResponse(String),

  #[error("subscription closed by the server")]
  SubscriptionClosed,

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, RpcError>;

/// The standard JSON-RPC 2.0 error codes (spec §6).
pub mod codes {
  pub const PARSE_ERROR: i64 = -32700;
  pub const INVALID_REQUEST: i64 = -32600;
  pub const METHOD_NOT_FOUND: i64 = -32601;
  pub const INVALID_PARAMS: i64 = -32602;
  pub const INTERNAL_ERROR: i64 = -32603;

  /// Application-specific codes record-nodes return alongside the
  /// standard JSON-RPC range.
  pub const BAD_REQUEST: i64 = -50400;
  pub const UNAUTHORIZED: i64 = -50401;
  pub const FORBIDDEN: i64 = -50403;
  pub const CONFLICT: i64 = -50409;
}
