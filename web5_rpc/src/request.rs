// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC 2.0 wire types (spec §6): `{jsonrpc, id, method, params}`
//! requests, `{jsonrpc, id, result|error}` responses.

use serde::Deserialize;
use serde::Serialize;

use crate::error::RpcError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
  Number(i64),
  String(String),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JsonRpcRequest {
  pub jsonrpc: String,
  pub id: RequestId,
  pub method: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
  pub fn new(id: RequestId, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
    Self {
      jsonrpc: "2.0".to_string(),
      id,
      method: method.into(),
      params,
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JsonRpcError {
  pub code: i64,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JsonRpcResponse {
  pub jsonrpc: String,
  pub id: RequestId,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub result: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
  /// Extracts `result`, turning a populated `error` member into
  /// [`RpcError::Remote`].
  pub fn into_result(self) -> crate::error::Result<serde_json::Value> {
    if let Some(error) = self.error {
      return Err(RpcError::Remote {
        code: error.code,
        message: error.message,
      });
    }
    self
      .result
      .ok_or_else(|| RpcError::MalformedResponse("response has neither result nor error".to_string()))
  }
}

/// Monotonic request-id generator, one per client.
#[derive(Debug, Default)]
pub struct IdGenerator {
  next: std::sync::atomic::AtomicI64,
}

impl IdGenerator {
  pub fn next(&self) -> RequestId {
    RequestId::Number(self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn error_response_becomes_remote_error() {
    let response = JsonRpcResponse {
      jsonrpc: "2.0".to_string(),
      id: RequestId::Number(1),
      result: None,
      error: Some(JsonRpcError {
        code: crate::error::codes::FORBIDDEN,
        message: "nope".to_string(),
        data: None,
      }),
    };
    let err = response.into_result().unwrap_err();
    assert!(matches!(err, RpcError::Remote { code, .. } if code == crate::error::codes::FORBIDDEN));
  }

  #[test]
  fn id_generator_is_monotonic() {
    let gen = IdGenerator::default();
    let a = gen.next();
    let b = gen.next();
    assert_ne!(a, b);
  }
}
