// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The RPC client applications hold: request/response calls over HTTP,
//! subscriptions over WebSocket, both against the same record-node URL.

use crate::bytes::ByteSource;
use crate::config::RpcConfig;
use crate::error::Result;
use crate::http::HttpTransport;
use crate::http::ServerInfo;
use crate::ws::subscribe;
use crate::ws::Subscription;

pub struct RpcClient {
  http: HttpTransport,
}

impl RpcClient {
  pub fn new(config: RpcConfig) -> Result<Self> {
    Ok(Self {
      http: HttpTransport::new(config)?,
    })
  }

  /// Sends a JSON-RPC request and returns its `result`, plus any
  /// accompanying data stream the record-node attached (spec §6).
  pub async fn call(
    &self,
    url: &str,
    method: &str,
    params: Option<serde_json::Value>,
  ) -> Result<(serde_json::Value, Option<ByteSource>)> {
    self.http.call(url, method, params).await
  }

  /// Fetches the record-node's capability descriptor, cached per-URL.
  pub async fn get_info(&self, url: &str) -> Result<ServerInfo> {
    self.http.get_info(url).await
  }

  /// Opens `rpc.subscribe.<method>` over WebSocket; dropping the
  /// returned handle unsubscribes.
  pub async fn subscribe(&self, url: &str, method: &str, params: Option<serde_json::Value>) -> Result<Subscription> {
    subscribe(url, method, params).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn client_constructs_with_default_config() {
    assert!(RpcClient::new(RpcConfig::default()).is_ok());
  }
}
