// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The record-node HTTP transport (spec §6): `POST /` carrying the
//! JSON-RPC request in the `dwn-request` header, with the response
//! either a plain JSON-RPC body or (when the body is itself a data
//! stream) a `dwn-response` header alongside a raw byte body.
//! `GET /info` is cached per-URL (spec §4 item 5 of the restored
//! features), reusing the same TTL-cache primitive the DID resolver
//! uses for its own cache (C11).

use serde::Deserialize;
use serde::Serialize;
use web5_dids::TtlCache;

use crate::bytes::ByteSource;
use crate::config::RpcConfig;
use crate::error::Result;
use crate::error::RpcError;
use crate::request::IdGenerator;
use crate::request::JsonRpcRequest;
use crate::request::JsonRpcResponse;
use crate::request::RequestId;

const DWN_REQUEST_HEADER: &str = "dwn-request";
const DWN_RESPONSE_HEADER: &str = "dwn-response";

/// `GET /info` response shape (spec §6).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
  #[serde(rename = "registrationRequirements")]
  pub registration_requirements: Vec<String>,
  #[serde(rename = "maxFileSize")]
  pub max_file_size: u64,
  #[serde(rename = "webSocketSupport")]
  pub web_socket_support: bool,
}

pub struct HttpTransport {
  client: reqwest::Client,
  request_timeout: std::time::Duration,
  ids: IdGenerator,
  info_cache: TtlCache<ServerInfo>,
}

impl HttpTransport {
  pub fn new(config: RpcConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .connect_timeout(config.connect_timeout)
      .build()
      .map_err(|e| RpcError::NetworkError(e.to_string()))?;
    Ok(Self {
      client,
      request_timeout: config.request_timeout,
      ids: IdGenerator::default(),
      info_cache: TtlCache::default(),
    })
  }

  /// Sends `method`/`params` as a JSON-RPC request to `url` and returns
  /// the decoded `result`, plus any accompanying data stream.
  pub async fn call(&self, url: &str, method: &str, params: Option<serde_json::Value>) -> Result<(serde_json::Value, Option<ByteSource>)> {
    let id = self.ids.next();
    let request = JsonRpcRequest::new(id.clone(), method, params);
    let request_json = serde_json::to_string(&request)?;

    let response = self
      .client
      .post(url)
      .header(DWN_REQUEST_HEADER, request_json)
      .timeout(self.request_timeout)
      .send()
      .await
      .map_err(|e| {
        if e.is_timeout() {
          RpcError::Timeout(self.request_timeout)
        } else {
          RpcError::NetworkError(e.to_string())
        }
      })?;

    if !response.status().is_success() {
      return Err(RpcError::HttpStatus(response.status().as_u16()));
    }

    if let Some(header) = response.headers().get(DWN_RESPONSE_HEADER) {
      let header = header
        .to_str()
        .map_err(|_| RpcError::MalformedResponse("dwn-response header is not valid UTF-8".to_string()))?;
      let rpc_response: JsonRpcResponse = serde_json::from_str(header)?;
      check_id(&id, &rpc_response.id)?;
      let result = rpc_response.into_result()?;
      let body = response.bytes().await.map_err(|e| RpcError::NetworkError(e.to_string()))?;
      return Ok((result, Some(ByteSource::Bytes(body.to_vec()))));
    }

    let body = response.bytes().await.map_err(|e| RpcError::NetworkError(e.to_string()))?;
    let rpc_response: JsonRpcResponse = serde_json::from_slice(&body)?;
    check_id(&id, &rpc_response.id)?;
    Ok((rpc_response.into_result()?, None))
  }

  /// `GET {url}/info`, cached per-URL for the cache's TTL.
  pub async fn get_info(&self, url: &str) -> Result<ServerInfo> {
    if let Some(cached) = self.info_cache.get(url).ok().flatten() {
      tracing::trace!(%url, "GET /info cache hit");
      return Ok(cached);
    }

    tracing::debug!(%url, "GET /info cache miss");
    let info_url = format!("{url}/info");
    let response = self
      .client
      .get(&info_url)
      .timeout(self.request_timeout)
      .send()
      .await
      .map_err(|e| RpcError::NetworkError(e.to_string()))?;

    if !response.status().is_success() {
      return Err(RpcError::HttpStatus(response.status().as_u16()));
    }

    let info: ServerInfo = response.json().await.map_err(|e| RpcError::NetworkError(e.to_string()))?;
    let _ = self.info_cache.set(url.to_string(), info.clone());
    Ok(info)
  }
}

fn check_id(expected: &RequestId, actual: &RequestId) -> Result<()> {
  if expected != actual {
    return Err(RpcError::MalformedResponse("response id does not match request id".to_string()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn server_info_round_trips_through_json() {
    let info = ServerInfo {
      registration_requirements: vec!["proof-of-work".to_string()],
      max_file_size: 1024,
      web_socket_support: true,
    };
    let json = serde_json::to_string(&info).unwrap();
    let parsed: ServerInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(info, parsed);
  }
}
