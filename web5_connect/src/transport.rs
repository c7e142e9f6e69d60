// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The rendezvous server's HTTP contract (spec §4.9 steps 5 & 7), behind
//! a trait so the handshake can be driven end-to-end in tests without a
//! network. [`HttpRendezvousTransport`] is the real client;
//! [`InMemoryRendezvous`] is a stateless-store-and-forward stand-in that
//! plays both the server and (indirectly, through its accessors) the
//! out-of-band wallet side in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ConnectError;
use crate::error::Result;

/// What a client needs from the rendezvous server: push the encrypted
/// request, then poll for the encrypted response by `state`.
#[async_trait]
pub trait RendezvousTransport: Send + Sync {
  async fn pushed_authorization_request(&self, server: &str, jwe_compact: &str) -> Result<String>;

  /// Returns `None` while no response has arrived yet.
  async fn poll_token(&self, server: &str, state: &str) -> Result<Option<String>>;
}

/// The real HTTP transport: `POST <server>/pushedAuthorizationRequest`
/// form-encoded, `GET <server>/token?state=<state>`.
pub struct HttpRendezvousTransport {
  client: reqwest::Client,
}

impl HttpRendezvousTransport {
  pub fn new() -> Self {
    Self { client: reqwest::Client::new() }
  }
}

impl Default for HttpRendezvousTransport {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl RendezvousTransport for HttpRendezvousTransport {
  async fn pushed_authorization_request(&self, server: &str, jwe_compact: &str) -> Result<String> {
    let url = format!("{server}/pushedAuthorizationRequest");
    let response = self
      .client
      .post(&url)
      .form(&[("request", jwe_compact)])
      .send()
      .await
      .map_err(|e| ConnectError::NetworkError(e.to_string()))?;

    if !response.status().is_success() {
      return Err(ConnectError::HttpStatus(response.status().as_u16()));
    }

    #[derive(serde::Deserialize)]
    struct ParResponse {
      request_uri: String,
    }
    let body: ParResponse = response.json().await.map_err(|e| ConnectError::NetworkError(e.to_string()))?;
    Ok(body.request_uri)
  }

  async fn poll_token(&self, server: &str, state: &str) -> Result<Option<String>> {
    let url = format!("{server}/token");
    let response = self
      .client
      .get(&url)
      .query(&[("state", state)])
      .send()
      .await
      .map_err(|e| ConnectError::NetworkError(e.to_string()))?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !response.status().is_success() {
      return Err(ConnectError::HttpStatus(response.status().as_u16()));
    }
    let body = response.text().await.map_err(|e| ConnectError::NetworkError(e.to_string()))?;
    if body.trim().is_empty() {
      return Ok(None);
    }
    Ok(Some(body))
  }
}

/// An in-process rendezvous server standing in for the real one in
/// tests: stores the PAR payload by a synthetic `request_uri` and the
/// response JWE by `state`, with no notion of either beyond
/// store-and-forward (spec §4.9 guarantee (a): the server learns only
/// ciphertexts).
#[derive(Default)]
pub struct InMemoryRendezvous {
  requests: Mutex<HashMap<String, String>>,
  responses: Mutex<HashMap<String, String>>,
  counter: Mutex<u64>,
}

impl InMemoryRendezvous {
  pub fn new() -> Self {
    Self::default()
  }

  /// Test/wallet-side accessor: fetches the PAR payload for a
  /// `request_uri` produced by `pushed_authorization_request`.
  pub fn fetch_request(&self, request_uri: &str) -> Option<String> {
    self.requests.lock().expect("lock poisoned").get(request_uri).cloned()
  }

  /// Test/wallet-side accessor: publishes the encrypted response for
  /// `state`, as the real wallet would after the user approves.
  pub fn respond(&self, state: &str, response_jwe: String) {
    self.responses.lock().expect("lock poisoned").insert(state.to_string(), response_jwe);
  }
}

#[async_trait]
impl RendezvousTransport for InMemoryRendezvous {
  async fn pushed_authorization_request(&self, _server: &str, jwe_compact: &str) -> Result<String> {
    let mut counter = self.counter.lock().expect("lock poisoned");
    *counter += 1;
    let request_uri = format!("urn:web5-connect:par:{counter}");
    self.requests.lock().expect("lock poisoned").insert(request_uri.clone(), jwe_compact.to_string());
    Ok(request_uri)
  }

  async fn poll_token(&self, _server: &str, state: &str) -> Result<Option<String>> {
    Ok(self.responses.lock().expect("lock poisoned").get(state).cloned())
  }
}
