// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Wire types for the request/response objects the wallet-connect
//! handshake carries (spec §4.9 steps 2 & 8).

use serde::Deserialize;
use serde::Serialize;

/// The OIDC-PAR-shaped authorization request object (spec §4.9 step 2).
///
/// `key_agreement_key` carries the client's ephemeral X25519 public JWK
/// out to the wallet: the wallet needs it to derive the response's
/// content-encryption key (spec §4.9 step 8), and the PAR JWE already
/// gives it a confidential channel to receive it over.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequestObject {
  pub client_id: String,
  pub scope: String,
  pub code_challenge: String,
  pub code_challenge_method: String,
  pub permission_requests: Vec<serde_json::Value>,
  pub redirect_uri: String,
  pub client_metadata: serde_json::Value,
  pub key_agreement_key: serde_json::Value,
  pub state: String,
  pub nonce: String,
}

/// The inner JWT payload carried by the (decrypted) authorization
/// response (spec §4.9 step 8): bears the grants the user approved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResponseObject {
  pub iss: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub state: Option<String>,
  pub grants: Vec<serde_json::Value>,
}
