// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Minimal compact JWS support, just enough for the wallet-connect
//! handshake (C9) to sign and verify its authorization request/response
//! JWTs. Mirrors the teacher's own `CompactJwsEncoder`/`Decoder` split:
//! signing and verification are supplied by the caller (here, a
//! `BearerDid` signer) rather than baked into this crate.

use serde::Deserialize;
use serde::Serialize;

use crate::error::JoseError;
use crate::error::Result;
use crate::jwu;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JwsHeader {
  pub alg: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kid: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub typ: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cty: Option<String>,
}

/// Builds `base64url(header) || "." || base64url(payload)`, the bytes a
/// signer signs over.
pub fn signing_input(header: &JwsHeader, payload: &[u8]) -> Result<String> {
  let header_b64 = jwu::encode_b64(serde_json::to_vec(header)?);
  let payload_b64 = jwu::encode_b64(payload);
  Ok(format!("{header_b64}.{payload_b64}"))
}

/// Encodes a compact JWS given an already-computed signature.
pub fn encode_compact(header: &JwsHeader, payload: &[u8], signature: &[u8]) -> Result<String> {
  let input = signing_input(header, payload)?;
  Ok(format!("{input}.{}", jwu::encode_b64(signature)))
}

pub struct DecodedJws {
  pub header: JwsHeader,
  pub payload: Vec<u8>,
  pub signing_input: Vec<u8>,
  pub signature: Vec<u8>,
}

/// Splits a compact JWS into its three parts without verifying it.
pub fn decode_compact(token: &str) -> Result<DecodedJws> {
  let mut parts = token.split('.');
  let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
    (parts.next(), parts.next(), parts.next(), parts.next())
  else {
    return Err(JoseError::InvalidJwe("compact JWS must have exactly 3 segments".into()));
  };

  let header: JwsHeader = serde_json::from_slice(&jwu::decode_b64(header_b64)?)?;
  let payload = jwu::decode_b64(payload_b64)?;
  let signature = jwu::decode_b64(sig_b64)?;
  let signing_input = format!("{header_b64}.{payload_b64}").into_bytes();

  Ok(DecodedJws {
    header,
    payload,
    signing_input,
    signature,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compact_round_trip_without_verification() {
    let header = JwsHeader {
      alg: "EdDSA".to_string(),
      kid: Some("did:jwk:abc#0".to_string()),
      typ: Some("JWT".to_string()),
      cty: None,
    };
    let payload = br#"{"iss":"issuer"}"#;
    let fake_sig = vec![0u8; 64];

    let token = encode_compact(&header, payload, &fake_sig).unwrap();
    let decoded = decode_compact(&token).unwrap();

    assert_eq!(decoded.header, header);
    assert_eq!(decoded.payload, payload);
    assert_eq!(decoded.signature, fake_sig);
  }

  #[test]
  fn decode_rejects_wrong_segment_count() {
    assert!(decode_compact("a.b").is_err());
    assert!(decode_compact("a.b.c.d").is_err());
  }
}
