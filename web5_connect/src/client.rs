// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The client side of the wallet-connect handshake (spec §4.9): compose
//! and push an encrypted authorization request, format the `web5://`
//! deep link, poll the rendezvous server, and decrypt the response.
//!
//! The request leg (client -> wallet) is a `dir`/`XC20P` JWE keyed by
//! the PKCE `code_challenge` bytes, reusing `web5_jose`'s compact JWE
//! end to end. The response leg (wallet -> client) cannot: its
//! content-encryption key is agreed over X25519 and its authentication
//! tag is bound to a PIN the two parties share out of band, and that
//! PIN must never be serialized onto the wire the way
//! `web5_jose::encrypt_flattened`'s `aad` parameter normally is. So the
//! response is handled by hand, one level below `web5_jose`'s JWE
//! helpers, directly against `web5_crypto`'s AEAD primitives.

use std::sync::Arc;

use web5_dids::DidJwk;
use web5_dids::CreateOptions;
use web5_dids::DidMethod;
use web5_dids::Resolver;
use web5_jose::decode_b64;
use web5_jose::encode_b64;
use web5_jose::encrypt_compact;
use web5_jose::EncryptParams;
use web5_jose::Jwk;
use web5_jose::JweHeader;
use web5_jose::JwsHeader;
use web5_kms::KeyAlg;
use web5_kms::Kms;

use crate::config::ConnectConfig;
use crate::error::ConnectError;
use crate::error::Result;
use crate::protocol::AuthorizationRequestObject;
use crate::protocol::AuthorizationResponseObject;
use crate::state::transition;
use crate::state::ConnectState;
use crate::transport::RendezvousTransport;

/// The client-held state of a single in-flight handshake: the signing
/// DID it proves possession of, the agreement key the wallet will
/// encrypt the response against, and the PKCE/session identifiers. None
/// of this carries a secret the server ever sees in the clear except
/// through the `code_challenge` pre-shared key, which is exactly what
/// PKCE already assumes a network observer can see.
pub struct PendingConnect {
  kms: Arc<dyn Kms>,
  pub client_did: String,
  agreement_key_uri: String,
  code_challenge_key: Vec<u8>,
  pub state: String,
  pub request_uri: String,
}

fn random_b64(len: usize) -> String {
  encode_b64(web5_crypto::random_bytes(len))
}

/// Composes, signs, and encrypts an authorization request, pushes it to
/// the rendezvous server, and returns the pending session plus the
/// `web5://connect/` URI to render as a QR code or deep link (spec §4.9
/// steps 1-5).
pub async fn init_client(
  kms: Arc<dyn Kms>,
  transport: &dyn RendezvousTransport,
  server: &str,
  scope: &str,
  permission_requests: Vec<serde_json::Value>,
  redirect_uri: &str,
  client_metadata: serde_json::Value,
) -> Result<(PendingConnect, String)> {
  transition(ConnectState::Init, ConnectState::EphemeralKeys);

  let signing_did = DidJwk::new()
    .create(
      kms.clone(),
      CreateOptions {
        key_alg: KeyAlg::Ed25519,
        use_: Some("sig".to_string()),
        publish: false,
      },
    )
    .await?;
  let signer = signing_did.get_signer(None)?;

  let agreement_key_uri = kms.generate(KeyAlg::X25519).await?;
  let agreement_public: Jwk = kms.get_public(&agreement_key_uri).await?;

  let code_verifier = random_b64(32);
  let code_challenge_key = web5_crypto::sha256(code_verifier.as_bytes()).to_vec();
  let code_challenge = encode_b64(&code_challenge_key);
  let state = random_b64(16);
  let nonce = random_b64(16);

  let request_object = AuthorizationRequestObject {
    client_id: signing_did.uri.clone(),
    scope: scope.to_string(),
    code_challenge: code_challenge.clone(),
    code_challenge_method: "S256".to_string(),
    permission_requests,
    redirect_uri: redirect_uri.to_string(),
    client_metadata,
    key_agreement_key: serde_json::to_value(&agreement_public)?,
    state: state.clone(),
    nonce: nonce.clone(),
  };
  let payload = serde_json::to_vec(&request_object)?;

  let jws_header = JwsHeader {
    alg: "EdDSA".to_string(),
    kid: Some(format!("{}#0", signing_did.uri)),
    typ: Some("JWT".to_string()),
    cty: None,
  };
  let signing_input = web5_jose::signing_input(&jws_header, &payload)?;
  let signature = signer.sign(signing_input.as_bytes()).await?;
  let signed_jwt = web5_jose::encode_compact(&jws_header, &payload, &signature)?;

  transition(ConnectState::EphemeralKeys, ConnectState::PushedAuthRequest);

  let mut protected = JweHeader::new();
  protected.insert("alg".into(), serde_json::json!("dir"));
  protected.insert("enc".into(), serde_json::json!("XC20P"));
  let request_jwe = encrypt_compact(EncryptParams {
    plaintext: signed_jwt.as_bytes(),
    protected_header: protected,
    shared_unprotected_header: None,
    key: &code_challenge_key,
    aad: None,
  })?;

  let request_uri = transport.pushed_authorization_request(server, &request_jwe).await?;

  transition(ConnectState::PushedAuthRequest, ConnectState::UriReady);

  let connect_uri = format_connect_uri(&request_uri, &signing_did.uri, &state, &nonce, &code_challenge);

  Ok((
    PendingConnect {
      kms,
      client_did: signing_did.uri,
      agreement_key_uri,
      code_challenge_key,
      state,
      request_uri,
    },
    connect_uri,
  ))
}

fn format_connect_uri(request_uri: &str, client_did: &str, state: &str, nonce: &str, code_challenge: &str) -> String {
  let mut serializer = url::form_urlencoded::Serializer::new(String::new());
  serializer
    .append_pair("nonce", nonce)
    .append_pair("request_uri", request_uri)
    .append_pair("client_did", client_did)
    .append_pair("state", state)
    .append_pair("code_challenge", code_challenge);
  format!("web5://connect/?{}", serializer.finish())
}

/// Polls the rendezvous server until the wallet's response arrives or
/// `config.poll_deadline` elapses. Transient transport errors are
/// absorbed and retried rather than failing the whole handshake;
/// cancellation is safe at any point since nothing here mutates session
/// state (spec §4.9 step 7, §5).
pub async fn poll_with_ttl(
  session: &PendingConnect,
  transport: &dyn RendezvousTransport,
  server: &str,
  config: &ConnectConfig,
) -> Result<String> {
  transition(ConnectState::UriReady, ConnectState::Polling);

  let deadline = tokio::time::Instant::now() + config.poll_deadline;
  loop {
    match transport.poll_token(server, &session.state).await {
      Ok(Some(response_jwe)) => {
        transition(ConnectState::Polling, ConnectState::Received);
        return Ok(response_jwe);
      }
      Ok(None) => {}
      Err(err) => {
        tracing::debug!(error = %err, "transient error polling rendezvous server, retrying");
      }
    }

    if tokio::time::Instant::now() >= deadline {
      transition(ConnectState::Polling, ConnectState::TimedOut);
      return Err(ConnectError::Timeout);
    }
    tokio::time::sleep(config.poll_interval).await;
  }
}

/// Decrypts the wallet's authorization response and verifies the inner
/// JWT's signature (spec §4.9 step 8).
///
/// The content-encryption key is derived via X25519 ECDH between the
/// session's agreement key and the wallet's ephemeral public key (the
/// response's protected `epk` header), then HKDF-expanded. The AEAD
/// additional data is `<protected-header-b64>.<base64url(pin)>`,
/// computed locally and never transmitted: an attacker holding the
/// connect URI and the response ciphertext, but not the PIN, cannot
/// reconstruct it (spec §8 item 6's replay-with-wrong-PIN guarantee).
pub async fn decrypt_response(
  session: &PendingConnect,
  response_jwe_compact: &str,
  pin: &[u8],
  resolver: &Resolver,
) -> Result<AuthorizationResponseObject> {
  let parts: Vec<&str> = response_jwe_compact.split('.').collect();
  if parts.len() != 5 {
    return Err(ConnectError::InvalidResponse("compact JWE must have 5 segments".into()));
  }
  let [protected_b64, _encrypted_key, iv_b64, ciphertext_b64, tag_b64] =
    [parts[0], parts[1], parts[2], parts[3], parts[4]];

  let protected: JweHeader = serde_json::from_slice(&decode_b64(protected_b64)?)?;
  let epk = protected
    .get("epk")
    .ok_or_else(|| ConnectError::InvalidResponse("missing epk header".into()))?;
  let epk: Jwk = serde_json::from_value(epk.clone())?;
  let epk_x = epk
    .x
    .as_deref()
    .ok_or_else(|| ConnectError::InvalidResponse("epk missing x".into()))?;
  let epk_public = decode_b64(epk_x)?;

  let agreement_private = session.kms.export(&session.agreement_key_uri).await?;
  let agreement_d = agreement_private
    .d
    .as_deref()
    .ok_or_else(|| ConnectError::InvalidResponse("agreement key has no private component".into()))?;
  let agreement_d = decode_b64(agreement_d)?;

  let shared_secret = web5_crypto::x25519_derive(&agreement_d, &epk_public)?;
  let cek = web5_crypto::hkdf_sha256(&shared_secret, session.state.as_bytes(), b"web5-connect-response", 256)?;

  let additional_data = format!("{protected_b64}.{}", encode_b64(pin));

  let iv = decode_b64(iv_b64)?;
  let ciphertext = decode_b64(ciphertext_b64)?;
  let tag = decode_b64(tag_b64)?;
  let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
  combined.extend_from_slice(&ciphertext);
  combined.extend_from_slice(&tag);

  let plaintext = web5_crypto::xchacha20poly1305_decrypt(&cek, &iv, &combined, additional_data.as_bytes())
    .map_err(|_| ConnectError::Decrypt)?;

  let inner_jwt = String::from_utf8(plaintext).map_err(|_| ConnectError::InvalidResponse("payload not utf-8".into()))?;
  let decoded = web5_jose::decode_compact(&inner_jwt)?;

  let kid = decoded
    .header
    .kid
    .as_deref()
    .ok_or_else(|| ConnectError::InvalidResponse("inner JWT missing kid".into()))?;
  let verification_method = match resolver.dereference(kid).await? {
    web5_dids::Dereferenced::VerificationMethod(vm) => vm,
    _ => return Err(ConnectError::InvalidResponse("kid does not resolve to a verification method".into())),
  };

  let alg = KeyAlg::from_jwk(&verification_method.public_key_jwk)?;
  if !alg.verify(&verification_method.public_key_jwk, &decoded.signature, &decoded.signing_input) {
    return Err(ConnectError::SignatureInvalid);
  }

  let response: AuthorizationResponseObject = serde_json::from_slice(&decoded.payload)?;
  if let Some(response_state) = &response.state {
    if response_state != &session.state {
      return Err(ConnectError::InvalidResponse("state mismatch".into()));
    }
  }

  transition(ConnectState::Received, ConnectState::DecryptedResponse);
  Ok(response)
}

/// Convenience wrapper combining [`poll_with_ttl`] and [`decrypt_response`].
pub async fn wait_for_response(
  session: &PendingConnect,
  transport: &dyn RendezvousTransport,
  server: &str,
  config: &ConnectConfig,
  pin: &[u8],
  resolver: &Resolver,
) -> Result<AuthorizationResponseObject> {
  let response_jwe = poll_with_ttl(session, transport, server, config).await?;
  decrypt_response(session, &response_jwe, pin, resolver).await
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::transport::InMemoryRendezvous;
  use web5_kms::InMemoryKms;

  #[tokio::test]
  async fn full_round_trip_succeeds_with_correct_pin() {
    let client_kms: Arc<dyn Kms> = Arc::new(InMemoryKms::new());
    let wallet_kms: Arc<dyn Kms> = Arc::new(InMemoryKms::new());
    let rendezvous = InMemoryRendezvous::new();
    let config = ConnectConfig {
      poll_interval: Duration::from_millis(5),
      poll_deadline: Duration::from_millis(500),
    };
    let pin = b"1234";

    let (session, connect_uri) = init_client(
      client_kms.clone(),
      &rendezvous,
      "https://rendezvous.example",
      "openid",
      vec![],
      "https://client.example/callback",
      serde_json::json!({"name": "test client"}),
    )
    .await
    .unwrap();
    assert!(connect_uri.starts_with("web5://connect/?"));

    let request_jwe = rendezvous.fetch_request(&session.request_uri).unwrap();
    let request = decrypt_request_with_key(&request_jwe, &session.code_challenge_key);
    assert_eq!(request.state, session.state);

    respond_as_wallet_with_request(&rendezvous, &request, pin, wallet_kms).await;

    let mut resolver = Resolver::new(web5_dids::ResolverConfig::default());
    resolver.register(Arc::new(DidJwk::new()));

    let response = wait_for_response(&session, &rendezvous, "https://rendezvous.example", &config, pin, &resolver)
      .await
      .unwrap();
    assert_eq!(response.grants.len(), 1);
  }

  #[tokio::test]
  async fn wrong_pin_fails_decryption() {
    let client_kms: Arc<dyn Kms> = Arc::new(InMemoryKms::new());
    let wallet_kms: Arc<dyn Kms> = Arc::new(InMemoryKms::new());
    let rendezvous = InMemoryRendezvous::new();
    let config = ConnectConfig {
      poll_interval: Duration::from_millis(5),
      poll_deadline: Duration::from_millis(500),
    };

    let (session, _uri) = init_client(
      client_kms.clone(),
      &rendezvous,
      "https://rendezvous.example",
      "openid",
      vec![],
      "https://client.example/callback",
      serde_json::json!({"name": "test client"}),
    )
    .await
    .unwrap();

    let request_jwe = rendezvous.fetch_request(&session.request_uri).unwrap();
    let request = decrypt_request_with_key(&request_jwe, &session.code_challenge_key);
    respond_as_wallet_with_request(&rendezvous, &request, b"1234", wallet_kms).await;

    let mut resolver = Resolver::new(web5_dids::ResolverConfig::default());
    resolver.register(Arc::new(DidJwk::new()));

    let response_jwe = poll_with_ttl(&session, &rendezvous, "https://rendezvous.example", &config)
      .await
      .unwrap();

    let result = decrypt_response(&session, &response_jwe, b"0000", &resolver).await;
    assert!(matches!(result, Err(ConnectError::Decrypt)));
  }

  fn decrypt_request_with_key(request_jwe: &str, key: &[u8]) -> AuthorizationRequestObject {
    let decrypted = web5_jose::decrypt_compact(request_jwe, key).unwrap();
    let jwt = String::from_utf8(decrypted.plaintext).unwrap();
    let decoded = web5_jose::decode_compact(&jwt).unwrap();
    serde_json::from_slice(&decoded.payload).unwrap()
  }

  async fn respond_as_wallet_with_request(
    rendezvous: &InMemoryRendezvous,
    request: &AuthorizationRequestObject,
    pin: &[u8],
    wallet_kms: Arc<dyn Kms>,
  ) {
    let wallet_did = DidJwk::new()
      .create(
        wallet_kms.clone(),
        CreateOptions {
          key_alg: KeyAlg::Ed25519,
          use_: Some("sig".to_string()),
          publish: false,
        },
      )
      .await
      .unwrap();
    let signer = wallet_did.get_signer(None).unwrap();

    let response = AuthorizationResponseObject {
      iss: wallet_did.uri.clone(),
      state: Some(request.state.clone()),
      grants: vec![serde_json::json!({"protocol": "https://example/protocol"})],
    };
    let payload = serde_json::to_vec(&response).unwrap();
    let header = JwsHeader {
      alg: "EdDSA".to_string(),
      kid: Some(format!("{}#0", wallet_did.uri)),
      typ: Some("JWT".to_string()),
      cty: None,
    };
    let signing_input = web5_jose::signing_input(&header, &payload).unwrap();
    let signature = signer.sign(signing_input.as_bytes()).await.unwrap();
    let inner_jwt = web5_jose::encode_compact(&header, &payload, &signature).unwrap();

    let client_agreement: Jwk = serde_json::from_value(request.key_agreement_key.clone()).unwrap();
    let client_x = decode_b64(client_agreement.x.as_deref().unwrap()).unwrap();

    let wallet_ephemeral_uri = wallet_kms.generate(KeyAlg::X25519).await.unwrap();
    let wallet_ephemeral_public: Jwk = wallet_kms.get_public(&wallet_ephemeral_uri).await.unwrap();
    let wallet_ephemeral_private = wallet_kms.export(&wallet_ephemeral_uri).await.unwrap();
    let wallet_ephemeral_d = decode_b64(wallet_ephemeral_private.d.as_deref().unwrap()).unwrap();

    let shared_secret = web5_crypto::x25519_derive(&wallet_ephemeral_d, &client_x).unwrap();
    let cek =
      web5_crypto::hkdf_sha256(&shared_secret, request.state.as_bytes(), b"web5-connect-response", 256).unwrap();

    let mut response_protected = JweHeader::new();
    response_protected.insert("alg".into(), serde_json::json!("ECDH-ES"));
    response_protected.insert("enc".into(), serde_json::json!("XC20P"));
    response_protected.insert("epk".into(), serde_json::to_value(&wallet_ephemeral_public).unwrap());
    let protected_json = serde_json::to_vec(&response_protected).unwrap();
    let protected_b64 = encode_b64(protected_json);

    let additional_data = format!("{protected_b64}.{}", encode_b64(pin));
    let iv = web5_crypto::random_bytes(24);
    let combined =
      web5_crypto::xchacha20poly1305_encrypt(&cek, &iv, inner_jwt.as_bytes(), additional_data.as_bytes()).unwrap();
    let split = combined.len() - 16;
    let (ciphertext, tag) = (&combined[..split], &combined[split..]);

    let response_compact = format!(
      "{protected_b64}..{}.{}.{}",
      encode_b64(&iv),
      encode_b64(ciphertext),
      encode_b64(tag)
    );
    rendezvous.respond(&request.state, response_compact);
  }
}
