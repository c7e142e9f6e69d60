// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! [`Agent`]: the facade pairing a key manager and DID resolver with the
//! tenanted record store's identity/permissions APIs, the wallet-connect
//! handshake, and the JSON-RPC transport to record-node substrates.

use std::sync::Arc;

use web5_connect::AuthorizationResponseObject;
use web5_connect::PendingConnect;
use web5_connect::RendezvousTransport;
use web5_dids::BearerDid;
use web5_dids::CreateOptions;
use web5_dids::DidMethod;
use web5_dids::ResolutionResult;
use web5_dids::Resolver;
use web5_identity::IdentityApi;
use web5_identity::IdentityRecord;
use web5_identity::PermissionsApi;
use web5_identity::RecordSubstrate;
use web5_kms::Kms;
use web5_rpc::RpcClient;

use crate::builder::AgentBuilder;
use crate::error::Result;

/// The wired-together agent. Construct one with [`AgentBuilder`].
pub struct Agent<S: RecordSubstrate = web5_identity::InMemorySubstrate> {
  pub(crate) kms: Arc<dyn Kms>,
  pub(crate) resolver: Resolver,
  pub(crate) primary_method: Arc<dyn DidMethod>,
  pub(crate) identity: IdentityApi<S>,
  pub(crate) permissions: PermissionsApi<S>,
  pub(crate) rpc: RpcClient,
  pub(crate) connect_config: web5_connect::ConnectConfig,
}

impl Agent<web5_identity::InMemorySubstrate> {
  /// Shorthand for `AgentBuilder::new().build()`.
  pub fn new() -> Result<Self> {
    AgentBuilder::new().build()
  }
}

impl<S: RecordSubstrate> Agent<S> {
  pub fn kms(&self) -> &Arc<dyn Kms> {
    &self.kms
  }

  pub fn resolver(&self) -> &Resolver {
    &self.resolver
  }

  pub fn identity(&self) -> &IdentityApi<S> {
    &self.identity
  }

  pub fn permissions(&self) -> &PermissionsApi<S> {
    &self.permissions
  }

  pub fn rpc(&self) -> &RpcClient {
    &self.rpc
  }

  /// Resolves a DID URI through the agent's resolver.
  pub async fn resolve(&self, uri: &str) -> Result<ResolutionResult> {
    Ok(self.resolver.resolve(uri).await?)
  }

  /// Mints a new identity DID with the builder's chosen method, then
  /// writes the identity record auto-tenanted under its own DID (spec
  /// §4.7).
  pub async fn create_identity(&self, name: impl Into<String>, options: CreateOptions) -> Result<BearerDid> {
    let bearer = self.primary_method.create(self.kms.clone(), options).await?;

    let record = IdentityRecord {
      uri: bearer.uri.clone(),
      name: name.into(),
      metadata: serde_json::Map::new(),
    };
    self.identity.create(record, None).await?;

    Ok(bearer)
  }

  /// Starts a wallet-connect handshake as the client (spec §4.9 steps
  /// 1-5): composes, signs, and encrypts the authorization request and
  /// pushes it to the rendezvous server.
  pub async fn connect(
    &self,
    transport: &dyn RendezvousTransport,
    server: &str,
    scope: &str,
    permission_requests: Vec<serde_json::Value>,
    redirect_uri: &str,
    client_metadata: serde_json::Value,
  ) -> Result<(PendingConnect, String)> {
    Ok(
      web5_connect::init_client(
        self.kms.clone(),
        transport,
        server,
        scope,
        permission_requests,
        redirect_uri,
        client_metadata,
      )
      .await?,
    )
  }

  /// Polls the rendezvous server until the wallet responds, then
  /// decrypts and verifies the response (spec §4.9 steps 7-8).
  pub async fn wait_for_connect_response(
    &self,
    session: &PendingConnect,
    transport: &dyn RendezvousTransport,
    server: &str,
    pin: &[u8],
  ) -> Result<AuthorizationResponseObject> {
    Ok(web5_connect::wait_for_response(session, transport, server, &self.connect_config, pin, &self.resolver).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use web5_connect::InMemoryRendezvous;
  use web5_identity::GrantFilter;
  use web5_identity::Grant;
  use web5_identity::PermissionScope;
  use web5_identity::RecordsMethod;

  #[tokio::test]
  async fn create_identity_round_trips_through_the_identity_api() {
    let agent = Agent::new().unwrap();
    let bearer = agent.create_identity("Alice", CreateOptions::default()).await.unwrap();

    let fetched = agent.identity().get(&bearer.uri, None).await.unwrap().unwrap();
    assert_eq!(fetched.uri, bearer.uri);
    assert_eq!(fetched.name, "Alice");
  }

  #[tokio::test]
  async fn created_identity_resolves_through_the_agent_resolver() {
    let agent = Agent::new().unwrap();
    let bearer = agent.create_identity("Bob", CreateOptions::default()).await.unwrap();

    let resolved = agent.resolve(&bearer.uri).await.unwrap();
    assert_eq!(resolved.document.id, bearer.uri);
  }

  #[tokio::test]
  async fn permissions_api_is_reachable_through_the_agent() {
    let agent = Agent::new().unwrap();
    let bearer = agent.create_identity("Carol", CreateOptions::default()).await.unwrap();

    let grant = Grant {
      id: "grant-1".to_string(),
      grantor: bearer.uri.clone(),
      grantee: "did:jwk:dave".to_string(),
      scope: PermissionScope::Records {
        method: RecordsMethod::Read,
        protocol: "https://example.com/protocol/P".to_string(),
        protocol_path: None,
        context_id: None,
      },
      date_expires: "2999-01-01T00:00:00Z".to_string(),
      delegated: false,
      request_id: None,
      description: None,
    };
    agent.permissions().create_grant(&bearer.uri, &bearer.uri, grant.clone()).await.unwrap();

    let found = agent
      .permissions()
      .fetch_grants(
        &bearer.uri,
        GrantFilter {
          grantor: Some(bearer.uri.clone()),
          ..Default::default()
        },
      )
      .await
      .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, grant.id);
  }

  #[tokio::test]
  async fn connect_handshake_round_trips_through_the_agent() {
    use web5_dids::DidJwk;
    use web5_jose::decode_b64;
    use web5_jose::encode_b64;
    use web5_jose::Jwk;
    use web5_jose::JweHeader;
    use web5_jose::JwsHeader;

    let agent = Agent::new().unwrap();
    let rendezvous = InMemoryRendezvous::new();

    let (session, connect_uri) = agent
      .connect(
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

    // A real wallet scans `connect_uri` and reads `code_challenge` out
    // of it in the clear; that digest doubles as the request's XC20P
    // decryption key (spec §4.9 step 6).
    let parsed = url::Url::parse(&connect_uri).unwrap();
    let code_challenge = parsed
      .query_pairs()
      .find(|(k, _)| k == "code_challenge")
      .map(|(_, v)| v.into_owned())
      .unwrap();
    let code_challenge_key = decode_b64(&code_challenge).unwrap();

    let request_jwe = rendezvous.fetch_request(&session.request_uri).unwrap();
    let decrypted = web5_jose::decrypt_compact(&request_jwe, &code_challenge_key).unwrap();
    let request_jwt = String::from_utf8(decrypted.plaintext).unwrap();
    let decoded_request = web5_jose::decode_compact(&request_jwt).unwrap();
    let request: web5_connect::AuthorizationRequestObject = serde_json::from_slice(&decoded_request.payload).unwrap();

    let wallet_kms: Arc<dyn Kms> = Arc::new(web5_kms::InMemoryKms::new());
    let wallet_did = DidJwk::new()
      .create(
        wallet_kms.clone(),
        CreateOptions {
          key_alg: web5_kms::KeyAlg::Ed25519,
          use_: Some("sig".to_string()),
          publish: false,
        },
      )
      .await
      .unwrap();
    let signer = wallet_did.get_signer(None).unwrap();

    let pin = b"1234";
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

    let wallet_ephemeral_uri = wallet_kms.generate(web5_kms::KeyAlg::X25519).await.unwrap();
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

    let response = agent
      .wait_for_connect_response(&session, &rendezvous, "https://rendezvous.example", pin)
      .await
      .unwrap();
    assert_eq!(response.iss, wallet_did.uri);
  }
}
