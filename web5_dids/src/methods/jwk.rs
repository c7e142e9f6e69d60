// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! `did:jwk`: a deterministic DID method whose method-specific id is the
//! base64url-encoded canonical form of a single public JWK.

use std::sync::Arc;

use async_trait::async_trait;
use web5_jose::Jwk;
use web5_kms::Kms;

use crate::bearer_did::BearerDid;
use crate::did_url;
use crate::document::DidDocument;
use crate::document::ResolutionMetadata;
use crate::document::ResolutionResult;
use crate::document::VerificationMethod;
use crate::error::DidError;
use crate::error::Result;
use crate::methods::default_get_signing_method;
use crate::methods::CreateOptions;
use crate::methods::DidMethod;

pub struct DidJwk;

impl DidJwk {
  pub fn new() -> Self {
    Self
  }

  fn document_for(&self, public_jwk: &Jwk) -> Result<DidDocument> {
    // The method-specific id is the full JWK, not just the RFC 7638
    // thumbprint members: `resolve` rebuilds the JWK straight from the
    // id, so dropping `alg`/`use`/`kid` here would make a resolved
    // document disagree with the one `create` returned.
    let jwk_json = serde_json::to_vec(public_jwk).map_err(|e| DidError::BadKey(e.to_string()))?;
    let method_id = web5_jose::encode_b64(jwk_json);
    let did_uri = format!("did:jwk:{method_id}");
    let vm_id = format!("{did_uri}#0");

    let mut document = DidDocument::new(did_uri.clone());
    document.verification_method.push(VerificationMethod {
      id: vm_id.clone(),
      type_: "JsonWebKey2020".to_string(),
      controller: did_uri,
      public_key_jwk: public_jwk.clone(),
    });

    match public_jwk.use_.as_deref() {
      Some("enc") => {
        document.key_agreement.push(vm_id);
      }
      Some("sig") => {
        document.authentication.push(vm_id.clone());
        document.assertion_method.push(vm_id.clone());
        document.capability_invocation.push(vm_id.clone());
        document.capability_delegation.push(vm_id);
      }
      _ => {
        document.authentication.push(vm_id.clone());
        document.assertion_method.push(vm_id.clone());
        document.capability_invocation.push(vm_id.clone());
        document.capability_delegation.push(vm_id.clone());
        document.key_agreement.push(vm_id);
      }
    }

    Ok(document)
  }
}

impl Default for DidJwk {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl DidMethod for DidJwk {
  fn method_name(&self) -> &'static str {
    "jwk"
  }

  async fn create(&self, kms: Arc<dyn Kms>, options: CreateOptions) -> Result<BearerDid> {
    let key_uri = kms.generate(options.key_alg).await?;
    let mut public_jwk = kms.get_public(&key_uri).await?;
    if let Some(use_) = options.use_ {
      public_jwk.set_use(use_);
    }
    let document = self.document_for(&public_jwk)?;
    let uri = document.id.clone();
    Ok(BearerDid::new(uri, document, ResolutionMetadata::default(), kms))
  }

  async fn resolve(&self, did_uri: &str) -> Result<ResolutionResult> {
    let parsed = did_url::parse(did_uri).ok_or_else(|| DidError::InvalidDid(did_uri.to_string()))?;
    if parsed.method != "jwk" {
      return Err(DidError::MethodNotSupported(parsed.method));
    }

    let canonical = web5_jose::decode_b64(&parsed.id).map_err(|_| DidError::InvalidDid(did_uri.to_string()))?;
    let public_jwk: Jwk = serde_json::from_slice(&canonical).map_err(|_| DidError::InvalidDid(did_uri.to_string()))?;
    if public_jwk.is_private() {
      return Err(DidError::InvalidDid("did:jwk method id must encode a public key".to_string()));
    }

    let document = self.document_for(&public_jwk)?;
    Ok(ResolutionResult {
      document,
      document_metadata: crate::document::ResolutionMetadata::default(),
    })
  }

  fn get_signing_method(&self, document: &DidDocument, method_id: Option<&str>) -> Result<VerificationMethod> {
    default_get_signing_method(document, method_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use web5_kms::InMemoryKms;
  use web5_kms::KeyAlg;

  #[tokio::test]
  async fn create_then_resolve_round_trips_the_same_document() {
    let kms: Arc<dyn Kms> = Arc::new(InMemoryKms::new());
    let method = DidJwk::new();
    let bearer = method
      .create(
        kms,
        CreateOptions {
          key_alg: KeyAlg::Ed25519,
          use_: None,
          publish: false,
        },
      )
      .await
      .unwrap();

    let resolved = method.resolve(&bearer.uri).await.unwrap();
    assert_eq!(resolved.document, bearer.document);
  }

  #[tokio::test]
  async fn sig_use_omits_key_agreement() {
    let kms: Arc<dyn Kms> = Arc::new(InMemoryKms::new());
    let method = DidJwk::new();
    let bearer = method
      .create(
        kms,
        CreateOptions {
          key_alg: KeyAlg::Ed25519,
          use_: Some("sig".to_string()),
          publish: false,
        },
      )
      .await
      .unwrap();

    assert!(bearer.document.key_agreement.is_empty());
    assert!(!bearer.document.assertion_method.is_empty());
  }

  #[tokio::test]
  async fn enc_use_includes_only_key_agreement() {
    let kms: Arc<dyn Kms> = Arc::new(InMemoryKms::new());
    let method = DidJwk::new();
    let bearer = method
      .create(
        kms,
        CreateOptions {
          key_alg: KeyAlg::X25519,
          use_: Some("enc".to_string()),
          publish: false,
        },
      )
      .await
      .unwrap();

    assert!(!bearer.document.key_agreement.is_empty());
    assert!(bearer.document.assertion_method.is_empty());
  }

  #[tokio::test]
  async fn resolve_rejects_malformed_method_id() {
    let method = DidJwk::new();
    assert!(method.resolve("did:jwk:not-base64url-json!!").await.is_err());
  }

  #[tokio::test]
  async fn resolve_rejects_wrong_method() {
    let method = DidJwk::new();
    assert!(matches!(
      method.resolve("did:dht:abc").await,
      Err(DidError::MethodNotSupported(_))
    ));
  }
}
