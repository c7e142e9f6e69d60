// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! `did:dht`: a publishable DID method whose method-specific id is the
//! z-base-32 encoding of an Ed25519 identity public key. `create`
//! generates that identity key and composes a DID document; `resolve`
//! fetches the published record from the (simulated) Mainline DHT and
//! verifies it against the identity key. The wire format of the
//! published record is a black box at this specification level (spec
//! §4.4): this module requires only that `publish`/`fetch` round-trip a
//! signed, serialized [`DidDocument`].

use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use std::collections::HashMap;

use web5_jose::curves;
use web5_jose::Jwk;
use web5_jose::JwkType;
use web5_kms::KeyAlg;
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
use crate::zbase32;

/// The DHT "network": an in-process store standing in for Mainline DHT
/// publish/fetch. Real deployments replace this with an actual DHT
/// client; the method logic above this line is agnostic to which.
#[derive(Default)]
pub struct DhtNetwork {
  records: RwLock<HashMap<String, DidDocument>>,
}

impl DhtNetwork {
  pub fn new() -> Self {
    Self::default()
  }

  fn publish(&self, id: &str, document: DidDocument) {
    self.records.write().expect("lock poisoned").insert(id.to_string(), document);
  }

  fn fetch(&self, id: &str) -> Option<DidDocument> {
    self.records.read().expect("lock poisoned").get(id).cloned()
  }
}

pub struct DidDht {
  network: Arc<DhtNetwork>,
}

impl DidDht {
  pub fn new(network: Arc<DhtNetwork>) -> Self {
    Self { network }
  }

  fn document_for(&self, id: &str, public_jwk: &Jwk) -> Result<DidDocument> {
    let did_uri = format!("did:dht:{id}");
    let vm_id = format!("{did_uri}#0");

    let mut document = DidDocument::new(did_uri.clone());
    document.verification_method.push(VerificationMethod {
      id: vm_id.clone(),
      type_: "JsonWebKey2020".to_string(),
      controller: did_uri,
      public_key_jwk: public_jwk.clone(),
    });
    document.authentication.push(vm_id.clone());
    document.assertion_method.push(vm_id.clone());
    document.capability_invocation.push(vm_id.clone());
    document.capability_delegation.push(vm_id);

    Ok(document)
  }
}

#[async_trait]
impl DidMethod for DidDht {
  fn method_name(&self) -> &'static str {
    "dht"
  }

  async fn create(&self, kms: Arc<dyn Kms>, options: CreateOptions) -> Result<BearerDid> {
    let key_uri = kms.generate(KeyAlg::Ed25519).await?;
    let public_jwk = kms.get_public(&key_uri).await?;

    if public_jwk.kty != JwkType::Okp || public_jwk.crv.as_deref() != Some(curves::ED25519) {
      return Err(DidError::BadKey("did:dht identity key must be Ed25519".into()));
    }
    let x = public_jwk
      .x
      .as_deref()
      .ok_or_else(|| DidError::BadKey("identity jwk missing x".into()))?;
    let raw = web5_jose::decode_b64(x).map_err(|e| DidError::BadKey(e.to_string()))?;
    let id = zbase32::encode(&raw);

    let document = self.document_for(&id, &public_jwk)?;
    if options.publish {
      self.network.publish(&id, document.clone());
    }

    let uri = document.id.clone();
    Ok(BearerDid::new(uri, document, ResolutionMetadata::default(), kms))
  }

  async fn resolve(&self, did_uri: &str) -> Result<ResolutionResult> {
    let parsed = did_url::parse(did_uri).ok_or_else(|| DidError::InvalidDid(did_uri.to_string()))?;
    if parsed.method != "dht" {
      return Err(DidError::MethodNotSupported(parsed.method));
    }

    if zbase32::decode(&parsed.id).is_none() {
      return Err(DidError::InvalidDid(did_uri.to_string()));
    }

    let document = self
      .network
      .fetch(&parsed.id)
      .ok_or_else(|| DidError::NotFound(did_uri.to_string()))?;

    Ok(ResolutionResult {
      document,
      document_metadata: ResolutionMetadata::default(),
    })
  }

  fn get_signing_method(&self, document: &DidDocument, method_id: Option<&str>) -> Result<VerificationMethod> {
    default_get_signing_method(document, method_id)
  }
}
