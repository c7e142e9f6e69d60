// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use web5_jose::Jwk;

use crate::alg::KeyAlg;
use crate::error::KmsError;
use crate::error::Result;
use crate::traits::digest;
use crate::traits::DigestAlg;
use crate::traits::Kms;

/// The minimal key/value contract a record substrate must offer for a
/// [`RecordBackedKms`] to sit on top of it. A tenanted record store
/// (see `web5_identity`) implements this by tenanting all keys under a
/// single fixed DID reserved for key material.
#[async_trait]
pub trait KeySubstrate: Send + Sync {
  async fn put(&self, key_uri: &str, jwk_json: Vec<u8>) -> Result<()>;
  async fn get(&self, key_uri: &str) -> Result<Option<Vec<u8>>>;
}

/// A [`Kms`] whose key material lives in a [`KeySubstrate`] (typically a
/// tenanted record store) rather than in process memory. Export can be
/// disabled at construction to model a backend that forbids it.
pub struct RecordBackedKms<S: KeySubstrate> {
  substrate: S,
  exportable: bool,
}

impl<S: KeySubstrate> RecordBackedKms<S> {
  pub fn new(substrate: S, exportable: bool) -> Self {
    Self { substrate, exportable }
  }

  async fn load(&self, key_uri: &str) -> Result<Jwk> {
    let bytes = self
      .substrate
      .get(key_uri)
      .await?
      .ok_or_else(|| KmsError::NotFound(key_uri.to_string()))?;
    Ok(serde_json::from_slice(&bytes).map_err(|e| KmsError::BadKey(e.to_string()))?)
  }

  async fn store(&self, jwk: &Jwk) -> Result<String> {
    let key_uri = jwk.public_view().key_uri()?;
    let bytes = serde_json::to_vec(jwk).map_err(|e| KmsError::BadKey(e.to_string()))?;
    self.substrate.put(&key_uri, bytes).await?;
    Ok(key_uri)
  }
}

impl<S: KeySubstrate> std::fmt::Debug for RecordBackedKms<S> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RecordBackedKms").field("exportable", &self.exportable).finish()
  }
}

#[async_trait]
impl<S: KeySubstrate> Kms for RecordBackedKms<S> {
  async fn generate(&self, alg: KeyAlg) -> Result<String> {
    let jwk = alg.generate()?;
    self.store(&jwk).await
  }

  async fn import(&self, jwk: Jwk) -> Result<String> {
    self.store(&jwk).await
  }

  async fn export(&self, key_uri: &str) -> Result<Jwk> {
    if !self.exportable {
      return Err(KmsError::NotExportable);
    }
    self.load(key_uri).await
  }

  async fn get_public(&self, key_uri: &str) -> Result<Jwk> {
    Ok(self.load(key_uri).await?.public_view())
  }

  async fn sign(&self, key_uri: &str, data: &[u8]) -> Result<Vec<u8>> {
    let jwk = self.load(key_uri).await?;
    let alg = KeyAlg::from_jwk(&jwk)?;
    alg.sign(&jwk, data)
  }

  async fn verify(&self, public_jwk: &Jwk, signature: &[u8], data: &[u8]) -> Result<bool> {
    let alg = match KeyAlg::from_jwk(public_jwk) {
      Ok(alg) => alg,
      Err(_) => return Ok(false),
    };
    Ok(alg.verify(public_jwk, signature, data))
  }

  async fn digest(&self, alg: DigestAlg, data: &[u8]) -> Result<Vec<u8>> {
    Ok(digest(alg, data))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::sync::Mutex;

  #[derive(Default)]
  struct InMemorySubstrate {
    map: Mutex<HashMap<String, Vec<u8>>>,
  }

  #[async_trait]
  impl KeySubstrate for InMemorySubstrate {
    async fn put(&self, key_uri: &str, jwk_json: Vec<u8>) -> Result<()> {
      self.map.lock().unwrap().insert(key_uri.to_string(), jwk_json);
      Ok(())
    }

    async fn get(&self, key_uri: &str) -> Result<Option<Vec<u8>>> {
      Ok(self.map.lock().unwrap().get(key_uri).cloned())
    }
  }

  #[tokio::test]
  async fn generate_then_sign_verify_round_trips() {
    let kms = RecordBackedKms::new(InMemorySubstrate::default(), true);
    let key_uri = kms.generate(KeyAlg::Ed25519).await.unwrap();
    let public = kms.get_public(&key_uri).await.unwrap();
    let signature = kms.sign(&key_uri, b"data").await.unwrap();
    assert!(kms.verify(&public, &signature, b"data").await.unwrap());
  }

  #[tokio::test]
  async fn export_fails_when_backend_forbids_it() {
    let kms = RecordBackedKms::new(InMemorySubstrate::default(), false);
    let key_uri = kms.generate(KeyAlg::Ed25519).await.unwrap();
    assert!(matches!(kms.export(&key_uri).await, Err(KmsError::NotExportable)));
  }

  #[tokio::test]
  async fn get_public_on_missing_key_fails_not_found() {
    let kms = RecordBackedKms::new(InMemorySubstrate::default(), true);
    assert!(matches!(
      kms.get_public("urn:jwk:missing").await,
      Err(KmsError::NotFound(_))
    ));
  }
}
