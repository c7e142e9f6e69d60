// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use web5_jose::Jwk;

use crate::alg::KeyAlg;
use crate::error::KmsError;
use crate::error::Result;
use crate::traits::digest;
use crate::traits::DigestAlg;
use crate::traits::Kms;

/// An in-memory [`Kms`], keyed by key URI. Supports export; intended for
/// tests and for agents that keep key material only for the lifetime of
/// the process.
#[derive(Default)]
pub struct InMemoryKms {
  keys: RwLock<HashMap<String, Jwk>>,
}

impl InMemoryKms {
  pub fn new() -> Self {
    Self::default()
  }
}

impl std::fmt::Debug for InMemoryKms {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("InMemoryKms")
  }
}

#[async_trait]
impl Kms for InMemoryKms {
  async fn generate(&self, alg: KeyAlg) -> Result<String> {
    let jwk = alg.generate()?;
    let key_uri = jwk.public_view().key_uri()?;
    self.keys.write().expect("lock poisoned").insert(key_uri.clone(), jwk);
    Ok(key_uri)
  }

  async fn import(&self, jwk: Jwk) -> Result<String> {
    let key_uri = jwk.public_view().key_uri()?;
    self.keys.write().expect("lock poisoned").insert(key_uri.clone(), jwk);
    Ok(key_uri)
  }

  async fn export(&self, key_uri: &str) -> Result<Jwk> {
    self
      .keys
      .read()
      .expect("lock poisoned")
      .get(key_uri)
      .cloned()
      .ok_or_else(|| KmsError::NotFound(key_uri.to_string()))
  }

  async fn get_public(&self, key_uri: &str) -> Result<Jwk> {
    self
      .keys
      .read()
      .expect("lock poisoned")
      .get(key_uri)
      .map(Jwk::public_view)
      .ok_or_else(|| KmsError::NotFound(key_uri.to_string()))
  }

  async fn sign(&self, key_uri: &str, data: &[u8]) -> Result<Vec<u8>> {
    let jwk = self
      .keys
      .read()
      .expect("lock poisoned")
      .get(key_uri)
      .cloned()
      .ok_or_else(|| KmsError::NotFound(key_uri.to_string()))?;
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
