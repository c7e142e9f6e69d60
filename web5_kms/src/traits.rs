// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use web5_jose::Jwk;

use crate::alg::KeyAlg;
use crate::error::Result;

/// A digest algorithm supported by [`Kms::digest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlg {
  Sha256,
}

/// Stores keys by key URI and performs operations (sign, verify, digest)
/// without ever exposing private key material except through an
/// explicit, possibly-unsupported [`Kms::export`].
///
/// See [`crate::InMemoryKms`] for a test/example implementation and
/// [`crate::RecordBackedKms`] for one backed by a tenanted record store.
#[async_trait]
pub trait Kms: Send + Sync + std::fmt::Debug {
  /// Generates a new key of `alg`, stores it, and returns its key URI.
  async fn generate(&self, alg: KeyAlg) -> Result<String>;

  /// Imports `jwk`. Idempotent: importing the same JWK twice returns the
  /// same key URI without creating a second entry.
  async fn import(&self, jwk: Jwk) -> Result<String>;

  /// Exports the private JWK stored at `key_uri`, if this backend
  /// supports export.
  async fn export(&self, key_uri: &str) -> Result<Jwk>;

  /// Returns the public JWK stored at `key_uri`.
  async fn get_public(&self, key_uri: &str) -> Result<Jwk>;

  /// Computes the key URI a JWK would have, without persisting anything.
  fn get_key_uri(&self, jwk: &Jwk) -> Result<String> {
    Ok(jwk.public_view().key_uri()?)
  }

  /// Signs `data` with the private key at `key_uri`. The signature
  /// encoding is algorithm-canonical.
  async fn sign(&self, key_uri: &str, data: &[u8]) -> Result<Vec<u8>>;

  /// Verifies `signature` over `data` against `public_jwk`. Never fails
  /// for a signature-shape mismatch; returns `false` instead.
  async fn verify(&self, public_jwk: &Jwk, signature: &[u8], data: &[u8]) -> Result<bool>;

  /// Computes a digest of `data`.
  async fn digest(&self, alg: DigestAlg, data: &[u8]) -> Result<Vec<u8>>;
}

pub(crate) fn digest(alg: DigestAlg, data: &[u8]) -> Vec<u8> {
  match alg {
    DigestAlg::Sha256 => web5_crypto::sha256(data).to_vec(),
  }
}
