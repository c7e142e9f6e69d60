// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

pub mod dht;
pub mod jwk;

use std::sync::Arc;

use async_trait::async_trait;
use web5_kms::Kms;
use web5_kms::KeyAlg;

use crate::bearer_did::BearerDid;
use crate::document::DidDocument;
use crate::document::ResolutionResult;
use crate::document::VerificationMethod;
use crate::error::Result;

/// Options accepted by [`DidMethod::create`].
#[derive(Debug, Clone)]
pub struct CreateOptions {
  pub key_alg: KeyAlg,
  /// `"sig"` or `"enc"`; `None` means both verification relationships.
  pub use_: Option<String>,
  /// `did:dht` only: whether to publish the document to the (simulated)
  /// distributed KV network.
  pub publish: bool,
}

impl Default for CreateOptions {
  fn default() -> Self {
    Self {
      key_alg: KeyAlg::Ed25519,
      use_: None,
      publish: true,
    }
  }
}

/// A DID method implementation: deterministic (`jwk`) or publishable
/// (`dht`).
#[async_trait]
pub trait DidMethod: Send + Sync {
  fn method_name(&self) -> &'static str;

  async fn create(&self, kms: Arc<dyn Kms>, options: CreateOptions) -> Result<BearerDid>;

  async fn resolve(&self, did_uri: &str) -> Result<ResolutionResult>;

  fn get_signing_method(&self, document: &DidDocument, method_id: Option<&str>) -> Result<VerificationMethod>;
}

/// Shared `get_signing_method` logic: methods differ only in document
/// shape, not in verification-method selection, so both `jwk` and `dht`
/// delegate to this.
pub(crate) fn default_get_signing_method(
  document: &DidDocument,
  method_id: Option<&str>,
) -> Result<VerificationMethod> {
  use crate::error::DidError;

  if let Some(method_id) = method_id {
    return document
      .verification_method
      .iter()
      .find(|vm| vm.id == method_id || vm.id.ends_with(method_id))
      .cloned()
      .ok_or(DidError::NoSigningMethod);
  }

  let first_assertion = document.assertion_method.first().ok_or(DidError::NoSigningMethod)?;
  document
    .verification_method
    .iter()
    .find(|vm| vm.id == *first_assertion || vm.id.ends_with(first_assertion.as_str()))
    .cloned()
    .ok_or(DidError::NoSigningMethod)
}
