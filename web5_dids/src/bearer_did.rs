// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use web5_jose::Jwk;
use web5_kms::Kms;
use web5_kms::KeyAlg;
use web5_kms::KmsError;

use crate::document::DidDocument;
use crate::document::ResolutionMetadata;
use crate::error::DidError;
use crate::error::Result;
use crate::methods::default_get_signing_method;

/// A signer bound to one verification method of a [`BearerDid`].
pub struct Signer {
  pub algorithm: KeyAlg,
  pub key_id: String,
  kms: Arc<dyn Kms>,
  public_jwk: Jwk,
}

impl Signer {
  pub async fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
    Ok(self.kms.sign(&self.key_id, data).await?)
  }

  pub async fn verify(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
    Ok(self.kms.verify(&self.public_jwk, signature, data).await?)
  }
}

/// A DID document's private-key-bearing export, portable across process
/// boundaries. `private_keys` is populated only when every verification
/// method's key manager entry supports export.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PortableDid {
  pub uri: String,
  pub document: DidDocument,
  pub metadata: ResolutionMetadata,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub private_keys: Option<Vec<Jwk>>,
}

/// A value pairing a DID document with the key manager that holds its
/// private key material.
pub struct BearerDid {
  pub uri: String,
  pub document: DidDocument,
  pub metadata: ResolutionMetadata,
  kms: Arc<dyn Kms>,
}

impl BearerDid {
  pub fn new(uri: String, document: DidDocument, metadata: ResolutionMetadata, kms: Arc<dyn Kms>) -> Self {
    Self {
      uri,
      document,
      metadata,
      kms,
    }
  }

  /// Selects a signer: `method_id` if given, otherwise the first entry
  /// of `assertionMethod`; fails `NoSigningMethod` if neither resolves.
  pub fn get_signer(&self, method_id: Option<&str>) -> Result<Signer> {
    let vm = default_get_signing_method(&self.document, method_id)?;
    let algorithm = KeyAlg::from_jwk(&vm.public_key_jwk)?;
    let key_id = vm.public_key_jwk.key_uri()?;
    Ok(Signer {
      algorithm,
      key_id,
      kms: self.kms.clone(),
      public_jwk: vm.public_key_jwk,
    })
  }

  /// Exports this DID as a [`PortableDid`]. `private_keys` is omitted
  /// entirely if the key manager forbids export for any key.
  pub async fn export(&self) -> Result<PortableDid> {
    let mut private_keys = Vec::with_capacity(self.document.verification_method.len());
    for vm in &self.document.verification_method {
      let key_uri = vm.public_key_jwk.key_uri()?;
      match self.kms.export(&key_uri).await {
        Ok(jwk) => private_keys.push(jwk),
        Err(KmsError::NotExportable) => {
          return Ok(PortableDid {
            uri: self.uri.clone(),
            document: self.document.clone(),
            metadata: self.metadata.clone(),
            private_keys: None,
          })
        }
        Err(e) => return Err(e.into()),
      }
    }
    Ok(PortableDid {
      uri: self.uri.clone(),
      document: self.document.clone(),
      metadata: self.metadata.clone(),
      private_keys: Some(private_keys),
    })
  }

  /// Imports a [`PortableDid`], first importing any supplied private
  /// keys, then validating that every verification method's public key
  /// is present in `kms`.
  pub async fn import(portable: PortableDid, kms: Arc<dyn Kms>) -> Result<BearerDid> {
    if let Some(private_keys) = &portable.private_keys {
      for jwk in private_keys {
        kms.import(jwk.clone()).await?;
      }
    }

    for vm in &portable.document.verification_method {
      let key_uri = vm.public_key_jwk.key_uri()?;
      kms
        .get_public(&key_uri)
        .await
        .map_err(|_| DidError::NotFound(format!("key manager is missing {key_uri}")))?;
    }

    Ok(BearerDid::new(portable.uri, portable.document, portable.metadata, kms))
  }
}
