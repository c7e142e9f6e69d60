// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde::Serialize;
use web5_jose::Jwk;

/// A single verification method entry in a DID document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationMethod {
  pub id: String,
  #[serde(rename = "type")]
  pub type_: String,
  pub controller: String,
  #[serde(rename = "publicKeyJwk")]
  pub public_key_jwk: Jwk,
}

/// A service endpoint entry in a DID document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Service {
  pub id: String,
  #[serde(rename = "type")]
  pub type_: String,
  #[serde(rename = "serviceEndpoint")]
  pub service_endpoint: String,
}

/// A DID document. Verification relationships are stored as reference
/// strings into `verification_method` (either a full DID URL or a
/// bare fragment), matching the DID Core data model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DidDocument {
  pub id: String,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub verification_method: Vec<VerificationMethod>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub authentication: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  #[serde(rename = "assertionMethod")]
  pub assertion_method: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  #[serde(rename = "keyAgreement")]
  pub key_agreement: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  #[serde(rename = "capabilityInvocation")]
  pub capability_invocation: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  #[serde(rename = "capabilityDelegation")]
  pub capability_delegation: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub service: Vec<Service>,
}

impl DidDocument {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      ..Default::default()
    }
  }

  /// Finds a verification method or service whose `id` matches any of
  /// `did_url`, `"#" + fragment`, or bare `fragment`.
  pub fn dereference_fragment(&self, fragment: &str) -> Option<DereferencedItem<'_>> {
    let candidates = [format!("#{fragment}"), fragment.to_string()];
    for method in &self.verification_method {
      if candidates.iter().any(|c| method.id == *c || method.id.ends_with(c.as_str())) {
        return Some(DereferencedItem::VerificationMethod(method));
      }
    }
    for service in &self.service {
      if candidates.iter().any(|c| service.id == *c || service.id.ends_with(c.as_str())) {
        return Some(DereferencedItem::Service(service));
      }
    }
    None
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DereferencedItem<'a> {
  VerificationMethod(&'a VerificationMethod),
  Service(&'a Service),
}

/// Resolution metadata, mirroring the DID Core resolution result shape.
#[derive(Debug, Clone, Default)]
pub struct ResolutionMetadata {
  pub content_type: Option<String>,
}

/// The result of resolving a DID.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
  pub document: DidDocument,
  pub document_metadata: ResolutionMetadata,
}

#[cfg(test)]
mod tests {
  use super::*;
  use web5_jose::JwkType;

  fn sample_document() -> DidDocument {
    let mut doc = DidDocument::new("did:jwk:abc");
    doc.verification_method.push(VerificationMethod {
      id: "did:jwk:abc#0".to_string(),
      type_: "JsonWebKey2020".to_string(),
      controller: "did:jwk:abc".to_string(),
      public_key_jwk: Jwk::new(JwkType::Okp),
    });
    doc.assertion_method.push("did:jwk:abc#0".to_string());
    doc
  }

  #[test]
  fn dereferences_by_full_url_hash_fragment_or_bare_fragment() {
    let doc = sample_document();
    assert!(doc.dereference_fragment("did:jwk:abc#0").is_some());
    assert!(doc.dereference_fragment("0").is_some());
    assert!(doc.dereference_fragment("missing").is_none());
  }
}
