// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Identity records (spec §4.7): long-lived records tenanted under a
//! DID, auto-tenanted under the identity's own DID when no explicit
//! tenant is given.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;
use crate::store::GetOptions;
use crate::store::SetOptions;
use crate::store::StoreConfig;
use crate::store::TenantedStore;
use crate::store::WriteMeta;
use crate::substrate::RecordSubstrate;

/// `https://identity.foundation/schemas/web5/identity-metadata`, the
/// schema identity records are written with (spec §4.7).
pub const IDENTITY_SCHEMA: &str = "https://identity.foundation/schemas/web5/identity-metadata";

/// A long-lived identity record (spec §3 "Identity record").
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
  pub uri: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
  pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Identity API operations, wrapping the tenanted record store (C6)
/// with the identity schema and auto-tenanting rule.
pub struct IdentityApi<S: RecordSubstrate> {
  store: TenantedStore<S>,
}

impl<S: RecordSubstrate> IdentityApi<S> {
  pub fn new(substrate: Arc<S>, config: StoreConfig) -> Self {
    Self {
      store: TenantedStore::new(substrate, IDENTITY_SCHEMA, config),
    }
  }

  /// Creates an identity record. `tenant` defaults to `record.uri` when
  /// not given explicitly (spec §4.7 auto-tenanting).
  pub async fn create(&self, record: IdentityRecord, tenant: Option<&str>) -> Result<String> {
    let tenant = tenant.unwrap_or(record.uri.as_str());
    self
      .store
      .set(tenant, &record.uri, &record.uri, &record, WriteMeta::default(), SetOptions::default())
      .await
  }

  pub async fn get(&self, uri: &str, tenant: Option<&str>) -> Result<Option<IdentityRecord>> {
    let tenant = tenant.unwrap_or(uri);
    self.store.get(tenant, uri, GetOptions { use_cache: true }).await
  }

  pub async fn list(&self, tenant: &str) -> Result<Vec<IdentityRecord>> {
    self.store.list(tenant).await
  }

  pub async fn delete(&self, uri: &str, tenant: Option<&str>) -> Result<bool> {
    let tenant = tenant.unwrap_or(uri);
    self.store.delete(tenant, uri).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::substrate::InMemorySubstrate;

  fn api() -> IdentityApi<InMemorySubstrate> {
    IdentityApi::new(Arc::new(InMemorySubstrate::new()), StoreConfig::default())
  }

  fn sample() -> IdentityRecord {
    IdentityRecord {
      uri: "did:jwk:alice".to_string(),
      name: "Alice".to_string(),
      metadata: serde_json::Map::new(),
    }
  }

  #[tokio::test]
  async fn create_auto_tenants_under_own_did_and_round_trips() {
    let api = api();
    let record = sample();
    api.create(record.clone(), None).await.unwrap();

    let got = api.get(&record.uri, None).await.unwrap().unwrap();
    assert_eq!(got, record);
  }

  #[tokio::test]
  async fn list_returns_all_identities_for_a_tenant() {
    let api = api();
    api.create(sample(), None).await.unwrap();
    let identities = api.list("did:jwk:alice").await.unwrap();
    assert_eq!(identities.len(), 1);
  }

  #[tokio::test]
  async fn delete_removes_the_identity() {
    let api = api();
    let record = sample();
    api.create(record.clone(), None).await.unwrap();
    assert!(api.delete(&record.uri, None).await.unwrap());
    assert!(api.get(&record.uri, None).await.unwrap().is_none());
  }
}
