// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The tenanted record store (C6): maps `(tenant, logical_id) ->
//! record_id` through a TTL index that rebuilds on miss, with a
//! separate value cache in front of the decoded JSON. The index is
//! never authoritative; [`RecordSubstrate`] always is (spec §4.6
//! invariant (a)).

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use web5_dids::TtlCache;

use crate::error::Result;
use crate::error::StoreError;
use crate::substrate::QueryFilter;
use crate::substrate::RecordSubstrate;
use crate::substrate::WriteDescriptor;

const INDEX_SEP: char = '\u{1}';

/// Config for the store's two caches (spec §3 data model defaults).
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
  pub index_ttl: Duration,
  pub index_capacity: usize,
  pub value_ttl: Duration,
  pub value_capacity: usize,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      index_ttl: Duration::from_secs(2 * 60 * 60),
      index_capacity: 1000,
      value_ttl: Duration::from_secs(15 * 60),
      value_capacity: 100,
    }
  }
}

/// Options accepted by [`TenantedStore::set`].
#[derive(Debug, Clone, Copy)]
pub struct SetOptions {
  pub prevent_duplicates: bool,
  pub use_cache: bool,
}

impl Default for SetOptions {
  fn default() -> Self {
    Self {
      prevent_duplicates: true,
      use_cache: true,
    }
  }
}

/// Options accepted by [`TenantedStore::get`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
  pub use_cache: bool,
}

/// Everything needed to compose a write beyond the value itself:
/// entity-specific schema plus any protocol metadata (used verbatim by
/// the identity and permissions APIs built on top, §4.7).
#[derive(Debug, Clone, Default)]
pub struct WriteMeta {
  pub protocol: Option<String>,
  pub protocol_path: Option<String>,
  pub parent_context_id: Option<String>,
  pub parent_id: Option<String>,
  pub recipient: Option<String>,
  pub tags: std::collections::BTreeMap<String, String>,
}

fn index_key(tenant: &str, logical_id: &str) -> String {
  format!("{tenant}{INDEX_SEP}{logical_id}")
}

/// A tenanted record store over a [`RecordSubstrate`], at-most-one-live
/// record per `(tenant, logical_id)` under normal operation, tolerant of
/// substrate duplicates under concurrent pressure (spec §9 open
/// question (b)).
pub struct TenantedStore<S: RecordSubstrate> {
  substrate: Arc<S>,
  schema: String,
  index: TtlCache<String>,
  values: TtlCache<Vec<u8>>,
}

impl<S: RecordSubstrate> TenantedStore<S> {
  pub fn new(substrate: Arc<S>, schema: impl Into<String>, config: StoreConfig) -> Self {
    Self {
      substrate,
      schema: schema.into(),
      index: TtlCache::new(config.index_ttl, config.index_capacity),
      values: TtlCache::new(config.value_ttl, config.value_capacity),
    }
  }

  /// Checks the TTL index; on miss, rebuilds it from the substrate via
  /// [`Self::get_all_record_ids`] and re-checks once. Never retries a
  /// substrate error (spec §7 propagation).
  pub async fn lookup_record_id(&self, tenant: &str, logical_id: &str) -> Result<Option<String>> {
    let key = index_key(tenant, logical_id);
    if let Some(record_id) = self.index.get(&key)? {
      return Ok(Some(record_id));
    }

    tracing::debug!(tenant, logical_id, "index miss, rebuilding from substrate");
    self.rebuild_index(tenant).await?;
    self.index.get(&key)
  }

  async fn rebuild_index(&self, tenant: &str) -> Result<Vec<(String, String, Vec<u8>, u128)>> {
    let filter = QueryFilter {
      schema: Some(self.schema.clone()),
      ..Default::default()
    };
    let records = self.substrate.query(tenant, filter).await?;

    // Resolve duplicates by timestamp, breaking ties by record id (which
    // is assigned in write order): the most recent record per logical id
    // wins the index entry (spec §4.6 invariant (b)).
    let mut latest: std::collections::HashMap<String, &crate::substrate::StoredRecord> = std::collections::HashMap::new();
    for record in &records {
      let entry = latest.entry(record.descriptor.logical_id.clone()).or_insert(record);
      if (record.timestamp, &record.record_id) >= (entry.timestamp, &entry.record_id) {
        *entry = record;
      }
    }

    let mut out = Vec::with_capacity(latest.len());
    for (logical_id, record) in latest {
      let key = index_key(tenant, &logical_id);
      let _ = self.index.set(key, record.record_id.clone());
      out.push((logical_id, record.record_id.clone(), record.encoded_data.clone(), record.timestamp));
    }
    Ok(out)
  }

  /// Writes `value` under `(tenant, logical_id)`. Spec §4.6 `set`.
  pub async fn set<T: Serialize>(
    &self,
    tenant: &str,
    author: &str,
    logical_id: &str,
    value: &T,
    meta: WriteMeta,
    options: SetOptions,
  ) -> Result<String> {
    if options.prevent_duplicates {
      if self.lookup_record_id(tenant, logical_id).await?.is_some() {
        return Err(StoreError::DuplicateEntry);
      }
    }

    let bytes = serde_json::to_vec(value)?;

    let mut descriptor = WriteDescriptor::new(self.schema.clone(), logical_id.to_string());
    descriptor.protocol = meta.protocol;
    descriptor.protocol_path = meta.protocol_path;
    descriptor.parent_context_id = meta.parent_context_id;
    descriptor.parent_id = meta.parent_id;
    descriptor.recipient = meta.recipient;
    descriptor.tags = meta.tags;

    let (status, record_id) = self.substrate.write(tenant, author, descriptor, bytes.clone()).await?;
    if status != 202 {
      return Err(StoreError::WriteRejected(status));
    }

    // Index only mutates on a successful 202, so a cancelled or failed
    // write never leaves a dangling index entry (spec §5 cancellation).
    let _ = self.index.set(index_key(tenant, logical_id), record_id.clone());
    if options.use_cache {
      let _ = self.values.set(record_id.clone(), bytes);
    }

    Ok(record_id)
  }

  /// Reads the value at `(tenant, logical_id)`, if any. Spec §4.6 `get`.
  pub async fn get<T: DeserializeOwned>(&self, tenant: &str, logical_id: &str, options: GetOptions) -> Result<Option<T>> {
    let Some(record_id) = self.lookup_record_id(tenant, logical_id).await? else {
      return Ok(None);
    };

    if options.use_cache {
      if let Some(bytes) = self.values.get(&record_id)? {
        return Ok(Some(serde_json::from_slice(&bytes)?));
      }
    }

    let bytes = self
      .substrate
      .read(tenant, &record_id)
      .await?
      .ok_or(StoreError::RecordMissing)?;

    if options.use_cache {
      let _ = self.values.set(record_id, bytes.clone());
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
  }

  /// Queries the substrate for every record of this store's schema
  /// under `tenant`, rebuilding the index as a side effect, and returns
  /// the most-recent value per logical id. Spec §4.6 `list`.
  pub async fn list<T: DeserializeOwned>(&self, tenant: &str) -> Result<Vec<T>> {
    let rebuilt = self.rebuild_index(tenant).await?;
    let mut out = Vec::with_capacity(rebuilt.len());
    for (_, _, data, _) in rebuilt {
      out.push(serde_json::from_slice(&data)?);
    }
    Ok(out)
  }

  /// Runs an arbitrary substrate query scoped to this store's schema and
  /// deserializes the matches, without touching the logical-id index.
  /// Used by callers (e.g. permissions fetches) that filter on fields
  /// `get`/`list` don't expose, such as author or protocol path.
  pub async fn query_raw<T: DeserializeOwned>(&self, tenant: &str, mut filter: QueryFilter) -> Result<Vec<T>> {
    filter.schema = Some(self.schema.clone());
    let records = self.substrate.query(tenant, filter).await?;
    records
      .into_iter()
      .map(|r| Ok(serde_json::from_slice(&r.encoded_data)?))
      .collect()
  }

  /// Deletes every live record at `(tenant, logical_id)`, tolerating
  /// substrate duplicates from races (spec §9 open question (b)).
  /// Returns `false` if no record ever existed.
  pub async fn delete(&self, tenant: &str, logical_id: &str) -> Result<bool> {
    let Some(_) = self.lookup_record_id(tenant, logical_id).await? else {
      return Ok(false);
    };

    let filter = QueryFilter {
      schema: Some(self.schema.clone()),
      ..Default::default()
    };
    let duplicates: Vec<String> = self
      .substrate
      .query(tenant, filter)
      .await?
      .into_iter()
      .filter(|r| r.descriptor.logical_id == logical_id)
      .map(|r| r.record_id)
      .collect();

    for record_id in &duplicates {
      let status = self.substrate.delete(tenant, record_id).await?;
      if status != 202 && status != 404 {
        return Err(StoreError::WriteRejected(status));
      }
      let _ = self.values.delete(record_id);
    }

    let _ = self.index.delete(&index_key(tenant, logical_id));
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::substrate::InMemorySubstrate;
  use serde::Deserialize;

  #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
  struct Widget {
    name: String,
  }

  fn store() -> TenantedStore<InMemorySubstrate> {
    TenantedStore::new(Arc::new(InMemorySubstrate::new()), "schema://widget", StoreConfig::default())
  }

  #[tokio::test]
  async fn set_then_get_round_trips() {
    let store = store();
    let widget = Widget { name: "gear".to_string() };
    store
      .set("tenant", "tenant", "widget-1", &widget, WriteMeta::default(), SetOptions::default())
      .await
      .unwrap();

    let got: Widget = store.get("tenant", "widget-1", GetOptions { use_cache: true }).await.unwrap().unwrap();
    assert_eq!(got, widget);
  }

  #[tokio::test]
  async fn set_rejects_duplicate_logical_id_by_default() {
    let store = store();
    let widget = Widget { name: "gear".to_string() };
    store
      .set("tenant", "tenant", "widget-1", &widget, WriteMeta::default(), SetOptions::default())
      .await
      .unwrap();

    let result = store
      .set("tenant", "tenant", "widget-1", &widget, WriteMeta::default(), SetOptions::default())
      .await;
    assert!(matches!(result, Err(StoreError::DuplicateEntry)));
  }

  #[tokio::test]
  async fn get_on_missing_logical_id_returns_none() {
    let store = store();
    let got: Option<Widget> = store.get("tenant", "missing", GetOptions::default()).await.unwrap();
    assert!(got.is_none());
  }

  #[tokio::test]
  async fn delete_then_get_returns_none() {
    let store = store();
    let widget = Widget { name: "gear".to_string() };
    store
      .set("tenant", "tenant", "widget-1", &widget, WriteMeta::default(), SetOptions::default())
      .await
      .unwrap();

    assert!(store.delete("tenant", "widget-1").await.unwrap());
    let got: Option<Widget> = store.get("tenant", "widget-1", GetOptions::default()).await.unwrap();
    assert!(got.is_none());
  }

  #[tokio::test]
  async fn delete_on_never_written_logical_id_returns_false() {
    let store = store();
    assert!(!store.delete("tenant", "never").await.unwrap());
  }

  #[tokio::test]
  async fn list_rebuilds_index_and_returns_all_values() {
    let store = store();
    for i in 0..3 {
      let widget = Widget { name: format!("gear-{i}") };
      store
        .set("tenant", "tenant", &format!("widget-{i}"), &widget, WriteMeta::default(), SetOptions::default())
        .await
        .unwrap();
    }
    let all: Vec<Widget> = store.list("tenant").await.unwrap();
    assert_eq!(all.len(), 3);
  }

  #[tokio::test]
  async fn duplicate_substrate_records_resolve_by_timestamp_and_delete_removes_all() {
    // Simulates the chaos-monkey scenario (spec §9 open question (b)):
    // two racing writes land on the same logical id without
    // `prevent_duplicates` guarding them.
    let substrate = Arc::new(InMemorySubstrate::new());
    let store = TenantedStore::new(substrate.clone(), "schema://widget", StoreConfig::default());

    let first = Widget { name: "first".to_string() };
    let second = Widget { name: "second".to_string() };

    store
      .set(
        "tenant",
        "tenant",
        "widget-1",
        &first,
        WriteMeta::default(),
        SetOptions { prevent_duplicates: false, use_cache: false },
      )
      .await
      .unwrap();
    store
      .set(
        "tenant",
        "tenant",
        "widget-1",
        &second,
        WriteMeta::default(),
        SetOptions { prevent_duplicates: false, use_cache: false },
      )
      .await
      .unwrap();

    let got: Widget = store.get("tenant", "widget-1", GetOptions::default()).await.unwrap().unwrap();
    assert_eq!(got, second);

    assert!(store.delete("tenant", "widget-1").await.unwrap());
    let got: Option<Widget> = store.get("tenant", "widget-1", GetOptions::default()).await.unwrap();
    assert!(got.is_none());
  }
}
