// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The record substrate: the external record-node capability (spec §3,
//! "Substrate"), reached in a full deployment through an opaque
//! *process-request* RPC. This crate treats it as a duck-typed
//! capability (spec §9, "Duck-typed stores") rather than a concrete
//! daemon client; [`InMemorySubstrate`] is the reference backend used
//! by tests and by any agent that doesn't need cross-process durability.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;

use crate::error::Result;
use crate::error::StoreError;

/// Everything about a write except the record's bytes. `logical_id` is
/// the `(tenant, id)` key the store (C6) indexes by; it is opaque to the
/// substrate itself, which just stores and queries on it like any other
/// descriptor field.
#[derive(Debug, Clone)]
pub struct WriteDescriptor {
  pub schema: String,
  pub data_format: String,
  pub logical_id: String,
  pub protocol: Option<String>,
  pub protocol_path: Option<String>,
  pub parent_context_id: Option<String>,
  pub parent_id: Option<String>,
  pub recipient: Option<String>,
  pub tags: BTreeMap<String, String>,
}

impl WriteDescriptor {
  pub fn new(schema: impl Into<String>, logical_id: impl Into<String>) -> Self {
    Self {
      schema: schema.into(),
      data_format: "application/json".to_string(),
      logical_id: logical_id.into(),
      protocol: None,
      protocol_path: None,
      parent_context_id: None,
      parent_id: None,
      recipient: None,
      tags: BTreeMap::new(),
    }
  }
}

/// A query over the substrate. `None`/empty fields are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
  pub schema: Option<String>,
  pub protocol: Option<String>,
  pub protocol_path: Option<String>,
  pub author: Option<String>,
  pub recipient: Option<String>,
  pub parent_id: Option<String>,
  pub tags: BTreeMap<String, String>,
}

/// A record as the substrate holds it: descriptor, bytes, and the
/// timestamp used to resolve duplicate logical ids (spec §4.6 invariant
/// (b), §9 open question (b)).
#[derive(Debug, Clone)]
pub struct StoredRecord {
  pub record_id: String,
  pub tenant: String,
  pub author: String,
  pub descriptor: WriteDescriptor,
  pub encoded_data: Vec<u8>,
  pub timestamp: u128,
}

/// The minimal capability the tenanted record store (C6) needs from a
/// record node: write, point-read, schema/tag query, and delete.
#[async_trait]
pub trait RecordSubstrate: Send + Sync {
  async fn write(&self, tenant: &str, author: &str, descriptor: WriteDescriptor, data: Vec<u8>) -> Result<(u16, String)>;

  async fn read(&self, tenant: &str, record_id: &str) -> Result<Option<Vec<u8>>>;

  async fn query(&self, tenant: &str, filter: QueryFilter) -> Result<Vec<StoredRecord>>;

  async fn delete(&self, tenant: &str, record_id: &str) -> Result<u16>;
}

fn now_nanos() -> u128 {
  SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos()
}

/// A content-addressed, in-process substrate. Record ids are derived
/// from a monotonically increasing counter folded with tenant and
/// schema, which is sufficient for deterministic, collision-free ids in
/// a single process; it is not meant to model the substrate's actual
/// CID scheme (spec §4.4 design note: that is delegated entirely to
/// pluggable method/substrate modules).
#[derive(Default)]
pub struct InMemorySubstrate {
  records: Mutex<HashMap<String, StoredRecord>>,
  counter: Mutex<u64>,
}

impl InMemorySubstrate {
  pub fn new() -> Self {
    Self::default()
  }

  fn next_record_id(&self) -> String {
    let mut counter = self.counter.lock().expect("lock poisoned");
    *counter += 1;
    format!("record-{:020}", *counter)
  }

  fn matches(record: &StoredRecord, filter: &QueryFilter) -> bool {
    if let Some(schema) = &filter.schema {
      if &record.descriptor.schema != schema {
        return false;
      }
    }
    if let Some(protocol) = &filter.protocol {
      if record.descriptor.protocol.as_deref() != Some(protocol.as_str()) {
        return false;
      }
    }
    if let Some(protocol_path) = &filter.protocol_path {
      if record.descriptor.protocol_path.as_deref() != Some(protocol_path.as_str()) {
        return false;
      }
    }
    if let Some(author) = &filter.author {
      if &record.author != author {
        return false;
      }
    }
    if let Some(parent_id) = &filter.parent_id {
      if record.descriptor.parent_id.as_deref() != Some(parent_id.as_str()) {
        return false;
      }
    }
    if let Some(recipient) = &filter.recipient {
      if record.descriptor.recipient.as_deref() != Some(recipient.as_str()) {
        return false;
      }
    }
    for (k, v) in &filter.tags {
      if record.descriptor.tags.get(k) != Some(v) {
        return false;
      }
    }
    true
  }
}

#[async_trait]
impl RecordSubstrate for InMemorySubstrate {
  async fn write(&self, tenant: &str, author: &str, descriptor: WriteDescriptor, data: Vec<u8>) -> Result<(u16, String)> {
    let record_id = self.next_record_id();
    let record = StoredRecord {
      record_id: record_id.clone(),
      tenant: tenant.to_string(),
      author: author.to_string(),
      descriptor,
      encoded_data: data,
      timestamp: now_nanos(),
    };
    self.records.lock().expect("lock poisoned").insert(record_id.clone(), record);
    Ok((202, record_id))
  }

  async fn read(&self, tenant: &str, record_id: &str) -> Result<Option<Vec<u8>>> {
    let records = self.records.lock().expect("lock poisoned");
    Ok(records.get(record_id).filter(|r| r.tenant == tenant).map(|r| r.encoded_data.clone()))
  }

  async fn query(&self, tenant: &str, filter: QueryFilter) -> Result<Vec<StoredRecord>> {
    let records = self.records.lock().expect("lock poisoned");
    Ok(
      records
        .values()
        .filter(|r| r.tenant == tenant && Self::matches(r, &filter))
        .cloned()
        .collect(),
    )
  }

  async fn delete(&self, tenant: &str, record_id: &str) -> Result<u16> {
    let mut records = self.records.lock().expect("lock poisoned");
    match records.get(record_id) {
      Some(r) if r.tenant == tenant => {
        records.remove(record_id);
        Ok(202)
      }
      Some(_) => Err(StoreError::WriteRejected(403)),
      None => Ok(404),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn write_then_read_round_trips() {
    let substrate = InMemorySubstrate::new();
    let descriptor = WriteDescriptor::new("schema://x", "logical-1");
    let (status, record_id) = substrate.write("did:jwk:tenant", "did:jwk:tenant", descriptor, b"hi".to_vec()).await.unwrap();
    assert_eq!(status, 202);
    assert_eq!(substrate.read("did:jwk:tenant", &record_id).await.unwrap(), Some(b"hi".to_vec()));
  }

  #[tokio::test]
  async fn query_filters_by_schema_and_tags() {
    let substrate = InMemorySubstrate::new();
    let mut descriptor = WriteDescriptor::new("schema://x", "logical-1");
    descriptor.tags.insert("protocol".to_string(), "P".to_string());
    substrate.write("t", "t", descriptor, b"a".to_vec()).await.unwrap();

    let mut other = WriteDescriptor::new("schema://y", "logical-2");
    other.tags.insert("protocol".to_string(), "Q".to_string());
    substrate.write("t", "t", other, b"b".to_vec()).await.unwrap();

    let mut filter = QueryFilter {
      schema: Some("schema://x".to_string()),
      ..Default::default()
    };
    filter.tags.insert("protocol".to_string(), "P".to_string());
    let results = substrate.query("t", filter).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].encoded_data, b"a");
  }

  #[tokio::test]
  async fn delete_on_missing_record_returns_404() {
    let substrate = InMemorySubstrate::new();
    assert_eq!(substrate.delete("t", "nope").await.unwrap(), 404);
  }
}
