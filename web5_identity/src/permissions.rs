// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Grants, requests, and revocations (spec §3, §4.7): signed records
//! encoding scoped, delegable capabilities over records or messages,
//! persisted under the fixed `PermissionsProtocol` (spec §6).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::PermissionError;
use crate::error::PermissionResult;
use crate::error::Result;
use crate::store::GetOptions;
use crate::store::SetOptions;
use crate::store::StoreConfig;
use crate::store::TenantedStore;
use crate::store::WriteMeta;
use crate::substrate::QueryFilter;
use crate::substrate::RecordSubstrate;

/// The schema grants/requests/revocations are persisted under; distinct
/// from the identity schema since these are a different record kind,
/// but sharing one tenanted store keeps the index/cache semantics
/// identical across all three (spec §4.7 step 2).
pub const PERMISSIONS_SCHEMA: &str = "https://identity.foundation/schemas/web5/permissions";

/// The protocol identifier and path constants (spec §6), treated as
/// opaque strings exported by this module.
pub mod permissions_protocol {
  pub const URI: &str = "https://tbd.website/dwn/permissions";
  pub const GRANT_PATH: &str = "grant";
  pub const REQUEST_PATH: &str = "request";
  pub const REVOCATION_PATH: &str = "grant/revocation";
}

/// A `Records` or `Messages` permission scope (spec §3 "Permission scope").
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "interface")]
pub enum PermissionScope {
  #[serde(rename = "Records")]
  Records {
    method: RecordsMethod,
    protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    protocol_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context_id: Option<String>,
  },
  #[serde(rename = "Messages")]
  Messages {
    method: MessagesMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    protocol: Option<String>,
  },
}

impl PermissionScope {
  pub fn protocol(&self) -> Option<&str> {
    match self {
      PermissionScope::Records { protocol, .. } => Some(protocol.as_str()),
      PermissionScope::Messages { protocol, .. } => protocol.as_deref(),
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordsMethod {
  Write,
  Read,
  Query,
  Delete,
  Subscribe,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagesMethod {
  Query,
  Read,
  Subscribe,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Grant {
  pub id: String,
  pub grantor: String,
  pub grantee: String,
  pub scope: PermissionScope,
  pub date_expires: String,
  pub delegated: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
  pub id: String,
  pub grantee: String,
  pub scope: PermissionScope,
  pub delegated: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Revocation {
  pub parent_grant_id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

fn protocol_tag(scope: &PermissionScope) -> BTreeMap<String, String> {
  let mut tags = BTreeMap::new();
  if let Some(protocol) = scope.protocol() {
    tags.insert("protocol".to_string(), protocol.to_string());
  }
  tags
}

/// Filter accepted by [`PermissionsApi::fetch_grants`].
#[derive(Debug, Clone, Default)]
pub struct GrantFilter {
  pub grantor: Option<String>,
  pub grantee: Option<String>,
  pub protocol: Option<String>,
}

/// Filter accepted by [`PermissionsApi::fetch_requests`].
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
  pub author: Option<String>,
  pub protocol: Option<String>,
}

/// Grant/request/revocation creation and lookup, built over the
/// tenanted record store (C6).
pub struct PermissionsApi<S: RecordSubstrate> {
  store: TenantedStore<S>,
}

impl<S: RecordSubstrate> PermissionsApi<S> {
  pub fn new(substrate: Arc<S>, config: StoreConfig) -> Self {
    Self {
      store: TenantedStore::new(substrate, PERMISSIONS_SCHEMA, config),
    }
  }

  /// Spec §4.7 grant creation: writes with `protocolPath = grantPath`
  /// and, when the scope names a protocol, `tags.protocol`.
  pub async fn create_grant(&self, author: &str, target: &str, grant: Grant) -> Result<String> {
    let mut meta = WriteMeta {
      protocol: Some(permissions_protocol::URI.to_string()),
      protocol_path: Some(permissions_protocol::GRANT_PATH.to_string()),
      recipient: Some(grant.grantee.clone()),
      ..Default::default()
    };
    meta.tags = protocol_tag(&grant.scope);

    self
      .store
      .set(target, author, &format!("grant/{}", grant.id), &grant, meta, SetOptions::default())
      .await
  }

  pub async fn create_request(&self, author: &str, target: &str, request: PermissionRequest) -> Result<String> {
    let mut meta = WriteMeta {
      protocol: Some(permissions_protocol::URI.to_string()),
      protocol_path: Some(permissions_protocol::REQUEST_PATH.to_string()),
      ..Default::default()
    };
    meta.tags = protocol_tag(&request.scope);

    self
      .store
      .set(target, author, &format!("request/{}", request.id), &request, meta, SetOptions::default())
      .await
  }

  /// Spec §4.7 revocation creation: `parentContextId = grant.id`, stored
  /// under a logical id distinct from the grant so `is_grant_revoked`
  /// can point-read it by `parentId`.
  pub async fn create_revocation(&self, author: &str, target: &str, revocation: Revocation) -> Result<String> {
    let meta = WriteMeta {
      protocol: Some(permissions_protocol::URI.to_string()),
      protocol_path: Some(permissions_protocol::REVOCATION_PATH.to_string()),
      parent_context_id: Some(revocation.parent_grant_id.clone()),
      parent_id: Some(revocation.parent_grant_id.clone()),
      ..Default::default()
    };

    self
      .store
      .set(
        target,
        author,
        &format!("revocation/{}", revocation.parent_grant_id),
        &revocation,
        meta,
        SetOptions::default(),
      )
      .await
  }

  /// Spec §4.7 `fetch_grants`: queries with `author=grantor`,
  /// `recipient=grantee`, `protocolPath=grant`, and optional
  /// `tags.protocol`.
  pub async fn fetch_grants(&self, target: &str, filter: GrantFilter) -> Result<Vec<Grant>> {
    let mut query = QueryFilter {
      protocol: Some(permissions_protocol::URI.to_string()),
      protocol_path: Some(permissions_protocol::GRANT_PATH.to_string()),
      author: filter.grantor,
      recipient: filter.grantee,
      ..Default::default()
    };
    if let Some(protocol) = filter.protocol {
      query.tags.insert("protocol".to_string(), protocol);
    }
    self.raw_query(target, query).await
  }

  pub async fn fetch_requests(&self, target: &str, filter: RequestFilter) -> Result<Vec<PermissionRequest>> {
    let mut query = QueryFilter {
      protocol: Some(permissions_protocol::URI.to_string()),
      protocol_path: Some(permissions_protocol::REQUEST_PATH.to_string()),
      author: filter.author,
      ..Default::default()
    };
    if let Some(protocol) = filter.protocol {
      query.tags.insert("protocol".to_string(), protocol);
    }
    self.raw_query(target, query).await
  }

  /// Spec §4.7 `is_grant_revoked`: a point read for a revocation whose
  /// `parentId` equals `grant_id`'s logical id. Missing => not revoked;
  /// present => revoked.
  pub async fn is_grant_revoked(&self, target: &str, grant_id: &str) -> Result<bool> {
    let revocation: Option<Revocation> = self
      .store
      .get(target, &format!("revocation/{grant_id}"), GetOptions { use_cache: true })
      .await?;
    Ok(revocation.is_some())
  }

  /// Checks a grant against its expiry and revocation status, surfacing
  /// the permission-specific error taxonomy (spec §7).
  pub async fn check_grant_usable(&self, target: &str, grant: &Grant, now_rfc3339: &str) -> PermissionResult<()> {
    if self.is_grant_revoked(target, &grant.id).await? {
      return Err(PermissionError::GrantRevoked);
    }
    if now_rfc3339 >= grant.date_expires.as_str() {
      return Err(PermissionError::GrantExpired);
    }
    Ok(())
  }

  async fn raw_query<T: serde::de::DeserializeOwned>(&self, tenant: &str, filter: QueryFilter) -> Result<Vec<T>> {
    // `TenantedStore` doesn't expose its substrate query directly since
    // callers are meant to go through `get`/`list`; permissions queries
    // need schema+protocol-path filtering list() doesn't support, so we
    // go one level down via a dedicated helper on the store.
    self.store.query_raw(tenant, filter).await
  }
}
