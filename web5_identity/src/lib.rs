// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The tenanted record store (C6) and the identity and permissions APIs
//! (C7) built on top of it.

mod error;
mod identity;
mod permissions;
mod store;
mod substrate;

pub use error::PermissionError;
pub use error::PermissionResult;
pub use error::Result;
pub use error::StoreError;
pub use identity::IdentityApi;
pub use identity::IdentityRecord;
pub use identity::IDENTITY_SCHEMA;
pub use permissions::permissions_protocol;
pub use permissions::Grant;
pub use permissions::GrantFilter;
pub use permissions::MessagesMethod;
pub use permissions::PermissionRequest;
pub use permissions::PermissionScope;
pub use permissions::PermissionsApi;
pub use permissions::RecordsMethod;
pub use permissions::RequestFilter;
pub use permissions::Revocation;
pub use store::GetOptions;
pub use store::SetOptions;
pub use store::StoreConfig;
pub use store::TenantedStore;
pub use store::WriteMeta;
pub use substrate::InMemorySubstrate;
pub use substrate::QueryFilter;
pub use substrate::RecordSubstrate;
pub use substrate::StoredRecord;
pub use substrate::WriteDescriptor;
