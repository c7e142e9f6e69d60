// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! DID URL parsing, the `jwk` and `dht` DID methods, a TTL-cached
//! universal resolver, and the `BearerDid` facade that pairs a DID
//! document with the key manager holding its private key material.

mod bearer_did;
mod cache;
mod did_url;
mod document;
mod error;
pub mod methods;
mod resolver;
mod zbase32;

pub use bearer_did::BearerDid;
pub use bearer_did::PortableDid;
pub use bearer_did::Signer;
pub use cache::TtlCache;
pub use did_url::parse as parse_did_url;
pub use did_url::DidUrl;
pub use document::DereferencedItem;
pub use document::DidDocument;
pub use document::ResolutionMetadata;
pub use document::ResolutionResult;
pub use document::Service;
pub use document::VerificationMethod;
pub use error::DidError;
pub use error::Result;
pub use methods::dht::DhtNetwork;
pub use methods::dht::DidDht;
pub use methods::jwk::DidJwk;
pub use methods::CreateOptions;
pub use methods::DidMethod;
pub use resolver::Dereferenced;
pub use resolver::Resolver;
pub use resolver::ResolverConfig;
