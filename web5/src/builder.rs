// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! [`AgentBuilder`], composing the per-crate configs the way
//! `identity-account::account::builder::AccountBuilder` composes a
//! `Config` and an `AccountStorage`.

use std::sync::Arc;

use web5_connect::ConnectConfig;
use web5_dids::DhtNetwork;
use web5_dids::DidDht;
use web5_dids::DidJwk;
use web5_dids::DidMethod;
use web5_dids::Resolver;
use web5_dids::ResolverConfig;
use web5_identity::RecordSubstrate;
use web5_identity::StoreConfig;
use web5_kms::InMemoryKms;
use web5_kms::Kms;
use web5_rpc::RpcConfig;

use crate::agent::Agent;
use crate::error::Result;

/// Which registered DID method [`Agent::create_identity`] uses to mint a
/// new identity DID. Both methods are always registered on the
/// resolver regardless of this choice, so a `did:dht` identity still
/// resolves a `did:jwk` one created elsewhere, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DidMethodChoice {
  #[default]
  Jwk,
  Dht,
}

/// Builds an [`Agent`]. Every config defaults to the values its own
/// crate specifies (spec §3/§5); `substrate` defaults to an in-process
/// [`web5_identity::InMemorySubstrate`] and `kms` to an in-process
/// [`InMemoryKms`], suitable for tests and for agents that don't need
/// cross-process durability.
pub struct AgentBuilder<S: RecordSubstrate = web5_identity::InMemorySubstrate> {
  kms: Arc<dyn Kms>,
  substrate: Arc<S>,
  did_method: DidMethodChoice,
  resolver_config: ResolverConfig,
  store_config: StoreConfig,
  connect_config: ConnectConfig,
  rpc_config: RpcConfig,
}

impl AgentBuilder<web5_identity::InMemorySubstrate> {
  pub fn new() -> Self {
    Self {
      kms: Arc::new(InMemoryKms::new()),
      substrate: Arc::new(web5_identity::InMemorySubstrate::new()),
      did_method: DidMethodChoice::default(),
      resolver_config: ResolverConfig::default(),
      store_config: StoreConfig::default(),
      connect_config: ConnectConfig::default(),
      rpc_config: RpcConfig::default(),
    }
  }
}

impl Default for AgentBuilder<web5_identity::InMemorySubstrate> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S: RecordSubstrate> AgentBuilder<S> {
  /// Swaps the record substrate backing the tenanted store (C6), e.g.
  /// for a record-node-backed substrate that speaks through `web5_rpc`.
  pub fn substrate<S2: RecordSubstrate>(self, substrate: Arc<S2>) -> AgentBuilder<S2> {
    AgentBuilder {
      kms: self.kms,
      substrate,
      did_method: self.did_method,
      resolver_config: self.resolver_config,
      store_config: self.store_config,
      connect_config: self.connect_config,
      rpc_config: self.rpc_config,
    }
  }

  pub fn kms(mut self, kms: Arc<dyn Kms>) -> Self {
    self.kms = kms;
    self
  }

  pub fn did_method(mut self, choice: DidMethodChoice) -> Self {
    self.did_method = choice;
    self
  }

  pub fn resolver_config(mut self, config: ResolverConfig) -> Self {
    self.resolver_config = config;
    self
  }

  pub fn store_config(mut self, config: StoreConfig) -> Self {
    self.store_config = config;
    self
  }

  pub fn connect_config(mut self, config: ConnectConfig) -> Self {
    self.connect_config = config;
    self
  }

  pub fn rpc_config(mut self, config: RpcConfig) -> Self {
    self.rpc_config = config;
    self
  }

  /// Builds the [`Agent`]: registers both `jwk` and `dht` on a fresh
  /// resolver sharing one [`DhtNetwork`], then wires the tenanted store
  /// APIs and the RPC client over the chosen configs.
  pub fn build(self) -> Result<Agent<S>> {
    let mut resolver = Resolver::new(self.resolver_config);
    let dht_network = Arc::new(DhtNetwork::new());
    let jwk_method: Arc<dyn DidMethod> = Arc::new(DidJwk::new());
    let dht_method: Arc<dyn DidMethod> = Arc::new(DidDht::new(dht_network));
    resolver.register(jwk_method.clone());
    resolver.register(dht_method.clone());

    let primary_method = match self.did_method {
      DidMethodChoice::Jwk => jwk_method,
      DidMethodChoice::Dht => dht_method,
    };

    let identity = web5_identity::IdentityApi::new(self.substrate.clone(), self.store_config);
    let permissions = web5_identity::PermissionsApi::new(self.substrate.clone(), self.store_config);
    let rpc = web5_rpc::RpcClient::new(self.rpc_config)?;

    Ok(Agent {
      kms: self.kms,
      resolver,
      primary_method,
      identity,
      permissions,
      rpc,
      connect_config: self.connect_config,
    })
  }
}
