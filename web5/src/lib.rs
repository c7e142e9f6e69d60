// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A personal, self-sovereign identity agent: this crate wires
//! `web5_crypto`, `web5_jose`, `web5_kms`, `web5_dids`, `web5_identity`,
//! `web5_connect`, and `web5_rpc` together behind [`Agent`] and
//! [`AgentBuilder`].

mod agent;
mod builder;
mod error;

pub use agent::Agent;
pub use builder::AgentBuilder;
pub use builder::DidMethodChoice;
pub use error::Result;
pub use error::Web5Error;

// Re-exported so application code can construct the types `Agent`'s
// methods take (create/connect options, records, grants) without
// depending on the sub-crates directly.
pub use web5_connect::ConnectConfig;
pub use web5_connect::RendezvousTransport;
pub use web5_dids::CreateOptions;
pub use web5_dids::ResolverConfig;
pub use web5_identity::GrantFilter;
pub use web5_identity::IdentityRecord;
pub use web5_identity::PermissionScope;
pub use web5_identity::RequestFilter;
pub use web5_identity::StoreConfig;
pub use web5_kms::KeyAlg;
pub use web5_rpc::RpcConfig;

/// Convenience `tracing-subscriber` initializer reading `RUST_LOG`
/// (default `info`). Libraries never install a global subscriber
/// themselves; this is for applications and examples that embed an
/// agent and want sensible defaults without writing the boilerplate.
pub fn init_tracing() {
  use tracing_subscriber::EnvFilter;

  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .try_init();
}
