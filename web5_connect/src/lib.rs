// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The wallet-connect handshake (C9): an OIDC-PAR-shaped exchange that
//! lets an application obtain permission grants from a user's wallet
//! without either party running a reachable server. A rendezvous server
//! relays ciphertexts it cannot read; the PIN the user reads off both
//! screens binds the response's authentication tag so a passive
//! rendezvous observer cannot decrypt it either.

mod client;
mod config;
mod error;
mod protocol;
mod state;
mod transport;

pub use client::decrypt_response;
pub use client::init_client;
pub use client::poll_with_ttl;
pub use client::wait_for_response;
pub use client::PendingConnect;
pub use config::ConnectConfig;
pub use error::ConnectError;
pub use error::Result;
pub use protocol::AuthorizationRequestObject;
pub use protocol::AuthorizationResponseObject;
pub use state::ConnectState;
pub use transport::HttpRendezvousTransport;
pub use transport::InMemoryRendezvous;
pub use transport::RendezvousTransport;
