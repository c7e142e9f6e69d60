// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! The client-side handshake state machine (spec §4.9):
//!
//! ```text
//! Init -> EphemeralKeys -> PushedAuthRequest -> URIReady -> Polling -> { Received, TimedOut, Error }
//!                                                                    -> DecryptedResponse
//! ```
//!
//! States are logged at `debug` (SPEC_FULL §3.1), never with secret
//! material, and are otherwise just a narration aid: the actual control
//! flow lives in [`crate::client::ConnectClient`]'s method sequence.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
  Init,
  EphemeralKeys,
  PushedAuthRequest,
  UriReady,
  Polling,
  Received,
  TimedOut,
  Error,
  DecryptedResponse,
}

pub(crate) fn transition(from: ConnectState, to: ConnectState) {
  tracing::debug!(?from, ?to, "wallet-connect state transition");
}
