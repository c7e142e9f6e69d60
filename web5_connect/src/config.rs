// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Polling configuration for the rendezvous handshake (spec §4.9 step 7,
/// §5 timeouts).
#[derive(Debug, Clone, Copy)]
pub struct ConnectConfig {
  pub poll_interval: Duration,
  pub poll_deadline: Duration,
}

impl Default for ConnectConfig {
  fn default() -> Self {
    Self {
      poll_interval: Duration::from_secs(1),
      poll_deadline: Duration::from_secs(5 * 60),
    }
  }
}
