// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Transport timeouts (spec §5): connecting and the per-call request
/// budget.
#[derive(Debug, Clone, Copy)]
pub struct RpcConfig {
  pub connect_timeout: Duration,
  pub request_timeout: Duration,
}

impl Default for RpcConfig {
  fn default() -> Self {
    Self {
      connect_timeout: Duration::from_secs(3),
      request_timeout: Duration::from_secs(30),
    }
  }
}
