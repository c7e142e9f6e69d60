// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Small base64url helpers, named `jwu` after the teacher's own JOSE
//! utility module.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::Result;

pub fn encode_b64(data: impl AsRef<[u8]>) -> String {
  URL_SAFE_NO_PAD.encode(data)
}

pub fn decode_b64(data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
  Ok(URL_SAFE_NO_PAD.decode(data)?)
}
