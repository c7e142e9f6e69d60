// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use crypto::hashes::sha::SHA256;
use crypto::hashes::sha::SHA256_LEN;
use crypto::macs::hmac::HMAC_SHA256;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;
use crate::Result;

/// Fills `n` bytes from the OS CSPRNG.
pub fn random_bytes(n: usize) -> Vec<u8> {
  let mut out = vec![0u8; n];
  OsRng.fill_bytes(&mut out);
  out
}

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
  let mut digest = [0u8; SHA256_LEN];
  SHA256(data, &mut digest);
  digest
}

/// HKDF-SHA256 per RFC 5869, extract-then-expand.
///
/// `length` is in *bits* per the spec; the result is rounded up to the
/// nearest byte. `iota-crypto` does not expose a ready-made HKDF binding
/// compatible with this signature, so this builds directly on the
/// `HMAC_SHA256` primitive it already provides.
pub fn hkdf_sha256(ikm: &[u8], salt: &[u8], info: &[u8], length_bits: usize) -> Result<Vec<u8>> {
  let hash_len = SHA256_LEN;
  if length_bits > 255 * hash_len * 8 {
    return Err(CryptoError::InvalidInput(
      "requested HKDF length exceeds 255 * hash length".into(),
    ));
  }
  let length = length_bits.div_ceil(8);

  // extract
  let mut prk = [0u8; SHA256_LEN];
  HMAC_SHA256(ikm, salt, &mut prk);

  // expand
  let mut okm = Vec::with_capacity(length);
  let mut t = Vec::<u8>::new();
  let mut counter: u8 = 1;
  while okm.len() < length {
    let mut input = Vec::with_capacity(t.len() + info.len() + 1);
    input.extend_from_slice(&t);
    input.extend_from_slice(info);
    input.push(counter);

    let mut block = [0u8; SHA256_LEN];
    HMAC_SHA256(&input, &prk, &mut block);

    t = block.to_vec();
    okm.extend_from_slice(&t);
    counter = counter
      .checked_add(1)
      .ok_or_else(|| CryptoError::InvalidInput("HKDF expand counter overflow".into()))?;
  }
  okm.truncate(length);
  Ok(okm)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hkdf_vector_returns_exact_length() {
    let ikm = [0x01, 0x02, 0x03];
    let salt = [0x04, 0x05, 0x06];
    let info = [0x07, 0x08, 0x09];
    let okm = hkdf_sha256(&ikm, &salt, &info, 256).unwrap();
    assert_eq!(okm.len(), 32);
  }

  #[test]
  fn hkdf_rejects_too_long_output() {
    let err = hkdf_sha256(&[1], &[2], &[3], 255 * 256 * 8 + 8);
    assert!(err.is_err());
  }

  #[test]
  fn random_bytes_has_requested_length() {
    assert_eq!(random_bytes(32).len(), 32);
  }

  #[test]
  fn sha256_is_deterministic() {
    assert_eq!(sha256(b"abc"), sha256(b"abc"));
    assert_ne!(sha256(b"abc"), sha256(b"abd"));
  }
}
