// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! z-base-32 encoding, used for `did:dht` identity-key-derived method
//! IDs. Hand-rolled (rather than an external crate) so the exact
//! alphabet and bit-packing are verifiable by inspection.

const ALPHABET: &[u8; 32] = b"ybndrfg8ejkmcpqxot1uwisza345h769";

/// Encodes `data` as lowercase z-base-32, with no padding.
pub fn encode(data: &[u8]) -> String {
  let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
  let mut buffer: u32 = 0;
  let mut bits_in_buffer: u32 = 0;

  for &byte in data {
    buffer = (buffer << 8) | byte as u32;
    bits_in_buffer += 8;
    while bits_in_buffer >= 5 {
      bits_in_buffer -= 5;
      let index = (buffer >> bits_in_buffer) & 0x1F;
      out.push(ALPHABET[index as usize] as char);
    }
  }

  if bits_in_buffer > 0 {
    let index = (buffer << (5 - bits_in_buffer)) & 0x1F;
    out.push(ALPHABET[index as usize] as char);
  }

  out
}

fn reverse_lookup(c: char) -> Option<u32> {
  ALPHABET.iter().position(|&a| a as char == c).map(|p| p as u32)
}

/// Decodes a z-base-32 string back into bytes.
pub fn decode(encoded: &str) -> Option<Vec<u8>> {
  let mut out = Vec::new();
  let mut buffer: u32 = 0;
  let mut bits_in_buffer: u32 = 0;

  for c in encoded.chars() {
    let value = reverse_lookup(c.to_ascii_lowercase())?;
    buffer = (buffer << 5) | value;
    bits_in_buffer += 5;
    if bits_in_buffer >= 8 {
      bits_in_buffer -= 8;
      out.push(((buffer >> bits_in_buffer) & 0xFF) as u8);
    }
  }

  Some(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_arbitrary_bytes() {
    let data = b"the quick brown fox jumps over the lazy dog";
    let encoded = encode(data);
    assert_eq!(decode(&encoded).unwrap(), data);
  }

  #[test]
  fn round_trips_32_byte_identity_key() {
    let data = web5_crypto::random_bytes(32);
    let encoded = encode(&data);
    assert!(encoded.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    assert_eq!(decode(&encoded).unwrap(), data);
  }
}
