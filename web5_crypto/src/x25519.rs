// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use crypto::keys::x25519::PublicKey;
use crypto::keys::x25519::SecretKey;

use crate::error::CryptoError;
use crate::Result;

/// X25519 Diffie-Hellman: derives a 32-byte shared secret from a raw
/// private key and a raw public key.
pub fn x25519_derive(private_key: &[u8], public_key: &[u8]) -> Result<[u8; 32]> {
  let sk_bytes: [u8; SecretKey::LENGTH] = private_key
    .try_into()
    .map_err(|_| CryptoError::InvalidKey("X25519 private key must be 32 bytes".into()))?;
  let pk_bytes: [u8; PublicKey::LENGTH] = public_key
    .try_into()
    .map_err(|_| CryptoError::InvalidKey("X25519 public key must be 32 bytes".into()))?;

  let secret = SecretKey::from_bytes(&sk_bytes);
  let public = PublicKey::from_bytes(&pk_bytes);
  Ok(secret.diffie_hellman(&public).to_bytes())
}
