// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use crypto::signatures::ed25519::PublicKey;
use crypto::signatures::ed25519::SecretKey;
use crypto::signatures::ed25519::Signature;

use crate::error::CryptoError;
use crate::Result;

/// Signs `message` with a raw 32-byte Ed25519 private key.
pub fn ed25519_sign(private_key: &[u8], message: &[u8]) -> Result<[u8; Signature::LENGTH]> {
  let bytes: [u8; SecretKey::LENGTH] = private_key
    .try_into()
    .map_err(|_| CryptoError::InvalidKey("Ed25519 private key must be 32 bytes".into()))?;
  let secret = SecretKey::from_bytes(&bytes);
  Ok(secret.sign(message).to_bytes())
}

/// Verifies an Ed25519 signature. Returns `false` on any shape mismatch
/// rather than an error, per the KMS `verify` contract.
pub fn ed25519_verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
  let Ok(pk_bytes): std::result::Result<[u8; PublicKey::LENGTH], _> = public_key.try_into() else {
    return false;
  };
  let Ok(sig_bytes): std::result::Result<[u8; Signature::LENGTH], _> = signature.try_into() else {
    return false;
  };
  let Ok(public) = PublicKey::try_from(pk_bytes) else {
    return false;
  };
  let signature = Signature::from_bytes(sig_bytes);
  public.verify(&signature, message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trip_signing() {
    let secret = SecretKey::generate().unwrap();
    let public = secret.public_key();
    let msg = b"hello web5";
    let sig = ed25519_sign(&secret.to_bytes(), msg).unwrap();
    assert!(ed25519_verify(&public.to_bytes(), &sig, msg));
  }

  #[test]
  fn verify_rejects_tampered_message() {
    let secret = SecretKey::generate().unwrap();
    let public = secret.public_key();
    let sig = ed25519_sign(&secret.to_bytes(), b"hello").unwrap();
    assert!(!ed25519_verify(&public.to_bytes(), &sig, b"goodbye"));
  }

  #[test]
  fn verify_never_panics_on_malformed_shapes() {
    assert!(!ed25519_verify(&[0u8; 4], &[0u8; 4], b"x"));
  }
}
