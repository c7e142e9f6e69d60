// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use k256::ecdsa::signature::Signer as _;
use k256::ecdsa::signature::Verifier as _;
use k256::ecdsa::Signature;
use k256::ecdsa::SigningKey;
use k256::ecdsa::VerifyingKey;

use crate::error::CryptoError;
use crate::Result;

/// Deterministic (RFC 6979) secp256k1 signature over `message`.
///
/// Returns the raw, fixed-size `r || s` encoding (64 bytes), the
/// algorithm-canonical shape for a JOSE `ES256K` signature.
pub fn secp256k1_sign(private_key: &[u8], message: &[u8]) -> Result<[u8; 64]> {
  let signing_key =
    SigningKey::from_slice(private_key).map_err(|err| CryptoError::InvalidKey(err.to_string()))?;
  let signature: Signature = signing_key.sign(message);
  Ok(signature.to_bytes().into())
}

/// Verifies a secp256k1 signature in raw `r || s` form. Returns `false`
/// on any shape or cryptographic mismatch rather than an error.
pub fn secp256k1_verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
  let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
    return false;
  };
  let Ok(signature) = Signature::try_from(signature) else {
    return false;
  };
  verifying_key.verify(message, &signature).is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;
  use k256::ecdsa::SigningKey;
  use rand::rngs::OsRng;

  #[test]
  fn round_trip_signing() {
    let signing_key = SigningKey::random(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    let msg = b"hello web5";
    let sig = secp256k1_sign(&signing_key.to_bytes(), msg).unwrap();
    assert!(secp256k1_verify(&verifying_key.to_sec1_bytes(), &sig, msg));
  }

  #[test]
  fn signing_is_deterministic() {
    let signing_key = SigningKey::random(&mut OsRng);
    let msg = b"deterministic per RFC 6979";
    let sig1 = secp256k1_sign(&signing_key.to_bytes(), msg).unwrap();
    let sig2 = secp256k1_sign(&signing_key.to_bytes(), msg).unwrap();
    assert_eq!(sig1, sig2);
  }

  #[test]
  fn verify_rejects_malformed_signature() {
    let signing_key = SigningKey::random(&mut OsRng);
    let verifying_key = signing_key.verifying_key();
    assert!(!secp256k1_verify(&verifying_key.to_sec1_bytes(), &[0u8; 4], b"x"));
  }
}
