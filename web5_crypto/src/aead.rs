// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use aes::cipher::KeyIvInit;
use aes::cipher::StreamCipher;
use aes_gcm::aead::Aead;
use aes_gcm::aead::KeyInit;
use aes_gcm::aead::Payload;
use aes_gcm::Aes128Gcm;
use aes_gcm::Aes256Gcm;
use chacha20poly1305::XChaCha20Poly1305;
use chacha20poly1305::XNonce;

use crate::error::CryptoError;
use crate::Result;

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// AES-CTR encrypt/decrypt are the same operation (XOR keystream).
fn aes_ctr_apply(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
  let mut buf = data.to_vec();
  match key.len() {
    16 => {
      let mut cipher =
        Aes128Ctr::new_from_slices(key, iv).map_err(|_| CryptoError::InvalidKey("bad AES-128-CTR key/iv".into()))?;
      cipher.apply_keystream(&mut buf);
    }
    32 => {
      let mut cipher =
        Aes256Ctr::new_from_slices(key, iv).map_err(|_| CryptoError::InvalidKey("bad AES-256-CTR key/iv".into()))?;
      cipher.apply_keystream(&mut buf);
    }
    other => return Err(CryptoError::InvalidKey(format!("unsupported AES-CTR key length: {other}"))),
  }
  Ok(buf)
}

pub fn aes_ctr_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
  aes_ctr_apply(key, iv, plaintext)
}

pub fn aes_ctr_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
  aes_ctr_apply(key, iv, ciphertext)
}

/// AES-GCM with a 12-byte nonce. Returns ciphertext with the 16-byte tag
/// appended, matching the slicing the JWE layer expects.
pub fn aes_gcm_encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
  if nonce.len() != 12 {
    return Err(CryptoError::InvalidInput("AES-GCM nonce must be 12 bytes".into()));
  }
  let payload = Payload { msg: plaintext, aad };
  match key.len() {
    16 => {
      let cipher = Aes128Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey("bad AES-128-GCM key".into()))?;
      cipher
        .encrypt(aes_gcm::Nonce::from_slice(nonce), payload)
        .map_err(|_| CryptoError::OperationFailed("AES-128-GCM encryption failed".into()))
    }
    32 => {
      let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey("bad AES-256-GCM key".into()))?;
      cipher
        .encrypt(aes_gcm::Nonce::from_slice(nonce), payload)
        .map_err(|_| CryptoError::OperationFailed("AES-256-GCM encryption failed".into()))
    }
    other => Err(CryptoError::InvalidKey(format!("unsupported AES-GCM key length: {other}"))),
  }
}

pub fn aes_gcm_decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
  if nonce.len() != 12 {
    return Err(CryptoError::InvalidInput("AES-GCM nonce must be 12 bytes".into()));
  }
  let payload = Payload { msg: ciphertext, aad };
  match key.len() {
    16 => {
      let cipher = Aes128Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey("bad AES-128-GCM key".into()))?;
      cipher
        .decrypt(aes_gcm::Nonce::from_slice(nonce), payload)
        .map_err(|_| CryptoError::OperationFailed("AES-128-GCM decryption failed".into()))
    }
    32 => {
      let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey("bad AES-256-GCM key".into()))?;
      cipher
        .decrypt(aes_gcm::Nonce::from_slice(nonce), payload)
        .map_err(|_| CryptoError::OperationFailed("AES-256-GCM decryption failed".into()))
    }
    other => Err(CryptoError::InvalidKey(format!("unsupported AES-GCM key length: {other}"))),
  }
}

/// XChaCha20-Poly1305 with a 24-byte nonce, used for `enc=XC20P`.
pub fn xchacha20poly1305_encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
  if nonce.len() != 24 {
    return Err(CryptoError::InvalidInput("XChaCha20-Poly1305 nonce must be 24 bytes".into()));
  }
  let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::InvalidKey("bad XC20P key".into()))?;
  let nonce = XNonce::from_slice(nonce);
  cipher
    .encrypt(nonce, Payload { msg: plaintext, aad })
    .map_err(|_| CryptoError::OperationFailed("XChaCha20-Poly1305 encryption failed".into()))
}

pub fn xchacha20poly1305_decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
  if nonce.len() != 24 {
    return Err(CryptoError::InvalidInput("XChaCha20-Poly1305 nonce must be 24 bytes".into()));
  }
  let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| CryptoError::InvalidKey("bad XC20P key".into()))?;
  let nonce = XNonce::from_slice(nonce);
  cipher
    .decrypt(nonce, Payload { msg: ciphertext, aad })
    .map_err(|_| CryptoError::OperationFailed("XChaCha20-Poly1305 decryption failed (tampered or wrong key)".into()))
}
