// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! RFC 3394 AES Key Wrap, built directly on the `aes` block-cipher crate
//! (the same RustCrypto family as the AES-GCM implementation below)
//! rather than a dedicated key-wrap crate, so the wrap/unwrap loop is
//! fully auditable here.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::BlockDecrypt;
use aes::cipher::BlockEncrypt;
use aes::cipher::KeyInit;
use aes::Aes128;
use aes::Aes192;
use aes::Aes256;

use crate::error::CryptoError;
use crate::Result;

const DEFAULT_IV: [u8; 8] = [0xA6; 8];

trait KwBlockCipher {
  fn encrypt_block(&self, block: &mut [u8; 16]);
  fn decrypt_block(&self, block: &mut [u8; 16]);
}

macro_rules! impl_kw_block_cipher {
  ($cipher:ty) => {
    impl KwBlockCipher for $cipher {
      fn encrypt_block(&self, block: &mut [u8; 16]) {
        let mut ga = GenericArray::clone_from_slice(block);
        BlockEncrypt::encrypt_block(self, &mut ga);
        block.copy_from_slice(&ga);
      }

      fn decrypt_block(&self, block: &mut [u8; 16]) {
        let mut ga = GenericArray::clone_from_slice(block);
        BlockDecrypt::decrypt_block(self, &mut ga);
        block.copy_from_slice(&ga);
      }
    }
  };
}

impl_kw_block_cipher!(Aes128);
impl_kw_block_cipher!(Aes192);
impl_kw_block_cipher!(Aes256);

fn new_cipher(kek: &[u8]) -> Result<Box<dyn KwBlockCipher>> {
  match kek.len() {
    16 => Ok(Box::new(Aes128::new_from_slice(kek).map_err(|_| CryptoError::InvalidKey("bad AES-128 KEK".into()))?)),
    24 => Ok(Box::new(Aes192::new_from_slice(kek).map_err(|_| CryptoError::InvalidKey("bad AES-192 KEK".into()))?)),
    32 => Ok(Box::new(Aes256::new_from_slice(kek).map_err(|_| CryptoError::InvalidKey("bad AES-256 KEK".into()))?)),
    other => Err(CryptoError::InvalidKey(format!("unsupported AES-KW KEK length: {other}"))),
  }
}

/// RFC 3394 AES Key Wrap. `kek` must be 16, 24, or 32 bytes; `key_material`
/// must be a multiple of 8 bytes, at least 16.
pub fn aes_kw_wrap(kek: &[u8], key_material: &[u8]) -> Result<Vec<u8>> {
  if key_material.len() % 8 != 0 || key_material.len() < 16 {
    return Err(CryptoError::InvalidInput(
      "key material for AES-KW must be a multiple of 8 bytes, at least 16".into(),
    ));
  }
  let cipher = new_cipher(kek)?;
  let n = key_material.len() / 8;

  let mut r: Vec<[u8; 8]> = key_material.chunks_exact(8).map(|c| c.try_into().unwrap()).collect();
  let mut a = DEFAULT_IV;

  for j in 0..=5u64 {
    for (i, block) in r.iter_mut().enumerate() {
      let mut buf = [0u8; 16];
      buf[..8].copy_from_slice(&a);
      buf[8..].copy_from_slice(block);
      cipher.encrypt_block(&mut buf);

      let t = j * (n as u64) + (i as u64) + 1;
      a.copy_from_slice(&buf[..8]);
      for (byte, t_byte) in a.iter_mut().zip(t.to_be_bytes().iter()) {
        *byte ^= t_byte;
      }
      block.copy_from_slice(&buf[8..]);
    }
  }

  let mut out = Vec::with_capacity(8 + key_material.len());
  out.extend_from_slice(&a);
  for block in r {
    out.extend_from_slice(&block);
  }
  Ok(out)
}

/// RFC 3394 AES Key Unwrap. Fails with `OperationFailed` if the integrity
/// check value does not match (tampered ciphertext or wrong KEK).
pub fn aes_kw_unwrap(kek: &[u8], wrapped: &[u8]) -> Result<Vec<u8>> {
  if wrapped.len() % 8 != 0 || wrapped.len() < 24 {
    return Err(CryptoError::InvalidInput("wrapped key has invalid length".into()));
  }
  let cipher = new_cipher(kek)?;
  let n = wrapped.len() / 8 - 1;

  let mut a: [u8; 8] = wrapped[..8].try_into().unwrap();
  let mut r: Vec<[u8; 8]> = wrapped[8..].chunks_exact(8).map(|c| c.try_into().unwrap()).collect();

  for j in (0..=5u64).rev() {
    for i in (0..n).rev() {
      let t = j * (n as u64) + (i as u64) + 1;
      let mut a_xor = a;
      for (byte, t_byte) in a_xor.iter_mut().zip(t.to_be_bytes().iter()) {
        *byte ^= t_byte;
      }

      let mut buf = [0u8; 16];
      buf[..8].copy_from_slice(&a_xor);
      buf[8..].copy_from_slice(&r[i]);
      cipher.decrypt_block(&mut buf);

      a.copy_from_slice(&buf[..8]);
      r[i].copy_from_slice(&buf[8..]);
    }
  }

  if a != DEFAULT_IV {
    return Err(CryptoError::OperationFailed(
      "AES-KW integrity check failed (tampered ciphertext or wrong KEK)".into(),
    ));
  }

  Ok(r.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trip_128() {
    let kek = [0x11u8; 16];
    let key_material = [0x22u8; 16];
    let wrapped = aes_kw_wrap(&kek, &key_material).unwrap();
    let unwrapped = aes_kw_unwrap(&kek, &wrapped).unwrap();
    assert_eq!(unwrapped, key_material);
  }

  #[test]
  fn round_trip_256() {
    let kek = [0x33u8; 32];
    let key_material = [0x44u8; 32];
    let wrapped = aes_kw_wrap(&kek, &key_material).unwrap();
    let unwrapped = aes_kw_unwrap(&kek, &wrapped).unwrap();
    assert_eq!(unwrapped, key_material);
  }

  #[test]
  fn unwrap_detects_tampering() {
    let kek = [0x55u8; 16];
    let key_material = [0x66u8; 24];
    let mut wrapped = aes_kw_wrap(&kek, &key_material).unwrap();
    wrapped[0] ^= 0xFF;
    assert!(aes_kw_unwrap(&kek, &wrapped).is_err());
  }

  #[test]
  fn rejects_unsupported_kek_length() {
    assert!(aes_kw_wrap(&[0u8; 10], &[0u8; 16]).is_err());
  }
}
