// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::JoseError;
use crate::error::Result;
use crate::jwu;

/// `enc` values this implementation supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JweEnc {
  A128Gcm,
  A256Gcm,
  Xc20P,
}

impl JweEnc {
  fn as_str(&self) -> &'static str {
    match self {
      JweEnc::A128Gcm => "A128GCM",
      JweEnc::A256Gcm => "A256GCM",
      JweEnc::Xc20P => "XC20P",
    }
  }

  fn parse(s: &str) -> Result<Self> {
    match s {
      "A128GCM" => Ok(JweEnc::A128Gcm),
      "A256GCM" => Ok(JweEnc::A256Gcm),
      "XC20P" => Ok(JweEnc::Xc20P),
      other => Err(JoseError::UnsupportedAlg(format!("enc={other}"))),
    }
  }

  fn iv_len(&self) -> usize {
    match self {
      JweEnc::A128Gcm | JweEnc::A256Gcm => 12,
      JweEnc::Xc20P => 24,
    }
  }

  fn key_len(&self) -> usize {
    match self {
      JweEnc::A128Gcm => 16,
      JweEnc::A256Gcm => 32,
      JweEnc::Xc20P => 32,
    }
  }
}

/// JWE header members, modeled as an ordered map so merge-duplicate
/// detection (spec §4.8 step 1) and round-trip serialization are exact.
pub type JweHeader = BTreeMap<String, serde_json::Value>;

fn header_str<'a>(header: &'a JweHeader, name: &str) -> Result<&'a str> {
  header
    .get(name)
    .and_then(|v| v.as_str())
    .ok_or_else(|| JoseError::InvalidJwe(format!("missing or non-string `{name}` header")))
}

fn merge_headers(protected: &JweHeader, shared_unprotected: Option<&JweHeader>) -> Result<JweHeader> {
  let mut merged = protected.clone();
  if let Some(unprotected) = shared_unprotected {
    for (k, v) in unprotected {
      if merged.insert(k.clone(), v.clone()).is_some() {
        return Err(JoseError::InvalidJwe(format!("duplicate header member `{k}`")));
      }
    }
  }
  Ok(merged)
}

/// A JWE in flattened JSON serialization (RFC 7516 §7.2.2).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlattenedJwe {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub protected: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unprotected: Option<JweHeader>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub header: Option<JweHeader>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub encrypted_key: Option<String>,
  pub iv: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub aad: Option<String>,
  pub ciphertext: String,
  pub tag: String,
}

pub struct DecryptedJwe {
  pub plaintext: Vec<u8>,
  pub protected_header: JweHeader,
  pub unprotected_header: Option<JweHeader>,
  pub shared_unprotected_header: Option<JweHeader>,
  pub additional_authenticated_data: Option<Vec<u8>>,
}

fn additional_data(protected_b64: &str, aad: Option<&[u8]>) -> String {
  match aad {
    Some(aad) => format!("{protected_b64}.{}", jwu::encode_b64(aad)),
    None => protected_b64.to_string(),
  }
}

fn aead_encrypt(enc: JweEnc, key: &[u8], iv: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
  let combined = match enc {
    JweEnc::A128Gcm | JweEnc::A256Gcm => web5_crypto::aes_gcm_encrypt(key, iv, plaintext, aad)?,
    JweEnc::Xc20P => web5_crypto::xchacha20poly1305_encrypt(key, iv, plaintext, aad)?,
  };
  if combined.len() < 16 {
    return Err(JoseError::InvalidJwe("AEAD output shorter than tag length".into()));
  }
  let split = combined.len() - 16;
  Ok((combined[..split].to_vec(), combined[split..].to_vec()))
}

fn aead_decrypt(enc: JweEnc, key: &[u8], iv: &[u8], ciphertext: &[u8], tag: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
  let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
  combined.extend_from_slice(ciphertext);
  combined.extend_from_slice(tag);
  match enc {
    JweEnc::A128Gcm | JweEnc::A256Gcm => {
      web5_crypto::aes_gcm_decrypt(key, iv, &combined, aad).map_err(|_| JoseError::Decrypt)
    }
    JweEnc::Xc20P => web5_crypto::xchacha20poly1305_decrypt(key, iv, &combined, aad).map_err(|_| JoseError::Decrypt),
  }
}

pub struct EncryptParams<'a> {
  pub plaintext: &'a [u8],
  pub protected_header: JweHeader,
  pub shared_unprotected_header: Option<JweHeader>,
  pub key: &'a [u8],
  pub aad: Option<&'a [u8]>,
}

/// Encrypts `plaintext` into a flattened JWE. Only `alg=dir` is
/// supported: `key` is used directly as the content-encryption key.
pub fn encrypt_flattened(params: EncryptParams<'_>) -> Result<FlattenedJwe> {
  let merged = merge_headers(&params.protected_header, params.shared_unprotected_header.as_ref())?;
  let alg = header_str(&merged, "alg")?;
  if alg != "dir" {
    return Err(JoseError::UnsupportedAlg(format!("alg={alg}")));
  }
  let enc = JweEnc::parse(header_str(&merged, "enc")?)?;
  if params.key.len() != enc.key_len() {
    return Err(JoseError::InvalidKey(format!(
      "enc={:?} requires a {}-byte key, got {}",
      enc,
      enc.key_len(),
      params.key.len()
    )));
  }

  let iv = web5_crypto::random_bytes(enc.iv_len());

  let protected_json = serde_json::to_vec(&params.protected_header)?;
  let protected_b64 = jwu::encode_b64(protected_json);
  let aad_str = additional_data(&protected_b64, params.aad);

  let (ciphertext, tag) = aead_encrypt(enc, params.key, &iv, params.plaintext, aad_str.as_bytes())?;

  Ok(FlattenedJwe {
    protected: Some(protected_b64),
    unprotected: params.shared_unprotected_header,
    header: None,
    encrypted_key: None,
    iv: jwu::encode_b64(iv),
    aad: params.aad.map(jwu::encode_b64),
    ciphertext: jwu::encode_b64(ciphertext),
    tag: jwu::encode_b64(tag),
  })
}

/// Decrypts a flattened JWE. `key` must be the raw content-encryption
/// key (direct key agreement is the only supported mode).
pub fn decrypt_flattened(jwe: &FlattenedJwe, key: &[u8]) -> Result<DecryptedJwe> {
  let protected_b64 = jwe
    .protected
    .as_deref()
    .ok_or_else(|| JoseError::InvalidJwe("missing protected header".into()))?;
  let protected_header: JweHeader = serde_json::from_slice(&jwu::decode_b64(protected_b64)?)?;

  let merged = merge_headers(&protected_header, jwe.unprotected.as_ref())?;
  let alg = header_str(&merged, "alg").map_err(|_| JoseError::InvalidJwe("missing `alg`".into()))?;
  if alg != "dir" {
    return Err(JoseError::UnsupportedAlg(format!("alg={alg}")));
  }
  let enc = header_str(&merged, "enc").map_err(|_| JoseError::InvalidJwe("missing `enc`".into()))?;
  let enc = JweEnc::parse(enc).map_err(|_| JoseError::InvalidJwe(format!("unknown enc `{enc}`")))?;

  if key.len() != enc.key_len() {
    return Err(JoseError::InvalidKey(format!(
      "enc={:?} requires a {}-byte key, got {}",
      enc,
      enc.key_len(),
      key.len()
    )));
  }

  let iv = jwu::decode_b64(&jwe.iv)?;
  if iv.len() != enc.iv_len() {
    return Err(JoseError::InvalidJwe("iv length does not match enc".into()));
  }
  let ciphertext = jwu::decode_b64(&jwe.ciphertext)?;
  let tag = jwu::decode_b64(&jwe.tag)?;
  let aad = jwe.aad.as_deref().map(jwu::decode_b64).transpose()?;
  let aad_str = additional_data(protected_b64, aad.as_deref());

  let plaintext = aead_decrypt(enc, key, &iv, &ciphertext, &tag, aad_str.as_bytes())?;

  Ok(DecryptedJwe {
    plaintext,
    protected_header,
    unprotected_header: jwe.header.clone(),
    shared_unprotected_header: jwe.unprotected.clone(),
    additional_authenticated_data: aad,
  })
}

/// Encrypts into a compact JWE: 5 base64url segments joined by `.`.
/// `encrypted_key` is always empty (direct key agreement only).
pub fn encrypt_compact(params: EncryptParams<'_>) -> Result<String> {
  let jwe = encrypt_flattened(params)?;
  let protected = jwe.protected.unwrap_or_default();
  Ok(format!("{protected}..{}.{}.{}", jwe.iv, jwe.ciphertext, jwe.tag))
}

/// Decrypts a compact JWE (exactly 5 segments).
pub fn decrypt_compact(token: &str, key: &[u8]) -> Result<DecryptedJwe> {
  let parts: Vec<&str> = token.split('.').collect();
  if parts.len() != 5 {
    return Err(JoseError::InvalidJwe("compact JWE must have exactly 5 segments".into()));
  }
  let [protected, encrypted_key, iv, ciphertext, tag] = [parts[0], parts[1], parts[2], parts[3], parts[4]];

  let flattened = FlattenedJwe {
    protected: Some(protected.to_string()),
    unprotected: None,
    header: None,
    encrypted_key: if encrypted_key.is_empty() {
      None
    } else {
      Some(encrypted_key.to_string())
    },
    iv: iv.to_string(),
    aad: None,
    ciphertext: ciphertext.to_string(),
    tag: tag.to_string(),
  };
  decrypt_flattened(&flattened, key)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn dir_header(enc: &str) -> JweHeader {
    let mut header = JweHeader::new();
    header.insert("alg".into(), json!("dir"));
    header.insert("enc".into(), json!(enc));
    header
  }

  #[test]
  fn compact_jwe_round_trip() {
    let key = jwu::decode_b64("x_6M0CwMITqmj0a-u1EggAmolpXWty6UxwlfWVtWgFs").unwrap();
    let plaintext = [0x01, 0x02, 0x03, 0x04];

    let token = encrypt_compact(EncryptParams {
      plaintext: &plaintext,
      protected_header: dir_header("A256GCM"),
      shared_unprotected_header: None,
      key: &key,
      aad: None,
    })
    .unwrap();

    assert_eq!(token.split('.').count(), 5);

    let decrypted = decrypt_compact(&token, &key).unwrap();
    assert_eq!(decrypted.plaintext, plaintext);
    assert_eq!(decrypted.protected_header.get("alg").unwrap(), "dir");
    assert_eq!(decrypted.protected_header.get("enc").unwrap(), "A256GCM");
  }

  #[test]
  fn tampering_any_segment_fails_decryption() {
    let key = web5_crypto::random_bytes(32);
    let token = encrypt_compact(EncryptParams {
      plaintext: b"secret",
      protected_header: dir_header("A256GCM"),
      shared_unprotected_header: None,
      key: &key,
      aad: None,
    })
    .unwrap();

    let mut parts: Vec<String> = token.split('.').map(String::from).collect();
    // tamper the ciphertext segment
    let mut bytes = jwu::decode_b64(&parts[3]).unwrap();
    bytes[0] ^= 0xFF;
    parts[3] = jwu::encode_b64(bytes);
    let tampered = parts.join(".");

    assert!(matches!(decrypt_compact(&tampered, &key), Err(JoseError::Decrypt)));
  }

  #[test]
  fn unknown_enc_is_invalid_jwe() {
    let key = web5_crypto::random_bytes(32);
    let mut header = JweHeader::new();
    header.insert("alg".into(), json!("dir"));
    header.insert("enc".into(), json!("A999BOGUS"));

    let result = encrypt_flattened(EncryptParams {
      plaintext: b"x",
      protected_header: header,
      shared_unprotected_header: None,
      key: &key,
      aad: None,
    });
    assert!(result.is_err());
  }

  #[test]
  fn decrypting_unknown_enc_is_invalid_jwe() {
    let key = web5_crypto::random_bytes(32);
    let mut header = JweHeader::new();
    header.insert("alg".into(), json!("dir"));
    header.insert("enc".into(), json!("A999BOGUS"));
    let protected_b64 = jwu::encode_b64(serde_json::to_vec(&header).unwrap());

    let jwe = FlattenedJwe {
      protected: Some(protected_b64),
      unprotected: None,
      header: None,
      encrypted_key: None,
      iv: jwu::encode_b64([0u8; 12]),
      aad: None,
      ciphertext: jwu::encode_b64(b"whatever"),
      tag: jwu::encode_b64([0u8; 16]),
    };

    assert!(matches!(decrypt_flattened(&jwe, &key), Err(JoseError::InvalidJwe(_))));
  }

  #[test]
  fn xchacha20_flattened_round_trip_with_aad() {
    let key = web5_crypto::random_bytes(32);
    let aad = b"pin-bound-aad";

    let jwe = encrypt_flattened(EncryptParams {
      plaintext: b"hello wallet",
      protected_header: dir_header("XC20P"),
      shared_unprotected_header: None,
      key: &key,
      aad: Some(aad),
    })
    .unwrap();

    let decrypted = decrypt_flattened(&jwe, &key).unwrap();
    assert_eq!(decrypted.plaintext, b"hello wallet");
    assert_eq!(decrypted.additional_authenticated_data.as_deref(), Some(aad.as_slice()));
  }

  #[test]
  fn decrypting_with_wrong_aad_bound_key_fails() {
    // Simulates wallet-connect's PIN-as-AAD guarantee: same JWE, wrong AAD.
    let key = web5_crypto::random_bytes(32);
    let jwe = encrypt_flattened(EncryptParams {
      plaintext: b"hello wallet",
      protected_header: dir_header("XC20P"),
      shared_unprotected_header: None,
      key: &key,
      aad: Some(b"correct-pin"),
    })
    .unwrap();

    let mut wrong_aad_jwe = jwe.clone();
    wrong_aad_jwe.aad = Some(jwu::encode_b64(b"wrong-pin"));

    assert!(matches!(decrypt_flattened(&wrong_aad_jwe, &key), Err(JoseError::Decrypt)));
  }
}
