// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use web5_jose::curves;
use web5_jose::Jwk;
use web5_jose::JwkType;

use crate::error::KmsError;
use crate::error::Result;

/// The key algorithms this key manager can generate, import, and operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlg {
  Ed25519,
  Secp256k1,
  X25519,
}

impl KeyAlg {
  /// Infers the algorithm a JWK was generated for, from its `kty`/`crv`.
  pub fn from_jwk(jwk: &Jwk) -> Result<Self> {
    match (jwk.kty, jwk.crv.as_deref()) {
      (JwkType::Okp, Some(crv)) if crv == curves::ED25519 => Ok(KeyAlg::Ed25519),
      (JwkType::Okp, Some(crv)) if crv == curves::X25519 => Ok(KeyAlg::X25519),
      (JwkType::Ec, Some(crv)) if crv == curves::SECP256K1 => Ok(KeyAlg::Secp256k1),
      _ => Err(KmsError::UnsupportedAlgorithm(format!(
        "kty={:?} crv={:?}",
        jwk.kty, jwk.crv
      ))),
    }
  }

  fn jwk_alg_name(self) -> &'static str {
    match self {
      KeyAlg::Ed25519 => "EdDSA",
      KeyAlg::Secp256k1 => "ES256K",
      KeyAlg::X25519 => "ECDH-ES",
    }
  }

  /// Generates a fresh private key of this algorithm, returned as a JWK.
  pub fn generate(self) -> Result<Jwk> {
    match self {
      KeyAlg::Ed25519 => {
        let seed = web5_crypto::random_bytes(32);
        self.private_jwk_from_seed(&seed)
      }
      KeyAlg::X25519 => {
        let seed = web5_crypto::random_bytes(32);
        self.private_jwk_from_seed(&seed)
      }
      KeyAlg::Secp256k1 => {
        let seed = web5_crypto::random_bytes(32);
        self.private_jwk_from_seed(&seed)
      }
    }
  }

  /// Builds the private-key JWK for this algorithm from raw key bytes
  /// (the Ed25519/X25519 seed, or the secp256k1 scalar).
  pub fn private_jwk_from_seed(self, seed: &[u8]) -> Result<Jwk> {
    match self {
      KeyAlg::Ed25519 => {
        let public = ed25519_public_from_seed(seed)?;
        let mut jwk = Jwk::new(JwkType::Okp);
        jwk.crv = Some(curves::ED25519.to_string());
        jwk.alg = Some(self.jwk_alg_name().to_string());
        jwk.x = Some(web5_jose::encode_b64(public));
        jwk.d = Some(web5_jose::encode_b64(seed));
        Ok(jwk)
      }
      KeyAlg::X25519 => {
        let public = x25519_public_from_seed(seed)?;
        let mut jwk = Jwk::new(JwkType::Okp);
        jwk.crv = Some(curves::X25519.to_string());
        jwk.alg = Some(self.jwk_alg_name().to_string());
        jwk.x = Some(web5_jose::encode_b64(public));
        jwk.d = Some(web5_jose::encode_b64(seed));
        Ok(jwk)
      }
      KeyAlg::Secp256k1 => {
        let (x, y) = secp256k1_public_from_scalar(seed)?;
        let mut jwk = Jwk::new(JwkType::Ec);
        jwk.crv = Some(curves::SECP256K1.to_string());
        jwk.alg = Some(self.jwk_alg_name().to_string());
        jwk.x = Some(web5_jose::encode_b64(x));
        jwk.y = Some(web5_jose::encode_b64(y));
        jwk.d = Some(web5_jose::encode_b64(seed));
        Ok(jwk)
      }
    }
  }

  /// Signs `message` with the private key encoded in `jwk`. The returned
  /// signature is algorithm-canonical: 64 bytes for Ed25519, raw `r||s`
  /// for secp256k1.
  pub fn sign(self, jwk: &Jwk, message: &[u8]) -> Result<Vec<u8>> {
    let d = jwk
      .d
      .as_deref()
      .ok_or_else(|| KmsError::BadKey("jwk has no private component".into()))?;
    let d = web5_jose::decode_b64(d)?;
    match self {
      KeyAlg::Ed25519 => Ok(web5_crypto::ed25519_sign(&d, message)?.to_vec()),
      KeyAlg::Secp256k1 => Ok(web5_crypto::secp256k1_sign(&d, message)?.to_vec()),
      KeyAlg::X25519 => Err(KmsError::UnsupportedAlgorithm("X25519 keys cannot sign".into())),
    }
  }

  /// Verifies `signature` over `message` against the public key encoded
  /// in `jwk`. Returns `false` on shape mismatch, never an error, in
  /// accordance with the verify contract.
  pub fn verify(self, jwk: &Jwk, signature: &[u8], message: &[u8]) -> bool {
    let Some(x) = jwk.x.as_deref() else { return false };
    let Ok(x) = web5_jose::decode_b64(x) else { return false };
    match self {
      KeyAlg::Ed25519 => web5_crypto::ed25519_verify(&x, signature, message),
      KeyAlg::Secp256k1 => {
        let Some(y) = jwk.y.as_deref() else { return false };
        let Ok(y) = web5_jose::decode_b64(y) else { return false };
        let mut uncompressed = Vec::with_capacity(65);
        uncompressed.push(0x04);
        uncompressed.extend_from_slice(&x);
        uncompressed.extend_from_slice(&y);
        web5_crypto::secp256k1_verify(&uncompressed, signature, message)
      }
      KeyAlg::X25519 => false,
    }
  }
}

fn ed25519_public_from_seed(seed: &[u8]) -> Result<Vec<u8>> {
  use crypto::signatures::ed25519::PublicKey;
  use crypto::signatures::ed25519::SecretKey;

  let seed: &[u8; SecretKey::LENGTH] = seed
    .try_into()
    .map_err(|_| KmsError::BadKey(format!("ed25519 seed must be {} bytes", SecretKey::LENGTH)))?;
  let secret = SecretKey::from_bytes(seed);
  let public: PublicKey = secret.public_key();
  Ok(public.to_bytes().to_vec())
}

fn x25519_public_from_seed(seed: &[u8]) -> Result<Vec<u8>> {
  use crypto::keys::x25519::PublicKey;
  use crypto::keys::x25519::SecretKey;

  let seed: &[u8; SecretKey::LENGTH] = seed
    .try_into()
    .map_err(|_| KmsError::BadKey(format!("x25519 seed must be {} bytes", SecretKey::LENGTH)))?;
  let secret = SecretKey::from_bytes(seed);
  let public: PublicKey = secret.public_key();
  Ok(public.to_bytes().to_vec())
}

fn secp256k1_public_from_scalar(seed: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
  use k256::ecdsa::SigningKey;

  let signing_key =
    SigningKey::from_slice(seed).map_err(|e| KmsError::BadKey(format!("invalid secp256k1 scalar: {e}")))?;
  let verifying_key = signing_key.verifying_key();
  let point = verifying_key.to_encoded_point(false);
  let x = point
    .x()
    .ok_or_else(|| KmsError::BadKey("secp256k1 point has no x coordinate".into()))?;
  let y = point
    .y()
    .ok_or_else(|| KmsError::BadKey("secp256k1 point has no y coordinate".into()))?;
  Ok((x.to_vec(), y.to_vec()))
}
