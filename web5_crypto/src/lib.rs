// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Primitive cryptographic operations over byte arrays.
//!
//! Every function here is a pure operation on bytes; nothing in this
//! crate knows about JWKs, key URIs, or key storage. See `web5_jose` for
//! the JOSE layer built on top, and `web5_kms` for the key manager that
//! owns private key material.

mod aead;
mod ecdsa;
mod eddsa;
mod error;
mod hash;
mod kw;
mod x25519;

pub use aead::aes_ctr_decrypt;
pub use aead::aes_ctr_encrypt;
pub use aead::aes_gcm_decrypt;
pub use aead::aes_gcm_encrypt;
pub use aead::xchacha20poly1305_decrypt;
pub use aead::xchacha20poly1305_encrypt;
pub use ecdsa::secp256k1_sign;
pub use ecdsa::secp256k1_verify;
pub use eddsa::ed25519_sign;
pub use eddsa::ed25519_verify;
pub use error::CryptoError;
pub use hash::hkdf_sha256;
pub use hash::random_bytes;
pub use hash::sha256;
pub use kw::aes_kw_unwrap;
pub use kw::aes_kw_wrap;
pub use x25519::x25519_derive;

/// Result alias used throughout this crate.
pub type Result<T> = core::result::Result<T, CryptoError>;
