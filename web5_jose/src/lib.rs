// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! JWK types, key URIs, and the JOSE wire formats (compact JWS, flattened
//! and compact JWE) layered on top of `web5_crypto`'s raw byte
//! operations.

mod error;
mod jwe;
mod jwk;
mod jws;
mod jwu;

pub use error::JoseError;
pub use error::Result;
pub use jwe::decrypt_compact;
pub use jwe::decrypt_flattened;
pub use jwe::encrypt_compact;
pub use jwe::encrypt_flattened;
pub use jwe::DecryptedJwe;
pub use jwe::EncryptParams;
pub use jwe::FlattenedJwe;
pub use jwe::JweEnc;
pub use jwe::JweHeader;
pub use jwk::curves;
pub use jwk::Jwk;
pub use jwk::JwkType;
pub use jws::decode_compact;
pub use jws::encode_compact;
pub use jws::signing_input;
pub use jws::DecodedJws;
pub use jws::JwsHeader;
pub use jwu::decode_b64;
pub use jwu::encode_b64;
