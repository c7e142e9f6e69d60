// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A key manager that stores keys by key URI and performs generate,
//! import, export, sign, verify, and digest operations against pluggable
//! backends. See [`InMemoryKms`] and [`RecordBackedKms`].

mod alg;
mod error;
mod memory;
mod record;
mod traits;

pub use alg::KeyAlg;
pub use error::KmsError;
pub use error::Result;
pub use memory::InMemoryKms;
pub use record::KeySubstrate;
pub use record::RecordBackedKms;
pub use traits::DigestAlg;
pub use traits::Kms;
