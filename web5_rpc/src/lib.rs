// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC transport to record-node substrates (C10): HTTP
//! request/response (with the `dwn-request`/`dwn-response` header
//! convention and a cached `GET /info`) and WebSocket subscriptions.
//! Everything above this crate treats the substrate as an opaque
//! process-request capability; this crate is the one place that speaks
//! its actual wire protocol.

mod bytes;
mod client;
mod config;
mod error;
mod http;
mod request;
mod ws;

pub use bytes::ByteSource;
pub use client::RpcClient;
pub use config::RpcConfig;
pub use error::codes;
pub use error::Result;
pub use error::RpcError;
pub use http::HttpTransport;
pub use http::ServerInfo;
pub use request::IdGenerator;
pub use request::JsonRpcError;
pub use request::JsonRpcRequest;
pub use request::JsonRpcResponse;
pub use request::RequestId;
pub use ws::subscribe;
pub use ws::Subscription;
