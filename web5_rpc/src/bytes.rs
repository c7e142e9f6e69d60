// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! A minimal byte-stream abstraction (spec §9 design note) standing in
//! for ad-hoc `Readable`/`ReadableStream` interop: a record-node
//! response is either a small in-memory body or a stream of chunks, and
//! callers choose how to consume either.

use std::pin::Pin;

use futures::Stream;
use futures::StreamExt;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::error::RpcError;

pub type ByteChunks = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

pub enum ByteSource {
  Bytes(Vec<u8>),
  Stream(ByteChunks),
}

impl ByteSource {
  /// Buffers the whole source into memory. Callers reading large
  /// streams should consume `Stream` chunk-by-chunk instead.
  pub async fn consume_to_bytes(self) -> Result<Vec<u8>> {
    match self {
      ByteSource::Bytes(bytes) => Ok(bytes),
      ByteSource::Stream(mut chunks) => {
        let mut out = Vec::new();
        while let Some(chunk) = chunks.next().await {
          out.extend_from_slice(&chunk?);
        }
        Ok(out)
      }
    }
  }

  pub async fn consume_to_string(self) -> Result<String> {
    let bytes = self.consume_to_bytes().await?;
    String::from_utf8(bytes).map_err(|e| RpcError::MalformedResponse(e.to_string()))
  }

  pub async fn consume_to_json<T: DeserializeOwned>(self) -> Result<T> {
    let bytes = self.consume_to_bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::stream;

  #[tokio::test]
  async fn bytes_variant_consumes_directly() {
    let source = ByteSource::Bytes(b"hello".to_vec());
    assert_eq!(source.consume_to_string().await.unwrap(), "hello");
  }

  #[tokio::test]
  async fn stream_variant_concatenates_chunks() {
    let chunks: Vec<Result<Vec<u8>>> = vec![Ok(b"hel".to_vec()), Ok(b"lo".to_vec())];
    let source = ByteSource::Stream(Box::pin(stream::iter(chunks)));
    assert_eq!(source.consume_to_string().await.unwrap(), "hello");
  }

  #[tokio::test]
  async fn consume_to_json_parses_buffered_bytes() {
    let source = ByteSource::Bytes(br#"{"a":1}"#.to_vec());
    let value: serde_json::Value = source.consume_to_json().await.unwrap();
    assert_eq!(value["a"], 1);
  }
}
