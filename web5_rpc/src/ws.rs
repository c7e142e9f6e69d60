// Copyright 2020-2025 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! WebSocket subscriptions (spec §6): `rpc.subscribe.<method>` opens a
//! subscription, notifications arrive as JSON-RPC-shaped messages on the
//! same socket, and `rpc.subscribe.close` tears it down. Cancellation is
//! literal (spec §5, §4 item 7): dropping a [`Subscription`] sends the
//! close message from its `Drop` impl rather than relying on the caller
//! to remember to unsubscribe.

use futures::SinkExt;
use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;
use crate::error::RpcError;
use crate::request::IdGenerator;
use crate::request::JsonRpcRequest;
use crate::request::JsonRpcResponse;

/// A live subscription. Notifications are delivered as decoded JSON
/// values through [`Subscription::next`]; dropping the handle
/// unsubscribes.
pub struct Subscription {
  notifications: tokio::sync::mpsc::Receiver<Result<serde_json::Value>>,
  close_tx: Option<tokio::sync::mpsc::Sender<()>>,
}

impl Subscription {
  pub async fn next(&mut self) -> Option<Result<serde_json::Value>> {
    self.notifications.recv().await
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(tx) = self.close_tx.take() {
      // best-effort: the background task may already have exited.
      let _ = tx.try_send(());
    }
  }
}

/// Opens `rpc.subscribe.<method>` over a fresh WebSocket connection to
/// `url` and returns a handle streaming notifications until it is
/// dropped or the server closes the socket.
pub async fn subscribe(url: &str, method: &str, params: Option<serde_json::Value>) -> Result<Subscription> {
  let (ws_stream, response) = tokio_tungstenite::connect_async(url)
    .await
    .map_err(|e| RpcError::NetworkError(e.to_string()))?;
  if !response.status().is_success() {
    return Err(RpcError::HttpStatus(response.status().as_u16()));
  }

  let (mut sink, mut stream) = ws_stream.split();

  let ids = IdGenerator::default();
  let subscribe_request = JsonRpcRequest::new(ids.next(), format!("rpc.subscribe.{method}"), params);
  let subscribe_json = serde_json::to_string(&subscribe_request)?;
  sink
    .send(Message::Text(subscribe_json))
    .await
    .map_err(|e| RpcError::NetworkError(e.to_string()))?;

  let (notif_tx, notif_rx) = tokio::sync::mpsc::channel(32);
  let (close_tx, mut close_rx) = tokio::sync::mpsc::channel(1);

  tokio::spawn(async move {
    loop {
      tokio::select! {
        _ = close_rx.recv() => {
          let close_request = JsonRpcRequest::new(ids.next(), "rpc.subscribe.close", None);
          if let Ok(json) = serde_json::to_string(&close_request) {
            let _ = sink.send(Message::Text(json)).await;
          }
          let _ = sink.close().await;
          break;
        }
        message = stream.next() => {
          match message {
            Some(Ok(Message::Text(text))) => {
              let is_error = match serde_json::from_str::<JsonRpcResponse>(&text) {
                Ok(response) => {
                  let is_error = response.error.is_some();
                  let item = response.into_result();
                  if notif_tx.send(item).await.is_err() {
                    break;
                  }
                  is_error
                }
                Err(e) => {
                  let _ = notif_tx.send(Err(RpcError::from(e))).await;
                  false
                }
              };
              if is_error {
                // spec §4.10: an error for a subscription id tears the
                // subscription down, not just this one notification.
                let close_request = JsonRpcRequest::new(ids.next(), "rpc.subscribe.close", None);
                if let Ok(json) = serde_json::to_string(&close_request) {
                  let _ = sink.send(Message::Text(json)).await;
                }
                let _ = sink.close().await;
                break;
              }
            }
            Some(Ok(Message::Close(_))) | None => {
              let _ = notif_tx.send(Err(RpcError::SubscriptionClosed)).await;
              break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
              let _ = notif_tx.send(Err(RpcError::NetworkError(e.to_string()))).await;
              break;
            }
          }
        }
      }
    }
  });

  Ok(Subscription {
    notifications: notif_rx,
    close_tx: Some(close_tx),
  })
}
