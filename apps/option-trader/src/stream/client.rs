//! Options quote stream client.
//!
//! Connects to the options WebSocket feed, authenticates, and writes
//! quote updates into a shared [`QuoteCache`]. The connection lives for
//! the interactive session; if it drops, live quotes degrade to "no
//! quote available", which the rest of the client already tolerates.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::cache::QuoteCache;
use super::codec::{self, CodecError};
use super::messages::{AuthRequest, StreamMessage, SubscribeRequest};
use crate::domain::Quote;
use crate::gateway::alpaca::AlpacaConfig;

/// Errors from the stream client.
#[derive(Debug, Error)]
pub enum StreamError {
    /// WebSocket failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Codec failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Server rejected authentication.
    #[error("stream authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Connection closed by the server.
    #[error("stream connection closed")]
    Closed,
}

/// Handle for requesting subscriptions on a running stream.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    subscribe_tx: mpsc::UnboundedSender<Vec<String>>,
    cache: Arc<QuoteCache>,
}

impl StreamHandle {
    /// Subscribe to quotes for the given OCC symbols. Already-subscribed
    /// symbols are deduplicated by the read loop.
    pub fn subscribe(&self, symbols: Vec<String>) {
        if symbols.is_empty() {
            return;
        }
        // Send fails only after the read loop exits; quotes are best-effort.
        let _ = self.subscribe_tx.send(symbols);
    }

    /// The cache this stream writes into.
    #[must_use]
    pub fn cache(&self) -> Arc<QuoteCache> {
        Arc::clone(&self.cache)
    }
}

/// Spawned options stream: read loop task plus its handle.
pub struct OptionsStream {
    /// Subscription/cache handle.
    pub handle: StreamHandle,
    /// The read loop task.
    pub task: tokio::task::JoinHandle<Result<(), StreamError>>,
}

impl OptionsStream {
    /// Connect, authenticate, and spawn the read loop.
    pub async fn connect(
        config: &AlpacaConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, StreamError> {
        let url = config.environment.options_stream_url();
        let (mut ws, _) = connect_async(url).await?;
        tracing::info!(url, "Options stream connected");

        let auth = AuthRequest::new(config.api_key.clone(), config.api_secret.clone());
        ws.send(Message::Binary(codec::encode_auth(&auth)?.into()))
            .await?;

        let cache = Arc::new(QuoteCache::new());
        let (subscribe_tx, subscribe_rx) = mpsc::unbounded_channel();
        let handle = StreamHandle {
            subscribe_tx,
            cache: Arc::clone(&cache),
        };

        let task = tokio::spawn(read_loop(ws, cache, subscribe_rx, shutdown));
        Ok(Self { handle, task })
    }
}

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn read_loop(
    mut ws: WsStream,
    cache: Arc<QuoteCache>,
    mut subscribe_rx: mpsc::UnboundedReceiver<Vec<String>>,
    shutdown: CancellationToken,
) -> Result<(), StreamError> {
    let mut subscribed: HashSet<String> = HashSet::new();
    let mut authenticated = false;
    // Subscriptions requested before auth completes are held back.
    let mut pending: Vec<String> = Vec::new();

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::debug!("Options stream shutting down");
                let _ = ws.close(None).await;
                return Ok(());
            }
            request = subscribe_rx.recv() => {
                let Some(symbols) = request else {
                    // All handles dropped; keep feeding the cache anyway.
                    continue;
                };
                let fresh: Vec<String> = symbols
                    .into_iter()
                    .filter(|s| !subscribed.contains(s) && !pending.contains(s))
                    .collect();
                if fresh.is_empty() {
                    continue;
                }
                if authenticated {
                    send_subscribe(&mut ws, &mut subscribed, fresh).await?;
                } else {
                    pending.extend(fresh);
                }
            }
            frame = ws.next() => {
                let Some(frame) = frame else {
                    tracing::warn!("Options stream closed by server");
                    return Err(StreamError::Closed);
                };
                let bytes = match frame? {
                    Message::Binary(bytes) => bytes,
                    Message::Ping(_) | Message::Pong(_) => continue,
                    Message::Close(_) => return Err(StreamError::Closed),
                    other => {
                        tracing::debug!(?other, "Ignoring non-binary stream frame");
                        continue;
                    }
                };

                for message in codec::decode_frame(&bytes)? {
                    match message {
                        StreamMessage::Success(m) if m.msg == "authenticated" => {
                            tracing::info!("Options stream authenticated");
                            authenticated = true;
                            if !pending.is_empty() {
                                let backlog = std::mem::take(&mut pending);
                                send_subscribe(&mut ws, &mut subscribed, backlog).await?;
                            }
                        }
                        StreamMessage::Success(m) => {
                            tracing::debug!(msg = %m.msg, "Stream control message");
                        }
                        StreamMessage::Error(m) => {
                            if !authenticated {
                                return Err(StreamError::AuthenticationFailed(m.msg));
                            }
                            tracing::warn!(code = ?m.code, msg = %m.msg, "Stream error message");
                        }
                        StreamMessage::Subscription(m) => {
                            tracing::debug!(quotes = m.quotes.len(), "Subscription confirmed");
                        }
                        StreamMessage::Quote(q) => {
                            let quote = Quote {
                                bid: q.bid_price,
                                ask: q.ask_price,
                                timestamp: q.timestamp,
                            };
                            cache.update(q.symbol, quote);
                        }
                    }
                }
            }
        }
    }
}

async fn send_subscribe(
    ws: &mut WsStream,
    subscribed: &mut HashSet<String>,
    symbols: Vec<String>,
) -> Result<(), StreamError> {
    let request = SubscribeRequest::new(symbols.clone());
    ws.send(Message::Binary(codec::encode_subscribe(&request)?.into()))
        .await?;
    tracing::info!(count = symbols.len(), "Subscribed to option quotes");
    subscribed.extend(symbols);
    Ok(())
}
