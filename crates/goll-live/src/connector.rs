//! Stream connectors.
//!
//! A connector knows how to open a raw frame stream for one goll. The
//! production connector speaks WebSocket; tests plug in channel-backed
//! fakes through the same trait.

use crate::error::{StreamError, StreamResult};
use futures_util::future::BoxFuture;
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

/// A stream of raw text frames for one goll.
pub type EventStream = BoxStream<'static, StreamResult<String>>;

/// Opens the live-update stream for a single goll.
pub trait StreamConnector: Send + Sync {
    fn connect(&self, goll_id: u64) -> BoxFuture<'_, StreamResult<EventStream>>;
}

/// WebSocket connector for the production stream endpoint.
pub struct WsConnector {
    base_url: String,
}

impl WsConnector {
    /// Create a connector against a stream base URL, e.g. `wss://api.goll.gg`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn stream_url(&self, goll_id: u64) -> StreamResult<Url> {
        let url = format!("{}/golls/{}/stream", self.base_url, goll_id);
        Ok(Url::parse(&url)?)
    }
}

impl StreamConnector for WsConnector {
    fn connect(&self, goll_id: u64) -> BoxFuture<'_, StreamResult<EventStream>> {
        Box::pin(async move {
            let url = self.stream_url(goll_id)?;
            debug!(%url, goll_id, "Opening live-update stream");

            let (socket, _response) = connect_async(url.as_str())
                .await
                .map_err(|e| StreamError::Connect(e.to_string()))?;

            let frames = socket
                .map_err(StreamError::from)
                .try_filter_map(|message| async move {
                    // Only text frames carry events; pings and binary
                    // frames are transport noise.
                    match message {
                        Message::Text(text) => Ok(Some(text.to_string())),
                        _ => Ok(None),
                    }
                })
                .boxed();

            Ok(frames)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stream_url_shape() {
        let connector = WsConnector::new("wss://api.goll.gg/");
        let url = connector.stream_url(42).unwrap();
        assert_eq!(url.as_str(), "wss://api.goll.gg/golls/42/stream");
    }

    #[test]
    fn test_bad_base_url_is_reported() {
        let connector = WsConnector::new("not a url");
        assert!(matches!(
            connector.stream_url(1),
            Err(StreamError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_secure_scheme_reaches_the_handshake() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                drop(socket);
            }
        });

        let connector = WsConnector::new(format!("wss://{}", addr));
        let result = tokio::time::timeout(Duration::from_secs(5), connector.connect(1))
            .await
            .expect("connect did not resolve");

        // A plain TCP peer cannot complete the TLS handshake. The point
        // is that the failure comes from the handshake itself, not from
        // TLS support being absent from the build.
        match result {
            Err(StreamError::Connect(message)) => {
                assert!(
                    !message.contains("TLS support not compiled in"),
                    "wss connect failed before the handshake: {}",
                    message
                );
            }
            Err(other) => panic!("unexpected error kind: {:?}", other),
            Ok(_) => panic!("expected the connect to fail"),
        }
    }
}
