//! Per-goll subscription lifecycle.

use crate::connector::StreamConnector;
use crate::error::StreamResult;
use crate::event::StreamEvent;
use futures_util::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, warn};

/// Manages at most one live-update stream at a time.
///
/// Subscribing to a goll while another stream is open tears the old one
/// down completely before the new connection is attempted, so events
/// from the two never interleave.
pub struct LiveSubscriber {
    connector: Arc<dyn StreamConnector>,
    active: Mutex<Option<Active>>,
}

struct Active {
    goll_id: u64,
    task: JoinHandle<()>,
}

impl LiveSubscriber {
    pub fn new(connector: Arc<dyn StreamConnector>) -> Self {
        Self {
            connector,
            active: Mutex::new(None),
        }
    }

    /// Open the stream for `goll_id` and deliver its events to `handler`.
    ///
    /// Events carrying a different goll id are dropped, and a stream
    /// error stops delivery without reconnecting. The previous
    /// subscription, if any, is fully closed first.
    pub async fn subscribe<F>(&self, goll_id: u64, handler: F) -> StreamResult<SubscriptionHandle>
    where
        F: Fn(StreamEvent) + Send + 'static,
    {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            Self::teardown(previous).await;
        }

        let mut frames = self.connector.connect(goll_id).await?;
        let task = tokio::spawn(async move {
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(raw) => {
                        let Some(event) = StreamEvent::parse(&raw) else {
                            continue;
                        };
                        if event.goll_id() != goll_id {
                            debug!(
                                got = event.goll_id(),
                                want = goll_id,
                                "Dropping event for another goll"
                            );
                            continue;
                        }
                        handler(event);
                    }
                    Err(e) => {
                        warn!(goll_id, error = %e, "Live-update stream failed, stopping delivery");
                        break;
                    }
                }
            }
            debug!(goll_id, "Live-update stream closed");
        });

        let handle = SubscriptionHandle {
            abort: task.abort_handle(),
            closed: AtomicBool::new(false),
        };
        *active = Some(Active { goll_id, task });
        Ok(handle)
    }

    /// Close the current subscription, if any.
    pub async fn close(&self) {
        if let Some(previous) = self.active.lock().await.take() {
            Self::teardown(previous).await;
        }
    }

    async fn teardown(previous: Active) {
        debug!(goll_id = previous.goll_id, "Tearing down live-update stream");
        previous.task.abort();
        // Wait for the task to fully exit so the old connection is gone
        // before any replacement opens.
        let _ = previous.task.await;
    }
}

/// Handle to one subscription. Unsubscribing is idempotent, and dropping
/// the handle unsubscribes as well.
pub struct SubscriptionHandle {
    abort: AbortHandle,
    closed: AtomicBool,
}

impl SubscriptionHandle {
    pub fn unsubscribe(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.abort.abort();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
