//! WebSocket transport for the control channel.
//!
//! A thin layer that moves wire text in and out; all protocol logic stays
//! in the sans-IO core. Each open spawns one I/O task bridging an mpsc
//! sender to the socket and pushing notifications (telemetry text, close)
//! back to the driver.

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The socket task has already terminated.
    #[error("channel closed")]
    ChannelClosed,
}

/// Notifications from the socket task to the driver.
#[derive(Debug)]
pub enum TransportEvent {
    /// Vehicle-to-client text (video/position telemetry).
    Telemetry(String),

    /// The socket closed or errored on the vehicle side. Sent at most
    /// once; a locally closed or stopped channel stays silent.
    Closed,
}

/// Handle to one open control channel.
pub struct WsChannel {
    to_vehicle: mpsc::Sender<String>,
    task: tokio::task::JoinHandle<()>,
}

impl WsChannel {
    /// Queue wire text for the vehicle.
    pub async fn send(&self, text: String) -> Result<(), TransportError> {
        self.to_vehicle.send(text).await.map_err(|_| TransportError::ChannelClosed)
    }

    /// Close gracefully: already-queued text is drained onto the socket
    /// and a close frame is sent before the task finishes. Waits for
    /// completion, so text queued before the close is never lost.
    pub async fn close(self) {
        drop(self.to_vehicle);
        let _ = self.task.await;
    }

    /// Abort the socket task immediately, discarding any queued text.
    /// Only for superseded stale channels; the close path must use
    /// [`WsChannel::close`].
    pub fn stop(self) {
        self.task.abort();
    }
}

/// Open a WebSocket control channel.
///
/// Notifications from the socket flow into `notify` until the channel is
/// stopped or closes.
pub async fn open(
    url: &str,
    notify: mpsc::Sender<TransportEvent>,
) -> Result<WsChannel, TransportError> {
    let (stream, _) =
        connect_async(url).await.map_err(|e| TransportError::Connect(e.to_string()))?;
    tracing::info!(url, "control channel connected");

    let (mut write, mut read) = stream.split();
    let (to_vehicle, mut outgoing) = mpsc::channel::<String>(32);

    let task = tokio::spawn(async move {
        let remote_close = loop {
            tokio::select! {
                text = outgoing.recv() => match text {
                    Some(text) => {
                        if let Err(error) = write.send(Message::Text(text)).await {
                            tracing::warn!(%error, "socket write failed");
                            break true;
                        }
                    },
                    // Sender dropped: the queue is drained, close politely.
                    None => break false,
                },
                incoming = read.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if notify.send(TransportEvent::Telemetry(text)).await.is_err() {
                            break false;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("vehicle closed the channel");
                        break true;
                    },
                    Some(Ok(_)) => {},
                    Some(Err(error)) => {
                        tracing::warn!(%error, "socket read failed");
                        break true;
                    },
                },
            }
        };

        if remote_close {
            let _ = notify.send(TransportEvent::Closed).await;
        } else {
            let _ = write.send(Message::Close(None)).await;
        }
    });

    Ok(WsChannel { to_vehicle, task })
}
