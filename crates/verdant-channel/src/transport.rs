//! The pluggable connection underneath the channel adapter.
//!
//! Production plugs a websocket client in here; tests use
//! [`InProcTransport`], whose remote end can inject duplicates, reorder
//! across names, and kill the connection to exercise the reconnect path.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use verdant_core::VerdantError;
use verdant_protocol::Frame;

/// A persistent bidirectional frame connection.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish (or re-establish) the connection.
    async fn connect(&self) -> Result<(), VerdantError>;

    /// Send a frame; fire and forget.
    async fn send(&self, frame: Frame) -> Result<(), VerdantError>;

    /// Receive the next frame. `None` means the connection dropped and
    /// the caller should reconnect.
    async fn recv(&self) -> Option<Frame>;
}

struct Shared {
    to_client: AsyncMutex<mpsc::UnboundedReceiver<Option<Frame>>>,
    to_client_tx: mpsc::UnboundedSender<Option<Frame>>,
    from_client_tx: mpsc::UnboundedSender<Frame>,
    connects: Mutex<u32>,
    fail_next_connects: Mutex<u32>,
}

/// In-process transport for tests.
pub struct InProcTransport {
    shared: Arc<Shared>,
}

/// The simulated server side of an [`InProcTransport`].
pub struct RemoteEnd {
    shared: Arc<Shared>,
    from_client: mpsc::UnboundedReceiver<Frame>,
}

impl InProcTransport {
    /// Build a connected pair: the client transport and its remote end.
    pub fn pair() -> (Self, RemoteEnd) {
        let (to_client_tx, to_client_rx) = mpsc::unbounded_channel();
        let (from_client_tx, from_client_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            to_client: AsyncMutex::new(to_client_rx),
            to_client_tx,
            from_client_tx,
            connects: Mutex::new(0),
            fail_next_connects: Mutex::new(0),
        });
        (
            Self {
                shared: Arc::clone(&shared),
            },
            RemoteEnd {
                shared,
                from_client: from_client_rx,
            },
        )
    }
}

#[async_trait]
impl Transport for InProcTransport {
    async fn connect(&self) -> Result<(), VerdantError> {
        {
            let mut failures = self.shared.fail_next_connects.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(VerdantError::network("simulated connect failure"));
            }
        }
        *self.shared.connects.lock() += 1;
        Ok(())
    }

    async fn send(&self, frame: Frame) -> Result<(), VerdantError> {
        self.shared
            .from_client_tx
            .send(frame)
            .map_err(|_| VerdantError::channel("remote end gone"))
    }

    async fn recv(&self) -> Option<Frame> {
        // Cancel-safe: the dispatch loop may drop this future mid-await
        // when an outgoing frame wins the select.
        let mut rx = self.shared.to_client.lock().await;
        rx.recv().await.flatten()
    }
}

impl RemoteEnd {
    /// Deliver a frame to the client.
    pub fn push(&self, frame: Frame) {
        let _ = self.shared.to_client_tx.send(Some(frame));
    }

    /// Deliver the same frame twice, as a flaky reconnect would.
    pub fn push_duplicate(&self, frame: Frame) {
        self.push(frame.clone());
        self.push(frame);
    }

    /// Drop the connection; the client's next `recv` yields `None`.
    pub fn drop_connection(&self) {
        let _ = self.shared.to_client_tx.send(None);
    }

    /// Make the next `n` connect attempts fail.
    pub fn fail_next_connects(&self, n: u32) {
        *self.shared.fail_next_connects.lock() = n;
    }

    /// How many times the client has (re)connected.
    pub fn connect_count(&self) -> u32 {
        *self.shared.connects.lock()
    }

    /// Next frame the client emitted, if any has arrived.
    pub async fn emitted(&mut self) -> Option<Frame> {
        self.from_client.recv().await
    }
}
