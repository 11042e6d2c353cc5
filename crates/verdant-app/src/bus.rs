//! Typed page-local bus.
//!
//! Sibling widgets on one page decouple through [`PageNote`] values on
//! this bus instead of stringly-named custom events. Notes are published
//! from a mutation's returned entity; the bus never carries anything read
//! back from rendered output.

use tokio::sync::broadcast;
use tracing::debug;
use verdant_protocol::PageNote;

const BUS_CAPACITY: usize = 32;

/// Broadcast bus for one page's widgets.
#[derive(Debug, Clone)]
pub struct PageBus {
    tx: broadcast::Sender<PageNote>,
}

impl PageBus {
    /// Fresh bus with no listeners.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish to every current listener. With no listeners the note is
    /// dropped, which is fine: notes are fire-and-forget decoration cues.
    pub fn publish(&self, note: PageNote) {
        debug!(?note, "page note");
        let _ = self.tx.send(note);
    }

    /// Register a listener. Only notes published after this call arrive.
    pub fn subscribe(&self) -> BusSubscription {
        BusSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for PageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A listener registration on a [`PageBus`].
pub struct BusSubscription {
    rx: broadcast::Receiver<PageNote>,
}

impl BusSubscription {
    /// Next note, or `None` once every publisher is gone. A slow listener
    /// that lagged past the buffer skips to the oldest retained note.
    pub async fn recv(&mut self) -> Option<PageNote> {
        loop {
            match self.rx.recv().await {
                Ok(note) => return Some(note),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "bus listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant for widgets draining between renders.
    pub fn try_recv(&mut self) -> Option<PageNote> {
        loop {
            match self.rx.try_recv() {
                Ok(note) => return Some(note),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdant_core::ReflectionId;

    fn note(id: u64) -> PageNote {
        PageNote::ReflectionSubmitted {
            id: ReflectionId::new(id),
            content: "hello".into(),
            group_id: None,
        }
    }

    #[tokio::test]
    async fn notes_reach_all_listeners() {
        let bus = PageBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(note(1));

        assert_eq!(a.recv().await, Some(note(1)));
        assert_eq!(b.recv().await, Some(note(1)));
    }

    #[tokio::test]
    async fn late_listener_misses_earlier_notes() {
        let bus = PageBus::new();
        bus.publish(note(1));

        let mut late = bus.subscribe();
        bus.publish(note(2));

        assert_eq!(late.try_recv(), Some(note(2)));
        assert_eq!(late.try_recv(), None);
    }
}
