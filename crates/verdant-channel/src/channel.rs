//! The push channel: per-name fan-out plus the dispatch/reconnect loop.

use crate::reconnect::{ReconnectConfig, ReconnectStats};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};
use verdant_core::VerdantError;
use verdant_protocol::{EventName, Frame, PushEvent};

struct Inner {
    transport: Arc<dyn Transport>,
    config: ReconnectConfig,
    subscribers: Mutex<HashMap<EventName, Vec<mpsc::UnboundedSender<PushEvent>>>>,
    out_tx: mpsc::UnboundedSender<Frame>,
    stats: Mutex<ReconnectStats>,
}

/// Handle to the push connection.
///
/// Cloneable; all clones share one dispatch loop. Dropping every clone
/// does not stop the loop — call [`PushChannel::close`] on teardown.
#[derive(Clone)]
pub struct PushChannel {
    inner: Arc<Inner>,
    closed_tx: Arc<watch::Sender<bool>>,
}

/// A registration for one event name.
///
/// Events of that name arrive in receipt order. Dropping the
/// subscription unregisters it; the channel prunes the slot lazily on
/// the next delivery.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<PushEvent>,
}

impl Subscription {
    /// Next event, or `None` once the channel has closed.
    pub async fn recv(&mut self) -> Option<PushEvent> {
        self.rx.recv().await
    }

    /// Non-blocking variant for controllers draining between renders.
    pub fn try_recv(&mut self) -> Option<PushEvent> {
        self.rx.try_recv().ok()
    }
}

impl PushChannel {
    /// Connect the transport and start the dispatch loop.
    pub fn start(transport: Arc<dyn Transport>, config: ReconnectConfig) -> Self {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = watch::channel(false);
        let inner = Arc::new(Inner {
            transport,
            config,
            subscribers: Mutex::new(HashMap::new()),
            out_tx,
            stats: Mutex::new(ReconnectStats::default()),
        });
        tokio::spawn(run_loop(Arc::clone(&inner), out_rx, closed_rx));
        Self {
            inner,
            closed_tx: Arc::new(closed_tx),
        }
    }

    /// Register for one event name.
    pub fn subscribe(&self, name: EventName) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .lock()
            .entry(name)
            .or_default()
            .push(tx);
        Subscription { rx }
    }

    /// Send an event without waiting for acknowledgement.
    pub fn emit(&self, event: &PushEvent) -> Result<(), VerdantError> {
        let frame = event.to_frame()?;
        self.inner
            .out_tx
            .send(frame)
            .map_err(|_| VerdantError::channel("dispatch loop stopped"))
    }

    /// Reconnect and decode counters.
    pub fn stats(&self) -> ReconnectStats {
        *self.inner.stats.lock()
    }

    /// Stop the dispatch loop. Subscriptions drain and then end.
    pub fn close(&self) {
        let _ = self.closed_tx.send(true);
        // Drop the senders so every subscriber's recv() returns None once
        // its buffered events are consumed; clones of this handle keep
        // Inner alive, so the map would otherwise never empty.
        self.inner.subscribers.lock().clear();
    }
}

async fn run_loop(
    inner: Arc<Inner>,
    mut out_rx: mpsc::UnboundedReceiver<Frame>,
    mut closed_rx: watch::Receiver<bool>,
) {
    if let Err(err) = inner.transport.connect().await {
        warn!(%err, "initial connect failed, entering reconnect");
        if !reconnect(&inner).await {
            return;
        }
    }
    loop {
        tokio::select! {
            _ = closed_rx.changed() => {
                debug!("push channel closed");
                break;
            }
            incoming = inner.transport.recv() => match incoming {
                Some(frame) => dispatch(&inner, frame),
                None => {
                    if !reconnect(&inner).await {
                        break;
                    }
                }
            },
            outgoing = out_rx.recv() => {
                if let Some(frame) = outgoing {
                    if let Err(err) = inner.transport.send(frame).await {
                        warn!(%err, "emit failed");
                    }
                }
            }
        }
    }
}

fn dispatch(inner: &Inner, frame: Frame) {
    let event = match PushEvent::from_frame(&frame) {
        Ok(event) => event,
        Err(err) => {
            warn!(name = %frame.name, %err, "dropping undecodable frame");
            inner.stats.lock().undecodable_frames += 1;
            return;
        }
    };
    let name = event.name();
    let mut subscribers = inner.subscribers.lock();
    if let Some(slots) = subscribers.get_mut(&name) {
        // Prune subscriptions whose receiving side is gone.
        slots.retain(|tx| tx.send(event.clone()).is_ok());
        if slots.is_empty() {
            subscribers.remove(&name);
        }
    }
}

/// Run the backoff schedule until connected or exhausted. Returns false
/// when the retry budget is spent and the loop should stop.
async fn reconnect(inner: &Inner) -> bool {
    for attempt in 1..=inner.config.max_attempts {
        inner.stats.lock().total_attempts += 1;
        let delay = inner.config.delay_for_attempt(attempt);
        debug!(attempt, ?delay, "reconnect backoff");
        tokio::time::sleep(delay).await;
        match inner.transport.connect().await {
            Ok(()) => {
                inner.stats.lock().successful_reconnects += 1;
                debug!(attempt, "reconnected");
                return true;
            }
            Err(err) => warn!(attempt, %err, "reconnect attempt failed"),
        }
    }
    inner.stats.lock().exhausted += 1;
    error!(
        max_attempts = inner.config.max_attempts,
        "reconnect budget exhausted, channel stopping"
    );
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InProcTransport;
    use verdant_core::{Goal, GoalId, UserId, UserVitals};

    fn goal_frame(id: u64, progress: u8) -> Frame {
        PushEvent::GoalCreated(Goal {
            id: GoalId::new(id),
            title: format!("goal {id}"),
            progress,
            created_by: UserId::new(1),
            ..Goal::default()
        })
        .to_frame()
        .unwrap()
    }

    #[tokio::test]
    async fn delivers_in_receipt_order_per_name() {
        let (transport, remote) = InProcTransport::pair();
        let channel = PushChannel::start(Arc::new(transport), ReconnectConfig::default());
        let mut sub = channel.subscribe(EventName::GoalCreated);

        remote.push(goal_frame(1, 10));
        remote.push(goal_frame(2, 20));
        remote.push(goal_frame(3, 30));

        let ids: Vec<u64> = [
            sub.recv().await.unwrap(),
            sub.recv().await.unwrap(),
            sub.recv().await.unwrap(),
        ]
        .iter()
        .map(|ev| match ev {
            PushEvent::GoalCreated(g) => g.id.value(),
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        channel.close();
    }

    #[tokio::test]
    async fn duplicate_frames_pass_through_unfiltered() {
        let (transport, remote) = InProcTransport::pair();
        let channel = PushChannel::start(Arc::new(transport), ReconnectConfig::default());
        let mut sub = channel.subscribe(EventName::GoalCreated);

        remote.push_duplicate(goal_frame(9, 50));

        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_some());
        channel.close();
    }

    fn vitals_frame(xp: u64) -> Frame {
        PushEvent::UserStateUpdate(UserVitals {
            streak: 3,
            xp,
            level: 2,
        })
        .to_frame()
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn reconnects_with_backoff_after_drop() {
        let (transport, remote) = InProcTransport::pair();
        let channel = PushChannel::start(Arc::new(transport), ReconnectConfig::default());
        let mut sub = channel.subscribe(EventName::UserStateUpdate);

        // Let the loop finish its initial connect before injecting
        // failures, or they get eaten by that connect instead of the
        // reconnect under test.
        remote.push(vitals_frame(10));
        sub.recv().await.unwrap();
        assert_eq!(remote.connect_count(), 1);

        remote.fail_next_connects(2);
        remote.drop_connection();

        // Frames delivered after the reconnect still reach subscribers.
        remote.push(vitals_frame(120));
        let event = sub.recv().await.unwrap();
        assert!(matches!(event, PushEvent::UserStateUpdate(v) if v.xp == 120));

        let stats = channel.stats();
        assert!(stats.total_attempts >= 3);
        assert_eq!(stats.successful_reconnects, 1);
        // one initial connect plus the successful reconnect
        assert_eq!(remote.connect_count(), 2);
        channel.close();
    }

    #[tokio::test]
    async fn close_ends_subscriptions_after_draining() {
        let (transport, remote) = InProcTransport::pair();
        let channel = PushChannel::start(Arc::new(transport), ReconnectConfig::default());
        let mut sub = channel.subscribe(EventName::GoalCreated);

        remote.push(goal_frame(1, 10));
        assert!(sub.recv().await.is_some());

        channel.close();
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn emit_reaches_remote_end() {
        let (transport, mut remote) = InProcTransport::pair();
        let channel = PushChannel::start(Arc::new(transport), ReconnectConfig::default());

        let event = PushEvent::GardenUpdate {
            user_id: UserId::new(4),
        };
        channel.emit(&event).unwrap();

        let frame = remote.emitted().await.unwrap();
        assert_eq!(frame.name, "garden_update");
        channel.close();
    }

    #[tokio::test]
    async fn undecodable_frames_are_counted_and_dropped() {
        let (transport, remote) = InProcTransport::pair();
        let channel = PushChannel::start(Arc::new(transport), ReconnectConfig::default());
        let mut sub = channel.subscribe(EventName::GoalCreated);

        remote.push(Frame {
            name: "mystery".into(),
            payload: serde_json::json!({}),
        });
        remote.push(goal_frame(5, 0));

        let event = sub.recv().await.unwrap();
        assert!(matches!(event, PushEvent::GoalCreated(g) if g.id.value() == 5));
        assert_eq!(channel.stats().undecodable_frames, 1);
        channel.close();
    }
}
