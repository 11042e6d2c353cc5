//! Effect scheduling: one active effect per target, cleanup exactly once.

use crate::effects::kind::{EffectKind, EffectPolicy};
use crate::effects::stage::{EffectTarget, Stage};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

struct Slot {
    kind: EffectKind,
    epoch: u64,
    timer: JoinHandle<()>,
    queue: VecDeque<EffectKind>,
}

struct Inner {
    stage: Arc<dyn Stage>,
    slots: Mutex<HashMap<EffectTarget, Slot>>,
    epochs: AtomicU64,
}

/// Plays effects against a [`Stage`].
///
/// At most one effect runs per target; a concurrent request queues or is
/// dropped per the incoming kind's policy. Every attached marker is
/// removed exactly once: by [`Scheduler::complete`] when the surface
/// signals the animation ended, or by the kind's fallback timer when the
/// signal never comes. Epochs distinguish the two racers, so the loser
/// finds nothing to clean.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl Scheduler {
    /// Scheduler over a render surface.
    pub fn new(stage: Arc<dyn Stage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                stage,
                slots: Mutex::new(HashMap::new()),
                epochs: AtomicU64::new(0),
            }),
        }
    }

    /// Request an effect on a target.
    pub fn play(&self, target: EffectTarget, kind: EffectKind) {
        let mut slots = self.inner.slots.lock();
        if let Some(slot) = slots.get_mut(&target) {
            match kind.policy() {
                EffectPolicy::Queue => slot.queue.push_back(kind),
                EffectPolicy::Drop => {
                    debug!(%target, ?kind, running = ?slot.kind, "effect dropped")
                }
            }
            return;
        }
        let slot = self.inner.activate(&target, kind, VecDeque::new());
        slots.insert(target, slot);
    }

    /// The surface signals that the target's current animation finished.
    pub fn complete(&self, target: &EffectTarget) {
        let epoch = self.inner.slots.lock().get(target).map(|slot| slot.epoch);
        if let Some(epoch) = epoch {
            self.inner.finish(target, epoch, false);
        }
    }

    /// The effect currently running on a target, if any.
    pub fn active(&self, target: &EffectTarget) -> Option<EffectKind> {
        self.inner.slots.lock().get(target).map(|slot| slot.kind)
    }

    /// Number of targets with a running effect.
    pub fn active_count(&self) -> usize {
        self.inner.slots.lock().len()
    }

    /// Cancel every pending timer and strip every attached marker.
    pub fn close(&self) {
        let mut slots = self.inner.slots.lock();
        for (target, slot) in slots.drain() {
            slot.timer.abort();
            self.inner.stage.remove(&target, slot.kind.marker_class());
        }
    }
}

impl Inner {
    /// Attach a marker and arm its fallback timer. Caller holds the slot
    /// lock and inserts the returned slot.
    fn activate(
        self: &Arc<Self>,
        target: &EffectTarget,
        kind: EffectKind,
        queue: VecDeque<EffectKind>,
    ) -> Slot {
        let epoch = self.epochs.fetch_add(1, Ordering::Relaxed);
        self.stage.attach(target, kind.marker_class());
        let timer = tokio::spawn({
            let inner = Arc::clone(self);
            let target = target.clone();
            async move {
                tokio::time::sleep(kind.fallback()).await;
                debug!(%target, ?kind, "effect fallback expired");
                inner.finish(&target, epoch, true);
            }
        });
        Slot {
            kind,
            epoch,
            timer,
            queue,
        }
    }

    /// Tear down the target's current effect if `epoch` still names it,
    /// then start the next queued effect when the target is still there.
    fn finish(self: &Arc<Self>, target: &EffectTarget, epoch: u64, expired: bool) {
        let mut slots = self.slots.lock();
        match slots.get(target) {
            Some(slot) if slot.epoch == epoch => {}
            _ => return,
        }
        if let Some(mut slot) = slots.remove(target) {
            slot.timer.abort();
            self.stage.remove(target, slot.kind.marker_class());
            if expired {
                debug!(%target, kind = ?slot.kind, "marker removed by fallback");
            }
            if !self.stage.target_exists(target) {
                if !slot.queue.is_empty() {
                    debug!(%target, pending = slot.queue.len(), "target gone, queue dropped");
                }
                return;
            }
            if let Some(next) = slot.queue.pop_front() {
                let replacement = self.activate(target, next, slot.queue);
                slots.insert(target.clone(), replacement);
            }
        }
    }
}
