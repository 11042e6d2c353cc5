//! Pathways: the personal goals page.

use crate::context::AppContext;
use crate::controller::provisional_id;
use crate::effects::{EffectKind, EffectTarget, Scheduler, Stage};
use std::sync::Arc;
use tracing::warn;
use verdant_channel::Subscription;
use verdant_core::{CorrelationId, Goal, GoalId, VerdantError};
use verdant_protocol::snapshots::GoalDraft;
use verdant_protocol::{EventName, PageNote, PushEvent};
use verdant_sync::{Reconciler, RenderIntent, ViewCaches, ViewContext, ViewKind};

/// Number of goals behind each milestone node on the path.
const GOALS_PER_MILESTONE: usize = 5;

/// What the pathways page renders.
#[derive(Debug, Clone, Default)]
pub struct PathwaysView {
    /// Goals in listing order.
    pub goals: Vec<Goal>,
    /// Completed goals.
    pub completed: usize,
    /// Milestone nodes earned, one per five goals.
    pub milestones: usize,
}

/// Controller for the goals page.
pub struct PathwaysController {
    ctx: AppContext,
    reconciler: Reconciler,
    caches: ViewCaches,
    scheduler: Scheduler,
    subs: Vec<Subscription>,
    active: bool,
}

impl PathwaysController {
    /// Subscribe, pull the goal snapshot, and hand back the controller.
    pub async fn start(ctx: AppContext, stage: Arc<dyn Stage>) -> Self {
        let subs = vec![
            ctx.channel.subscribe(EventName::GoalCreated),
            ctx.channel.subscribe(EventName::GoalUpdated),
            ctx.channel.subscribe(EventName::GoalDeleted),
        ];
        let mut controller = Self {
            scheduler: Scheduler::new(stage),
            reconciler: Reconciler::new(ViewKind::Pathways),
            caches: ViewCaches::new(),
            subs,
            active: true,
            ctx,
        };
        controller.load_snapshot().await;
        controller
    }

    fn view_context(&self) -> ViewContext {
        self.ctx.view_context(None)
    }

    /// Initial pull. Seeding skips ids a racing push already wrote.
    async fn load_snapshot(&mut self) {
        match self.ctx.api.goals().await {
            Ok(snapshot) => {
                if !self.active {
                    return;
                }
                for goal in snapshot.personal {
                    self.caches.goals.seed(goal);
                }
            }
            Err(err) => warn!(%err, "goal snapshot failed, keeping prior state"),
        }
    }

    /// Drain pending push events through the reconciler.
    pub async fn pump(&mut self) -> Vec<RenderIntent> {
        let mut intents = Vec::new();
        if !self.active {
            return intents;
        }
        let mut events = Vec::new();
        for sub in &mut self.subs {
            while let Some(event) = sub.try_recv() {
                events.push(event);
            }
        }
        for event in events {
            intents.extend(self.handle(&event));
        }
        intents
    }

    fn handle(&mut self, event: &PushEvent) -> Vec<RenderIntent> {
        let fresh = match event {
            PushEvent::GoalCreated(goal) | PushEvent::GoalUpdated(goal) => {
                (!self.caches.goals.contains(goal.id)).then_some(goal.id)
            }
            _ => None,
        };
        let ctx = self.view_context();
        let intents = self.reconciler.apply(&mut self.caches, &ctx, event);
        for intent in &intents {
            if let RenderIntent::GoalUpserted(id) = intent {
                if fresh == Some(*id) {
                    self.scheduler.play(EffectTarget::goal(*id), EffectKind::Bloom);
                }
            }
        }
        intents
    }

    /// Create a goal: optimistic insert, then reconcile the confirmation.
    pub async fn save_goal(&mut self, draft: GoalDraft) -> Result<Goal, VerdantError> {
        if draft.title.trim().is_empty() {
            return Err(VerdantError::invalid("goal title must not be empty"));
        }

        let token = CorrelationId::new();
        let provisional = Goal {
            id: GoalId::new(provisional_id()),
            title: draft.title.clone(),
            description: draft.description.clone(),
            kind: draft.kind,
            group_id: draft.group_id,
            due_date: draft.due_date,
            progress: Goal::clamp_progress(draft.progress as i64),
            created_by: self.ctx.user,
            correlation: Some(token),
            ..Goal::default()
        };
        let provisional_id = provisional.id;
        self.reconciler
            .insert_optimistic_goal(&mut self.caches, provisional);

        match self.ctx.api.create_goal(&draft).await {
            Ok(created) => {
                if !self.active {
                    return Ok(created.goal);
                }
                let goal = created.goal;
                self.reconciler
                    .resolve_goal(&mut self.caches, token, goal.clone());
                self.scheduler
                    .play(EffectTarget::goal(goal.id), EffectKind::Bloom);
                self.ctx.bus.publish(PageNote::GoalSubmitted {
                    id: goal.id,
                    title: goal.title.clone(),
                    group_id: goal.group_id,
                });
                Ok(goal)
            }
            Err(err) => {
                warn!(%err, "goal creation failed, rolling back optimistic insert");
                self.caches.goals.remove(provisional_id);
                Err(err)
            }
        }
    }

    /// Update a goal's fields; the cache takes the server's copy.
    pub async fn update_goal(
        &mut self,
        id: GoalId,
        draft: GoalDraft,
    ) -> Result<Goal, VerdantError> {
        if draft.title.trim().is_empty() {
            return Err(VerdantError::invalid("goal title must not be empty"));
        }
        let updated = self.ctx.api.update_goal(id, &draft).await?;
        if self.active {
            let ctx = self.view_context();
            self.reconciler
                .apply(&mut self.caches, &ctx, &PushEvent::GoalUpdated(updated.goal.clone()));
        }
        Ok(updated.goal)
    }

    /// Mark complete: optimistic, with a celebration on the node.
    pub async fn complete_goal(&mut self, id: GoalId) -> Result<(), VerdantError> {
        if let Some(goal) = self.caches.goals.get_mut(id) {
            goal.complete();
        } else {
            return Err(VerdantError::not_found(format!("goal {id}")));
        }
        self.scheduler.play(EffectTarget::goal(id), EffectKind::GrowPulse);
        self.scheduler.play(EffectTarget::goal(id), EffectKind::Celebrate);

        match self.ctx.api.complete_goal(id).await {
            Ok(confirmed) => {
                if self.active {
                    let ctx = self.view_context();
                    self.reconciler.apply(
                        &mut self.caches,
                        &ctx,
                        &PushEvent::GoalUpdated(confirmed.goal),
                    );
                }
                Ok(())
            }
            Err(err) => {
                warn!(%err, "goal completion failed, reloading");
                self.caches.goals.clear();
                self.load_snapshot().await;
                Err(err)
            }
        }
    }

    /// Delete a goal; the push echo finds nothing left to remove.
    pub async fn delete_goal(&mut self, id: GoalId) -> Result<(), VerdantError> {
        self.caches.goals.remove(id);
        match self.ctx.api.delete_goal(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(%err, "goal deletion failed, reloading");
                self.caches.goals.clear();
                self.load_snapshot().await;
                Err(err)
            }
        }
    }

    /// Project the caches into the page's view model.
    pub fn render(&self) -> PathwaysView {
        let goals: Vec<Goal> = self.caches.goals.iter().cloned().collect();
        let completed = goals.iter().filter(|g| g.status.is_completed()).count();
        PathwaysView {
            milestones: goals.len() / GOALS_PER_MILESTONE,
            completed,
            goals,
        }
    }

    /// Signal that a goal node's animation finished.
    pub fn effect_done(&self, id: GoalId) {
        self.scheduler.complete(&EffectTarget::goal(id));
    }

    /// Tear down: cancel effects, drop subscriptions, go inert.
    pub fn close(&mut self) {
        self.active = false;
        self.subs.clear();
        self.scheduler.close();
    }

    /// Whether the controller is still live.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
