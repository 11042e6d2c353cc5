//! Greenhouse: groups and their shared gardens.

use crate::context::AppContext;
use crate::effects::{EffectKind, EffectTarget, Scheduler, Stage};
use std::sync::Arc;
use tracing::warn;
use verdant_channel::Subscription;
use verdant_core::{ActivityEvent, Goal, GroupId, GroupSummary, VerdantError};
use verdant_protocol::snapshots::{GroupDetail, GroupDraft};
use verdant_protocol::{EventName, PushEvent};
use verdant_sync::{Reconciler, RenderIntent, ViewCaches, ViewContext, ViewKind};

/// What the greenhouse page renders.
#[derive(Debug, Clone, Default)]
pub struct GreenhouseView {
    /// Known groups.
    pub groups: Vec<GroupSummary>,
    /// The opened group, when one is.
    pub detail: Option<GroupDetail>,
    /// The opened group's activity feed.
    pub activity: Vec<ActivityEvent>,
    /// The opened group's goals, rendered as flowers.
    pub goals: Vec<Goal>,
}

/// Controller for the groups page.
pub struct GreenhouseController {
    ctx: AppContext,
    reconciler: Reconciler,
    caches: ViewCaches,
    scheduler: Scheduler,
    subs: Vec<Subscription>,
    active_group: Option<GroupId>,
    detail: Option<GroupDetail>,
    active: bool,
}

impl GreenhouseController {
    /// Subscribe and pull the group list.
    pub async fn start(ctx: AppContext, stage: Arc<dyn Stage>) -> Self {
        let subs = vec![
            ctx.channel.subscribe(EventName::GroupCreated),
            ctx.channel.subscribe(EventName::NewGroupReflection),
            ctx.channel.subscribe(EventName::NewComment),
            ctx.channel.subscribe(EventName::GoalCreated),
        ];
        let mut controller = Self {
            scheduler: Scheduler::new(stage),
            reconciler: Reconciler::new(ViewKind::Greenhouse),
            caches: ViewCaches::new(),
            subs,
            active_group: None,
            detail: None,
            active: true,
            ctx,
        };
        controller.load_groups(true).await;
        controller
    }

    fn view_context(&self) -> ViewContext {
        self.ctx.view_context(self.active_group)
    }

    async fn load_groups(&mut self, initial: bool) {
        match self.ctx.api.groups().await {
            Ok(groups) => {
                if !self.active {
                    return;
                }
                for group in groups {
                    if initial {
                        self.caches.groups.seed(group);
                    } else {
                        self.caches.groups.upsert(group);
                    }
                }
            }
            Err(err) => warn!(%err, "group list failed, keeping prior state"),
        }
    }

    async fn load_activity(&mut self) {
        let Some(group) = self.active_group else {
            return;
        };
        match self.ctx.api.group_activity(group).await {
            Ok(feed) => {
                // Guarded: the fetch may complete after the user moved on.
                if self.active && self.active_group == Some(group) {
                    self.caches.set_activity(feed);
                }
            }
            Err(err) => warn!(%err, %group, "group activity failed, keeping prior feed"),
        }
    }

    /// Open one group: scope the filters to it and pull its detail.
    pub async fn open_group(&mut self, group: GroupId) -> Result<(), VerdantError> {
        self.active_group = Some(group);
        self.caches.goals.clear();
        let detail = self.ctx.api.group(group).await?;
        if !self.active || self.active_group != Some(group) {
            return Ok(());
        }
        for goal in detail.garden.goals.clone() {
            self.caches.goals.seed(goal);
        }
        self.detail = Some(detail);
        self.load_activity().await;
        Ok(())
    }

    /// Close the opened group.
    pub fn leave_group(&mut self) {
        self.active_group = None;
        self.detail = None;
        self.caches.goals.clear();
        self.caches.set_activity(Vec::new());
    }

    /// Create a group. Name and class are both required.
    pub async fn create_group(&mut self, draft: GroupDraft) -> Result<GroupSummary, VerdantError> {
        if draft.name.trim().is_empty() {
            return Err(VerdantError::invalid("group name must not be empty"));
        }
        if draft.class_name.trim().is_empty() {
            return Err(VerdantError::invalid("group class must not be empty"));
        }
        let summary = self.ctx.api.create_group(&draft).await?;
        if self.active {
            self.caches.groups.upsert(summary.clone());
        }
        Ok(summary)
    }

    /// Drain pending push events; perform the refetches they signal.
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
            let applied = self.handle(&event);
            if applied.contains(&RenderIntent::RefetchGroups) {
                self.load_groups(false).await;
            }
            if applied.contains(&RenderIntent::RefetchGroupActivity) {
                self.load_activity().await;
            }
            intents.extend(applied);
        }
        intents
    }

    fn handle(&mut self, event: &PushEvent) -> Vec<RenderIntent> {
        let ctx = self.view_context();
        let intents = self.reconciler.apply(&mut self.caches, &ctx, event);
        for intent in &intents {
            if let RenderIntent::GoalUpserted(id) = intent {
                self.scheduler.play(EffectTarget::goal(*id), EffectKind::Bloom);
            }
        }
        intents
    }

    /// Project the page.
    pub fn render(&self) -> GreenhouseView {
        GreenhouseView {
            groups: self.caches.groups.iter().cloned().collect(),
            detail: self.detail.clone(),
            activity: self.caches.activity.clone(),
            goals: self.caches.goals.iter().cloned().collect(),
        }
    }

    /// The group currently open.
    pub fn active_group(&self) -> Option<GroupId> {
        self.active_group
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
