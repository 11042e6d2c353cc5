//! Journal: reflection compose and feeds.

use crate::context::AppContext;
use crate::controller::provisional_id;
use crate::effects::{EffectKind, EffectTarget, Scheduler, Stage};
use std::sync::Arc;
use tracing::warn;
use verdant_channel::Subscription;
use verdant_core::{
    Comment, CorrelationId, DisplayMode, GroupId, ReflectionEntry, ReflectionId, TimeStamp,
    VerdantError,
};
use verdant_protocol::snapshots::ReflectionDraft;
use verdant_protocol::{EventName, PageNote, PushEvent};
use verdant_sync::{Reconciler, RenderIntent, ViewCaches, ViewContext, ViewKind};

/// Which feed tab is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JournalTab {
    /// The user's own entries.
    #[default]
    Mine,
    /// The active group's feed.
    Group,
}

/// What the journal page renders.
#[derive(Debug, Clone, Default)]
pub struct JournalView {
    /// Entries for the open tab, in arrival order.
    pub entries: Vec<ReflectionEntry>,
    /// The open tab.
    pub tab: JournalTab,
}

/// Controller for the journal page.
pub struct JournalController {
    ctx: AppContext,
    reconciler: Reconciler,
    caches: ViewCaches,
    scheduler: Scheduler,
    subs: Vec<Subscription>,
    tab: JournalTab,
    active_group: Option<GroupId>,
    active: bool,
}

impl JournalController {
    /// Subscribe to the reflection stream and hand back the controller.
    pub fn start(ctx: AppContext, stage: Arc<dyn Stage>) -> Self {
        let subs = vec![
            ctx.channel.subscribe(EventName::NewReflection),
            ctx.channel.subscribe(EventName::NewGroupReflection),
            ctx.channel.subscribe(EventName::NewComment),
        ];
        Self {
            scheduler: Scheduler::new(stage),
            reconciler: Reconciler::new(ViewKind::Journal),
            caches: ViewCaches::new(),
            subs,
            tab: JournalTab::Mine,
            active_group: None,
            active: true,
            ctx,
        }
    }

    fn view_context(&self) -> ViewContext {
        self.ctx.view_context(self.active_group)
    }

    /// Switch tabs; the group tab needs an active group to show anything.
    pub fn set_tab(&mut self, tab: JournalTab) {
        self.tab = tab;
    }

    /// Scope the group tab to one group.
    pub fn set_active_group(&mut self, group: Option<GroupId>) {
        self.active_group = group;
    }

    /// Drain pending push events through the reconciler.
    pub fn pump(&mut self) -> Vec<RenderIntent> {
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
            PushEvent::NewReflection { reflection }
            | PushEvent::NewGroupReflection { reflection } => {
                (!self.caches.reflections.contains(reflection.id)).then_some(reflection.id)
            }
            _ => None,
        };
        let ctx = self.view_context();
        let intents = self.reconciler.apply(&mut self.caches, &ctx, event);
        for intent in &intents {
            if let RenderIntent::ReflectionUpserted(id) = intent {
                if fresh == Some(*id) {
                    self.scheduler
                        .play(EffectTarget::reflection(*id), EffectKind::SlideUpFadeIn);
                }
            }
        }
        intents
    }

    /// Submit a reflection: optimistic card, then the server's copy.
    pub async fn submit(
        &mut self,
        draft: ReflectionDraft,
    ) -> Result<ReflectionEntry, VerdantError> {
        if draft.content.trim().is_empty() {
            return Err(VerdantError::invalid("reflection must not be empty"));
        }
        if draft.display_mode == DisplayMode::Pseudonym
            && draft.pseudonym.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(VerdantError::invalid("pseudonym display needs a pseudonym"));
        }

        let token = CorrelationId::new();
        let provisional = ReflectionEntry {
            id: ReflectionId::new(provisional_id()),
            display_name: draft.pseudonym.clone(),
            content: draft.content.clone(),
            created_at: TimeStamp::now(),
            group_id: draft.group_id,
            tags: draft.tags.clone(),
            comments: Vec::new(),
            correlation: Some(token),
        };
        let provisional_id = provisional.id;
        self.reconciler
            .insert_optimistic_reflection(&mut self.caches, provisional);

        match self.ctx.api.create_reflection(&draft).await {
            Ok(created) => {
                if !self.active {
                    return Ok(created.reflection);
                }
                let entry = created.reflection;
                self.reconciler
                    .resolve_reflection(&mut self.caches, token, entry.clone());
                self.scheduler
                    .play(EffectTarget::reflection(entry.id), EffectKind::SlideUpFadeIn);
                // Published from the returned entity, never from rendered
                // output.
                self.ctx.bus.publish(PageNote::ReflectionSubmitted {
                    id: entry.id,
                    content: entry.content.clone(),
                    group_id: entry.group_id,
                });
                Ok(entry)
            }
            Err(err) => {
                warn!(%err, "reflection submit failed, rolling back optimistic card");
                self.caches.reflections.remove(provisional_id);
                Err(err)
            }
        }
    }

    /// Comment on a cached entry; the push echo deduplicates against this.
    pub async fn comment(
        &mut self,
        id: ReflectionId,
        content: &str,
    ) -> Result<Comment, VerdantError> {
        if content.trim().is_empty() {
            return Err(VerdantError::invalid("comment must not be empty"));
        }
        let response = self.ctx.api.add_comment(id, content).await?;
        if self.active {
            if let Some(entry) = self.caches.reflections.get_mut(id) {
                if !entry.comments.contains(&response.comment) {
                    entry.push_comment(response.comment.clone());
                }
            }
        }
        Ok(response.comment)
    }

    /// Project the open tab's feed.
    pub fn render(&self) -> JournalView {
        let entries = self
            .caches
            .reflections
            .iter()
            .filter(|entry| match self.tab {
                JournalTab::Mine => entry.group_id.is_none(),
                JournalTab::Group => {
                    self.active_group.is_some() && entry.group_id == self.active_group
                }
            })
            .cloned()
            .collect();
        JournalView {
            entries,
            tab: self.tab,
        }
    }

    /// Signal that a card's entry animation finished.
    pub fn effect_done(&self, id: ReflectionId) {
        self.scheduler.complete(&EffectTarget::reflection(id));
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
