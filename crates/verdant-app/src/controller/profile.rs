//! Profile: identity, badges, and reflection history.

use crate::context::AppContext;
use crate::effects::{EffectKind, EffectTarget, Scheduler, Stage};
use std::sync::Arc;
use tracing::warn;
use verdant_channel::Subscription;
use verdant_core::{Badge, Profile, ReflectionEntry, UserVitals, VerdantError};
use verdant_protocol::{EventName, PushEvent};
use verdant_sync::{Reconciler, RenderIntent, ViewCaches, ViewContext, ViewKind};

/// What the profile page renders.
#[derive(Debug, Clone, Default)]
pub struct ProfileView {
    /// The profile record.
    pub profile: Profile,
    /// Badges in award order.
    pub badges: Vec<Badge>,
    /// The user's reflection history as seen this session.
    pub reflections: Vec<ReflectionEntry>,
    /// Streak/xp/level.
    pub vitals: UserVitals,
}

/// Controller for the profile page.
pub struct ProfileController {
    ctx: AppContext,
    reconciler: Reconciler,
    caches: ViewCaches,
    profile: Profile,
    scheduler: Scheduler,
    subs: Vec<Subscription>,
    active: bool,
}

impl ProfileController {
    /// Subscribe and pull the profile.
    pub async fn start(ctx: AppContext, stage: Arc<dyn Stage>) -> Self {
        let subs = vec![
            ctx.channel.subscribe(EventName::NewReflection),
            ctx.channel.subscribe(EventName::NewBadge),
            ctx.channel.subscribe(EventName::UserStateUpdate),
        ];
        let mut controller = Self {
            scheduler: Scheduler::new(stage),
            reconciler: Reconciler::new(ViewKind::Profile),
            caches: ViewCaches::new(),
            profile: Profile::default(),
            subs,
            active: true,
            ctx,
        };
        controller.load_profile().await;
        controller
    }

    fn view_context(&self) -> ViewContext {
        self.ctx.view_context(None)
    }

    async fn load_profile(&mut self) {
        match self.ctx.api.profile().await {
            Ok(profile) => {
                if !self.active {
                    return;
                }
                for badge in profile.badges.clone() {
                    self.caches.badges.seed(badge);
                }
                self.profile = profile;
            }
            Err(err) => warn!(%err, "profile snapshot failed, keeping prior state"),
        }
    }

    /// Save edits. The cache takes the server's copy of the record.
    pub async fn save(&mut self, mut profile: Profile) -> Result<Profile, VerdantError> {
        if profile.username.trim().is_empty() {
            return Err(VerdantError::invalid("username must not be empty"));
        }
        profile.id = self.ctx.user;
        let stored = self.ctx.api.update_profile(&profile).await?;
        if self.active {
            self.profile = stored.clone();
        }
        Ok(stored)
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
        let ctx = self.view_context();
        let intents = self.reconciler.apply(&mut self.caches, &ctx, event);
        for intent in &intents {
            if let RenderIntent::BadgeUpserted(id) = intent {
                self.scheduler
                    .play(EffectTarget::badge(*id), EffectKind::BadgeToast);
            }
        }
        intents
    }

    /// Project the page.
    pub fn render(&self) -> ProfileView {
        ProfileView {
            profile: self.profile.clone(),
            badges: self.caches.badges.iter().cloned().collect(),
            reflections: self.caches.reflections.iter().cloned().collect(),
            vitals: self.caches.vitals,
        }
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
