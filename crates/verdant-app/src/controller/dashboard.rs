//! Dashboard: the home page summary.

use crate::context::AppContext;
use crate::effects::{AmbientScene, DayTheme, EffectKind, EffectTarget, Scheduler, Stage};
use std::sync::Arc;
use tracing::warn;
use verdant_channel::Subscription;
use verdant_core::{ActivityEvent, Badge, GardenState, Goal, UserVitals};
use verdant_protocol::{EventName, PushEvent};
use verdant_sync::{Reconciler, RenderIntent, ViewCaches, ViewContext, ViewKind};

/// What the dashboard renders.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    /// Streak/xp/level.
    pub vitals: UserVitals,
    /// Tree-of-insight height for the summary widget.
    pub tree_height: f32,
    /// Recent activity feed, newest first as the server returns it.
    pub activity: Vec<ActivityEvent>,
    /// Earned badges.
    pub badges: Vec<Badge>,
    /// Personal goals shown in the summary strip.
    pub goals: Vec<Goal>,
    /// Hour-of-day theme.
    pub theme: DayTheme,
}

/// Controller for the home page.
pub struct DashboardController {
    ctx: AppContext,
    reconciler: Reconciler,
    caches: ViewCaches,
    garden: GardenState,
    scheduler: Scheduler,
    ambient: AmbientScene,
    subs: Vec<Subscription>,
    active: bool,
}

impl DashboardController {
    /// Subscribe, pull the garden and activity snapshots, start the
    /// hourly theme refresh.
    pub async fn start(ctx: AppContext, stage: Arc<dyn Stage>) -> Self {
        let subs = vec![
            ctx.channel.subscribe(EventName::GardenUpdate),
            ctx.channel.subscribe(EventName::UserStateUpdate),
            ctx.channel.subscribe(EventName::NewBadge),
            ctx.channel.subscribe(EventName::GoalCreated),
        ];
        let mut controller = Self {
            scheduler: Scheduler::new(stage),
            ambient: AmbientScene::start(),
            reconciler: Reconciler::new(ViewKind::Dashboard),
            caches: ViewCaches::new(),
            garden: GardenState::default(),
            subs,
            active: true,
            ctx,
        };
        controller.load_garden(true).await;
        controller.load_activity().await;
        controller
    }

    fn view_context(&self) -> ViewContext {
        self.ctx.view_context(None)
    }

    async fn load_garden(&mut self, initial: bool) {
        match self.ctx.api.garden_state().await {
            Ok(snapshot) => {
                if !self.active {
                    return;
                }
                self.garden.apply_vitals(UserVitals {
                    streak: snapshot.streak,
                    xp: snapshot.xp,
                    level: snapshot.level,
                });
                self.caches.vitals = UserVitals {
                    streak: snapshot.streak,
                    xp: snapshot.xp,
                    level: snapshot.level,
                };
                for badge in snapshot.badges {
                    if initial {
                        self.caches.badges.seed(badge);
                    } else {
                        self.caches.badges.upsert(badge);
                    }
                }
                for goal in snapshot.goals {
                    if initial {
                        self.caches.goals.seed(goal);
                    } else {
                        self.caches.goals.upsert(goal);
                    }
                }
            }
            Err(err) => warn!(%err, "garden snapshot failed, keeping prior state"),
        }
    }

    async fn load_activity(&mut self) {
        match self.ctx.api.recent_activity().await {
            Ok(feed) => {
                if self.active {
                    self.caches.set_activity(feed);
                }
            }
            Err(err) => warn!(%err, "activity snapshot failed, keeping prior feed"),
        }
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
            if applied.contains(&RenderIntent::RefetchGarden) {
                self.load_garden(false).await;
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
            match intent {
                RenderIntent::BadgeUpserted(id) => {
                    self.scheduler
                        .play(EffectTarget::badge(*id), EffectKind::BadgeToast);
                }
                RenderIntent::VitalsChanged => {
                    self.garden.apply_vitals(self.caches.vitals);
                    self.scheduler
                        .play(EffectTarget::new("vitals"), EffectKind::GrowPulse);
                }
                _ => {}
            }
        }
        intents
    }

    /// Project the summary.
    pub fn render(&self) -> DashboardView {
        DashboardView {
            vitals: self.caches.vitals,
            tree_height: self.garden.tree_height(),
            activity: self.caches.activity.clone(),
            badges: self.caches.badges.iter().cloned().collect(),
            goals: self.caches.goals.iter().cloned().collect(),
            theme: self.ambient.theme(),
        }
    }

    /// Tear down: stop the theme refresh, cancel effects, go inert.
    pub fn close(&mut self) {
        self.active = false;
        self.subs.clear();
        self.ambient.close();
        self.scheduler.close();
    }

    /// Whether the controller is still live.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
