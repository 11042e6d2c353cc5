//! Garden: the full personal garden scene.

use crate::context::AppContext;
use crate::effects::{
    AmbientScene, DayTheme, EffectKind, EffectTarget, Scheduler, Stage, Weather,
};
use std::sync::Arc;
use tracing::warn;
use verdant_channel::Subscription;
use verdant_core::{Badge, GardenState, Goal, Plant, PlantId, VerdantError};
use verdant_protocol::snapshots::WaterResponse;
use verdant_protocol::{EventName, PushEvent};
use verdant_sync::{Reconciler, RenderIntent, ViewCaches, ViewContext, ViewKind};

/// What the garden page renders.
#[derive(Debug, Clone, Default)]
pub struct GardenView {
    /// Tree-of-insight height in layout units.
    pub tree_height: f32,
    /// Plants in listing order.
    pub plants: Vec<Plant>,
    /// Personal goals rendered as flowers along the path.
    pub goal_flowers: Vec<Goal>,
    /// Rare badges rendered as floating flowers.
    pub rare_flowers: Vec<Badge>,
    /// Current ambient weather.
    pub weather: Weather,
    /// Current scene theme.
    pub theme: DayTheme,
}

/// Controller for the garden page.
pub struct GardenController {
    ctx: AppContext,
    reconciler: Reconciler,
    caches: ViewCaches,
    garden: GardenState,
    scheduler: Scheduler,
    ambient: AmbientScene,
    subs: Vec<Subscription>,
    active: bool,
}

impl GardenController {
    /// Subscribe, pull the garden snapshot, start the ambient cycles.
    pub async fn start(ctx: AppContext, stage: Arc<dyn Stage>) -> Self {
        let subs = vec![
            ctx.channel.subscribe(EventName::GardenUpdate),
            ctx.channel.subscribe(EventName::NewPlant),
            ctx.channel.subscribe(EventName::GoalCreated),
            ctx.channel.subscribe(EventName::UserStateUpdate),
            ctx.channel.subscribe(EventName::NewBadge),
        ];
        let mut controller = Self {
            scheduler: Scheduler::new(stage),
            ambient: AmbientScene::start(),
            reconciler: Reconciler::new(ViewKind::Garden),
            caches: ViewCaches::new(),
            garden: GardenState::default(),
            subs,
            active: true,
            ctx,
        };
        controller.load_snapshot(true).await;
        controller
    }

    fn view_context(&self) -> ViewContext {
        self.ctx.view_context(None)
    }

    /// Pull `/api/garden-state`. The initial pull seeds (a racing push is
    /// fresher than the snapshot); a signal-driven refetch upserts (the
    /// pull was requested after the change it reports).
    async fn load_snapshot(&mut self, initial: bool) {
        match self.ctx.api.garden_state().await {
            Ok(snapshot) => {
                if !self.active {
                    return;
                }
                self.garden.apply_vitals(verdant_core::UserVitals {
                    streak: snapshot.streak,
                    xp: snapshot.xp,
                    level: snapshot.level,
                });
                for plant in snapshot.plants {
                    if initial {
                        self.caches.plants.seed(plant);
                    } else {
                        self.caches.plants.upsert(plant);
                    }
                }
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
                self.load_snapshot(false).await;
            }
            intents.extend(applied);
        }
        intents
    }

    fn handle(&mut self, event: &PushEvent) -> Vec<RenderIntent> {
        let fresh_plant = match event {
            PushEvent::NewPlant { plant_id, .. } => {
                (!self.caches.plants.contains(*plant_id)).then_some(*plant_id)
            }
            _ => None,
        };
        let ctx = self.view_context();
        let intents = self.reconciler.apply(&mut self.caches, &ctx, event);
        for intent in &intents {
            match intent {
                RenderIntent::PlantUpserted(id) if fresh_plant == Some(*id) => {
                    self.scheduler
                        .play(EffectTarget::plant(*id), EffectKind::SproutAppear);
                }
                RenderIntent::BadgeUpserted(id) => {
                    self.scheduler
                        .play(EffectTarget::badge(*id), EffectKind::BadgeToast);
                }
                RenderIntent::GoalUpserted(id) => {
                    self.scheduler.play(EffectTarget::goal(*id), EffectKind::Bloom);
                }
                RenderIntent::VitalsChanged => {
                    self.garden.apply_vitals(self.caches.vitals);
                }
                _ => {}
            }
        }
        intents
    }

    /// Water a plant: growing marker up front, growth applied from the
    /// response. Only the plant the response names is touched; a racing
    /// push about another plant cannot bleed into this one.
    pub async fn water(&mut self, id: PlantId) -> Result<WaterResponse, VerdantError> {
        if !self.caches.plants.contains(id) {
            return Err(VerdantError::not_found(format!("plant {id}")));
        }
        let target = EffectTarget::plant(id);
        self.scheduler.play(target.clone(), EffectKind::Growing);

        match self.ctx.api.water_plant(id).await {
            Ok(response) => {
                if self.active {
                    if let Some(plant) = self.caches.plants.get_mut(response.plant_id) {
                        plant.advance_to(response.new_stage, response.image.clone());
                    }
                    self.scheduler
                        .play(EffectTarget::plant(response.plant_id), EffectKind::WaterSplash);
                }
                Ok(response)
            }
            Err(err) => {
                warn!(%err, plant = %id, "watering failed");
                // End the growing marker early; nothing grew.
                self.scheduler.complete(&target);
                Err(err)
            }
        }
    }

    /// Project the scene.
    pub fn render(&self) -> GardenView {
        GardenView {
            tree_height: self.garden.tree_height(),
            plants: self.caches.plants.iter().cloned().collect(),
            goal_flowers: self.caches.goals.iter().cloned().collect(),
            rare_flowers: self
                .caches
                .badges
                .iter()
                .filter(|badge| badge.is_rare())
                .cloned()
                .collect(),
            weather: self.ambient.weather(),
            theme: self.ambient.theme(),
        }
    }

    /// Signal that a plant node's animation finished.
    pub fn effect_done(&self, id: PlantId) {
        self.scheduler.complete(&EffectTarget::plant(id));
    }

    /// Tear down: stop ambient cycles, cancel effects, go inert.
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
