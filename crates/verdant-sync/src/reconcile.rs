//! Merging push deltas into view caches.
//!
//! For each event the pipeline is: relevance filter, no-change discard,
//! apply, render intents. The rules the raw stream does not guarantee
//! are enforced on the way in:
//!
//! - an update arriving before its creation is treated as a creation
//!   (upsert handles both);
//! - a deletion of an unknown id is a no-op;
//! - goal progress is clamped to 0–100 and `completed` never regresses
//!   to `active`;
//! - a duplicated delivery changes nothing and emits no intents.

use crate::cache::Applied;
use crate::intent::RenderIntent;
use crate::view::{ViewCaches, ViewContext, ViewKind};
use tracing::debug;
use verdant_core::{
    Comment, CorrelationId, Goal, GoalStatus, Plant, ReflectionEntry, ReflectionId,
};
use verdant_protocol::PushEvent;

/// Applies push events to one view's caches.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    view: ViewKind,
}

impl Reconciler {
    /// Reconciler for the given view.
    pub fn new(view: ViewKind) -> Self {
        Self { view }
    }

    /// The view this reconciler feeds.
    pub fn view(&self) -> ViewKind {
        self.view
    }

    /// Merge one push event. Returns the fragments to re-render; empty
    /// when the event was irrelevant to this view or changed nothing.
    pub fn apply(
        &self,
        caches: &mut ViewCaches,
        ctx: &ViewContext,
        event: &PushEvent,
    ) -> Vec<RenderIntent> {
        let intents = match self.view {
            ViewKind::Dashboard => self.apply_dashboard(caches, ctx, event),
            ViewKind::Garden => self.apply_garden(caches, ctx, event),
            ViewKind::Greenhouse => self.apply_greenhouse(caches, ctx, event),
            ViewKind::Pathways => self.apply_pathways(caches, ctx, event),
            ViewKind::Journal => self.apply_journal(caches, ctx, event),
            ViewKind::Profile => self.apply_profile(caches, ctx, event),
        };
        if intents.is_empty() {
            debug!(view = ?self.view, event = %event.name(), "event discarded");
        }
        intents
    }

    fn apply_dashboard(
        &self,
        caches: &mut ViewCaches,
        ctx: &ViewContext,
        event: &PushEvent,
    ) -> Vec<RenderIntent> {
        match event {
            PushEvent::GardenUpdate { user_id } if *user_id == ctx.user => {
                vec![RenderIntent::RefetchGarden]
            }
            PushEvent::UserStateUpdate(vitals) => apply_vitals(caches, *vitals),
            PushEvent::NewBadge(badge) if badge.user_id == ctx.user => {
                upsert_badge(caches, badge.clone())
            }
            PushEvent::GoalCreated(goal) if is_own_personal(goal, ctx) => {
                upsert_goal(caches, goal)
            }
            _ => Vec::new(),
        }
    }

    fn apply_garden(
        &self,
        caches: &mut ViewCaches,
        ctx: &ViewContext,
        event: &PushEvent,
    ) -> Vec<RenderIntent> {
        match event {
            PushEvent::GardenUpdate { user_id } if *user_id == ctx.user => {
                vec![RenderIntent::RefetchGarden]
            }
            PushEvent::NewPlant {
                plant_id,
                user_id,
                image,
            } if *user_id == ctx.user => {
                let plant = Plant {
                    id: *plant_id,
                    user_id: *user_id,
                    stage: 0,
                    image: image.clone(),
                };
                match caches.plants.upsert(plant) {
                    Applied::Unchanged => Vec::new(),
                    _ => vec![RenderIntent::PlantUpserted(*plant_id)],
                }
            }
            PushEvent::GoalCreated(goal) if is_own_personal(goal, ctx) => {
                upsert_goal(caches, goal)
            }
            PushEvent::UserStateUpdate(vitals) => apply_vitals(caches, *vitals),
            PushEvent::NewBadge(badge) if badge.user_id == ctx.user => {
                upsert_badge(caches, badge.clone())
            }
            _ => Vec::new(),
        }
    }

    fn apply_greenhouse(
        &self,
        caches: &mut ViewCaches,
        ctx: &ViewContext,
        event: &PushEvent,
    ) -> Vec<RenderIntent> {
        match event {
            PushEvent::GroupCreated(_) => vec![RenderIntent::RefetchGroups],
            PushEvent::NewGroupReflection { reflection }
                if ctx.is_active_group(reflection.group_id) =>
            {
                vec![RenderIntent::RefetchGroupActivity]
            }
            PushEvent::NewComment { .. } if ctx.active_group.is_some() => {
                vec![RenderIntent::RefetchGroupActivity]
            }
            PushEvent::GoalCreated(goal) if ctx.is_active_group(goal.group_id) => {
                let mut intents = upsert_goal(caches, goal);
                if !intents.is_empty() {
                    intents.push(RenderIntent::RefetchGroupActivity);
                }
                intents
            }
            _ => Vec::new(),
        }
    }

    fn apply_pathways(
        &self,
        caches: &mut ViewCaches,
        ctx: &ViewContext,
        event: &PushEvent,
    ) -> Vec<RenderIntent> {
        match event {
            PushEvent::GoalCreated(goal) if is_own_personal(goal, ctx) => {
                upsert_goal(caches, goal)
            }
            // An update to a goal this view never admitted is only
            // relevant if it would have been admitted as a creation
            // (update-before-create) or the goal is already cached.
            PushEvent::GoalUpdated(goal)
                if caches.goals.contains(goal.id) || is_own_personal(goal, ctx) =>
            {
                upsert_goal(caches, goal)
            }
            PushEvent::GoalDeleted { goal_id } => match caches.goals.remove(*goal_id) {
                Some(_) => vec![RenderIntent::GoalRemoved(*goal_id)],
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn apply_journal(
        &self,
        caches: &mut ViewCaches,
        ctx: &ViewContext,
        event: &PushEvent,
    ) -> Vec<RenderIntent> {
        match event {
            PushEvent::NewReflection { reflection } if reflection.group_id.is_none() => {
                upsert_reflection(caches, reflection)
            }
            PushEvent::NewGroupReflection { reflection }
                if ctx.is_active_group(reflection.group_id) =>
            {
                upsert_reflection(caches, reflection)
            }
            PushEvent::NewComment {
                reflection_id,
                comment,
            } => add_comment(caches, *reflection_id, comment),
            _ => Vec::new(),
        }
    }

    fn apply_profile(
        &self,
        caches: &mut ViewCaches,
        ctx: &ViewContext,
        event: &PushEvent,
    ) -> Vec<RenderIntent> {
        match event {
            PushEvent::NewReflection { reflection } => upsert_reflection(caches, reflection),
            PushEvent::NewBadge(badge) if badge.user_id == ctx.user => {
                upsert_badge(caches, badge.clone())
            }
            PushEvent::UserStateUpdate(vitals) => apply_vitals(caches, *vitals),
            _ => Vec::new(),
        }
    }

    /// Insert an optimistic record for a goal the user just submitted.
    /// The record must carry a correlation token so the confirmation can
    /// replace it even if the server assigned a different id.
    pub fn insert_optimistic_goal(
        &self,
        caches: &mut ViewCaches,
        goal: Goal,
    ) -> Vec<RenderIntent> {
        debug_assert!(goal.correlation.is_some());
        let id = goal.id;
        match caches.goals.upsert(goal) {
            Applied::Unchanged => Vec::new(),
            _ => vec![RenderIntent::GoalUpserted(id)],
        }
    }

    /// Reconcile the server's confirmation of an optimistic goal.
    ///
    /// Matching is by id first; when the server assigned a different id,
    /// the provisional record is found by its correlation token and
    /// replaced, so exactly one record survives.
    pub fn resolve_goal(
        &self,
        caches: &mut ViewCaches,
        token: CorrelationId,
        confirmed: Goal,
    ) -> Vec<RenderIntent> {
        let mut intents = Vec::new();
        if !caches.goals.contains(confirmed.id) {
            let provisional = caches
                .goals
                .find(|g| g.correlation == Some(token))
                .map(|g| g.id);
            if let Some(old_id) = provisional {
                caches.goals.remove(old_id);
                intents.push(RenderIntent::GoalRemoved(old_id));
            }
        }
        intents.extend(upsert_goal(caches, &confirmed));
        intents
    }

    /// Insert an optimistic record for a reflection the user just wrote.
    pub fn insert_optimistic_reflection(
        &self,
        caches: &mut ViewCaches,
        entry: ReflectionEntry,
    ) -> Vec<RenderIntent> {
        debug_assert!(entry.correlation.is_some());
        let id = entry.id;
        match caches.reflections.upsert(entry) {
            Applied::Unchanged => Vec::new(),
            _ => vec![RenderIntent::ReflectionUpserted(id)],
        }
    }

    /// Reconcile the server's confirmation of an optimistic reflection.
    pub fn resolve_reflection(
        &self,
        caches: &mut ViewCaches,
        token: CorrelationId,
        confirmed: ReflectionEntry,
    ) -> Vec<RenderIntent> {
        let mut intents = Vec::new();
        if !caches.reflections.contains(confirmed.id) {
            let provisional = caches
                .reflections
                .find(|r| r.correlation == Some(token))
                .map(|r| r.id);
            if let Some(old_id) = provisional {
                caches.reflections.remove(old_id);
                intents.push(RenderIntent::ReflectionRemoved(old_id));
            }
        }
        intents.extend(upsert_reflection(caches, &confirmed));
        intents
    }
}

fn is_own_personal(goal: &Goal, ctx: &ViewContext) -> bool {
    goal.is_personal() && goal.created_by == ctx.user
}

fn apply_vitals(caches: &mut ViewCaches, vitals: verdant_core::UserVitals) -> Vec<RenderIntent> {
    if caches.vitals == vitals {
        return Vec::new();
    }
    caches.vitals = vitals;
    vec![RenderIntent::VitalsChanged]
}

fn upsert_badge(caches: &mut ViewCaches, badge: verdant_core::Badge) -> Vec<RenderIntent> {
    let id = badge.id;
    match caches.badges.upsert(badge) {
        Applied::Unchanged => Vec::new(),
        _ => vec![RenderIntent::BadgeUpserted(id)],
    }
}

/// Upsert with the monotonic status floor: once a cached goal is
/// completed, a later payload claiming `active` keeps completed shape.
fn upsert_goal(caches: &mut ViewCaches, incoming: &Goal) -> Vec<RenderIntent> {
    let mut goal = incoming.clone();
    goal.set_progress(goal.progress as i64);
    if let Some(existing) = caches.goals.get(goal.id) {
        if existing.status.is_completed() && !goal.status.is_completed() {
            goal.status = GoalStatus::Completed;
            goal.progress = 100;
        }
    }
    let id = goal.id;
    match caches.goals.upsert(goal) {
        Applied::Unchanged => Vec::new(),
        _ => vec![RenderIntent::GoalUpserted(id)],
    }
}

fn upsert_reflection(caches: &mut ViewCaches, incoming: &ReflectionEntry) -> Vec<RenderIntent> {
    let id = incoming.id;
    match caches.reflections.upsert(incoming.clone()) {
        Applied::Unchanged => Vec::new(),
        _ => vec![RenderIntent::ReflectionUpserted(id)],
    }
}

fn add_comment(
    caches: &mut ViewCaches,
    reflection_id: ReflectionId,
    comment: &Comment,
) -> Vec<RenderIntent> {
    let Some(entry) = caches.reflections.get_mut(reflection_id) else {
        return Vec::new();
    };
    // Comments carry no id; a redelivered signal would append the same
    // comment twice without this containment check.
    if entry.comments.contains(comment) {
        return Vec::new();
    }
    entry.push_comment(comment.clone());
    vec![RenderIntent::CommentAdded(reflection_id)]
}
