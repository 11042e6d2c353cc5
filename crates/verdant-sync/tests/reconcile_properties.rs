//! Property tests for cache reconciliation.
//!
//! Verifies the merge invariants over generated event streams: redelivery
//! changes nothing, snapshot/push ordering does not affect the final
//! state, progress stays in range, and completion is terminal.

use proptest::prelude::*;
use std::collections::BTreeMap;
use verdant_core::{Goal, GoalId, UserId};
use verdant_protocol::PushEvent;
use verdant_sync::{Reconciler, ViewCaches, ViewContext, ViewKind};

const ME: UserId = UserId::new(1);

fn active_goal() -> impl Strategy<Value = Goal> {
    (1u64..20, 0u8..=100).prop_map(|(id, progress)| Goal {
        id: GoalId::new(id),
        title: format!("g{id}"),
        progress,
        created_by: ME,
        ..Goal::default()
    })
}

fn any_goal() -> impl Strategy<Value = Goal> {
    (active_goal(), any::<bool>()).prop_map(|(mut goal, completed)| {
        if completed {
            goal.complete();
        }
        goal
    })
}

fn by_id(caches: &ViewCaches) -> BTreeMap<u64, Goal> {
    caches
        .goals
        .iter()
        .map(|g| (g.id.value(), g.clone()))
        .collect()
}

proptest! {
    /// Replaying an entire event stream on top of its own result lands
    /// on the same state.
    #[test]
    fn replaying_a_stream_converges(goals in proptest::collection::vec(any_goal(), 1..30)) {
        let reconciler = Reconciler::new(ViewKind::Pathways);
        let ctx = ViewContext::for_user(ME);
        let events: Vec<PushEvent> = goals.into_iter().map(PushEvent::GoalCreated).collect();

        let mut caches = ViewCaches::new();
        for event in &events {
            reconciler.apply(&mut caches, &ctx, event);
        }
        let first_pass = by_id(&caches);

        for event in &events {
            reconciler.apply(&mut caches, &ctx, event);
        }
        prop_assert_eq!(by_id(&caches), first_pass);
    }

    /// An immediately redelivered event is a no-op with no intents.
    #[test]
    fn immediate_duplicate_is_silent(goal in any_goal()) {
        let reconciler = Reconciler::new(ViewKind::Pathways);
        let ctx = ViewContext::for_user(ME);
        let event = PushEvent::GoalCreated(goal);

        let mut caches = ViewCaches::new();
        reconciler.apply(&mut caches, &ctx, &event);
        let again = reconciler.apply(&mut caches, &ctx, &event);
        prop_assert!(again.is_empty());
        prop_assert_eq!(caches.goals.len(), 1);
    }

    /// Seeding the snapshot before or after the push stream yields the
    /// same per-id state. Snapshot copies are the older read, so the
    /// generator keeps them active; the push stream is unconstrained.
    #[test]
    fn snapshot_position_does_not_matter(
        snapshot in proptest::collection::vec(active_goal(), 0..15),
        pushes in proptest::collection::vec(any_goal(), 0..15),
    ) {
        let reconciler = Reconciler::new(ViewKind::Pathways);
        let ctx = ViewContext::for_user(ME);
        let events: Vec<PushEvent> =
            pushes.into_iter().map(PushEvent::GoalUpdated).collect();

        let mut seed_first = ViewCaches::new();
        for goal in &snapshot {
            seed_first.goals.seed(goal.clone());
        }
        for event in &events {
            reconciler.apply(&mut seed_first, &ctx, event);
        }

        let mut seed_last = ViewCaches::new();
        for event in &events {
            reconciler.apply(&mut seed_last, &ctx, event);
        }
        for goal in &snapshot {
            seed_last.goals.seed(goal.clone());
        }

        prop_assert_eq!(by_id(&seed_first), by_id(&seed_last));
    }

    /// Cached progress is always in 0–100, whatever the wire claims.
    #[test]
    fn decoded_progress_stays_in_range(raw in any::<i64>()) {
        let goal: Goal = serde_json::from_value(serde_json::json!({
            "id": 1, "title": "t", "progress": raw, "created_by": 1
        }))
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(goal.progress <= 100);
    }

    /// Once a cached goal completes, no later update reactivates it.
    #[test]
    fn completion_is_terminal(updates in proptest::collection::vec(any_goal(), 1..20)) {
        let reconciler = Reconciler::new(ViewKind::Pathways);
        let ctx = ViewContext::for_user(ME);

        let mut done = Goal {
            id: GoalId::new(1),
            title: "g1".into(),
            created_by: ME,
            ..Goal::default()
        };
        done.complete();

        let mut caches = ViewCaches::new();
        reconciler.apply(&mut caches, &ctx, &PushEvent::GoalCreated(done));
        for mut update in updates {
            update.id = GoalId::new(1);
            reconciler.apply(&mut caches, &ctx, &PushEvent::GoalUpdated(update));
        }

        let goal = caches.goals.get(GoalId::new(1)).unwrap();
        prop_assert!(goal.status.is_completed());
        prop_assert_eq!(goal.progress, 100);
    }
}
