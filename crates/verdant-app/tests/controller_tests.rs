//! Controller behavior over a scripted API and an in-process channel.

use std::sync::Arc;
use std::time::Duration;
use verdant_app::{
    AppContext, GardenController, GreenhouseController, JournalController, PathwaysController,
    Stage,
};
use verdant_channel::{InProcTransport, PushChannel, ReconnectConfig, RemoteEnd};
use verdant_core::{GoalId, PlantId, UserId, UserVitals};
use verdant_protocol::snapshots::{GoalDraft, GroupDraft, ReflectionDraft};
use verdant_protocol::{PageNote, PushEvent};
use verdant_testkit::{factories, RecordingStage, ScriptApi};

fn harness(api: Arc<ScriptApi>) -> (AppContext, RemoteEnd, Arc<RecordingStage>) {
    let (transport, remote) = InProcTransport::pair();
    let channel = PushChannel::start(Arc::new(transport), ReconnectConfig::default());
    let ctx = AppContext::new(factories::TEST_USER, api, channel);
    (ctx, remote, Arc::new(RecordingStage::new()))
}

/// Let the channel's dispatch loop deliver anything pending.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

fn push(remote: &RemoteEnd, event: PushEvent) {
    remote.push(event.to_frame().unwrap());
}

#[tokio::test(start_paused = true)]
async fn watering_one_plant_is_isolated_from_a_foreign_sprout_echo() {
    let api = Arc::new(ScriptApi::new());
    api.set_garden(factories::garden(100, vec![factories::plant(3, 1)]));
    let (ctx, remote, stage) = harness(api);
    let channel = ctx.channel.clone();

    let mut garden = GardenController::start(ctx, stage.clone() as Arc<dyn Stage>).await;

    let response = garden.water(PlantId::new(3)).await.unwrap();
    assert_eq!(response.new_stage, 2);

    // A sprout echo about a different plant arrives concurrently.
    push(
        &remote,
        PushEvent::NewPlant {
            plant_id: PlantId::new(4),
            user_id: factories::TEST_USER,
            image: "stage0.png".into(),
        },
    );
    settle().await;
    garden.pump().await;

    let view = garden.render();
    let three = view.plants.iter().find(|p| p.id == PlantId::new(3)).unwrap();
    let four = view.plants.iter().find(|p| p.id == PlantId::new(4)).unwrap();
    assert_eq!(three.stage, 2);
    assert_eq!(four.stage, 0);

    garden.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn watering_plays_growing_then_splash_markers() {
    let api = Arc::new(ScriptApi::new());
    api.set_garden(factories::garden(0, vec![factories::plant(3, 0)]));
    let (ctx, _remote, stage) = harness(api);
    let channel = ctx.channel.clone();

    let mut garden = GardenController::start(ctx, stage.clone() as Arc<dyn Stage>).await;
    garden.water(PlantId::new(3)).await.unwrap();

    let target = verdant_app::EffectTarget::plant(PlantId::new(3));
    assert_eq!(stage.attachments(&target, "growing"), 1);

    garden.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn garden_update_signal_triggers_a_fresh_pull() {
    let api = Arc::new(ScriptApi::new());
    api.set_garden(factories::garden(0, Vec::new()));
    let (ctx, remote, stage) = harness(api.clone());
    let channel = ctx.channel.clone();

    let mut garden = GardenController::start(ctx, stage as Arc<dyn Stage>).await;
    assert_eq!(garden.render().tree_height, 200.0);

    api.set_garden(factories::garden(500, Vec::new()));
    push(
        &remote,
        PushEvent::GardenUpdate {
            user_id: factories::TEST_USER,
        },
    );
    settle().await;
    garden.pump().await;

    assert_eq!(garden.render().tree_height, 350.0);

    garden.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn foreign_garden_update_is_ignored() {
    let api = Arc::new(ScriptApi::new());
    api.set_garden(factories::garden(0, Vec::new()));
    let (ctx, remote, stage) = harness(api.clone());
    let channel = ctx.channel.clone();

    let mut garden = GardenController::start(ctx, stage as Arc<dyn Stage>).await;
    api.set_garden(factories::garden(500, Vec::new()));
    push(
        &remote,
        PushEvent::GardenUpdate {
            user_id: UserId::new(99),
        },
    );
    settle().await;
    garden.pump().await;

    // Not our garden: no re-pull happened.
    assert_eq!(garden.render().tree_height, 200.0);
    assert_eq!(
        api.calls().iter().filter(|c| **c == "garden_state").count(),
        1
    );

    garden.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn optimistic_goal_resolves_to_the_server_id() {
    let api = Arc::new(ScriptApi::new());
    let (ctx, _remote, stage) = harness(api.clone());
    let channel = ctx.channel.clone();

    let mut pathways = PathwaysController::start(ctx, stage as Arc<dyn Stage>).await;
    let goal = pathways
        .save_goal(GoalDraft {
            title: "Read daily".into(),
            ..GoalDraft::default()
        })
        .await
        .unwrap();

    let view = pathways.render();
    assert_eq!(view.goals.len(), 1);
    assert_eq!(view.goals[0].id, goal.id);
    // Server-assigned, not the provisional id.
    assert!(goal.id.value() < 1 << 40);

    pathways.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn failed_goal_save_rolls_the_optimistic_node_back() {
    let api = Arc::new(ScriptApi::new());
    api.fail_next("create_goal");
    let (ctx, _remote, stage) = harness(api);
    let channel = ctx.channel.clone();

    let mut pathways = PathwaysController::start(ctx, stage as Arc<dyn Stage>).await;
    let result = pathways
        .save_goal(GoalDraft {
            title: "Read daily".into(),
            ..GoalDraft::default()
        })
        .await;

    assert!(result.is_err());
    assert!(pathways.render().goals.is_empty());

    pathways.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn empty_goal_title_is_rejected_before_any_network_call() {
    let api = Arc::new(ScriptApi::new());
    let (ctx, _remote, stage) = harness(api.clone());
    let channel = ctx.channel.clone();

    let mut pathways = PathwaysController::start(ctx, stage as Arc<dyn Stage>).await;
    let result = pathways.save_goal(GoalDraft::default()).await;

    assert!(result.is_err());
    assert!(!api.calls().contains(&"create_goal"));

    pathways.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn closed_pathways_controller_ignores_later_pushes() {
    let api = Arc::new(ScriptApi::new());
    let (ctx, remote, stage) = harness(api);
    let channel = ctx.channel.clone();

    let mut pathways = PathwaysController::start(ctx, stage as Arc<dyn Stage>).await;
    pathways.close();
    assert!(!pathways.is_active());

    push(&remote, PushEvent::GoalCreated(factories::goal(7, 0)));
    settle().await;
    let intents = pathways.pump().await;

    assert!(intents.is_empty());
    assert!(pathways.render().goals.is_empty());

    channel.close();
}

#[tokio::test(start_paused = true)]
async fn milestones_accrue_one_per_five_goals() {
    let api = Arc::new(ScriptApi::new());
    api.set_goals((1..=11).map(|id| factories::goal(id, 0)).collect());
    let (ctx, _remote, stage) = harness(api);
    let channel = ctx.channel.clone();

    let pathways = PathwaysController::start(ctx, stage as Arc<dyn Stage>).await;
    assert_eq!(pathways.render().milestones, 2);

    channel.close();
}

#[tokio::test(start_paused = true)]
async fn reflection_submit_publishes_the_confirmed_entity() {
    let api = Arc::new(ScriptApi::new());
    let (ctx, _remote, stage) = harness(api);
    let channel = ctx.channel.clone();
    let mut notes = ctx.bus.subscribe();

    let mut journal = JournalController::start(ctx, stage as Arc<dyn Stage>);
    let entry = journal
        .submit(ReflectionDraft {
            content: "grew today".into(),
            ..ReflectionDraft::default()
        })
        .await
        .unwrap();

    // Exactly one card: the optimistic one was replaced by the server's.
    assert_eq!(journal.render().entries.len(), 1);
    assert_eq!(journal.render().entries[0].id, entry.id);

    let note = notes.recv().await.unwrap();
    assert_eq!(
        note,
        PageNote::ReflectionSubmitted {
            id: entry.id,
            content: "grew today".into(),
            group_id: None,
        }
    );

    journal.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn empty_reflection_is_rejected_before_any_network_call() {
    let api = Arc::new(ScriptApi::new());
    let (ctx, _remote, stage) = harness(api.clone());
    let channel = ctx.channel.clone();

    let mut journal = JournalController::start(ctx, stage as Arc<dyn Stage>);
    let result = journal
        .submit(ReflectionDraft {
            content: "   ".into(),
            ..ReflectionDraft::default()
        })
        .await;

    assert!(result.is_err());
    assert!(!api.calls().contains(&"create_reflection"));

    journal.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn duplicate_reflection_push_renders_one_card() {
    let api = Arc::new(ScriptApi::new());
    let (ctx, remote, stage) = harness(api);
    let channel = ctx.channel.clone();

    let mut journal = JournalController::start(ctx, stage as Arc<dyn Stage>);
    let event = PushEvent::NewReflection {
        reflection: factories::reflection(9),
    };
    push(&remote, event.clone());
    push(&remote, event);
    settle().await;
    journal.pump();

    assert_eq!(journal.render().entries.len(), 1);

    journal.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn group_creation_requires_name_and_class() {
    let api = Arc::new(ScriptApi::new());
    let (ctx, _remote, stage) = harness(api.clone());
    let channel = ctx.channel.clone();

    let mut greenhouse = GreenhouseController::start(ctx, stage as Arc<dyn Stage>).await;

    let no_name = greenhouse
        .create_group(GroupDraft {
            class_name: "Year 9".into(),
            ..GroupDraft::default()
        })
        .await;
    assert!(no_name.is_err());

    let no_class = greenhouse
        .create_group(GroupDraft {
            name: "Growers".into(),
            ..GroupDraft::default()
        })
        .await;
    assert!(no_class.is_err());
    assert!(!api.calls().contains(&"create_group"));

    let ok = greenhouse
        .create_group(GroupDraft {
            name: "Growers".into(),
            class_name: "Year 9".into(),
            ..GroupDraft::default()
        })
        .await
        .unwrap();
    assert_eq!(greenhouse.render().groups.len(), 1);
    assert_eq!(greenhouse.render().groups[0].id, ok.id);

    greenhouse.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn completing_a_goal_survives_a_stale_active_echo() {
    let api = Arc::new(ScriptApi::new());
    api.set_goals(vec![factories::goal(2, 30)]);
    let (ctx, remote, stage) = harness(api);
    let channel = ctx.channel.clone();

    let mut pathways = PathwaysController::start(ctx, stage as Arc<dyn Stage>).await;
    pathways.complete_goal(GoalId::new(2)).await.unwrap();

    // A stale update claiming the goal is still active arrives late.
    push(&remote, PushEvent::GoalUpdated(factories::goal(2, 30)));
    settle().await;
    pathways.pump().await;

    let view = pathways.render();
    assert_eq!(view.completed, 1);
    assert!(view.goals[0].status.is_completed());
    assert_eq!(view.goals[0].progress, 100);

    pathways.close();
    channel.close();
}

#[tokio::test(start_paused = true)]
async fn dashboard_vitals_follow_push_updates() {
    use verdant_app::DashboardController;

    let api = Arc::new(ScriptApi::new());
    let (ctx, remote, stage) = harness(api);
    let channel = ctx.channel.clone();

    let mut dashboard = DashboardController::start(ctx, stage as Arc<dyn Stage>).await;
    push(
        &remote,
        PushEvent::UserStateUpdate(UserVitals {
            streak: 4,
            xp: 220,
            level: 3,
        }),
    );
    settle().await;
    dashboard.pump().await;

    let view = dashboard.render();
    assert_eq!(view.vitals.xp, 220);
    assert_eq!(view.vitals.streak, 4);

    dashboard.close();
    channel.close();
}
