//! A scripted, in-memory [`Api`] implementation.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use verdant_app::Api;
use verdant_core::{
    Comment, DisplayMode, GardenState, Goal, GoalId, GroupId, GroupSummary, PlantId, Profile,
    ReflectionEntry, ReflectionId, TimeStamp, UserId, VerdantError,
};
use verdant_protocol::snapshots::{
    ActivitySnapshot, CommentResponse, CreatedGoal, CreatedReflection, GoalDraft, GoalsSnapshot,
    GroupDetail, GroupDraft, GroupsSnapshot, ReflectionDraft, UserDirectory, WaterResponse,
};

#[derive(Default)]
struct ScriptState {
    garden: GardenState,
    activity: ActivitySnapshot,
    goals: Vec<Goal>,
    groups: GroupsSnapshot,
    group_details: HashMap<GroupId, GroupDetail>,
    group_activity: HashMap<GroupId, ActivitySnapshot>,
    users: UserDirectory,
    profile: Profile,
    next_id: u64,
    fail_next: HashSet<&'static str>,
    calls: Vec<&'static str>,
}

/// Programmable [`Api`] backed by plain in-memory state.
///
/// Mutations assign server-style ids from a counter, so the id a
/// controller receives back is never the provisional one it inserted
/// optimistically. `fail_next("op")` makes the next call of that
/// operation fail with a network error.
pub struct ScriptApi {
    user: UserId,
    state: Mutex<ScriptState>,
}

impl ScriptApi {
    /// Empty server state; assigned ids start at 100.
    pub fn new() -> Self {
        Self {
            user: crate::factories::TEST_USER,
            state: Mutex::new(ScriptState {
                next_id: 100,
                ..ScriptState::default()
            }),
        }
    }

    /// Preload the garden snapshot.
    pub fn set_garden(&self, garden: GardenState) {
        self.state.lock().garden = garden;
    }

    /// Preload the goal list.
    pub fn set_goals(&self, goals: Vec<Goal>) {
        self.state.lock().goals = goals;
    }

    /// Preload the group list.
    pub fn set_groups(&self, groups: GroupsSnapshot) {
        self.state.lock().groups = groups;
    }

    /// Preload one group's detail.
    pub fn set_group(&self, detail: GroupDetail) {
        self.state.lock().group_details.insert(detail.id, detail);
    }

    /// Preload one group's activity feed.
    pub fn set_group_activity(&self, group: GroupId, feed: ActivitySnapshot) {
        self.state.lock().group_activity.insert(group, feed);
    }

    /// Preload the recent-activity feed.
    pub fn set_activity(&self, feed: ActivitySnapshot) {
        self.state.lock().activity = feed;
    }

    /// Preload the profile.
    pub fn set_profile(&self, profile: Profile) {
        self.state.lock().profile = profile;
    }

    /// Preload the user directory.
    pub fn set_users(&self, users: UserDirectory) {
        self.state.lock().users = users;
    }

    /// Make the next call of `op` fail with a network error.
    pub fn fail_next(&self, op: &'static str) {
        self.state.lock().fail_next.insert(op);
    }

    /// Operations called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    fn enter(&self, op: &'static str) -> Result<(), VerdantError> {
        let mut state = self.state.lock();
        state.calls.push(op);
        if state.fail_next.remove(op) {
            return Err(VerdantError::network(format!("scripted failure: {op}")));
        }
        Ok(())
    }

    fn assign_id(&self) -> u64 {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        id
    }
}

impl Default for ScriptApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Api for ScriptApi {
    async fn garden_state(&self) -> Result<GardenState, VerdantError> {
        self.enter("garden_state")?;
        Ok(self.state.lock().garden.clone())
    }

    async fn recent_activity(&self) -> Result<ActivitySnapshot, VerdantError> {
        self.enter("recent_activity")?;
        Ok(self.state.lock().activity.clone())
    }

    async fn goals(&self) -> Result<GoalsSnapshot, VerdantError> {
        self.enter("goals")?;
        let state = self.state.lock();
        let (group, personal): (Vec<Goal>, Vec<Goal>) = state
            .goals
            .iter()
            .cloned()
            .partition(|g| g.group_id.is_some());
        Ok(GoalsSnapshot { personal, group })
    }

    async fn groups(&self) -> Result<GroupsSnapshot, VerdantError> {
        self.enter("groups")?;
        Ok(self.state.lock().groups.clone())
    }

    async fn group(&self, id: GroupId) -> Result<GroupDetail, VerdantError> {
        self.enter("group")?;
        self.state
            .lock()
            .group_details
            .get(&id)
            .cloned()
            .ok_or_else(|| VerdantError::http(404, format!("no group {id}")))
    }

    async fn group_activity(&self, id: GroupId) -> Result<ActivitySnapshot, VerdantError> {
        self.enter("group_activity")?;
        Ok(self
            .state
            .lock()
            .group_activity
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn users(&self) -> Result<UserDirectory, VerdantError> {
        self.enter("users")?;
        Ok(self.state.lock().users.clone())
    }

    async fn profile(&self) -> Result<Profile, VerdantError> {
        self.enter("profile")?;
        Ok(self.state.lock().profile.clone())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, VerdantError> {
        self.enter("update_profile")?;
        self.state.lock().profile = profile.clone();
        Ok(profile.clone())
    }

    async fn create_reflection(
        &self,
        draft: &ReflectionDraft,
    ) -> Result<CreatedReflection, VerdantError> {
        self.enter("create_reflection")?;
        let display_name = match draft.display_mode {
            DisplayMode::Pseudonym => draft.pseudonym.clone(),
            DisplayMode::Named => {
                let username = self.state.lock().profile.username.clone();
                (!username.is_empty()).then_some(username)
            }
        };
        let reflection = ReflectionEntry {
            id: ReflectionId::new(self.assign_id()),
            display_name,
            content: draft.content.clone(),
            created_at: TimeStamp::now(),
            group_id: draft.group_id,
            tags: draft.tags.clone(),
            comments: Vec::new(),
            correlation: None,
        };
        Ok(CreatedReflection { reflection })
    }

    async fn add_comment(
        &self,
        _id: ReflectionId,
        content: &str,
    ) -> Result<CommentResponse, VerdantError> {
        self.enter("add_comment")?;
        Ok(CommentResponse {
            comment: Comment {
                author: self.state.lock().profile.username.clone(),
                content: content.to_string(),
                created_at: TimeStamp::now(),
            },
        })
    }

    async fn create_goal(&self, draft: &GoalDraft) -> Result<CreatedGoal, VerdantError> {
        self.enter("create_goal")?;
        let goal = Goal {
            id: GoalId::new(self.assign_id()),
            title: draft.title.clone(),
            description: draft.description.clone(),
            kind: draft.kind,
            group_id: draft.group_id,
            due_date: draft.due_date,
            progress: Goal::clamp_progress(draft.progress as i64),
            created_by: self.user,
            ..Goal::default()
        };
        self.state.lock().goals.push(goal.clone());
        Ok(CreatedGoal { goal })
    }

    async fn update_goal(
        &self,
        id: GoalId,
        draft: &GoalDraft,
    ) -> Result<CreatedGoal, VerdantError> {
        self.enter("update_goal")?;
        let mut state = self.state.lock();
        let goal = state
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| VerdantError::http(404, format!("no goal {id}")))?;
        goal.title = draft.title.clone();
        goal.description = draft.description.clone();
        goal.due_date = draft.due_date;
        goal.set_progress(draft.progress as i64);
        Ok(CreatedGoal { goal: goal.clone() })
    }

    async fn complete_goal(&self, id: GoalId) -> Result<CreatedGoal, VerdantError> {
        self.enter("complete_goal")?;
        let mut state = self.state.lock();
        let goal = state
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| VerdantError::http(404, format!("no goal {id}")))?;
        goal.complete();
        Ok(CreatedGoal { goal: goal.clone() })
    }

    async fn delete_goal(&self, id: GoalId) -> Result<(), VerdantError> {
        self.enter("delete_goal")?;
        self.state.lock().goals.retain(|g| g.id != id);
        Ok(())
    }

    async fn create_group(&self, draft: &GroupDraft) -> Result<GroupSummary, VerdantError> {
        self.enter("create_group")?;
        let summary = GroupSummary {
            id: GroupId::new(self.assign_id()),
            name: draft.name.clone(),
            member_count: draft.members.len() as u32 + 1,
        };
        self.state.lock().groups.push(summary.clone());
        Ok(summary)
    }

    async fn water_plant(&self, id: PlantId) -> Result<WaterResponse, VerdantError> {
        self.enter("water_plant")?;
        let mut state = self.state.lock();
        let plant = state
            .garden
            .plants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| VerdantError::http(404, format!("no plant {id}")))?;
        let new_stage = plant.stage + 1;
        let image = format!("stage{new_stage}.png");
        plant.advance_to(new_stage, image.clone());
        Ok(WaterResponse {
            plant_id: id,
            new_stage,
            image,
        })
    }
}
