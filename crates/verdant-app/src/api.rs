//! The snapshot loader seam.
//!
//! Controllers talk to the server through [`Api`] only; [`HttpApi`] is the
//! production implementation, the testkit carries a scripted one. There is
//! no automatic retry: a failed pull is logged at the controller boundary
//! and the previously rendered state stays up.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use verdant_core::{
    GardenState, GoalId, GroupId, GroupSummary, PlantId, Profile, ReflectionId, VerdantError,
};
use verdant_protocol::paths;
use verdant_protocol::snapshots::{
    ActivitySnapshot, CommentResponse, CreatedGoal, CreatedReflection, GoalDraft, GoalsSnapshot,
    GroupDetail, GroupDraft, GroupsSnapshot, ReflectionDraft, UserDirectory, WaterResponse,
};

/// Typed access to every REST endpoint the views pull from.
#[async_trait]
pub trait Api: Send + Sync {
    /// GET `/api/garden-state`.
    async fn garden_state(&self) -> Result<GardenState, VerdantError>;

    /// GET `/api/recent-activity`.
    async fn recent_activity(&self) -> Result<ActivitySnapshot, VerdantError>;

    /// GET `/api/goals`.
    async fn goals(&self) -> Result<GoalsSnapshot, VerdantError>;

    /// GET `/api/groups`.
    async fn groups(&self) -> Result<GroupsSnapshot, VerdantError>;

    /// GET `/api/groups/:id`.
    async fn group(&self, id: GroupId) -> Result<GroupDetail, VerdantError>;

    /// GET `/api/groups/:id/activity`.
    async fn group_activity(&self, id: GroupId) -> Result<ActivitySnapshot, VerdantError>;

    /// GET `/api/users`.
    async fn users(&self) -> Result<UserDirectory, VerdantError>;

    /// GET `/api/profile`.
    async fn profile(&self) -> Result<Profile, VerdantError>;

    /// PUT `/api/profile`.
    async fn update_profile(&self, profile: &Profile) -> Result<Profile, VerdantError>;

    /// POST `/api/reflections`.
    async fn create_reflection(
        &self,
        draft: &ReflectionDraft,
    ) -> Result<CreatedReflection, VerdantError>;

    /// POST `/api/reflections/:id/comments`.
    async fn add_comment(
        &self,
        id: ReflectionId,
        content: &str,
    ) -> Result<CommentResponse, VerdantError>;

    /// POST `/api/goals`.
    async fn create_goal(&self, draft: &GoalDraft) -> Result<CreatedGoal, VerdantError>;

    /// PUT `/api/goals/:id`.
    async fn update_goal(&self, id: GoalId, draft: &GoalDraft) -> Result<CreatedGoal, VerdantError>;

    /// POST `/api/goals/:id/complete`.
    async fn complete_goal(&self, id: GoalId) -> Result<CreatedGoal, VerdantError>;

    /// DELETE `/api/goals/:id`.
    async fn delete_goal(&self, id: GoalId) -> Result<(), VerdantError>;

    /// POST `/api/groups`.
    async fn create_group(&self, draft: &GroupDraft) -> Result<GroupSummary, VerdantError>;

    /// POST `/api/plants/:id/water`.
    async fn water_plant(&self, id: PlantId) -> Result<WaterResponse, VerdantError>;
}

#[derive(Serialize)]
struct CommentBody<'a> {
    content: &'a str,
}

/// [`Api`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    /// Client against a base URL such as `https://verdant.example`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, VerdantError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(to_network)?;
        decode(response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, VerdantError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(to_network)?;
        decode(response).await
    }

    async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, VerdantError> {
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(to_network)?;
        decode(response).await
    }
}

fn to_network(err: reqwest::Error) -> VerdantError {
    VerdantError::network(err.to_string())
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, VerdantError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VerdantError::http(status.as_u16(), body));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| VerdantError::serialization(err.to_string()))
}

async fn expect_success(response: reqwest::Response) -> Result<(), VerdantError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VerdantError::http(status.as_u16(), body));
    }
    Ok(())
}

#[async_trait]
impl Api for HttpApi {
    async fn garden_state(&self) -> Result<GardenState, VerdantError> {
        self.get(paths::GARDEN_STATE).await
    }

    async fn recent_activity(&self) -> Result<ActivitySnapshot, VerdantError> {
        self.get(paths::RECENT_ACTIVITY).await
    }

    async fn goals(&self) -> Result<GoalsSnapshot, VerdantError> {
        self.get(paths::GOALS).await
    }

    async fn groups(&self) -> Result<GroupsSnapshot, VerdantError> {
        self.get(paths::GROUPS).await
    }

    async fn group(&self, id: GroupId) -> Result<GroupDetail, VerdantError> {
        self.get(&paths::group(id)).await
    }

    async fn group_activity(&self, id: GroupId) -> Result<ActivitySnapshot, VerdantError> {
        self.get(&paths::group_activity(id)).await
    }

    async fn users(&self) -> Result<UserDirectory, VerdantError> {
        self.get(paths::USERS).await
    }

    async fn profile(&self) -> Result<Profile, VerdantError> {
        self.get(paths::PROFILE).await
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, VerdantError> {
        self.put(paths::PROFILE, profile).await
    }

    async fn create_reflection(
        &self,
        draft: &ReflectionDraft,
    ) -> Result<CreatedReflection, VerdantError> {
        self.post(paths::REFLECTIONS, draft).await
    }

    async fn add_comment(
        &self,
        id: ReflectionId,
        content: &str,
    ) -> Result<CommentResponse, VerdantError> {
        self.post(&paths::reflection_comments(id), &CommentBody { content })
            .await
    }

    async fn create_goal(&self, draft: &GoalDraft) -> Result<CreatedGoal, VerdantError> {
        self.post(paths::GOALS, draft).await
    }

    async fn update_goal(
        &self,
        id: GoalId,
        draft: &GoalDraft,
    ) -> Result<CreatedGoal, VerdantError> {
        self.put(&paths::goal(id), draft).await
    }

    async fn complete_goal(&self, id: GoalId) -> Result<CreatedGoal, VerdantError> {
        self.post(&paths::goal_complete(id), &serde_json::json!({}))
            .await
    }

    async fn delete_goal(&self, id: GoalId) -> Result<(), VerdantError> {
        let response = self
            .client
            .delete(self.url(&paths::goal(id)))
            .send()
            .await
            .map_err(to_network)?;
        expect_success(response).await
    }

    async fn create_group(&self, draft: &GroupDraft) -> Result<GroupSummary, VerdantError> {
        self.post(paths::GROUPS, draft).await
    }

    async fn water_plant(&self, id: PlantId) -> Result<WaterResponse, VerdantError> {
        self.post(&paths::water_plant(id), &serde_json::json!({}))
            .await
    }
}
