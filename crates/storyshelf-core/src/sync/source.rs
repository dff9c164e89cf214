use async_trait::async_trait;

use crate::api::ApiError;
use crate::keys::ProfileId;
use crate::models::RemoteStory;

/// Authoritative source of a profile's stories.
#[async_trait]
pub trait StorySource: Send + Sync {
    async fn fetch_user_stories(&self, profile: ProfileId) -> Result<Vec<RemoteStory>, ApiError>;
}
