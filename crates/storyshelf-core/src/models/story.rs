use serde::{Deserialize, Serialize};

use crate::keys::ProfileId;

/// A story as persisted under `profile_{id}/stories`.
///
/// `is_bookmarked` and `is_liked` are owned by the device; the remote
/// service never supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub story_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_kr: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub child_id: i64,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub is_liked: bool,
}

impl Story {
    /// Whether this record belongs to `profile`. A mismatch is tolerated
    /// but worth logging.
    pub fn belongs_to(&self, profile: ProfileId) -> bool {
        self.child_id == profile.get()
    }
}

/// Story payload as returned by the remote service.
///
/// Carries no owner and no preference flags; those are filled in locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct RemoteStory {
    pub story_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_kr: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RemoteStory {
    /// Convert into a locally-owned story with both preference flags off.
    pub fn into_story(self, profile: ProfileId) -> Story {
        Story {
            story_id: self.story_id,
            title: self.title,
            content: self.content,
            content_kr: self.content_kr,
            keywords: self.keywords,
            created_at: self.created_at,
            updated_at: self.updated_at,
            child_id: profile.get(),
            is_bookmarked: false,
            is_liked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_story() {
        let json = r#"{"storyId": 7, "title": "The Brave Fox", "content": "Once upon a time", "contentKr": "옛날 옛적에", "keywords": ["fox", "brave"], "createdAt": "2024-05-01T10:00:00Z", "updatedAt": "2024-05-02T10:00:00Z"}"#;

        let remote: RemoteStory = serde_json::from_str(json).expect("Failed to parse remote story");
        assert_eq!(remote.story_id, 7);
        assert_eq!(remote.keywords, vec!["fox", "brave"]);

        let story = remote.into_story(ProfileId::new(42).unwrap());
        assert_eq!(story.child_id, 42);
        assert!(!story.is_bookmarked);
        assert!(!story.is_liked);
        assert_eq!(story.content_kr, "옛날 옛적에");
    }

    #[test]
    fn test_story_serializes_camel_case() {
        let story = Story {
            story_id: 1,
            title: "t".to_string(),
            content: String::new(),
            content_kr: String::new(),
            keywords: vec![],
            created_at: None,
            updated_at: None,
            child_id: 3,
            is_bookmarked: true,
            is_liked: false,
        };
        let value = serde_json::to_value(&story).unwrap();
        assert_eq!(value["storyId"], 1);
        assert_eq!(value["childId"], 3);
        assert_eq!(value["isBookmarked"], true);
        assert_eq!(value["contentKr"], "");
    }

    #[test]
    fn test_story_missing_flags_default_false() {
        let story: Story = serde_json::from_str(r#"{"storyId": 1, "childId": 2}"#).unwrap();
        assert!(!story.is_bookmarked);
        assert!(!story.is_liked);
        assert!(story.belongs_to(ProfileId::new(2).unwrap()));
        assert!(!story.belongs_to(ProfileId::new(3).unwrap()));
    }
}
