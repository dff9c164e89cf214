//! Namespace key builder.
//!
//! Every profile-owned collection lives under `profile_{id}/`. The same
//! functions are used to write keys and to enumerate them by prefix, so a
//! key produced here can always be found again with the matching prefix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Key of the device-wide quiz bookmark collection (not profile scoped).
pub const QUIZ_BOOKMARKS_KEY: &str = "quiz_bookmarks";

const SECTIONS_PREFIX: &str = "story_sections_";
const TTS_PREFIX: &str = "story_tts_";

/// A validated, strictly positive profile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ProfileId(i64);

impl ProfileId {
    pub fn new(raw: i64) -> Result<Self, CacheError> {
        if raw <= 0 {
            return Err(CacheError::InvalidNamespace(format!(
                "profile id must be positive, got {}",
                raw
            )));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ProfileId {
    type Error = CacheError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ProfileId> for i64 {
    fn from(id: ProfileId) -> Self {
        id.0
    }
}

impl FromStr for ProfileId {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CacheError::InvalidNamespace("profile id is missing".to_string()));
        }
        let raw: i64 = trimmed
            .parse()
            .map_err(|_| CacheError::InvalidNamespace(format!("profile id is not numeric: {}", s)))?;
        Self::new(raw)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collections stored under a profile namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Stories,
    Favorites,
    Progress,
    Settings,
    StorySections(i64),
    StoryTts(i64),
    StoriesLastUpdate,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Stories => write!(f, "stories"),
            Collection::Favorites => write!(f, "favorites"),
            Collection::Progress => write!(f, "progress"),
            Collection::Settings => write!(f, "settings"),
            Collection::StorySections(story_id) => write!(f, "{}{}", SECTIONS_PREFIX, story_id),
            Collection::StoryTts(story_id) => write!(f, "{}{}", TTS_PREFIX, story_id),
            Collection::StoriesLastUpdate => write!(f, "stories_last_update"),
        }
    }
}

/// Build `profile_{id}/{collection}[/{item}]`.
pub fn namespaced(profile: ProfileId, collection: Collection, item: Option<&str>) -> String {
    match item {
        Some(item) => format!("profile_{}/{}/{}", profile, collection, item),
        None => format!("profile_{}/{}", profile, collection),
    }
}

/// Shorthand for a collection key without an item segment.
pub fn collection_key(profile: ProfileId, collection: Collection) -> String {
    namespaced(profile, collection, None)
}

/// Prefix shared by every key of a profile. Ends in `/` so that
/// `profile_1/` never matches keys of `profile_12`.
pub fn profile_prefix(profile: ProfileId) -> String {
    format!("profile_{}/", profile)
}

/// Prefix shared by every section snapshot key of a profile.
pub fn sections_prefix(profile: ProfileId) -> String {
    format!("{}{}", profile_prefix(profile), SECTIONS_PREFIX)
}

/// Prefix shared by every TTS snapshot key of a profile.
pub fn tts_prefix(profile: ProfileId) -> String {
    format!("{}{}", profile_prefix(profile), TTS_PREFIX)
}
