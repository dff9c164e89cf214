use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vocabulary word the user favorited while reading a story.
///
/// Identity is the literal `word` string; no case folding happens here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct FavoriteWord {
    pub word: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub example_eng: String,
    #[serde(default)]
    pub example_kor: String,
    /// Story the word was last favorited from. `None` for legacy entries.
    #[serde(default)]
    pub story_id: Option<i64>,
    pub favorited_at: DateTime<Utc>,
}

/// Input for favoriting a word; the timestamp is assigned on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct NewFavoriteWord {
    pub word: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub example_eng: String,
    #[serde(default)]
    pub example_kor: String,
    #[serde(default)]
    pub story_id: Option<i64>,
}

impl NewFavoriteWord {
    pub fn into_favorite(self, favorited_at: DateTime<Utc>) -> FavoriteWord {
        FavoriteWord {
            word: self.word,
            meaning: self.meaning,
            example_eng: self.example_eng,
            example_kor: self.example_kor,
            story_id: self.story_id,
            favorited_at,
        }
    }
}
