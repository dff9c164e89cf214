use serde::{Deserialize, Serialize};

/// One ordered, bilingual paragraph of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct StorySection {
    pub section_id: i64,
    pub story_id: i64,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub paragraph: String,
    #[serde(default)]
    pub paragraph_kr: String,
}
