//! Data models for cached StoryShelf records.
//!
//! - `Story`, `RemoteStory`: a profile's stories and the remote payload shape
//! - `StorySection`: ordered bilingual paragraphs of a story
//! - `TtsSnapshot`, `TtsAudio`: generated audio per voice and section
//! - `FavoriteWord`, `NewFavoriteWord`: favorited vocabulary
//! - `QuizBookmark`: bookmarked quiz questions

pub mod favorite;
pub mod quiz;
pub mod section;
pub mod story;
pub mod tts;

pub use favorite::{FavoriteWord, NewFavoriteWord};
pub use quiz::QuizBookmark;
pub use section::StorySection;
pub use story::{RemoteStory, Story};
pub use tts::{TtsAudio, TtsSnapshot};
