use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Generated audio for one section in one voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TtsAudio {
    /// Local file the audio was downloaded to, if any.
    #[serde(default)]
    pub audio_path: Option<String>,
    /// Remote URL the audio can be fetched from.
    #[serde(default)]
    pub tts_url: Option<String>,
}

/// All generated audio for a story: `voiceId -> sectionId -> audio`.
///
/// Persisted as a whole. Saving a snapshot replaces whatever was stored
/// before; nothing is merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct TtsSnapshot(pub BTreeMap<String, BTreeMap<String, TtsAudio>>);

impl TtsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|sections| sections.is_empty())
    }

    pub fn voices(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|v| v.as_str())
    }

    pub fn audio(&self, voice_id: &str, section_id: &str) -> Option<&TtsAudio> {
        self.0.get(voice_id).and_then(|sections| sections.get(section_id))
    }

    pub fn insert(&mut self, voice_id: impl Into<String>, section_id: impl Into<String>, audio: TtsAudio) {
        self.0
            .entry(voice_id.into())
            .or_default()
            .insert(section_id.into(), audio);
    }
}
