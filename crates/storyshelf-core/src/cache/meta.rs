use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::error::CacheResult;
use crate::keys::{self, Collection, ProfileId};
use crate::store::RecordStore;

/// A cached story collection is trusted for 5 minutes after the last
/// successful save. Story lists change often while a child is creating
/// stories, so the window is short.
pub const CACHE_TTL_MINUTES: i64 = 5;

const CACHE_TTL_MILLIS: i64 = CACHE_TTL_MINUTES * 60 * 1000;

/// Freshness rule: fresh iff `0 <= now - last_update < TTL`.
///
/// A timestamp ahead of the clock (clock moved backwards) or one too far
/// from `now` to subtract counts as stale.
pub fn is_fresh(last_update_millis: i64, now_millis: i64) -> bool {
    now_millis
        .checked_sub(last_update_millis)
        .map_or(false, |age| (0..CACHE_TTL_MILLIS).contains(&age))
}

/// Per-profile last-update timestamp for the story collection.
///
/// Stored as epoch milliseconds (a plain decimal string) under
/// `profile_{id}/stories_last_update`.
#[derive(Clone)]
pub struct CacheMeta {
    store: Arc<dyn RecordStore>,
}

impl CacheMeta {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn key(profile: ProfileId) -> String {
        keys::collection_key(profile, Collection::StoriesLastUpdate)
    }

    /// Record that the story collection was refreshed just now.
    pub async fn mark_updated(&self, profile: ProfileId) -> CacheResult<()> {
        let now = Utc::now().timestamp_millis();
        self.store.set(&Self::key(profile), now.to_string()).await?;
        debug!(profile = %profile, "Story cache marked updated");
        Ok(())
    }

    /// Forget the last-update timestamp so the next read is treated as stale.
    pub async fn invalidate(&self, profile: ProfileId) -> CacheResult<()> {
        self.store.remove(&Self::key(profile)).await?;
        debug!(profile = %profile, "Story cache invalidated");
        Ok(())
    }

    /// Last-update time in epoch millis. Unreadable or malformed values count
    /// as absent.
    pub async fn last_update_millis(&self, profile: ProfileId) -> Option<i64> {
        match self.store.get(&Self::key(profile)).await {
            Ok(Some(raw)) => match raw.trim().parse::<i64>() {
                Ok(millis) => Some(millis),
                Err(e) => {
                    warn!(profile = %profile, value = %raw, error = %e, "Malformed cache timestamp");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(profile = %profile, error = %e, "Failed to read cache timestamp");
                None
            }
        }
    }

    pub async fn last_updated(&self, profile: ProfileId) -> Option<DateTime<Utc>> {
        let millis = self.last_update_millis(profile).await?;
        Utc.timestamp_millis_opt(millis).single()
    }

    /// Whether the cached story collection may be used without a refresh.
    pub async fn is_valid(&self, profile: ProfileId) -> bool {
        match self.last_update_millis(profile).await {
            Some(last) => is_fresh(last, Utc::now().timestamp_millis()),
            None => false,
        }
    }

    pub async fn status(&self, profile: ProfileId) -> CacheStatus {
        let last_updated = self.last_updated(profile).await;
        let fresh = last_updated
            .map(|t| is_fresh(t.timestamp_millis(), Utc::now().timestamp_millis()))
            .unwrap_or(false);
        CacheStatus { last_updated, fresh }
    }
}

/// Snapshot of a profile's story cache freshness, for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStatus {
    pub last_updated: Option<DateTime<Utc>>,
    pub fresh: bool,
}

impl CacheStatus {
    pub fn age_minutes(&self) -> Option<i64> {
        self.last_updated.map(|t| (Utc::now() - t).num_minutes())
    }

    pub fn age_display(&self) -> String {
        let minutes = match self.age_minutes() {
            Some(m) => m,
            None => return "never".to_string(),
        };
        if minutes < 1 {
            // Includes clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}
