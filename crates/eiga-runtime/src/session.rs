//! Short-lived review sessions awaiting a human decision.
//!
//! When a candidate lands in the review band, the runtime stores an
//! explicit session record here instead of smuggling state through
//! callback payloads. Sessions expire after a TTL and do not survive a
//! restart.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// A candidate waiting on a Confirm / Rename / Ignore decision.
#[derive(Debug, Clone)]
pub struct PendingReview {
    pub title: String,
    pub year: String,
    pub file_ref: String,
    pub chat_id: i64,
    pub awaiting_title: bool,
    created_at: DateTime<Utc>,
}

impl PendingReview {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at >= ttl
    }
}

/// In-process store of review sessions, keyed by the originating file
/// reference. Expired entries answer as absent and are purged on access.
pub struct ReviewSessions {
    ttl: Duration,
    inner: RwLock<HashMap<String, PendingReview>>,
}

impl ReviewSessions {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(900)),
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Store a new session, sweeping out any expired ones.
    pub async fn insert(
        &self,
        key: String,
        title: String,
        year: String,
        file_ref: String,
        chat_id: i64,
    ) {
        let mut map = self.inner.write().await;
        let now = Utc::now();
        map.retain(|_, p| !p.is_expired(now, self.ttl));
        map.insert(
            key,
            PendingReview {
                title,
                year,
                file_ref,
                chat_id,
                awaiting_title: false,
                created_at: now,
            },
        );
    }

    /// Remove and return the session, unless it has expired.
    pub async fn claim(&self, key: &str) -> Option<PendingReview> {
        let mut map = self.inner.write().await;
        let now = Utc::now();
        match map.remove(key) {
            Some(p) if !p.is_expired(now, self.ttl) => Some(p),
            _ => None,
        }
    }

    /// Flip a live session into awaiting-title state.
    pub async fn begin_rename(&self, key: &str) -> bool {
        let mut map = self.inner.write().await;
        let now = Utc::now();
        if matches!(map.get(key), Some(p) if p.is_expired(now, self.ttl)) {
            map.remove(key);
            return false;
        }
        match map.get_mut(key) {
            Some(p) => {
                p.awaiting_title = true;
                true
            }
            None => false,
        }
    }

    /// Remove and return a session that is awaiting a title.
    pub async fn claim_rename(&self, key: &str) -> Option<PendingReview> {
        let mut map = self.inner.write().await;
        let now = Utc::now();
        if matches!(map.get(key), Some(p) if p.is_expired(now, self.ttl)) {
            map.remove(key);
            return None;
        }
        if matches!(map.get(key), Some(p) if p.awaiting_title) {
            map.remove(key)
        } else {
            None
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
