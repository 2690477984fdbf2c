//! TTL-scoped session store.
//!
//! One session per redaction call, holding the placeholder → original map
//! that makes un-redaction possible. Sessions are pruned lazily at the start
//! of each redaction and whenever mappings are requested; no background
//! thread is involved. The store is the only shared mutable resource in the
//! engine, so everything lives behind one `RwLock`.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Session {
    created_at: DateTime<Utc>,
    mappings: HashMap<String, String>,
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Mint a fresh session with an empty mapping.
    pub async fn create(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id.clone(),
            Session {
                created_at: Utc::now(),
                mappings: HashMap::new(),
            },
        );
        tracing::debug!(%session_id, "created redaction session");
        session_id
    }

    /// Record one placeholder → original pair. Idempotent; last write wins
    /// per placeholder. Unknown session ids are ignored (the caller just
    /// created the session, so this only happens after expiry races).
    pub async fn add(&self, session_id: &str, placeholder: &str, original: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(session_id) {
            session
                .mappings
                .insert(placeholder.to_string(), original.to_string());
        } else {
            tracing::warn!(%session_id, "add on unknown or expired session dropped");
        }
    }

    /// Shallow copy of a session's mappings; `None` for unknown or expired
    /// ids.
    pub async fn get(&self, session_id: &str) -> Option<HashMap<String, String>> {
        self.prune_expired(Utc::now()).await;
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|s| s.mappings.clone())
    }

    /// Drop sessions older than the TTL.
    pub async fn prune_expired(&self, now: DateTime<Utc>) {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now - s.created_at <= self.ttl);
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "pruned expired redaction sessions");
        }
    }

    #[cfg(test)]
    async fn backdate(&self, session_id: &str, by_secs: i64) {
        let mut sessions = self.sessions.write().await;
        if let Some(s) = sessions.get_mut(session_id) {
            s.created_at = s.created_at - Duration::seconds(by_secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_returns_distinct_ids() {
        let store = SessionStore::new(3600);
        let a = store.create().await;
        let b = store.create().await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let store = SessionStore::new(3600);
        let id = store.create().await;
        store.add(&id, "[PERSON_1]", "John Smith").await;
        store.add(&id, "[PERSON_1]", "Jane Doe").await; // last write wins

        let mappings = store.get(&id).await.unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings["[PERSON_1]"], "Jane Doe");
    }

    #[tokio::test]
    async fn unknown_session_is_absent_not_error() {
        let store = SessionStore::new(3600);
        assert!(store.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn expired_session_is_absent() {
        let store = SessionStore::new(10);
        let id = store.create().await;
        store.add(&id, "[URL_1]", "https://example.com").await;
        store.backdate(&id, 60).await;

        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn prune_keeps_fresh_sessions() {
        let store = SessionStore::new(10);
        let stale = store.create().await;
        let fresh = store.create().await;
        store.backdate(&stale, 60).await;

        store.prune_expired(Utc::now()).await;
        assert!(store.get(&stale).await.is_none());
        assert!(store.get(&fresh).await.is_some());
    }
}
