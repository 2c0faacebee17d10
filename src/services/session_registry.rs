use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    services::search_session::SearchSession,
};

struct Entry {
    session: Arc<SearchSession>,
    last_access: DateTime<Utc>,
}

impl Entry {
    fn is_idle(&self, now: DateTime<Utc>, idle_ttl: Duration) -> bool {
        // A clock step backwards yields a negative delta, which never expires
        (now - self.last_access)
            .to_std()
            .map_or(false, |idle| idle >= idle_ttl)
    }
}

/// Open search sessions addressable by id.
///
/// Sessions untouched for longer than the idle TTL are dropped, so clients
/// that never close their sessions cannot exhaust the capacity.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            idle_ttl,
        }
    }

    /// Fails with `CapacityExceeded` when no slot is free even after evicting
    /// idle sessions. Lets callers bail out before doing upstream work.
    pub async fn ensure_capacity(&self) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        self.evict_idle_locked(&mut sessions, Utc::now());
        self.check_capacity(&sessions)
    }

    /// Registers a session under a fresh id
    pub async fn insert(&self, session: Arc<SearchSession>) -> AppResult<Uuid> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        self.evict_idle_locked(&mut sessions, now);
        self.check_capacity(&sessions)?;

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            Entry {
                session,
                last_access: now,
            },
        );
        tracing::debug!(session_id = %id, open_sessions = sessions.len(), "Session registered");

        Ok(id)
    }

    /// Looks a session up and marks it as used
    pub async fn get(&self, id: &Uuid) -> AppResult<Arc<SearchSession>> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(id) {
            Some(entry) if !entry.is_idle(now, self.idle_ttl) => {
                entry.last_access = now;
                Ok(entry.session.clone())
            }
            Some(_) => {
                sessions.remove(id);
                tracing::debug!(session_id = %id, "Expired session looked up");
                Err(AppError::NotFound(format!("search session {}", id)))
            }
            None => Err(AppError::NotFound(format!("search session {}", id))),
        }
    }

    /// Drops the registry's handle; returns whether the id was known
    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drops every session idle for longer than the TTL, returning how many went
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_idle_locked(&mut sessions, Utc::now())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn evict_idle_locked(&self, sessions: &mut HashMap<Uuid, Entry>, now: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_idle(now, self.idle_ttl));

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(
                evicted,
                open_sessions = sessions.len(),
                idle_ttl_secs = self.idle_ttl.as_secs(),
                "Evicted idle search sessions"
            );
        }
        evicted
    }

    fn check_capacity(&self, sessions: &HashMap<Uuid, Entry>) -> AppResult<()> {
        if sessions.len() >= self.max_sessions {
            tracing::warn!(max_sessions = self.max_sessions, "Session registry is full");
            return Err(AppError::CapacityExceeded(self.max_sessions));
        }
        Ok(())
    }
}
