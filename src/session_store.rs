//! Keyed storage for in-progress number-guess sessions.
//!
//! Sessions are reclaimable resources, not permanent records: an entry is
//! removed when its round resolves, when it is seen expired on access, or
//! by the timer-driven reaper. The reaper takes the same per-entry shard
//! locks as a guess, so a sweep never interleaves with an in-flight play.

use crate::errors::{CasinoResult, GameError};
use crate::games::number::NumberSession;
use dashmap::mapref::one::RefMut;
use dashmap::try_result::TryResult;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct SessionStore {
    sessions: DashMap<String, NumberSession>,
    idle_timeout: Duration,
    lock_retry_attempts: u32,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, lock_retry_attempts: u32) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
            lock_retry_attempts: lock_retry_attempts.max(1),
        }
    }

    /// Store a freshly created session, keyed by its opaque id.
    pub fn create(&self, session: NumberSession) -> String {
        let id = session.id.clone();
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Lock a live session entry for one guess. Expired or already-resolved
    /// entries answer as not-found and are reclaimed on the way out;
    /// contention is retried a bounded number of times.
    pub fn try_lock(&self, id: &str) -> CasinoResult<RefMut<'_, String, NumberSession>> {
        for _ in 0..self.lock_retry_attempts {
            match self.sessions.try_get_mut(id) {
                TryResult::Present(guard) => {
                    if guard.terminal || guard.expired(self.idle_timeout) {
                        drop(guard);
                        self.sessions.remove(id);
                        return Err(GameError::SessionNotFound(id.to_string()));
                    }
                    return Ok(guard);
                }
                TryResult::Absent => {
                    return Err(GameError::SessionNotFound(id.to_string()));
                }
                TryResult::Locked => std::thread::yield_now(),
            }
        }
        tracing::warn!(session_id = id, "session entry lock retries exhausted");
        Err(GameError::Contention)
    }

    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every expired or resolved entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        let timeout = self.idle_timeout;
        self.sessions
            .retain(|_, session| !session.terminal && !session.expired(timeout));
        before - self.sessions.len()
    }

    /// Background reaper bounding store growth when clients abandon rounds.
    pub fn spawn_reaper(self: Arc<Self>, sweep_interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            // The immediate first tick would sweep an empty store.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.sweep_expired();
                if removed > 0 {
                    tracing::info!(removed, remaining = self.len(), "expired sessions reclaimed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(timeout: Duration) -> SessionStore {
        SessionStore::new(timeout, 8)
    }

    #[test]
    fn test_create_and_lock() {
        let store = store(Duration::from_secs(600));
        let session = NumberSession::with_secret(1, 10.0, 42);
        let id = store.create(session);

        let guard = store.try_lock(&id).unwrap();
        assert_eq!(guard.player_id, 1);
        drop(guard);

        store.remove(&id);
        assert!(matches!(
            store.try_lock(&id),
            Err(GameError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_expired_session_not_found_on_access() {
        let store = store(Duration::ZERO);
        let id = store.create(NumberSession::with_secret(1, 10.0, 42));

        // Zero idle timeout: the entry is expired the moment it is read.
        assert!(matches!(
            store.try_lock(&id),
            Err(GameError::SessionNotFound(_))
        ));
        // And reclaimed on the way out.
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let store = store(Duration::from_secs(600));
        let live = store.create(NumberSession::with_secret(1, 10.0, 42));

        let mut stale = NumberSession::with_secret(2, 10.0, 7);
        stale.terminal = true;
        store.create(stale);

        assert_eq!(store.sweep_expired(), 1);
        assert!(store.contains(&live));
        assert_eq!(store.len(), 1);
    }
}
