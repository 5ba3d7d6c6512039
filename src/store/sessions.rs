//! Login session store
//!
//! Bearer tokens mapped to authenticated accounts with TTL expiry.
//! Expired entries are dropped on read and by the periodic cleanup task.
//! Sessions are in-memory only: a restart logs everyone out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::types::Role;

/// Default session lifetime: 8 hours
const DEFAULT_TTL_SECS: u64 = 28_800;

/// One authenticated login
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: u64,
    pub role: Role,
    pub issued_at: Instant,
    pub ttl: Duration,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.issued_at.elapsed() > self.ttl
    }

    pub fn remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.issued_at.elapsed())
    }
}

/// Token -> session map
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
    issued: AtomicU64,
    rejected: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            issued: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Issue a fresh bearer token for an authenticated account
    pub fn issue(&self, user_id: u64, role: Role) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id,
                role,
                issued_at: Instant::now(),
                ttl: self.ttl,
            },
        );
        self.issued.fetch_add(1, Ordering::Relaxed);
        info!("🔑 Session issued for user {} ({})", user_id, role.as_str());
        token
    }

    /// Look up a token, dropping it when past its TTL
    pub fn get(&self, token: &str) -> Option<Session> {
        if let Some(entry) = self.sessions.get(token) {
            if entry.is_expired() {
                drop(entry);
                self.sessions.remove(token);
                self.rejected.fetch_add(1, Ordering::Relaxed);
                debug!("Session expired");
                None
            } else {
                Some(entry.clone())
            }
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every session belonging to a user (deactivation, deletion)
    pub fn revoke_user(&self, user_id: u64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.user_id != user_id);
        before - self.sessions.len()
    }

    /// Drop all expired sessions, returning how many went away
    pub fn cleanup_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired());
        let removed = before - self.sessions.len();
        if removed > 0 {
            info!("🧹 Session cleanup: {} expired entries removed", removed);
        }
        removed
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_get() {
        let sessions = SessionStore::new();
        let token = sessions.issue(1, Role::Manager);
        let session = sessions.get(&token).unwrap();
        assert_eq!(session.user_id, 1);
        assert_eq!(session.role, Role::Manager);
    }

    #[test]
    fn test_unknown_token() {
        let sessions = SessionStore::new();
        assert!(sessions.get("nope").is_none());
    }

    #[test]
    fn test_expired_token_dropped() {
        let sessions = SessionStore::with_ttl(Duration::ZERO);
        let token = sessions.issue(1, Role::Receptionist);
        std::thread::sleep(Duration::from_millis(5));
        assert!(sessions.get(&token).is_none());
        assert_eq!(sessions.active_count(), 0);
    }

    #[test]
    fn test_revoke_user_drops_all_their_sessions() {
        let sessions = SessionStore::new();
        sessions.issue(1, Role::Manager);
        sessions.issue(1, Role::Manager);
        sessions.issue(2, Role::Instructor);
        assert_eq!(sessions.revoke_user(1), 2);
        assert_eq!(sessions.active_count(), 1);
    }

    #[test]
    fn test_cleanup_expired() {
        let sessions = SessionStore::with_ttl(Duration::ZERO);
        sessions.issue(1, Role::Manager);
        sessions.issue(2, Role::Manager);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(sessions.cleanup_expired(), 2);
    }
}
