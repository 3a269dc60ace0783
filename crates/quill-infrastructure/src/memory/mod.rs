//! In-memory store
//!
//! Implements all three repository ports over one lock-protected state, so a
//! rotation is applied under a single write guard and is atomic the same way
//! the PostgreSQL transaction is. Suitable for development and tests; nothing
//! survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{RevokedToken, Session, SessionRotation, User};
use quill_core::error::AuthError;
use quill_core::repositories::{RevocationRepository, SessionRepository, UserRepository};

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    /// username -> user id
    usernames: HashMap<String, Uuid>,
    /// token -> session
    sessions: HashMap<String, Session>,
    /// token -> revocation
    revoked: HashMap<String, RevokedToken>,
    next_seq: i64,
}

impl State {
    fn insert_session(&mut self, session: &Session) {
        self.next_seq += 1;
        let mut session = session.clone();
        session.seq = self.next_seq;
        self.sessions.insert(session.token.clone(), session);
    }

    fn upsert_revoked(&mut self, revoked: &RevokedToken) {
        self.revoked
            .entry(revoked.token.clone())
            .and_modify(|existing| {
                if revoked.expires_at > existing.expires_at {
                    existing.expires_at = revoked.expires_at;
                }
            })
            .or_insert_with(|| revoked.clone());
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of session rows, live or not.
    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    pub async fn revoked_count(&self) -> usize {
        self.state.read().await.revoked.len()
    }

    pub async fn revocation(&self, token: &str) -> Option<RevokedToken> {
        self.state.read().await.revoked.get(token).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let state = self.state.read().await;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn exists(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.state.read().await.usernames.contains_key(username))
    }

    async fn create(&self, user: &User) -> Result<User, AuthError> {
        let mut state = self.state.write().await;
        if state.usernames.contains_key(&user.username) {
            return Err(AuthError::UserExists(user.username.clone()));
        }
        state.usernames.insert(user.username.clone(), user.id);
        state.users.insert(user.id, user.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn create(&self, session: &Session) -> Result<(), AuthError> {
        let mut state = self.state.write().await;
        if state.sessions.contains_key(&session.token) {
            return Err(AuthError::Database("duplicate session token".to_string()));
        }
        state.insert_session(session);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, AuthError> {
        Ok(self.state.read().await.sessions.get(token).cloned())
    }

    async fn find_active_by_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Session>, AuthError> {
        let state = self.state.read().await;
        let mut live: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| s.user_id == user_id && s.is_live_at(now))
            .cloned()
            .collect();
        live.sort_by_key(Session::issue_order);
        Ok(live)
    }

    async fn deactivate(&self, token: &str) -> Result<(), AuthError> {
        if let Some(session) = self.state.write().await.sessions.get_mut(token) {
            session.is_active = false;
        }
        Ok(())
    }

    async fn touch(&self, token: &str, at: DateTime<Utc>) -> Result<(), AuthError> {
        if let Some(session) = self.state.write().await.sessions.get_mut(token) {
            if session.is_active {
                session.last_activity = at;
            }
        }
        Ok(())
    }

    async fn apply_rotation(&self, rotation: &SessionRotation) -> Result<(), AuthError> {
        let mut state = self.state.write().await;

        // Reject before mutating anything.
        if let Some(issued) = &rotation.issued {
            if state.sessions.contains_key(&issued.token) {
                return Err(AuthError::Database("duplicate session token".to_string()));
            }
        }

        for revoked in &rotation.evicted {
            if let Some(session) = state.sessions.get_mut(&revoked.token) {
                session.is_active = false;
            }
            state.upsert_revoked(revoked);
        }
        if let Some(issued) = &rotation.issued {
            state.insert_session(issued);
        }
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl RevocationRepository for InMemoryStore {
    async fn insert(&self, revoked: &RevokedToken) -> Result<(), AuthError> {
        self.state.write().await.upsert_revoked(revoked);
        Ok(())
    }

    async fn is_revoked(&self, token: &str, now: DateTime<Utc>) -> Result<bool, AuthError> {
        Ok(self
            .state
            .read()
            .await
            .revoked
            .get(token)
            .is_some_and(|r| r.is_in_force_at(now)))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut state = self.state.write().await;
        let before = state.revoked.len();
        state.revoked.retain(|_, r| r.is_in_force_at(now));
        Ok((before - state.revoked.len()) as u64)
    }
}
