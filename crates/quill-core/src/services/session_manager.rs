// ============================================================================
// Quill Core - Session Manager
// File: crates/quill-core/src/services/session_manager.rs
// ============================================================================
//! Session manager
//!
//! Owns every token state transition. A token is issued on login, becomes
//! unusable on logout, eviction, forced revocation or expiry, and never comes
//! back. Validation consults the revocation list first, then the session
//! ledger, and only then verifies the signature.

use std::sync::Arc;

use quill_security::{PasswordService, TokenCodec};
use quill_shared::config::AppConfig;
use quill_shared::constants::DEFAULT_MAX_SESSIONS_PER_USER;
use quill_shared::utils::token_fingerprint;
use quill_shared::{Clock, Role};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    AuthenticatedUser, ClientInfo, RevocationReason, RevokedToken, Session, SessionRotation, User,
    UserInfo,
};
use crate::error::AuthError;
use crate::repositories::{RevocationRepository, SessionRepository, UserRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub max_sessions_per_user: usize,
}

impl SessionPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_sessions_per_user: config.session.max_per_user,
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            max_sessions_per_user: DEFAULT_MAX_SESSIONS_PER_USER,
        }
    }
}

/// Result of successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: UserInfo,
}

/// Rows removed by one [`SessionManager::sweep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions: u64,
    pub revoked_tokens: u64,
}

pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    revocations: Arc<dyn RevocationRepository>,
    codec: Arc<TokenCodec>,
    passwords: Arc<PasswordService>,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        revocations: Arc<dyn RevocationRepository>,
        codec: Arc<TokenCodec>,
        passwords: Arc<PasswordService>,
        clock: Arc<dyn Clock>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            users,
            sessions,
            revocations,
            codec,
            passwords,
            clock,
            policy,
        }
    }

    /// Register a new user
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<UserInfo, AuthError> {
        info!("Registration attempt for username: {}", username);

        if self.users.exists(username).await? {
            warn!("Registration failed: username already exists: {}", username);
            return Err(AuthError::UserExists(username.to_string()));
        }

        let passwords = Arc::clone(&self.passwords);
        let plain = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || passwords.hash(&plain))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task failed: {}", e)))??;

        let user = User::new(username.to_string(), password_hash, role, self.clock.now());
        let created = self.users.create(&user).await?;

        info!(user_id = %created.id, role = %created.role, "Registration successful for: {}", username);
        Ok(UserInfo::from(&created))
    }

    /// Login with username and password
    ///
    /// Evicts the oldest live sessions when the new one would exceed the cap.
    /// Evictions and the new session are committed in one rotation.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<LoginResult, AuthError> {
        info!("Login attempt for username: {}", username);

        let Some(user) = self.users.find_by_username(username).await? else {
            self.burn_dummy_verification(password).await;
            warn!("Login failed: username not found: {}", username);
            return Err(AuthError::UserNotFound);
        };

        if !self.check_password(password, &user.password_hash).await? {
            warn!(user_id = %user.id, "Login failed: invalid password for: {}", username);
            return Err(AuthError::InvalidPassword);
        }

        let now = self.clock.now();
        let mut live = self.sessions.find_active_by_user(user.id, now).await?;
        live.sort_by_key(Session::issue_order);

        let overflow = (live.len() + 1).saturating_sub(self.policy.max_sessions_per_user);
        let evicted: Vec<RevokedToken> = live
            .iter()
            .take(overflow)
            .map(|s| {
                debug!(
                    user_id = %user.id,
                    session_id = %s.id,
                    token = %token_fingerprint(&s.token),
                    "Evicting oldest session"
                );
                RevokedToken {
                    token: s.token.clone(),
                    user_id: user.id,
                    expires_at: s.expires_at,
                    reason: RevocationReason::NewLogin,
                    revoked_at: now,
                }
            })
            .collect();

        let issued = self.codec.issue(user.id, &user.username, user.role)?;
        let expires_at = issued.claims.expires_at();
        let session = Session::new(user.id, issued.token.clone(), now, expires_at, client);

        let evicted_count = evicted.len();
        let rotation = SessionRotation {
            evicted,
            issued: Some(session),
        };
        self.sessions.apply_rotation(&rotation).await?;

        info!(
            user_id = %user.id,
            token = %token_fingerprint(&issued.token),
            evicted = evicted_count,
            "Login successful for: {}",
            username
        );

        Ok(LoginResult {
            token: issued.token,
            expires_at,
            user: UserInfo::from(&user),
        })
    }

    /// Revoke a token. Calling it again for the same token is harmless.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(AuthError::TokenMissing);
        }

        let now = self.clock.now();
        let session = self.sessions.find_by_token(token).await?;
        let user_id = match &session {
            Some(s) => s.user_id,
            None => match self.codec.inspect(token) {
                Ok(claims) => claims.sub,
                Err(e) => {
                    warn!(token = %token_fingerprint(token), "Logout rejected: {}", e);
                    return Err(AuthError::TokenInvalid);
                }
            },
        };

        let revoked = RevokedToken {
            token: token.to_string(),
            user_id,
            expires_at: now + self.codec.ttl(),
            reason: RevocationReason::Logout,
            revoked_at: now,
        };
        self.revocations.insert(&revoked).await?;

        if session.as_ref().is_some_and(|s| s.is_active) {
            if let Err(e) = self.sessions.deactivate(token).await {
                warn!(token = %token_fingerprint(token), "Failed to deactivate session after logout: {}", e);
            }
        }

        info!(user_id = %user_id, token = %token_fingerprint(token), "Logout successful");
        Ok(())
    }

    /// Resolve a bearer token to the identity it was issued for.
    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::TokenMissing);
        }

        let now = self.clock.now();
        let fingerprint = token_fingerprint(token);

        if self.revocations.is_revoked(token, now).await? {
            warn!(token = %fingerprint, "Rejected revoked token");
            return Err(AuthError::TokenBlacklisted);
        }

        let session = match self.sessions.find_by_token(token).await? {
            Some(session) if session.is_active => session,
            _ => {
                warn!(token = %fingerprint, "Rejected token with no active session");
                return Err(AuthError::TokenInvalid);
            }
        };
        if session.is_expired_at(now) {
            warn!(token = %fingerprint, "Rejected expired session");
            return Err(AuthError::TokenExpired);
        }

        let claims = self.codec.verify(token).map_err(|e| {
            warn!(token = %fingerprint, "Token verification failed: {}", e);
            AuthError::from(e)
        })?;
        if claims.sub != session.user_id {
            warn!(token = %fingerprint, "Token subject does not match session owner");
            return Err(AuthError::TokenInvalid);
        }

        if let Err(e) = self.sessions.touch(token, now).await {
            warn!(token = %fingerprint, "Failed to update last activity: {}", e);
        }

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }

    /// Force-logout every live session of a user. Returns how many were revoked.
    pub async fn revoke_user_sessions(&self, user_id: Uuid) -> Result<usize, AuthError> {
        if self.users.find_by_id(user_id).await?.is_none() {
            warn!(user_id = %user_id, "Session revocation for unknown user");
            return Err(AuthError::UserNotFound);
        }

        let now = self.clock.now();
        let live = self.sessions.find_active_by_user(user_id, now).await?;
        if live.is_empty() {
            return Ok(0);
        }

        let rotation = SessionRotation {
            evicted: live
                .into_iter()
                .map(|s| RevokedToken {
                    token: s.token,
                    user_id,
                    expires_at: s.expires_at,
                    reason: RevocationReason::Forced,
                    revoked_at: now,
                })
                .collect(),
            issued: None,
        };
        self.sessions.apply_rotation(&rotation).await?;

        let count = rotation.evicted.len();
        info!(user_id = %user_id, count, "Revoked all sessions for user");
        Ok(count)
    }

    /// Live sessions of a user, oldest first.
    pub async fn active_sessions(&self, user_id: Uuid) -> Result<Vec<Session>, AuthError> {
        let mut live = self
            .sessions
            .find_active_by_user(user_id, self.clock.now())
            .await?;
        live.sort_by_key(Session::issue_order);
        Ok(live)
    }

    pub async fn find_user(&self, username: &str) -> Result<UserInfo, AuthError> {
        self.users
            .find_by_username(username)
            .await?
            .map(|user| UserInfo::from(&user))
            .ok_or(AuthError::UserNotFound)
    }

    /// Delete ledger and revocation rows whose expiry has passed.
    pub async fn sweep(&self) -> Result<SweepReport, AuthError> {
        let now = self.clock.now();
        let report = SweepReport {
            sessions: self.sessions.purge_expired(now).await?,
            revoked_tokens: self.revocations.purge_expired(now).await?,
        };
        if report.sessions > 0 || report.revoked_tokens > 0 {
            info!(
                sessions = report.sessions,
                revoked_tokens = report.revoked_tokens,
                "Swept expired rows"
            );
        }
        Ok(report)
    }

    async fn check_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let passwords = Arc::clone(&self.passwords);
        let plain = password.to_owned();
        let stored = hash.to_owned();
        let valid = tokio::task::spawn_blocking(move || passwords.verify(&plain, &stored))
            .await
            .map_err(|e| AuthError::Internal(format!("password verification task failed: {}", e)))??;
        Ok(valid)
    }

    async fn burn_dummy_verification(&self, password: &str) {
        let passwords = Arc::clone(&self.passwords);
        let plain = password.to_owned();
        let _ = tokio::task::spawn_blocking(move || passwords.verify_dummy(&plain)).await;
    }
}
