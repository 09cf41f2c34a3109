use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::{hash_password, verify_password, AuthError, Claims, JwtKeys};
use crate::config::SecurityConfig;
use crate::database::models::user::normalize_email;
use crate::database::models::{Role, User, UserInfo, ValidationError};
use crate::database::{DatabaseError, Store};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by register and login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Accounts, session tokens and logout revocation
pub struct AuthService {
    store: Arc<dyn Store>,
    keys: JwtKeys,
    security: SecurityConfig,
    /// Revoked token ids mapped to their expiry, pruned on each logout
    revoked: RwLock<HashMap<Uuid, i64>>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Result<Self, AuthError> {
        let keys = JwtKeys::from_config(&security)?;
        Ok(Self {
            store,
            keys,
            security,
            revoked: RwLock::new(HashMap::new()),
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<SessionInfo, ServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("name", "Name is required").into());
        }
        let email = normalize_email(&request.email);
        validate_email_format(&email)?;
        if request.password.chars().count() < self.security.min_password_length {
            return Err(ValidationError::new(
                "password",
                format!(
                    "Password must be at least {} characters",
                    self.security.min_password_length
                ),
            )
            .into());
        }

        let role = if self.security.is_admin_email(&email) {
            Role::Admin
        } else {
            Role::User
        };
        let user = User {
            id: Uuid::new_v4(),
            email: email.clone(),
            name: name.to_string(),
            role,
            password_hash: hash_password(&request.password)?,
            created_at: Utc::now(),
        };

        let user = self.store.insert_user(user).await.map_err(|e| match e {
            DatabaseError::Conflict(_) => ServiceError::EmailTaken(email.clone()),
            other => other.into(),
        })?;
        info!(user = %user.id, role = %user.role, "Registered account {}", user.email);
        self.session_for(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<SessionInfo, ServiceError> {
        let email = normalize_email(&request.email);
        let Some(user) = self.store.find_user_by_email(&email).await? else {
            warn!("Login attempt for unknown account {}", email);
            return Err(AuthError::InvalidCredentials.into());
        };
        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        info!(user = %user.id, "Session issued");
        self.session_for(&user)
    }

    /// Verify a bearer token and reject it if its session was logged out
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.keys.decode(token)?;
        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AuthError::Revoked);
        }
        Ok(claims)
    }

    /// Revoke the token `jti` until its own expiry passes
    pub async fn logout(&self, jti: Uuid, exp: i64) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, expires| *expires > now);
        revoked.insert(jti, exp);
        info!(token = %jti, "Session revoked");
    }

    /// Current profile from the store; the token's copy may be stale
    pub async fn whoami(&self, user_id: Uuid) -> Result<UserInfo, ServiceError> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound(user_id))?;
        Ok(UserInfo::from(&user))
    }

    pub async fn list_users(&self) -> Result<Vec<UserInfo>, ServiceError> {
        let users = self.store.list_users().await?;
        Ok(users.iter().map(UserInfo::from).collect())
    }

    fn session_for(&self, user: &User) -> Result<SessionInfo, ServiceError> {
        let issued = self.keys.issue(user)?;
        Ok(SessionInfo {
            token: issued.token,
            expires_in: self.keys.lifetime().num_seconds(),
            user: UserInfo::from(user),
        })
    }
}

fn validate_email_format(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::new("email", "Email is required"));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::new("email", "Invalid email format"));
    }
    Ok(())
}
