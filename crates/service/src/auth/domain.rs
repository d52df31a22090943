use std::fmt;

use serde::{Deserialize, Serialize};

/// The single configured login.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: String,
    pub owner_id: String,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into(), owner_id: owner_id.into() }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

impl From<&configs::AuthConfig> for User {
    fn from(cfg: &configs::AuthConfig) -> Self { User::new(&cfg.username, &cfg.password, &cfg.owner_id) }
}

/// Login input
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Login result (session)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Body returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub authenticated: bool,
}

impl AuthResponse {
    pub fn rejected() -> Self { Self { username: None, owner_id: None, token: None, authenticated: false } }
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            username: Some(session.user.username),
            owner_id: Some(session.user.owner_id),
            token: Some(session.token),
            authenticated: true,
        }
    }
}
