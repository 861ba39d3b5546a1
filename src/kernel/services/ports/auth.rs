use super::runtime::BoxFuture;
use crate::models::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auth: {}", self.message)
    }
}

impl std::error::Error for AuthError {}

/// External authentication provider. The kernel only uses the session's user
/// id, as an opaque owner filter.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> BoxFuture<'_, Result<Option<User>, AuthError>>;

    fn session(&self) -> BoxFuture<'_, Result<Option<Session>, AuthError>>;

    fn sign_out(&self) -> BoxFuture<'_, Result<(), AuthError>>;

    /// Auth state changes; the current value is the latest session.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}
