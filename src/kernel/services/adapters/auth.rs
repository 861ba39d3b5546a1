//! Auth provider backed by a watch channel; sessions are set directly.

use crate::kernel::services::ports::{AuthError, AuthProvider, BoxFuture, Session, User};
use tokio::sync::watch;

#[derive(Debug)]
pub struct MemoryAuthProvider {
    session: watch::Sender<Option<Session>>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self { session }
    }

    pub fn signed_in(session: Session) -> Self {
        let provider = Self::new();
        provider.sign_in(session);
        provider
    }

    /// Replaces the current session and notifies subscribers.
    pub fn sign_in(&self, session: Session) {
        tracing::info!(user = %session.user.id, "signed in");
        self.session.send_replace(Some(session));
    }

    pub fn expire(&self) {
        self.session.send_replace(None);
    }
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for MemoryAuthProvider {
    fn current_user(&self) -> BoxFuture<'_, Result<Option<User>, AuthError>> {
        Box::pin(async move { Ok(self.session.borrow().as_ref().map(|s| s.user.clone())) })
    }

    fn session(&self) -> BoxFuture<'_, Result<Option<Session>, AuthError>> {
        Box::pin(async move { Ok(self.session.borrow().clone()) })
    }

    fn sign_out(&self) -> BoxFuture<'_, Result<(), AuthError>> {
        Box::pin(async move {
            self.session.send_replace(None);
            Ok(())
        })
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/auth.rs"]
mod tests;
