//! Session lookup consumed by the orchestrator.

use qcommon::{BoxFuture, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
}

impl Session {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Resolves the caller's session, `None` when the request is not authenticated.
pub trait AuthProvider: Send + Sync {
    fn get_session<'a>(&'a self) -> BoxFuture<'a, Option<Session>>;
}

/// Fixed answer, for single-user deployments and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    session: Option<Session>,
}

impl StaticAuthProvider {
    pub fn authenticated(user_id: impl Into<UserId>) -> Self {
        Self {
            session: Some(Session::new(user_id)),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl AuthProvider for StaticAuthProvider {
    fn get_session<'a>(&'a self) -> BoxFuture<'a, Option<Session>> {
        Box::pin(async move { self.session.clone() })
    }
}
