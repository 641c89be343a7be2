//! Explicit session tracking. A session is created on successful login,
//! looked up per request via the `x-session-token` header, and destroyed on
//! logout. No timeout-based expiry and no per-user session limit.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const SESSION_HEADER: &str = "x-session-token";

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    /// Kept for operator inspection; nothing expires sessions by age.
    #[allow(dead_code)]
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `username` and returns its token.
    pub fn open(&self, username: &str) -> Uuid {
        let token = Uuid::new_v4();
        self.inner.write().unwrap().insert(
            token,
            Session {
                username: username.to_string(),
                created_at: Utc::now(),
            },
        );
        token
    }

    /// The username behind `token`, if the session exists.
    pub fn username(&self, token: Uuid) -> Option<String> {
        self.inner
            .read()
            .unwrap()
            .get(&token)
            .map(|s| s.username.clone())
    }

    /// Destroys the session; idempotent for unknown tokens.
    pub fn close(&self, token: Uuid) {
        self.inner.write().unwrap().remove(&token);
    }

    /// Parses the session header and resolves it to a username.
    pub fn username_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let token = headers
            .get(SESSION_HEADER)?
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        self.username(token)
    }
}
