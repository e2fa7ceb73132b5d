use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "smartid_session";

/// Server-side state of one logged-in client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub name: String,
    pub expires_at: OffsetDateTime,
}

impl Session {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a new session holding the user's display name.
    async fn create(&self, name: &str) -> Session;
    /// Returns the session if it exists and has not expired.
    async fn get(&self, id: Uuid) -> Option<Session>;
    async fn remove(&self, id: Uuid);
}

pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Drops every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, name: &str) -> Session {
        let expires_at = OffsetDateTime::now_utc()
            .checked_add(self.ttl)
            .unwrap_or_else(|| PrimitiveDateTime::MAX.assume_utc());
        let session = Session {
            id: Uuid::new_v4(),
            name: name.to_string(),
            expires_at,
        };
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        debug!(session_id = %session.id, "session created");
        session
    }

    async fn get(&self, id: Uuid) -> Option<Session> {
        let now = OffsetDateTime::now_utc();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(s) if !s.is_expired(now) => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.sessions.write().await.remove(&id);
        debug!(session_id = %id, "session expired");
        None
    }

    async fn remove(&self, id: Uuid) {
        if self.sessions.write().await.remove(&id).is_some() {
            debug!(session_id = %id, "session removed");
        }
    }
}

/// `Set-Cookie` value that hands the session id to the client.
pub fn session_cookie(session: &Session, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.id,
        max_age.whole_seconds().max(0)
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the client forget the session.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Reads the session id from the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == SESSION_COOKIE)
        .and_then(|(_, v)| Uuid::parse_str(v.trim()).ok())
}
