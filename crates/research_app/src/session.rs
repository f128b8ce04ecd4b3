//! Cookie-keyed per-user sessions. Each session owns its workflow state and
//! the collaborators holding the pages it ingested.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use research_core::{AppState, PresetCatalog};
use research_logging::{research_info, research_warn};
use uuid::Uuid;

use crate::controller::WorkflowController;

pub const SESSION_COOKIE: &str = "research_session";

pub struct Session {
    pub state: AppState,
    pub controller: WorkflowController,
}

/// The async lock is held for a whole interaction.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

type ControllerFactory = dyn Fn() -> WorkflowController + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(60 * 60),
            max_sessions: 256,
        }
    }
}

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    catalog: PresetCatalog,
    limits: SessionLimits,
    new_controller: Arc<ControllerFactory>,
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

/// Result of resolving the caller's session.
pub struct SessionLookup {
    pub id: String,
    pub handle: SessionHandle,
    /// The caller had no live session; a cookie must be set.
    pub created: bool,
}

impl SessionStore {
    /// `new_controller` is called once per session, so every session gets
    /// collaborators of its own.
    pub fn new(
        catalog: PresetCatalog,
        limits: SessionLimits,
        new_controller: impl Fn() -> WorkflowController + Send + Sync + 'static,
    ) -> Self {
        Self {
            catalog,
            limits: SessionLimits {
                max_sessions: limits.max_sessions.max(1),
                ..limits
            },
            new_controller: Arc::new(new_controller),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// State shown to a caller without a session. Nothing is stored.
    pub fn blank_state(&self) -> AppState {
        AppState::new(self.catalog.clone())
    }

    /// The live session for `id`, if any. Never creates one.
    pub fn existing(&self, id: Option<&str>) -> Option<SessionHandle> {
        let mut sessions = self.live_sessions();
        let entry = sessions.get_mut(id?)?;
        entry.last_seen = Instant::now();
        Some(entry.handle.clone())
    }

    /// Returns the live session for `id`, or a fresh one under a new id.
    /// Client-chosen ids that are not live are never adopted.
    pub fn resolve(&self, id: Option<&str>) -> SessionLookup {
        if let Some(id) = id {
            if let Some(handle) = self.existing(Some(id)) {
                return SessionLookup {
                    id: id.to_string(),
                    handle,
                    created: false,
                };
            }
        }

        let id = Uuid::new_v4().to_string();
        let handle: SessionHandle = Arc::new(tokio::sync::Mutex::new(Session {
            state: self.blank_state(),
            controller: (self.new_controller)(),
        }));

        let mut sessions = self.live_sessions();
        if sessions.len() >= self.limits.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                research_warn!(
                    "Session limit {} reached; evicted {}",
                    self.limits.max_sessions,
                    oldest
                );
            }
        }
        sessions.insert(
            id.clone(),
            SessionEntry {
                handle: handle.clone(),
                last_seen: Instant::now(),
            },
        );
        research_info!("Started session {}", id);
        SessionLookup {
            id,
            handle,
            created: true,
        }
    }

    pub fn len(&self) -> usize {
        self.live_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Locks the map after dropping idle sessions.
    fn live_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionEntry>> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.limits.idle);
        if sessions.len() < before {
            research_info!("Dropped {} idle session(s)", before - sessions.len());
        }
        sessions
    }
}

/// Extracts the session id from the `Cookie` headers, if present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
