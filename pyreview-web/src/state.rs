//! Shared server state and the per-browser session registry

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use pyreview_analysis::{ReviewPipeline, SessionState};

use crate::ServerConfig;

/// Cookie holding the session id
pub const SESSION_COOKIE: &str = "pyreview_session";

#[derive(Debug)]
struct Entry {
    session: Arc<SessionState>,
    last_seen: Instant,
}

/// Sessions keyed by the id stored in the browser cookie.
///
/// Holds at most `max_sessions` entries. Idle entries are dropped when a new
/// session is made, and the least recently used one goes when the map is
/// still full.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.max_sessions, config.session_idle())
    }

    /// Look up a live session and mark it as used
    pub async fn get(&self, id: Uuid) -> Option<Arc<SessionState>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;

        if entry.last_seen.elapsed() > self.idle_ttl {
            sessions.remove(&id);
            debug!("Session {} expired", id);
            return None;
        }

        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Existing session for `id`, or a fresh one under a new id.
    ///
    /// The returned flag is true when the caller must set the cookie.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, Arc<SessionState>, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id).await {
                return (id, session, false);
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(SessionState::new());

        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions);
        sessions.insert(
            id,
            Entry {
                session: Arc::clone(&session),
                last_seen: Instant::now(),
            },
        );
        debug!("Created session {} ({} active)", id, sessions.len());

        (id, session, true)
    }

    /// Make room for one more session
    fn evict(&self, sessions: &mut HashMap<Uuid, Entry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= self.idle_ttl);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} session(s)", evicted);
        }
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// State shared by all handlers
pub struct AppState {
    pub pipeline: ReviewPipeline,
    pub sessions: SessionRegistry,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(pipeline: ReviewPipeline, config: ServerConfig) -> Self {
        Self {
            pipeline,
            sessions: SessionRegistry::from_config(&config),
            config,
        }
    }
}
