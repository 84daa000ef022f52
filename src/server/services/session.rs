use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 1024;
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

/// Where a session's next upstream fetch resumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    /// Positioned at the contained continuation cursor; `None` means the
    /// start of the sequence.
    AtCursor(Option<String>),
    /// Upstream is drained for this session; no further fetches happen.
    Exhausted,
}

#[derive(Debug)]
pub struct SessionState {
    /// Record ids already delivered to this session. Grows monotonically.
    pub seen_ids: HashSet<String>,
    pub cursor: CursorState,
}

impl SessionState {
    fn new() -> Self {
        Self {
            seen_ids: HashSet::new(),
            cursor: CursorState::AtCursor(None),
        }
    }
}

struct SessionHandle {
    state: Arc<Mutex<SessionState>>,
    last_touched: Instant,
}

/// In-memory session registry, keyed by the caller-supplied session id.
///
/// Bounded: sessions idle longer than `idle_ttl` are swept when room is
/// needed, and if the map is still at `capacity` the least recently touched
/// session is evicted. Recency stamps live on the handle, outside the
/// per-session mutex, so eviction never blocks on an in-flight batch.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    capacity: usize,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_IDLE_TTL)
    }

    pub fn with_limits(capacity: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
            idle_ttl,
        }
    }

    /// Look up a session, creating it at the start of the sequence when the
    /// id is unknown.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        if let Some(handle) = sessions.get_mut(session_id) {
            handle.last_touched = now;
            return handle.state.clone();
        }

        if sessions.len() >= self.capacity {
            Self::evict(&mut sessions, now, self.idle_ttl, self.capacity);
        }

        let state = Arc::new(Mutex::new(SessionState::new()));
        sessions.insert(
            session_id.to_string(),
            SessionHandle {
                state: state.clone(),
                last_touched: now,
            },
        );
        state
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict(
        sessions: &mut HashMap<String, SessionHandle>,
        now: Instant,
        idle_ttl: Duration,
        capacity: usize,
    ) {
        let before = sessions.len();
        sessions.retain(|_, handle| now.duration_since(handle.last_touched) < idle_ttl);

        if sessions.len() >= capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, handle)| handle.last_touched)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                sessions.remove(&id);
            }
        }

        debug!("evicted {} sessions", before - sessions.len());
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
