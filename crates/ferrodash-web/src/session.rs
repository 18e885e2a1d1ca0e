use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use ferrodash_core::SelectionState;

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Handle to one session's selection. Events for a session serialize on it.
pub type SessionHandle = Arc<Mutex<SelectionState>>;

#[derive(Debug)]
struct Session {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Per-browser selection states. Sessions never share state.
///
/// A session idle for longer than the timeout is evicted the next time any
/// session is opened or looked up.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub async fn create(&self, state: SelectionState) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);
        sessions.insert(
            id,
            Session {
                handle: Arc::new(Mutex::new(state)),
                last_seen: now,
            },
        );
        tracing::debug!(session = %id, "session opened");
        id
    }

    /// Look up a live session and mark it as seen.
    pub async fn get(&self, id: &Uuid) -> Option<SessionHandle> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_idle(&mut sessions, now);
        sessions.get_mut(id).map(|session| {
            session.last_seen = now;
            Arc::clone(&session.handle)
        })
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, "session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_seen) <= self.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrodash_core::{DateWindow, Symbol};

    fn state(ticker: &str) -> SelectionState {
        SelectionState::new(
            Some(Symbol::parse(ticker).expect("symbol")),
            DateWindow::parse("2023-01-01", "2023-06-30").expect("window"),
        )
    }

    #[tokio::test]
    async fn sessions_hold_independent_state() {
        let registry = SessionRegistry::default();
        let first = registry.create(state("GC=F")).await;
        let second = registry.create(state("GC=F")).await;
        assert_ne!(first, second);

        let handle = registry.get(&first).await.expect("first session");
        handle.lock().await.ticker = Some(Symbol::parse("SI=F").expect("symbol"));

        let other = registry.get(&second).await.expect("second session");
        assert_eq!(
            other.lock().await.ticker.as_ref().map(Symbol::as_str),
            Some("GC=F")
        );
    }

    #[tokio::test]
    async fn removed_sessions_are_gone() {
        let registry = SessionRegistry::default();
        let id = registry.create(state("NG=F")).await;
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(&id).await);
        assert!(!registry.remove(&id).await);
        assert!(registry.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let registry = SessionRegistry::with_idle_timeout(Duration::from_millis(200));
        let idle = registry.create(state("GC=F")).await;
        let active = registry.create(state("SI=F")).await;

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(registry.get(&active).await.is_some());
        tokio::time::sleep(Duration::from_millis(120)).await;

        let fresh = registry.create(state("NG=F")).await;
        assert_eq!(registry.len().await, 2);
        assert!(registry.get(&idle).await.is_none());
        assert!(registry.get(&active).await.is_some());
        assert!(registry.get(&fresh).await.is_some());
    }
}
