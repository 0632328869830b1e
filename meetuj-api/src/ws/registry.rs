/// Session registry
///
/// Tracks connected sockets by session id. Entries are inserted when a
/// socket opens and removed when its [`SessionGuard`] drops, so a session
/// that ends by error or panic is still cleaned up. The lock is never held
/// across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A connected socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub account_id: Uuid,
    pub connected_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionInfo>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionInfo>> {
        // A poisoned map is still structurally valid
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a session for `account_id`; it stays registered while the
    /// returned guard lives
    pub fn register(self: &Arc<Self>, account_id: Uuid) -> SessionGuard {
        let info = SessionInfo {
            session_id: Uuid::new_v4(),
            account_id,
            connected_at: Utc::now(),
        };
        let session_id = info.session_id;

        self.lock().insert(session_id, info);
        tracing::debug!(%session_id, %account_id, "WebSocket session registered");

        SessionGuard {
            registry: Arc::clone(self),
            session_id,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sessions currently open for an account
    pub fn sessions_for(&self, account_id: Uuid) -> Vec<SessionInfo> {
        self.lock()
            .values()
            .filter(|s| s.account_id == account_id)
            .cloned()
            .collect()
    }

    fn remove(&self, session_id: Uuid) {
        if self.lock().remove(&session_id).is_some() {
            tracing::debug!(%session_id, "WebSocket session removed");
        }
    }
}

/// Removes its session from the registry on drop
#[derive(Debug)]
pub struct SessionGuard {
    registry: Arc<SessionRegistry>,
    session_id: Uuid,
}

impl SessionGuard {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(self.session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_removes_on_drop() {
        let registry = Arc::new(SessionRegistry::new());
        let account_id = Uuid::new_v4();

        let guard = registry.register(account_id);
        assert_eq!(registry.len(), 1);
        let sessions = registry.sessions_for(account_id);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, guard.session_id());

        drop(guard);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sessions_for_account() {
        let registry = Arc::new(SessionRegistry::new());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let _a1 = registry.register(alice);
        let _a2 = registry.register(alice);
        let _b = registry.register(bob);

        assert_eq!(registry.sessions_for(alice).len(), 2);
        assert_eq!(registry.sessions_for(bob).len(), 1);
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_sessions() {
        let registry = Arc::new(SessionRegistry::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let guard = registry.register(Uuid::new_v4());
                tokio::task::yield_now().await;
                drop(guard);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(registry.is_empty());
    }
}
