use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::booking::BookingSession;

/// One booking wizard per principal. Requests from the same user queue on the
/// session mutex; different users never contend past the map lookup.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<BookingSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's session, created empty on first use.
    pub async fn get(&self, principal_id: &str) -> Arc<Mutex<BookingSession>> {
        if let Some(session) = self.sessions.read().await.get(principal_id) {
            return session.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(principal_id.to_string())
            .or_insert_with(|| {
                debug!("Opening booking session for {}", principal_id);
                Arc::new(Mutex::new(BookingSession::new()))
            })
            .clone()
    }

    pub async fn remove(&self, principal_id: &str) -> bool {
        self.sessions.write().await.remove(principal_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
