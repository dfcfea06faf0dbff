use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, warn};

use super::store::{StoredTokens, TokenStore};

/// Capacity of the session event channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Changes in authentication state, for whoever owns navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    /// The access token was replaced using the refresh token.
    Refreshed,
    LoggedOut,
    /// Renewal failed and both tokens were discarded. The user must log in again.
    Invalidated,
}

/// The current user's access and refresh tokens.
///
/// One `Session` is created by the application and shared (`Arc`) with every
/// `ApiClient`. Reads come from memory; every change is written through to the
/// backing `TokenStore` on the blocking pool, after the token lock is released.
pub struct Session {
    store: Arc<dyn TokenStore>,
    tokens: RwLock<StoredTokens>,
    /// Taken before the token lock is released so store writes land in the
    /// same order as the in-memory changes.
    persist_lock: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            tokens: RwLock::new(StoredTokens::default()),
            persist_lock: Mutex::new(()),
            events,
        }
    }

    /// Load persisted tokens. Returns true if an access token was found.
    pub async fn init(&self) -> Result<bool> {
        let loaded = self.store.load()?;
        let has_access = loaded.access.is_some();
        debug!(
            has_access,
            has_refresh = loaded.refresh.is_some(),
            "Session loaded"
        );
        *self.tokens.write().await = loaded;
        Ok(has_access)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.access.is_some()
    }

    /// Store a freshly issued token pair.
    pub async fn set_tokens(&self, access: String, refresh: String) {
        self.update(|tokens| {
            tokens.access = Some(access);
            tokens.refresh = Some(refresh);
        })
        .await;
        self.emit(SessionEvent::LoggedIn);
    }

    /// Replace only the access token. The refresh token is not rotated.
    pub async fn set_access_token(&self, access: String) {
        self.update(|tokens| tokens.access = Some(access)).await;
        self.emit(SessionEvent::Refreshed);
    }

    /// Discard both tokens after a user-initiated logout.
    pub async fn clear(&self) {
        self.wipe().await;
        self.emit(SessionEvent::LoggedOut);
    }

    /// Discard both tokens because they can no longer be renewed.
    pub async fn invalidate(&self) {
        self.wipe().await;
        self.emit(SessionEvent::Invalidated);
    }

    async fn wipe(&self) {
        self.update(|tokens| *tokens = StoredTokens::default()).await;
    }

    /// Apply `change` in memory, then write the result to the store.
    async fn update(&self, change: impl FnOnce(&mut StoredTokens)) {
        let mut tokens = self.tokens.write().await;
        change(&mut *tokens);
        let snapshot = (*tokens).clone();
        let _persisting = self.persist_lock.lock().await;
        drop(tokens);

        let store = Arc::clone(&self.store);
        let saved = tokio::task::spawn_blocking(move || {
            if snapshot.is_empty() {
                store.clear()
            } else {
                store.save(&snapshot)
            }
        })
        .await;
        match saved {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to persist tokens"),
            Err(e) => warn!(error = %e, "Token store task failed"),
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
