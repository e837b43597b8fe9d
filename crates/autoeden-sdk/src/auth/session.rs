//! Session coordination
//!
//! `SessionManager` owns the persisted auth record and serialises token
//! refreshes. At most one refresh is in flight at a time; every request that
//! hits an expired token while it runs is queued and receives the outcome of
//! that same refresh, in the order the requests arrived.
//!
//! When a refresh fails (or cannot start because no refresh token is stored)
//! the session is expired: the record is cleared once, subscribers are told,
//! and after a short delay they are asked to navigate home.

use super::refresh::TokenRefresher;
use super::store::AuthStore;
use super::types::{AuthState, RefreshFailure};
use crate::error::Result;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// User-facing message shown when the session can no longer be renewed
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Delay between the expiry notice and the redirect home
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(1);

/// Delivered to every subscriber when the session expires
#[derive(Debug, Clone)]
pub struct SessionExpiredNotice {
    pub message: &'static str,
    pub reason: RefreshFailure,
}

/// Receives session-expiry events
///
/// Handlers run on the refresh task and must not block.
pub trait SessionExpiredHandler: Send + Sync {
    fn on_session_expired(&self, notice: &SessionExpiredNotice);

    /// Called once the redirect delay has elapsed
    fn on_redirect_home(&self) {}
}

type Waiter = oneshot::Sender<std::result::Result<String, RefreshFailure>>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<Waiter>,
}

/// Resets the in-flight flag if the refresh task dies before settling
///
/// Dropping the queued senders wakes every waiter with `Aborted`.
struct InFlight<'a> {
    state: &'a Mutex<RefreshState>,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = self.state.lock();
            state.refreshing = false;
            state.waiters.clear();
        }
    }
}

pub struct SessionManager {
    store: Arc<dyn AuthStore>,
    refresher: Arc<dyn TokenRefresher>,
    state: Mutex<RefreshState>,
    handlers: RwLock<Vec<Arc<dyn SessionExpiredHandler>>>,
    redirect_delay: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("refreshing", &self.is_refreshing())
            .field("redirect_delay", &self.redirect_delay)
            .finish()
    }
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn AuthStore>,
        refresher: Arc<dyn TokenRefresher>,
        redirect_delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            refresher,
            state: Mutex::new(RefreshState::default()),
            handlers: RwLock::new(Vec::new()),
            redirect_delay,
        })
    }

    /// The persisted auth record, if any
    pub async fn current(&self) -> Result<Option<AuthState>> {
        self.store.load().await
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.store.load().await?.and_then(|auth| auth.access))
    }

    pub async fn persist(&self, state: &AuthState) -> Result<()> {
        self.store.save(state).await
    }

    /// Local logout; does not notify expiry subscribers
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    pub fn subscribe(&self, handler: Arc<dyn SessionExpiredHandler>) {
        self.handlers.write().push(handler);
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Number of requests waiting on the current refresh
    pub fn queued(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Obtain a fresh access token after `stale_access` was rejected
    ///
    /// Joins the in-flight refresh if there is one, otherwise starts it. The
    /// refresh runs on its own task so a caller that gives up cannot strand
    /// the others.
    pub async fn recover(
        self: &Arc<Self>,
        stale_access: Option<&str>,
    ) -> std::result::Result<String, RefreshFailure> {
        let (tx, rx) = oneshot::channel();
        let start = {
            let mut state = self.state.lock();
            state.waiters.push_back(tx);
            !std::mem::replace(&mut state.refreshing, true)
        };

        if start {
            let manager = Arc::clone(self);
            let stale = stale_access.map(str::to_owned);
            tokio::spawn(async move { manager.run_refresh(stale).await });
        } else {
            debug!("Refresh already in flight, queueing request");
        }

        rx.await.unwrap_or(Err(RefreshFailure::Aborted))
    }

    async fn run_refresh(self: Arc<Self>, stale: Option<String>) {
        let mut guard = InFlight {
            state: &self.state,
            settled: false,
        };

        let outcome = self.refresh_once(stale.as_deref()).await;
        if let Err(reason) = &outcome {
            self.expire(reason.clone()).await;
        }

        let waiters = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        guard.settled = true;

        debug!(waiters = waiters.len(), ok = outcome.is_ok(), "Refresh settled");
        for waiter in waiters {
            // A waiter whose caller went away is simply skipped
            let _ = waiter.send(outcome.clone());
        }
    }

    async fn refresh_once(&self, stale: Option<&str>) -> std::result::Result<String, RefreshFailure> {
        let auth = self
            .store
            .load()
            .await
            .map_err(|e| RefreshFailure::Storage(e.to_string()))?
            .unwrap_or_default();

        // Another refresh already rotated the token the caller was rejected with
        if let Some(current) = auth.access.as_deref() {
            if stale != Some(current) {
                debug!("Access token already rotated, reusing stored token");
                return Ok(current.to_string());
            }
        }

        let refresh = auth.refresh.ok_or(RefreshFailure::MissingRefreshToken)?;
        let pair = self.refresher.refresh(&refresh).await?;

        let updated = AuthState {
            access: Some(pair.access.clone()),
            refresh: Some(pair.refresh),
            user: auth.user,
        };
        self.store
            .save(&updated)
            .await
            .map_err(|e| RefreshFailure::Storage(e.to_string()))?;

        info!("Session renewed");
        Ok(pair.access)
    }

    async fn expire(&self, reason: RefreshFailure) {
        warn!(reason = %reason, "{}", SESSION_EXPIRED_MESSAGE);

        if let Err(e) = self.store.clear().await {
            warn!("Failed to clear auth state: {}", e);
        }

        let notice = SessionExpiredNotice {
            message: SESSION_EXPIRED_MESSAGE,
            reason,
        };
        let handlers = self.handlers.read().clone();
        for handler in &handlers {
            handler.on_session_expired(&notice);
        }

        if handlers.is_empty() {
            return;
        }
        let delay = self.redirect_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            for handler in handlers {
                handler.on_redirect_home();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryAuthStore;
    use crate::auth::types::TokenPair;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Refresher that counts calls and answers after a delay
    struct ScriptedRefresher {
        calls: AtomicUsize,
        delay: Duration,
        outcome: std::result::Result<TokenPair, RefreshFailure>,
    }

    impl ScriptedRefresher {
        fn ok(access: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(50),
                outcome: Ok(TokenPair {
                    access: access.into(),
                    refresh: "r2".into(),
                }),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(50),
                outcome: Err(RefreshFailure::Rejected {
                    status: 401,
                    message: "Token is invalid or expired".into(),
                }),
            })
        }
    }

    #[async_trait]
    impl TokenRefresher for ScriptedRefresher {
        async fn refresh(&self, _refresh_token: &str) -> std::result::Result<TokenPair, RefreshFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct Recorder {
        expired: AtomicUsize,
        redirected: AtomicUsize,
    }

    impl SessionExpiredHandler for Recorder {
        fn on_session_expired(&self, notice: &SessionExpiredNotice) {
            assert_eq!(notice.message, SESSION_EXPIRED_MESSAGE);
            self.expired.fetch_add(1, Ordering::SeqCst);
        }

        fn on_redirect_home(&self) {
            self.redirected.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn logged_in() -> Arc<MemoryAuthStore> {
        Arc::new(MemoryAuthStore::with_state(AuthState::new(
            "a1",
            Some("r1".into()),
            None,
        )))
    }

    #[tokio::test]
    async fn test_concurrent_recoveries_share_one_refresh() {
        let refresher = ScriptedRefresher::ok("a2");
        let store = logged_in();
        let session = SessionManager::new(store.clone(), refresher.clone(), Duration::ZERO);

        let results = futures::future::join_all((0..5).map(|_| session.recover(Some("a1")))).await;

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.as_deref() == Ok("a2")));
        assert!(!session.is_refreshing());
        assert_eq!(session.queued(), 0);

        let stored = store.load().await.unwrap().unwrap();
        assert_eq!(stored.access.as_deref(), Some("a2"));
        assert_eq!(stored.refresh.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_stale_token_reuses_rotated_access() {
        let refresher = ScriptedRefresher::ok("unused");
        let store = Arc::new(MemoryAuthStore::with_state(AuthState::new(
            "a2",
            Some("r2".into()),
            None,
        )));
        let session = SessionManager::new(store, refresher.clone(), Duration::ZERO);

        assert_eq!(session.recover(Some("a1")).await.as_deref(), Ok("a2"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_expires_without_network() {
        let refresher = ScriptedRefresher::ok("unused");
        let store = Arc::new(MemoryAuthStore::with_state(AuthState::new("a1", None, None)));
        let session = SessionManager::new(store.clone(), refresher.clone(), Duration::ZERO);
        let recorder = Arc::new(Recorder::default());
        session.subscribe(recorder.clone());

        let result = session.recover(Some("a1")).await;

        assert_eq!(result, Err(RefreshFailure::MissingRefreshToken));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(recorder.expired.load(Ordering::SeqCst), 1);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_expires_once_then_redirects() {
        let refresher = ScriptedRefresher::failing();
        let store = logged_in();
        let session = SessionManager::new(store.clone(), refresher.clone(), DEFAULT_REDIRECT_DELAY);
        let recorder = Arc::new(Recorder::default());
        session.subscribe(recorder.clone());

        let results = futures::future::join_all((0..3).map(|_| session.recover(Some("a1")))).await;

        assert!(results.iter().all(|r| matches!(r, Err(RefreshFailure::Rejected { status: 401, .. }))));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.expired.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.redirected.load(Ordering::SeqCst), 0);
        assert!(store.load().await.unwrap().is_none());

        tokio::time::sleep(DEFAULT_REDIRECT_DELAY + Duration::from_millis(10)).await;
        assert_eq!(recorder.redirected.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_caller_does_not_strand_queue() {
        let refresher = ScriptedRefresher::ok("a2");
        let session = SessionManager::new(logged_in(), refresher.clone(), Duration::ZERO);

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.recover(Some("a1")).await })
        };
        tokio::task::yield_now().await;
        first.abort();

        assert_eq!(session.recover(Some("a1")).await.as_deref(), Ok("a2"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }
}
