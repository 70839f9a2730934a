//! Token lifecycle management.
//!
//! The embedded page authenticates with short-lived tokens minted by the
//! host application's backend. [`TokenManager`] owns one fetch cycle at a
//! time: it invokes the caller-supplied `fetch_token` future, publishes the
//! resulting state on a watch channel, and schedules the next fetch shortly
//! before the token expires. Consumers read cloned [`TokenSnapshot`]s;
//! nothing outside the manager task mutates token state.
//!
//! A failed fetch parks the manager in the error state (there is no
//! automatic retry loop) until [`TokenManager::force_refetch`] kicks off a
//! new cycle. Dropping the last handle cancels the task and any pending
//! refresh timer.

use std::future::{pending, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::time::epoch_millis;

/// How long before expiry the next fetch is scheduled.
pub const DEFAULT_REFRESH_LEAD: Duration = Duration::from_secs(60);

/// An auth token for the embedded page, with its expiry as epoch millis.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EmbedToken {
    pub token: String,
    pub expires: i64,
}

/// Where the manager is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFetchState {
    /// Manager created, first fetch not started yet.
    Initialised,
    Fetching,
    Fetched,
    Error,
}

/// Error type returned by the caller-supplied fetch function.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// A token fetch attempt failed.
#[derive(Debug, Clone, Error)]
#[error("Failed to generate token: {error}")]
pub struct TokenError {
    /// The failure returned by `fetch_token`.
    pub error: Arc<dyn std::error::Error + Send + Sync>,
}

impl TokenError {
    fn new(error: FetchError) -> Self {
        Self {
            error: Arc::from(error),
        }
    }
}

/// Read-only view of the manager's state, published on every change.
#[derive(Debug, Clone)]
pub enum TokenSnapshot {
    /// No failure recorded; `token` is `None` until the first fetch lands.
    Success {
        state: TokenFetchState,
        token: Option<EmbedToken>,
    },
    /// The most recent fetch failed. The last good token, if any, stays
    /// visible so existing embeds keep working until it actually expires.
    Error {
        state: TokenFetchState,
        error: TokenError,
        last_token: Option<EmbedToken>,
    },
}

impl TokenSnapshot {
    pub fn state(&self) -> TokenFetchState {
        match self {
            TokenSnapshot::Success { state, .. } | TokenSnapshot::Error { state, .. } => *state,
        }
    }

    /// The most recent good token, regardless of error state.
    pub fn token(&self) -> Option<&EmbedToken> {
        match self {
            TokenSnapshot::Success { token, .. } => token.as_ref(),
            TokenSnapshot::Error { last_token, .. } => last_token.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&TokenError> {
        match self {
            TokenSnapshot::Success { .. } => None,
            TokenSnapshot::Error { error, .. } => Some(error),
        }
    }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type FetchTokenFn = Arc<dyn Fn() -> BoxFuture<Result<EmbedToken, FetchError>> + Send + Sync>;
type FetchErrorCallback = Arc<dyn Fn(&TokenError) + Send + Sync>;

/// Builder for [`TokenManager`].
pub struct TokenManagerBuilder {
    fetch_token: FetchTokenFn,
    on_fetch_error: Option<FetchErrorCallback>,
    refresh_lead: Duration,
}

impl TokenManagerBuilder {
    /// Callback invoked from the manager task whenever a fetch fails.
    pub fn on_fetch_error(mut self, callback: impl Fn(&TokenError) + Send + Sync + 'static) -> Self {
        self.on_fetch_error = Some(Arc::new(callback));
        self
    }

    /// Override how long before expiry the next fetch is scheduled.
    pub fn refresh_lead(mut self, lead: Duration) -> Self {
        self.refresh_lead = lead;
        self
    }

    /// Spawn the manager task and trigger the first fetch.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> TokenManager {
        let (snapshot_tx, snapshot_rx) = watch::channel(TokenSnapshot::Success {
            state: TokenFetchState::Initialised,
            token: None,
        });
        let (refetch_tx, refetch_rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        let task = ManagerTask {
            fetch_token: self.fetch_token,
            on_fetch_error: self.on_fetch_error,
            refresh_lead_millis: self.refresh_lead.as_millis() as i64,
            snapshot_tx,
            last_token: None,
        };
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = task_cancel.cancelled() => {}
                _ = task.run(refetch_rx) => {}
            }
        });

        TokenManager {
            inner: Arc::new(Inner {
                snapshot_rx,
                refetch_tx,
                _teardown: cancel.drop_guard(),
            }),
        }
    }
}

/// Handle to the token lifecycle task.
///
/// Cloning shares the task; when the last handle drops, the task stops and
/// any pending refresh timer is cancelled with it.
#[derive(Clone)]
pub struct TokenManager {
    inner: Arc<Inner>,
}

struct Inner {
    snapshot_rx: watch::Receiver<TokenSnapshot>,
    refetch_tx: mpsc::Sender<()>,
    _teardown: DropGuard,
}

impl TokenManager {
    /// Start a manager with default options.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(fetch_token: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EmbedToken, FetchError>> + Send + 'static,
    {
        Self::builder(fetch_token).spawn()
    }

    pub fn builder<F, Fut>(fetch_token: F) -> TokenManagerBuilder
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<EmbedToken, FetchError>> + Send + 'static,
    {
        TokenManagerBuilder {
            fetch_token: Arc::new(move || -> BoxFuture<Result<EmbedToken, FetchError>> {
                Box::pin(fetch_token())
            }),
            on_fetch_error: None,
            refresh_lead: DEFAULT_REFRESH_LEAD,
        }
    }

    /// Latest published state.
    pub fn snapshot(&self) -> TokenSnapshot {
        self.inner.snapshot_rx.borrow().clone()
    }

    /// Watch state changes as they are published.
    pub fn subscribe(&self) -> watch::Receiver<TokenSnapshot> {
        self.inner.snapshot_rx.clone()
    }

    /// Cancel any pending refresh and fetch a new token now.
    ///
    /// Works from any state, including after a failed fetch. Requests
    /// arriving while a fetch is already in flight are satisfied by that
    /// fetch rather than queueing another one.
    pub fn force_refetch(&self) {
        let _ = self.inner.refetch_tx.try_send(());
    }
}

struct ManagerTask {
    fetch_token: FetchTokenFn,
    on_fetch_error: Option<FetchErrorCallback>,
    refresh_lead_millis: i64,
    snapshot_tx: watch::Sender<TokenSnapshot>,
    last_token: Option<EmbedToken>,
}

impl ManagerTask {
    async fn run(mut self, mut refetch_rx: mpsc::Receiver<()>) {
        let mut next_refresh = self.fetch_cycle().await;
        Self::drain(&mut refetch_rx);
        loop {
            let refresh = async move {
                match next_refresh {
                    Some(delay) => sleep(delay).await,
                    None => pending::<()>().await,
                }
            };
            tokio::select! {
                command = refetch_rx.recv() => {
                    if command.is_none() {
                        break;
                    }
                    next_refresh = self.fetch_cycle().await;
                    Self::drain(&mut refetch_rx);
                }
                _ = refresh => {
                    next_refresh = self.fetch_cycle().await;
                    Self::drain(&mut refetch_rx);
                }
            }
        }
    }

    /// One fetch attempt. Returns the delay until the next automatic fetch,
    /// or `None` after a failure (no retry without a forced refetch).
    async fn fetch_cycle(&mut self) -> Option<Duration> {
        self.publish_fetching();
        match (self.fetch_token)().await {
            Ok(token) => {
                tracing::debug!(expires = token.expires, "token fetch succeeded");
                // A negative delay (token already inside the lead window)
                // clamps to zero and refetches immediately.
                let delay = token.expires - epoch_millis() - self.refresh_lead_millis;
                self.last_token = Some(token.clone());
                self.snapshot_tx.send_replace(TokenSnapshot::Success {
                    state: TokenFetchState::Fetched,
                    token: Some(token),
                });
                Some(Duration::from_millis(delay.max(0) as u64))
            }
            Err(error) => {
                let error = TokenError::new(error);
                tracing::warn!(%error, "token fetch failed");
                self.snapshot_tx.send_replace(TokenSnapshot::Error {
                    state: TokenFetchState::Error,
                    error: error.clone(),
                    last_token: self.last_token.clone(),
                });
                if let Some(callback) = &self.on_fetch_error {
                    callback(&error);
                }
                None
            }
        }
    }

    /// Flip the state to `Fetching`, keeping the current token/error so
    /// consumers do not observe a blank snapshot mid-refresh.
    fn publish_fetching(&self) {
        self.snapshot_tx.send_modify(|snapshot| match snapshot {
            TokenSnapshot::Success { state, .. } | TokenSnapshot::Error { state, .. } => {
                *state = TokenFetchState::Fetching;
            }
        });
    }

    /// Forced refetches that arrived while a fetch was in flight were
    /// satisfied by that fetch; drop them instead of fetching again.
    fn drain(refetch_rx: &mut mpsc::Receiver<()>) {
        while refetch_rx.try_recv().is_ok() {}
    }
}
