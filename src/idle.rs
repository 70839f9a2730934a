//! Idle/active status derived from the embedded page's activity messages.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::channel::{MessageChannel, MessageListener, MessagingCallbacks};
use crate::origin::EmbedOrigin;
use crate::time::epoch_millis;

/// Default window with no user activity after which the user counts as
/// idle: ten minutes.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Current idle state. `is_idle` starts out `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdleStatus {
    pub is_idle: bool,
    /// Last observed user activity, epoch millis.
    pub last_active_time: Option<i64>,
}

/// Plain notification callback.
pub type NotifyFn = Arc<dyn Fn() + Send + Sync>;

/// Options for [`IdleTracker::spawn`].
#[derive(Clone, Default)]
pub struct IdleOptions {
    /// Inactivity window; [`DEFAULT_IDLE_TIMEOUT`] when unset.
    pub timeout: Option<Duration>,
    /// Invoked whenever a stale activity report flags the user idle.
    pub on_idle: Option<NotifyFn>,
    /// Invoked on every user event.
    pub on_action: Option<NotifyFn>,
    /// Extra callbacks merged into the underlying subscription.
    pub callbacks: MessagingCallbacks,
}

/// Tracks idle state for one embedded page.
///
/// USER_IDLE messages carrying a `lastActiveTime` update the stored time
/// and flag the user idle once that time falls outside the timeout window;
/// USER_EVENT messages unconditionally clear the idle flag. No other
/// message kind affects the state. Dropping the tracker detaches its
/// listener.
pub struct IdleTracker {
    status_rx: watch::Receiver<IdleStatus>,
    _listener: MessageListener,
}

impl IdleTracker {
    /// Attach the tracker to `channel`, scoped to `origin`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(channel: &MessageChannel, origin: EmbedOrigin, options: IdleOptions) -> Self {
        let timeout_millis = options.timeout.unwrap_or(DEFAULT_IDLE_TIMEOUT).as_millis() as i64;
        let (status_tx, status_rx) = watch::channel(IdleStatus::default());
        let status_tx = Arc::new(status_tx);

        let idle_tx = status_tx.clone();
        let on_idle = options.on_idle.clone();
        let action_tx = status_tx;
        let on_action = options.on_action.clone();

        let internal = MessagingCallbacks::new()
            .on_user_idle(move |message| {
                let Some(last_active) = message.last_active_time else {
                    return;
                };
                let stale = epoch_millis() - last_active > timeout_millis;
                idle_tx.send_modify(|status| {
                    status.last_active_time = Some(last_active);
                    if stale {
                        status.is_idle = true;
                    }
                });
                if stale {
                    if let Some(callback) = &on_idle {
                        callback();
                    }
                }
            })
            .on_user_event(move |message| {
                action_tx.send_modify(|status| {
                    if let Some(event_time) = message.user_event_time {
                        status.last_active_time = Some(event_time);
                    }
                    status.is_idle = false;
                });
                if let Some(callback) = &on_action {
                    callback();
                }
            });

        let listener = channel.listen(origin, internal.merged_with(options.callbacks));
        Self {
            status_rx,
            _listener: listener,
        }
    }

    pub fn status(&self) -> IdleStatus {
        self.status_rx.borrow().clone()
    }

    pub fn is_idle(&self) -> bool {
        self.status_rx.borrow().is_idle
    }

    pub fn last_active_time(&self) -> Option<i64> {
        self.status_rx.borrow().last_active_time
    }

    /// Watch status changes as they are published.
    pub fn subscribe(&self) -> watch::Receiver<IdleStatus> {
        self.status_rx.clone()
    }
}
