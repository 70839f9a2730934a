//! The inbound message channel and listener plumbing.
//!
//! The platform glue (webview bridge, test harness, ...) posts every
//! cross-window [`MessageEvent`] it receives onto one [`MessageChannel`].
//! Consumers attach listeners scoped to a trusted [`EmbedOrigin`]:
//!
//! - events from any other origin are dropped without comment (co-hosted
//!   apps post to the same channel, so warning on them is just noise);
//! - payloads that fail schema validation are logged at debug level and
//!   dropped, never surfaced to callbacks;
//! - valid messages fan out to the registered callbacks, the generic
//!   `on_message` first, then exactly one variant-specific callback.
//!
//! Listeners are guards: dropping the returned [`MessageListener`] detaches
//! it. To swap the origin or callback set, drop the old guard and call
//! [`MessageChannel::listen`] again: no duplicate listener is ever
//! attached, and the gap during the swap is negligible.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::messages::{
    self, EmbedMessage, ErrorMessage, InitialisingDoneMessage, InitialisingMessage,
    RenderingDoneMessage, RenderingMessage, UserEventMessage, UserIdleMessage,
};
use crate::origin::EmbedOrigin;

/// Cross-window message as delivered by the platform: the sender origin
/// and the raw JSON payload.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub origin: String,
    pub data: Value,
}

/// Shared handler; invoked from the listener task.
pub type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

fn handler<T: 'static>(callback: impl Fn(&T) + Send + Sync + 'static) -> Option<Handler<T>> {
    Some(Arc::new(callback))
}

fn maybe_call<T: 'static>(callback: &Option<Handler<T>>, message: &T) {
    if let Some(callback) = callback {
        callback(message);
    }
}

fn merge_handlers<T: 'static>(
    first: Option<Handler<T>>,
    second: Option<Handler<T>>,
) -> Option<Handler<T>> {
    match (first, second) {
        (None, None) => None,
        (Some(handler), None) | (None, Some(handler)) => Some(handler),
        (Some(first), Some(second)) => Some(Arc::new(move |message: &T| {
            first(message);
            second(message);
        })),
    }
}

/// Callbacks for inbound messages. All optional; absence is a no-op.
#[derive(Clone, Default)]
pub struct MessagingCallbacks {
    on_message: Option<Handler<EmbedMessage>>,
    on_initialising: Option<Handler<InitialisingMessage>>,
    on_initialising_done: Option<Handler<InitialisingDoneMessage>>,
    on_rendering: Option<Handler<RenderingMessage>>,
    on_rendering_done: Option<Handler<RenderingDoneMessage>>,
    on_user_event: Option<Handler<UserEventMessage>>,
    on_user_idle: Option<Handler<UserIdleMessage>>,
    on_error: Option<Handler<ErrorMessage>>,
}

impl MessagingCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoked for every valid message, before the variant callback.
    pub fn on_message(mut self, callback: impl Fn(&EmbedMessage) + Send + Sync + 'static) -> Self {
        self.on_message = handler(callback);
        self
    }

    pub fn on_initialising(
        mut self,
        callback: impl Fn(&InitialisingMessage) + Send + Sync + 'static,
    ) -> Self {
        self.on_initialising = handler(callback);
        self
    }

    pub fn on_initialising_done(
        mut self,
        callback: impl Fn(&InitialisingDoneMessage) + Send + Sync + 'static,
    ) -> Self {
        self.on_initialising_done = handler(callback);
        self
    }

    pub fn on_rendering(
        mut self,
        callback: impl Fn(&RenderingMessage) + Send + Sync + 'static,
    ) -> Self {
        self.on_rendering = handler(callback);
        self
    }

    pub fn on_rendering_done(
        mut self,
        callback: impl Fn(&RenderingDoneMessage) + Send + Sync + 'static,
    ) -> Self {
        self.on_rendering_done = handler(callback);
        self
    }

    pub fn on_user_event(
        mut self,
        callback: impl Fn(&UserEventMessage) + Send + Sync + 'static,
    ) -> Self {
        self.on_user_event = handler(callback);
        self
    }

    pub fn on_user_idle(
        mut self,
        callback: impl Fn(&UserIdleMessage) + Send + Sync + 'static,
    ) -> Self {
        self.on_user_idle = handler(callback);
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&ErrorMessage) + Send + Sync + 'static) -> Self {
        self.on_error = handler(callback);
        self
    }

    /// Merge two callback sets into one that invokes both, `self` first,
    /// for every handler slot.
    pub fn merged_with(self, other: Self) -> Self {
        Self {
            on_message: merge_handlers(self.on_message, other.on_message),
            on_initialising: merge_handlers(self.on_initialising, other.on_initialising),
            on_initialising_done: merge_handlers(
                self.on_initialising_done,
                other.on_initialising_done,
            ),
            on_rendering: merge_handlers(self.on_rendering, other.on_rendering),
            on_rendering_done: merge_handlers(self.on_rendering_done, other.on_rendering_done),
            on_user_event: merge_handlers(self.on_user_event, other.on_user_event),
            on_user_idle: merge_handlers(self.on_user_idle, other.on_user_idle),
            on_error: merge_handlers(self.on_error, other.on_error),
        }
    }
}

fn dispatch(callbacks: &MessagingCallbacks, message: &EmbedMessage) {
    maybe_call(&callbacks.on_message, message);
    match message {
        EmbedMessage::Initialising(m) => maybe_call(&callbacks.on_initialising, m),
        EmbedMessage::InitialisingDone(m) => maybe_call(&callbacks.on_initialising_done, m),
        EmbedMessage::Rendering(m) => maybe_call(&callbacks.on_rendering, m),
        EmbedMessage::RenderingDone(m) => maybe_call(&callbacks.on_rendering_done, m),
        EmbedMessage::UserEvent(m) => maybe_call(&callbacks.on_user_event, m),
        EmbedMessage::UserIdle(m) => maybe_call(&callbacks.on_user_idle, m),
        EmbedMessage::Error(m) => maybe_call(&callbacks.on_error, m),
    }
}

fn handle_event(origin: &EmbedOrigin, callbacks: &MessagingCallbacks, event: MessageEvent) {
    if !origin.matches(&event.origin) {
        // Unrelated co-hosted apps post here too; stay quiet.
        return;
    }
    match messages::parse_message(event.data) {
        Ok(message) => dispatch(callbacks, &message),
        Err(error) => tracing::debug!(%error, "dropping message that failed validation"),
    }
}

/// Buffered events per listener before a slow listener starts losing the
/// oldest ones.
const CHANNEL_CAPACITY: usize = 64;

/// The process-wide inbound message channel.
///
/// Clones share the same underlying channel. Within one listener, messages
/// are handled in the order they were posted.
#[derive(Clone)]
pub struct MessageChannel {
    sender: broadcast::Sender<MessageEvent>,
}

impl MessageChannel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Deliver an inbound event to every attached listener.
    pub fn post(&self, event: MessageEvent) {
        // Err just means no listener is attached right now.
        let _ = self.sender.send(event);
    }

    /// Attach a listener for messages from `origin`.
    ///
    /// Must be called from within a Tokio runtime. The subscription lives
    /// until the returned guard is dropped.
    pub fn listen(&self, origin: EmbedOrigin, callbacks: MessagingCallbacks) -> MessageListener {
        let mut events = self.sender.subscribe();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Teardown wins over a racing event: once the guard is
                    // dropped, no callback may fire.
                    biased;
                    _ = task_cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(event) => handle_event(&origin, &callbacks, event),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(missed, "listener fell behind; dropped inbound messages");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
        MessageListener {
            _teardown: cancel.drop_guard(),
        }
    }
}

impl Default for MessageChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Active subscription guard. Dropping it detaches the listener; no
/// callback fires afterwards.
pub struct MessageListener {
    _teardown: DropGuard,
}
