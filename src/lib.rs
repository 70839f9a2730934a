//! # embed_messaging
//!
//! Host-side SDK for embedding the **performance reporting page**:
//!
//! - Validate and dispatch the **typed cross-window messages** the embedded
//!   page posts back to the host
//! - Manage the **token lifecycle** (fetch, scheduled refresh, forced
//!   refetch) for authenticated embeds
//! - Build **embed URLs** from an origin, a token, and the performance
//!   query parameters
//! - Generate the **OpenAPI document** for the performance HTTP API
//!   (feature `openapi`, on by default)
//!
//! The goal is to be the "it just works" crate for embedding, especially
//! the parts that usually waste hours (origin filtering, token refresh
//! timing, and listeners that outlive their owner).
//!
//! ---
//!
//! ## The message protocol
//!
//! The embedded page posts JSON objects to the host window, discriminated
//! by a `type` field:
//!
//! ```json
//! { "type": "USER_EVENT", "messageTime": 1700000000000, "userEventTime": 1699999999000 }
//! ```
//!
//! Seven message kinds exist: `INITIALISING`, `INITIALISING_DONE`,
//! `RENDERING`, `RENDERING_DONE`, `USER_EVENT`, `USER_IDLE`, and `ERROR`.
//! See [`messages`] for the exact shapes.
//!
//! ### Most important gotchas (read this first)
//!
//! - **Origins match exactly:** an inbound event is only dispatched when its
//!   origin equals `"{protocol}://{host}"` of the configured
//!   [`EmbedOrigin`], case-sensitive, with no wildcarding. `http` vs `https`
//!   mismatches are silently dropped, which looks like "no messages arrive".
//! - **Foreign messages are normal:** co-hosted apps post to the same
//!   channel, so cross-origin and malformed events are dropped without
//!   logging noise (malformed ones are visible at `tracing` debug level).
//! - **Everything tears down by drop:** [`TokenManager`],
//!   [`MessageListener`](channel::MessageListener), and
//!   [`IdleTracker`](idle::IdleTracker) are guards. Dropping them cancels
//!   their tasks and timers; keep them alive for as long as you want the
//!   behavior.
//!
//! ---
//!
//! ## Quick start: tokens + context
//!
//! Provide a token fetcher once per application; the manager fetches
//! immediately and refreshes one minute before each expiry. A failed fetch
//! parks the manager in the error state (reported via `on_fetch_error`)
//! until [`TokenManager::force_refetch`] is called.
//!
//! ```no_run
//! use embed_messaging::context::PerformanceUrlRequest;
//! use embed_messaging::{EmbedContext, EmbedOrigin, EmbedToken, TokenManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tokens = TokenManager::spawn(|| async {
//!         // Call your backend's /api/auth/token endpoint here.
//!         Ok(EmbedToken { token: "tok".into(), expires: 4_102_444_800_000 })
//!     });
//!
//!     let context = EmbedContext::new()
//!         .with_origin(EmbedOrigin::new("embed.example.com"))
//!         .with_token_manager(tokens);
//!
//!     // Loading/error states are explicit, not exceptions:
//!     let state = context.performance_url(PerformanceUrlRequest::default());
//!     eprintln!("{:?}", state.url());
//! }
//! ```
//!
//! ## Quick start: listening for messages
//!
//! The platform glue posts every inbound cross-window event onto one
//! [`MessageChannel`]; listeners attach with a trusted origin and a set of
//! optional callbacks. The generic `on_message` always runs first, then
//! exactly one variant callback.
//!
//! ```no_run
//! use embed_messaging::{EmbedOrigin, MessageChannel, MessagingCallbacks};
//!
//! #[tokio::main]
//! async fn main() {
//!     let channel = MessageChannel::new();
//!     let listener = channel.listen(
//!         EmbedOrigin::new("embed.example.com"),
//!         MessagingCallbacks::new()
//!             .on_message(|message| eprintln!("message at {}", message.message_time()))
//!             .on_rendering_done(|_| eprintln!("page is ready")),
//!     );
//!
//!     // ... feed events from your webview bridge via channel.post(...) ...
//!
//!     drop(listener); // detaches; no callback fires afterwards
//! }
//! ```
//!
//! ## Idle tracking
//!
//! [`idle::IdleTracker`] derives idle/active state from `USER_IDLE` and
//! `USER_EVENT` messages with a configurable timeout (ten minutes by
//! default):
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use embed_messaging::idle::{IdleOptions, IdleTracker};
//! use embed_messaging::{EmbedOrigin, MessageChannel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let channel = MessageChannel::new();
//!     let tracker = IdleTracker::spawn(
//!         &channel,
//!         EmbedOrigin::new("embed.example.com"),
//!         IdleOptions {
//!             timeout: Some(Duration::from_secs(300)),
//!             on_idle: Some(Arc::new(|| eprintln!("user went idle"))),
//!             ..Default::default()
//!         },
//!     );
//!     assert!(!tracker.is_idle());
//! }
//! ```
//!
//! ---
//!
//! ## Generating the OpenAPI document
//!
//! With the default `openapi` feature, `cargo run --bin generate-openapi`
//! writes `dist/swagger/performance.yaml` describing `/api/auth/token`,
//! `/api/health`, and `/embed/pages/performance`.
//!
//! ---
//!
//! ## API re-exports
//!
//! The most common entry points are re-exported at the crate root. For the
//! full surface (variant payload types, snapshots, builders), see the
//! individual modules.

pub mod channel;
pub mod context;
pub mod idle;
pub mod messages;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod origin;
pub mod token;
pub mod url;

mod time;

// -------- Messaging re-exports --------

#[doc(inline)]
pub use channel::{MessageChannel, MessageEvent, MessageListener, MessagingCallbacks};
#[doc(inline)]
pub use messages::{parse_message, EmbedMessage};

// -------- Configuration re-exports --------

#[doc(inline)]
pub use context::{EmbedContext, PerformanceUrlState};
#[doc(inline)]
pub use origin::{EmbedOrigin, Protocol};

// -------- Token + URL re-exports --------

#[doc(inline)]
pub use token::{EmbedToken, TokenFetchState, TokenManager, TokenSnapshot};
#[doc(inline)]
pub use url::{performance_url, PerformanceParams};
