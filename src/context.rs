//! Application-level embed context.
//!
//! Hosts configure one [`EmbedContext`] per application: the trusted embed
//! origin plus the token lifecycle manager. Every stored value has two
//! accessors: an `Option`-returning one for callers that can degrade, and
//! a `require_*` one that panics with a descriptive message. Missing
//! configuration is a programmer error and should surface loudly during
//! development, not silently degrade at runtime.

use crate::origin::EmbedOrigin;
use crate::token::{TokenError, TokenFetchState, TokenManager, TokenSnapshot};
use crate::url::{performance_url, PerformanceParams};

/// Mirrors the misconfiguration contract of the fail-fast accessors: name
/// the operation and the missing value so the failure is actionable.
fn missing_context_value(operation: &str, value: &str) -> ! {
    panic!(
        "embed context value `{value}` not found: `{operation}` needs `{value}` to be \
         provided as a parameter or configured on the EmbedContext"
    )
}

/// Shared, read-only configuration for the embedding SDK.
#[derive(Clone, Default)]
pub struct EmbedContext {
    origin: Option<EmbedOrigin>,
    tokens: Option<TokenManager>,
}

impl EmbedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trusted origin of the embedded pages.
    pub fn with_origin(mut self, origin: EmbedOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Attach the application's token manager.
    pub fn with_token_manager(mut self, tokens: TokenManager) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn origin(&self) -> Option<&EmbedOrigin> {
        self.origin.as_ref()
    }

    /// Panics when no origin was configured.
    pub fn require_origin(&self) -> &EmbedOrigin {
        self.origin
            .as_ref()
            .unwrap_or_else(|| missing_context_value("require_origin", "origin"))
    }

    pub fn token_manager(&self) -> Option<&TokenManager> {
        self.tokens.as_ref()
    }

    /// Panics when no token manager was configured.
    pub fn require_token_manager(&self) -> &TokenManager {
        self.tokens
            .as_ref()
            .unwrap_or_else(|| missing_context_value("require_token_manager", "token manager"))
    }

    /// Resolve the ready-to-embed performance page URL.
    ///
    /// An explicit token in the request wins; otherwise the context's token
    /// manager supplies one, surfacing its loading and error states as
    /// [`PerformanceUrlState`] variants. Calling this with neither an
    /// explicit token nor a token manager, or without an origin from either
    /// source, is a configuration bug and panics.
    pub fn performance_url(&self, request: PerformanceUrlRequest) -> PerformanceUrlState {
        let origin = request
            .origin
            .as_ref()
            .or(self.origin.as_ref())
            .unwrap_or_else(|| missing_context_value("performance_url", "origin"));

        if let Some(token) = &request.token {
            return PerformanceUrlState::Ready {
                url: performance_url(origin, token, &request.params),
            };
        }

        let tokens = self
            .tokens
            .as_ref()
            .unwrap_or_else(|| missing_context_value("performance_url", "token"));
        match tokens.snapshot() {
            TokenSnapshot::Success {
                token: Some(token), ..
            } => PerformanceUrlState::Ready {
                url: performance_url(origin, &token.token, &request.params),
            },
            TokenSnapshot::Success { state, token: None } => {
                PerformanceUrlState::Pending { state }
            }
            // The last good token stays usable while a refresh is failing.
            TokenSnapshot::Error {
                last_token: Some(token),
                ..
            } => PerformanceUrlState::Ready {
                url: performance_url(origin, &token.token, &request.params),
            },
            TokenSnapshot::Error { error, .. } => PerformanceUrlState::Failed { error },
        }
    }
}

/// Parameters for [`EmbedContext::performance_url`].
#[derive(Clone, Default)]
pub struct PerformanceUrlRequest {
    /// Overrides the context origin when set.
    pub origin: Option<EmbedOrigin>,
    /// Explicit token; skips the context token manager entirely.
    pub token: Option<String>,
    pub params: PerformanceParams,
}

/// Outcome of resolving the performance URL.
#[derive(Debug, Clone)]
pub enum PerformanceUrlState {
    /// No token yet; carries the manager's current fetch state.
    Pending { state: TokenFetchState },
    Ready { url: String },
    /// Token fetching failed and no previous token is available.
    Failed { error: TokenError },
}

impl PerformanceUrlState {
    pub fn url(&self) -> Option<&str> {
        match self {
            PerformanceUrlState::Ready { url } => Some(url),
            _ => None,
        }
    }
}
