//! The trusted origin of the embedded page.

use std::fmt;

use serde::{Deserialize, Serialize};

/// URL scheme of the embed origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Https,
    Http,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Https => "https",
            Protocol::Http => "http",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheme + host of the page allowed to exchange messages with the host
/// application. Used both to build embed URLs and to validate the origin
/// of inbound messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedOrigin {
    #[serde(default)]
    pub protocol: Protocol,
    pub host: String,
}

impl EmbedOrigin {
    /// Origin with the default `https` scheme.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            protocol: Protocol::Https,
            host: host.into(),
        }
    }

    pub fn with_protocol(protocol: Protocol, host: impl Into<String>) -> Self {
        Self {
            protocol,
            host: host.into(),
        }
    }

    /// The exact `scheme://host` string inbound message origins must match.
    pub fn origin_string(&self) -> String {
        format!("{}://{}", self.protocol, self.host)
    }

    /// Exact, case-sensitive comparison. No path, port, or subdomain
    /// wildcarding.
    pub fn matches(&self, event_origin: &str) -> bool {
        event_origin == self.origin_string()
    }
}

impl fmt::Display for EmbedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.host)
    }
}
