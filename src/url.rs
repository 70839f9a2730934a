//! Embed URL construction.
//!
//! Builds `"{protocol}://{host}/{path}?{query}"` for the embedded pages.
//! Query serialization drops entries with nothing to say (`None`, empty
//! strings, lists that join to nothing) and comma-joins list values, so the
//! generated URL contains exactly the populated parameters.

use ::url::form_urlencoded;

use crate::origin::EmbedOrigin;

/// Path of the embedded performance page, relative to the embed origin.
pub const PERFORMANCE_PAGE_PATH: &str = "embed/pages/performance";

/// A single query parameter value: free text or a comma-joined list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Text(String),
    List(Vec<String>),
}

impl QueryValue {
    /// The wire form, or `None` when the value serializes to nothing.
    fn into_wire(self) -> Option<String> {
        let wire = match self {
            QueryValue::Text(text) => text,
            QueryValue::List(items) => items.join(","),
        };
        if wire.is_empty() {
            None
        } else {
            Some(wire)
        }
    }
}

impl From<&str> for QueryValue {
    fn from(text: &str) -> Self {
        QueryValue::Text(text.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(text: String) -> Self {
        QueryValue::Text(text)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(items: Vec<String>) -> Self {
        QueryValue::List(items)
    }
}

/// Serialize query parameters into a form-encoded string, dropping absent
/// and empty entries.
pub fn serialize_query<K, I>(params: I) -> String
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, Option<QueryValue>)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        let Some(value) = value.and_then(QueryValue::into_wire) else {
            continue;
        };
        serializer.append_pair(key.as_ref(), &value);
    }
    serializer.finish()
}

/// Compose the full embed URL from origin, page path, and serialized query.
pub fn build_embed_url(origin: &EmbedOrigin, path: &str, query: &str) -> String {
    format!("{}/{}?{}", origin.origin_string(), path, query)
}

/// Query parameters accepted by the embedded performance page.
///
/// Mirrors the `embedPagePerformance` operation of the performance API:
/// everything except the token is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformanceParams {
    /// Date to report performance from, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// Date to report performance to, `YYYY-MM-DD`.
    pub to: Option<String>,
    /// Three-letter currency ISO code, e.g. `GBP`.
    pub currency_iso_code: Option<String>,
    /// Investor references to calculate performance for.
    pub investor_ext_refs: Vec<String>,
    /// Investor account references to calculate performance for.
    pub investor_account_ext_refs: Vec<String>,
}

impl PerformanceParams {
    fn query_entries(&self, token: &str) -> Vec<(&'static str, Option<QueryValue>)> {
        vec![
            ("token", Some(QueryValue::Text(token.to_owned()))),
            ("from", self.from.clone().map(QueryValue::Text)),
            ("to", self.to.clone().map(QueryValue::Text)),
            (
                "currencyIsoCode",
                self.currency_iso_code.clone().map(QueryValue::Text),
            ),
            (
                "investorExtRefs",
                Some(QueryValue::List(self.investor_ext_refs.clone())),
            ),
            (
                "investorAccountExtRefs",
                Some(QueryValue::List(self.investor_account_ext_refs.clone())),
            ),
        ]
    }
}

/// Ready-to-embed URL for the performance page.
///
/// ```
/// use embed_messaging::{performance_url, EmbedOrigin, PerformanceParams};
///
/// let url = performance_url(
///     &EmbedOrigin::new("embed.example.com"),
///     "tok",
///     &PerformanceParams {
///         from: Some("2024-01-01".into()),
///         ..Default::default()
///     },
/// );
/// assert_eq!(
///     url,
///     "https://embed.example.com/embed/pages/performance?token=tok&from=2024-01-01"
/// );
/// ```
pub fn performance_url(origin: &EmbedOrigin, token: &str, params: &PerformanceParams) -> String {
    build_embed_url(
        origin,
        PERFORMANCE_PAGE_PATH,
        &serialize_query(params.query_entries(token)),
    )
}
