//! Backend origin resolution.
//!
//! The configuration UI can be served from somewhere other than the device
//! (e.g. a laptop during development) and still talk to the device by
//! adding `?backend=http://<device>` to the page URL. That override is
//! resolved once, when the client configuration is built, and never
//! re-read afterwards.

use reqwest::Url;
use tracing::info;

use crate::error::ConfigError;
use crate::query::query_get;

/// Name of the page query parameter that carries the override.
pub const BACKEND_QUERY_PARAM: &str = "backend";

/// Prefix applied to `get_request`/`post_request` URLs.
///
/// Empty means "same origin as the page": requests go to the page origin
/// configured alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendOrigin {
    prefix: String,
}

impl BackendOrigin {
    /// No override; requests are relative to the page.
    pub fn same_origin() -> Self {
        Self::default()
    }

    /// Explicit override. An empty string is the same as [`same_origin`](Self::same_origin).
    /// Trailing slashes are dropped so `prefix + "/get"` stays a single-slash path.
    pub fn with_override(origin: impl AsRef<str>) -> Self {
        let prefix = origin.as_ref().trim().trim_end_matches('/').to_string();
        if !prefix.is_empty() {
            info!(backend = %prefix, "Using backend");
        }
        Self { prefix }
    }

    /// Resolve from a raw query string such as `?backend=http://host:1780`.
    pub fn from_query(query: &str) -> Self {
        Self::from_param(query_get(query, BACKEND_QUERY_PARAM).as_deref())
    }

    /// Resolve from a full page URL, e.g.
    /// `http://localhost:8000/index.html?backend=http://192.168.1.100`.
    pub fn from_page_url(page_url: &str) -> Result<Self, ConfigError> {
        let url = parse_url(page_url)?;
        let backend = url
            .query_pairs()
            .find(|(k, _)| k == BACKEND_QUERY_PARAM)
            .map(|(_, v)| v);
        Ok(Self::from_param(backend.as_deref()))
    }

    fn from_param(backend: Option<&str>) -> Self {
        match backend {
            Some(backend) if !backend.is_empty() => Self::with_override(backend),
            _ => Self::same_origin(),
        }
    }

    /// The prefix string; empty when there is no override.
    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn is_override(&self) -> bool {
        !self.prefix.is_empty()
    }
}

impl std::fmt::Display for BackendOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "(same origin)")
        } else {
            write!(f, "{}", self.prefix)
        }
    }
}

/// `scheme://host[:port]` of `page_url`, i.e. what relative requests from
/// that page resolve against.
pub fn page_origin(page_url: &str) -> Result<String, ConfigError> {
    let url = parse_url(page_url)?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(ConfigError::InvalidUrl {
            url: page_url.to_string(),
            detail: "URL has no network origin".to_string(),
        });
    }
    Ok(origin.ascii_serialization())
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        detail: e.to_string(),
    })
}
