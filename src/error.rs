//! Error types for the parameter client.

use thiserror::Error;

/// Errors surfaced by the request layer ([`get_request`], [`post_request`]
/// and the `try_*` operations).
///
/// The sentinel-returning operations (`get_parameter`, `set_parameter`, ...)
/// never hand these to their callers; they log them and return `None`/`false`.
///
/// [`get_request`]: crate::client::ParamClient::get_request
/// [`post_request`]: crate::client::ParamClient::post_request
#[derive(Error, Debug)]
pub enum RequestError {
    /// The transport failed before any response arrived.
    #[error("network error on {endpoint}: {detail}")]
    Network { endpoint: String, detail: String },

    /// The device answered with a non-2xx status.
    #[error("HTTP error! status: {status} ({endpoint})")]
    Status { status: u16, endpoint: String },

    /// A JSON request body could not be serialized.
    #[error("could not encode request body: {0}")]
    Encode(String),

    /// The response body was not the JSON shape we expected.
    #[error("invalid JSON from {endpoint}: {detail}")]
    Json { endpoint: String, detail: String },
}

impl RequestError {
    /// HTTP status code, when the device produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while assembling a [`ClientConfig`](crate::config::ClientConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid URL '{url}': {detail}")]
    InvalidUrl { url: String, detail: String },

    #[error("no device origin configured (use --device, --page-url or a config file)")]
    MissingDevice,
}
