//! Client configuration.
//!
//! A [`ClientConfig`] is built once and handed to
//! [`ParamClient`](crate::client::ParamClient). The backend origin is
//! resolved at that point and never changes for the lifetime of the client.
//!
//! For the CLI, settings come from three layers, highest first: command
//! line flags, an optional TOML file, built-in defaults. Both of the upper
//! layers are a [`ConfigSource`]; [`ConfigSource::merge`] stacks them.
//!
//! ```toml
//! device = "http://192.168.1.50"
//! # or: page_url = "http://localhost:8000/?backend=http://192.168.1.50"
//! backend = "http://192.168.1.50"
//! connect_timeout_secs = 3
//! request_timeout_secs = 10
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::decode::DecoderTable;
use crate::error::ConfigError;
use crate::origin::{page_origin, BackendOrigin};
use crate::transport::TransportConfig;

/// Everything a [`ParamClient`](crate::client::ParamClient) needs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin that served the UI (the device itself). Relative requests and
    /// every DELETE go here.
    pub page_origin: String,
    /// Prefix for GET/POST; empty means `page_origin`.
    pub backend: BackendOrigin,
    pub decoders: DecoderTable,
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Same-origin config for a device at `page_origin`, e.g. `http://192.168.1.50`.
    pub fn new(page_origin: impl AsRef<str>) -> Self {
        Self {
            page_origin: page_origin.as_ref().trim_end_matches('/').to_string(),
            backend: BackendOrigin::same_origin(),
            decoders: DecoderTable::default(),
            transport: TransportConfig::default(),
        }
    }

    /// Config as the browser would see it when the UI is opened at
    /// `page_url`: the page's origin plus any `?backend=` override.
    pub fn from_page_url(page_url: &str) -> Result<Self, ConfigError> {
        let mut config = Self::new(page_origin(page_url)?);
        config.backend = BackendOrigin::from_page_url(page_url)?;
        Ok(config)
    }

    pub fn with_backend(mut self, backend: BackendOrigin) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_decoders(mut self, decoders: DecoderTable) -> Self {
        self.decoders = decoders;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Base for `get_request`/`post_request`.
    pub fn request_base(&self) -> &str {
        if self.backend.is_override() {
            self.backend.as_str()
        } else {
            &self.page_origin
        }
    }
}

/// One layer of user-supplied settings (config file or CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigSource {
    /// Device origin, e.g. `http://esp32-snapclient`.
    pub device: Option<String>,
    /// Full UI page URL; supplies the device origin and `?backend=`.
    pub page_url: Option<String>,
    /// Explicit backend override; beats `?backend=` in `page_url`.
    pub backend: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl ConfigSource {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Field-wise `self.or(lower)`.
    pub fn merge(self, lower: ConfigSource) -> ConfigSource {
        ConfigSource {
            device: self.device.or(lower.device),
            page_url: self.page_url.or(lower.page_url),
            backend: self.backend.or(lower.backend),
            connect_timeout_secs: self.connect_timeout_secs.or(lower.connect_timeout_secs),
            request_timeout_secs: self.request_timeout_secs.or(lower.request_timeout_secs),
        }
    }

    /// Resolve into a [`ClientConfig`].
    ///
    /// The device origin is `device` if set, else the origin of `page_url`.
    /// The backend is `backend` if set, else `?backend=` from `page_url`,
    /// else same-origin.
    pub fn into_client_config(self) -> Result<ClientConfig, ConfigError> {
        let mut config = match (&self.device, &self.page_url) {
            (Some(device), _) => ClientConfig::new(page_origin(device)?),
            (None, Some(page_url)) => ClientConfig::new(page_origin(page_url)?),
            (None, None) => return Err(ConfigError::MissingDevice),
        };

        config.backend = match (&self.backend, &self.page_url) {
            (Some(backend), _) => BackendOrigin::with_override(backend),
            (None, Some(page_url)) => BackendOrigin::from_page_url(page_url)?,
            (None, None) => BackendOrigin::same_origin(),
        };

        let defaults = TransportConfig::default();
        config.transport = TransportConfig {
            connect_timeout: self
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            request_timeout: self
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        };

        Ok(config)
    }
}
