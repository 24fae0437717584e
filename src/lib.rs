//! # snapclient-config
//!
//! Client for the HTTP configuration interface of ESP32 Snapcast clients.
//!
//! The device exposes a handful of query-string endpoints (`/get`, `/post`,
//! `/delete`, `/capabilities`, `/restart`). [`ParamClient`] wraps them:
//! reads are decoded per key through a [`DecoderTable`], writes are
//! percent-encoded, and failures at the parameter level are logged and
//! reported as `None`/`false` rather than errors.
//!
//! ```rust,ignore
//! let config = ClientConfig::from_page_url("http://localhost:8000/?backend=http://192.168.1.50")?;
//! let client = ParamClient::new(config);
//!
//! if let Some(host) = client.get_parameter("hostname").await {
//!     println!("hostname = {host}");
//! }
//! client.set_parameter("snapserver_port", 1704).await;
//! ```

pub mod capabilities;
pub mod cli;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod feedback;
pub mod origin;
pub mod query;
pub mod transport;

pub use capabilities::{Capabilities, DspSettings, GeneralSettings, Tab};
pub use client::{ParamClient, ParamClientBuilder};
pub use config::{ClientConfig, ConfigSource};
pub use decode::{DecoderTable, ParamValue};
pub use error::{ConfigError, RequestError};
pub use feedback::{show_error, show_loading, Container, HtmlContainer};
pub use origin::BackendOrigin;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportConfig};
