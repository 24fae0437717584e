//! Parameter client for the device's HTTP configuration interface.
//!
//! Endpoints (all plain query strings, no auth):
//!
//! | Method | Path                              | Origin        |
//! |--------|-----------------------------------|---------------|
//! | GET    | `/get?param=KEY`                  | backend       |
//! | POST   | `/post?param=KEY&value=VALUE`     | backend       |
//! | DELETE | `/delete?param=KEY`               | page (always) |
//! | GET    | `/capabilities?tab=general\|dsp`  | backend       |
//! | POST   | `/restart`                        | backend       |
//!
//! `get_request`/`post_request` return `Result`. The parameter-level
//! operations log failures and return `None`/`false` instead; their
//! `try_*` counterparts expose the underlying [`RequestError`].

use std::fmt::Display;

use serde::Serialize;
use tracing::{debug, error};

use crate::capabilities::{Capabilities, Tab};
use crate::config::ClientConfig;
use crate::decode::ParamValue;
use crate::error::RequestError;
use crate::query::encode_uri_component;
use crate::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

/// `post_request` without a body.
const NO_BODY: Option<&()> = None;

pub struct ParamClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl ParamClient<ReqwestTransport> {
    /// Client with a `reqwest` transport built from `config.transport`.
    pub fn new(config: ClientConfig) -> Self {
        let transport = ReqwestTransport::new(&config.transport);
        Self { config, transport }
    }

    /// Start building a client for the device at `page_origin`.
    pub fn builder(page_origin: impl AsRef<str>) -> ParamClientBuilder {
        ParamClientBuilder::new(page_origin)
    }
}

impl<T: Transport> ParamClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URL for `endpoint` under the backend origin.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.request_base(), endpoint)
    }

    /// Absolute URL for `endpoint` under the page origin, ignoring any
    /// backend override.
    pub fn page_url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.page_origin, endpoint)
    }

    async fn execute(&self, endpoint: &str, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let resp = self
            .transport
            .send(request)
            .await
            .map_err(|e| RequestError::Network {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            })?;

        if !resp.is_success() {
            return Err(RequestError::Status {
                status: resp.status,
                endpoint: endpoint.to_string(),
            });
        }
        Ok(resp)
    }

    /// GET `backend + endpoint`.
    ///
    /// # Returns
    /// - `Ok(HttpResponse)` on a 2xx status; decoding the body is up to the caller.
    /// - `Err(RequestError::Status)` on any other status.
    /// - `Err(RequestError::Network)` when no response arrived.
    ///
    /// Failures are logged with the endpoint before being returned.
    pub async fn get_request(&self, endpoint: &str) -> Result<HttpResponse, RequestError> {
        let request = HttpRequest::new(Method::GET, self.url_for(endpoint));
        self.execute(endpoint, request).await.inspect_err(|e| {
            error!(endpoint = %endpoint, error = %e, "Error fetching");
        })
    }

    /// POST `backend + endpoint`, with `data` as a JSON body when given.
    ///
    /// Same contract as [`get_request`](Self::get_request); additionally
    /// fails with `RequestError::Encode` if `data` cannot be serialized.
    pub async fn post_request<B>(&self, endpoint: &str, data: Option<&B>) -> Result<HttpResponse, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let result = match self.post_with_body(endpoint, data) {
            Ok(request) => self.execute(endpoint, request).await,
            Err(e) => Err(e),
        };
        result.inspect_err(|e| {
            error!(endpoint = %endpoint, error = %e, "Error posting to");
        })
    }

    fn post_with_body<B>(&self, endpoint: &str, data: Option<&B>) -> Result<HttpRequest, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let request = HttpRequest::new(Method::POST, self.url_for(endpoint));
        let Some(data) = data else {
            return Ok(request);
        };
        let body = serde_json::to_vec(data).map_err(|e| RequestError::Encode(e.to_string()))?;
        Ok(request.header("Content-Type", "application/json").body(body))
    }

    /// Read and decode `key` through the configured decoder table.
    pub async fn try_get_parameter(&self, key: &str) -> Result<ParamValue, RequestError> {
        let resp = self.get_request(&format!("/get?param={key}")).await?;
        Ok(self.config.decoders.decode(key, &resp.text()))
    }

    /// Read `key`; `None` on any failure (already logged).
    ///
    /// Numeric keys may decode to `NaN` when the device sent no number;
    /// treat that as unset.
    pub async fn get_parameter(&self, key: &str) -> Option<ParamValue> {
        match self.try_get_parameter(key).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!(param = %key, error = %e, "Error fetching parameter");
                None
            }
        }
    }

    pub async fn try_set_parameter(&self, key: &str, value: impl Display) -> Result<(), RequestError> {
        let value = encode_uri_component(&value.to_string());
        self.post_request(&format!("/post?param={key}&value={value}"), NO_BODY)
            .await
            .map(|_| ())
    }

    /// Write `value` to `key`. `true` on success.
    pub async fn set_parameter(&self, key: &str, value: impl Display) -> bool {
        match self.try_set_parameter(key, value).await {
            Ok(()) => true,
            Err(e) => {
                error!(param = %key, error = %e, "Error setting parameter");
                false
            }
        }
    }

    /// Clear `key` on the device (back to its compiled-in default).
    ///
    /// Always sent to the page origin: the backend override does not apply
    /// here.
    pub async fn try_delete_parameter(&self, key: &str) -> Result<(), RequestError> {
        let endpoint = format!("/delete?param={key}");
        let request = HttpRequest::new(Method::DELETE, self.page_url_for(&endpoint));
        self.execute(&endpoint, request).await.map(|_| ())
    }

    pub async fn delete_parameter(&self, key: &str) -> bool {
        match self.try_delete_parameter(key).await {
            Ok(()) => true,
            Err(e) => {
                error!(param = %key, error = %e, "Error deleting parameter");
                false
            }
        }
    }

    pub async fn try_get_capabilities(&self, tab: Tab) -> Result<Capabilities, RequestError> {
        let endpoint = format!("/capabilities?tab={tab}");
        let resp = self.get_request(&endpoint).await?;
        Capabilities::from_json(tab, &resp.body).map_err(|e| RequestError::Json {
            endpoint,
            detail: e.to_string(),
        })
    }

    /// Settings snapshot for one UI tab; `None` on any failure.
    pub async fn get_capabilities(&self, tab: Tab) -> Option<Capabilities> {
        match self.try_get_capabilities(tab).await {
            Ok(caps) => Some(caps),
            Err(e) => {
                error!(tab = %tab, error = %e, "Error fetching capabilities");
                None
            }
        }
    }

    /// Ask the device to reboot. It replies before restarting, so `true`
    /// only means the request was accepted.
    pub async fn restart(&self) -> bool {
        match self.post_request("/restart", NO_BODY).await {
            Ok(_) => true,
            Err(e) => {
                error!(error = %e, "Error requesting restart");
                false
            }
        }
    }
}

/// Builder for [`ParamClient`].
///
/// # Example
/// ```rust,ignore
/// let client = ParamClient::builder("http://192.168.1.50")
///     .backend(BackendOrigin::from_query("?backend=http://192.168.1.60"))
///     .request_timeout(Duration::from_secs(5))
///     .build();
/// ```
pub struct ParamClientBuilder {
    config: ClientConfig,
}

impl ParamClientBuilder {
    pub fn new(page_origin: impl AsRef<str>) -> Self {
        Self {
            config: ClientConfig::new(page_origin),
        }
    }

    pub fn backend(mut self, backend: crate::origin::BackendOrigin) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn decoders(mut self, decoders: crate::decode::DecoderTable) -> Self {
        self.config.decoders = decoders;
        self
    }

    /// Override the TCP connect timeout (default 3 s).
    pub fn connect_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.transport.connect_timeout = timeout;
        self
    }

    /// Override the per-request timeout (default 10 s).
    pub fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.transport.request_timeout = timeout;
        self
    }

    pub fn build(self) -> ParamClient {
        ParamClient::new(self.config)
    }

    pub fn build_with<T: Transport>(self, transport: T) -> ParamClient<T> {
        ParamClient::with_transport(self.config, transport)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{decode_text, DecoderTable};
    use crate::origin::BackendOrigin;
    use crate::transport::TransportError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned outcomes in order and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn replying(replies: Vec<Result<HttpResponse, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn ok(body: &str) -> Self {
            Self::replying(vec![Ok(HttpResponse::new(200, body))])
        }

        fn status(code: u16) -> Self {
            Self::replying(vec![Ok(HttpResponse::new(code, "error"))])
        }

        fn refused() -> Self {
            Self::replying(vec![Err(TransportError("connection refused".into()))])
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no scripted reply".into())))
        }
    }

    const DEVICE: &str = "http://192.168.1.50";

    fn client(transport: ScriptedTransport) -> ParamClient<ScriptedTransport> {
        ParamClient::with_transport(ClientConfig::new(DEVICE), transport)
    }

    fn client_with_backend(transport: ScriptedTransport) -> ParamClient<ScriptedTransport> {
        let config = ClientConfig::new(DEVICE).with_backend(BackendOrigin::from_query("?backend=http://host:1780"));
        ParamClient::with_transport(config, transport)
    }

    // -- get_request / post_request -----------------------------------------

    #[tokio::test]
    async fn get_request_same_origin_url() {
        let c = client(ScriptedTransport::ok("x"));
        let resp = c.get_request("/get?param=hostname").await.unwrap();
        assert_eq!(resp.text(), "x");
        let reqs = c.transport().requests();
        assert_eq!(reqs[0].method, Method::GET);
        assert_eq!(reqs[0].url, "http://192.168.1.50/get?param=hostname");
    }

    #[tokio::test]
    async fn get_request_uses_backend_override() {
        let c = client_with_backend(ScriptedTransport::ok("x"));
        c.get_request("/get?param=gain_1").await.unwrap();
        assert_eq!(c.transport().requests()[0].url, "http://host:1780/get?param=gain_1");
    }

    #[tokio::test]
    async fn get_request_status_error_carries_code() {
        let c = client(ScriptedTransport::status(404));
        let err = c.get_request("/get?param=nope").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn get_request_network_error() {
        let c = client(ScriptedTransport::refused());
        let err = c.get_request("/get?param=hostname").await.unwrap_err();
        assert!(matches!(err, RequestError::Network { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn post_request_without_data_sends_no_body() {
        let c = client(ScriptedTransport::ok(""));
        c.post_request("/restart", NO_BODY).await.unwrap();
        let req = &c.transport().requests()[0];
        assert_eq!(req.method, Method::POST);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[tokio::test]
    async fn post_request_with_data_sends_json() {
        let c = client_with_backend(ScriptedTransport::ok(""));
        let data = serde_json::json!({ "hostname": "kitchen" });
        c.post_request("/settings", Some(&data)).await.unwrap();
        let req = &c.transport().requests()[0];
        assert_eq!(req.url, "http://host:1780/settings");
        assert!(req
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
        let body: serde_json::Value = serde_json::from_slice(req.body.as_ref().unwrap()).unwrap();
        assert_eq!(body["hostname"], "kitchen");
    }

    #[tokio::test]
    async fn post_request_failure_status() {
        let c = client(ScriptedTransport::status(500));
        let err = c.post_request("/post?param=x&value=1", NO_BODY).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    // -- get_parameter ------------------------------------------------------

    #[tokio::test]
    async fn get_parameter_hostname_trimmed() {
        let c = client(ScriptedTransport::ok("  myhost  \n"));
        assert_eq!(c.get_parameter("hostname").await, Some(ParamValue::Text("myhost".into())));
        assert_eq!(c.transport().requests()[0].url, "http://192.168.1.50/get?param=hostname");
    }

    #[tokio::test]
    async fn get_parameter_port_empty_and_number() {
        let c = client(ScriptedTransport::replying(vec![
            Ok(HttpResponse::new(200, "")),
            Ok(HttpResponse::new(200, "1704")),
            Ok(HttpResponse::new(200, "  ")),
        ]));
        assert_eq!(c.get_parameter("snapserver_port").await, Some(ParamValue::Text(String::new())));
        assert_eq!(c.get_parameter("snapserver_port").await, Some(ParamValue::Number(1704.0)));
        assert_eq!(c.get_parameter("snapserver_port").await, Some(ParamValue::Text(String::new())));
    }

    #[tokio::test]
    async fn get_parameter_numeric_key() {
        let c = client(ScriptedTransport::ok("-6\n"));
        assert_eq!(c.get_parameter("gain_1").await, Some(ParamValue::Number(-6.0)));
    }

    #[tokio::test]
    async fn get_parameter_numeric_garbage_is_nan() {
        let c = client(ScriptedTransport::ok("Unknown parameter"));
        let value = c.get_parameter("fc_9").await.unwrap();
        assert!(value.is_nan());
    }

    #[tokio::test]
    async fn get_parameter_failure_is_none() {
        assert_eq!(client(ScriptedTransport::status(500)).get_parameter("hostname").await, None);
        assert_eq!(client(ScriptedTransport::refused()).get_parameter("gain_1").await, None);
    }

    #[tokio::test]
    async fn try_get_parameter_exposes_error() {
        let c = client(ScriptedTransport::status(503));
        let err = c.try_get_parameter("hostname").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn get_parameter_uses_custom_decoder_table() {
        let config = ClientConfig::new(DEVICE).with_decoders(DecoderTable::snapclient().with("room", decode_text));
        let c = ParamClient::with_transport(config, ScriptedTransport::ok(" Kitchen "));
        assert_eq!(c.get_parameter("room").await, Some(ParamValue::Text("Kitchen".into())));
    }

    // -- set_parameter ------------------------------------------------------

    #[tokio::test]
    async fn set_parameter_port_url_and_success() {
        let c = client(ScriptedTransport::ok(""));
        assert!(c.set_parameter("snapserver_port", 1704).await);
        let req = &c.transport().requests()[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "http://192.168.1.50/post?param=snapserver_port&value=1704");
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn set_parameter_encodes_value() {
        let c = client_with_backend(ScriptedTransport::ok(""));
        assert!(c.set_parameter("hostname", "living room&co").await);
        assert_eq!(
            c.transport().requests()[0].url,
            "http://host:1780/post?param=hostname&value=living%20room%26co"
        );
    }

    #[tokio::test]
    async fn set_parameter_param_value_display() {
        let c = client(ScriptedTransport::ok(""));
        assert!(c.set_parameter("gain_3", ParamValue::Number(-2.5)).await);
        assert!(c.transport().requests()[0].url.ends_with("value=-2.5"));
    }

    #[tokio::test]
    async fn set_parameter_false_on_status_or_fault() {
        assert!(!client(ScriptedTransport::status(400)).set_parameter("snapserver_port", 1704).await);
        assert!(!client(ScriptedTransport::refused()).set_parameter("snapserver_port", 1704).await);
    }

    // -- delete_parameter ---------------------------------------------------

    #[tokio::test]
    async fn delete_parameter_ignores_backend_override() {
        let c = client_with_backend(ScriptedTransport::ok(""));
        assert!(c.delete_parameter("hostname").await);
        let req = &c.transport().requests()[0];
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.url, "http://192.168.1.50/delete?param=hostname");
    }

    #[tokio::test]
    async fn delete_parameter_false_on_failure() {
        assert!(!client(ScriptedTransport::status(400)).delete_parameter("bogus").await);
        assert!(!client(ScriptedTransport::refused()).delete_parameter("hostname").await);
    }

    // -- capabilities / restart ---------------------------------------------

    #[tokio::test]
    async fn capabilities_general() {
        let c = client_with_backend(ScriptedTransport::ok(
            r#"{"hostname":"esp32-snapclient","mdns_enabled":true,"dsp_available":false}"#,
        ));
        let caps = c.get_capabilities(Tab::General).await.unwrap();
        let Capabilities::General(g) = caps else {
            panic!("expected general");
        };
        assert_eq!(g.hostname.as_deref(), Some("esp32-snapclient"));
        assert_eq!(c.transport().requests()[0].url, "http://host:1780/capabilities?tab=general");
    }

    #[tokio::test]
    async fn capabilities_bad_json_is_none() {
        let c = client(ScriptedTransport::ok("<html>"));
        assert!(c.get_capabilities(Tab::Dsp).await.is_none());
    }

    #[tokio::test]
    async fn try_capabilities_bad_json_is_json_error() {
        let c = client(ScriptedTransport::ok("<html>"));
        let err = c.try_get_capabilities(Tab::Dsp).await.unwrap_err();
        assert!(matches!(err, RequestError::Json { .. }));
    }

    #[tokio::test]
    async fn restart_posts_without_body() {
        let c = client(ScriptedTransport::ok("restarting"));
        assert!(c.restart().await);
        let req = &c.transport().requests()[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url, "http://192.168.1.50/restart");
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn restart_false_on_failure() {
        assert!(!client(ScriptedTransport::refused()).restart().await);
    }

    // -- builder ------------------------------------------------------------

    #[test]
    fn builder_applies_options() {
        let c = ParamClient::builder("http://192.168.1.50/")
            .backend(BackendOrigin::with_override("http://host:1780"))
            .connect_timeout(Duration::from_secs(1))
            .request_timeout(Duration::from_secs(2))
            .build_with(ScriptedTransport::default());
        assert_eq!(c.config().page_origin, "http://192.168.1.50");
        assert_eq!(c.url_for("/get?param=x"), "http://host:1780/get?param=x");
        assert_eq!(c.page_url_for("/delete?param=x"), "http://192.168.1.50/delete?param=x");
        assert_eq!(c.config().transport.connect_timeout, Duration::from_secs(1));
        assert_eq!(c.config().transport.request_timeout, Duration::from_secs(2));
    }

    #[test]
    fn try_set_parameter_outside_runtime() {
        let c = client(ScriptedTransport::ok(""));
        tokio_test::assert_ok!(tokio_test::block_on(c.try_set_parameter("gain_1", 2)));
        assert_eq!(c.transport().requests()[0].url, "http://192.168.1.50/post?param=gain_1&value=2");
    }

    #[test]
    fn builder_default_is_same_origin() {
        let c = ParamClient::builder(DEVICE).build();
        assert_eq!(c.url_for("/get?param=x"), "http://192.168.1.50/get?param=x");
    }

    #[tokio::test]
    async fn overlapping_requests_complete_independently() {
        let c = client(ScriptedTransport::replying(vec![
            Ok(HttpResponse::new(200, "a")),
            Ok(HttpResponse::new(500, "")),
            Ok(HttpResponse::new(200, "7")),
        ]));
        let (a, b, d) = tokio::join!(
            c.get_parameter("hostname"),
            c.get_parameter("snapserver_host"),
            c.get_parameter("gain_1"),
        );
        let results = [a, b, d];
        assert_eq!(results.iter().filter(|r| r.is_some()).count(), 2);
        assert_eq!(c.transport().requests().len(), 3);
    }
}
