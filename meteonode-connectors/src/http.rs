//! Blocking HTTP transport for hosts with a permanent link
//!
//! [`HttpNetwork`] implements the core [`Network`] port over a `ureq` agent so
//! the same senders that drive a WiFi radio on the node can run on a
//! gateway or a development machine. There is no association step: the
//! interface always reports connected and `disconnect` is a no-op.
//!
//! Status handling follows the senders' contract. Any status line the server
//! returns, 4xx and 5xx included, comes back as an [`HttpResponse`]; only
//! failures to reach the server become [`NodeError::Transport`].

use std::time::Duration;

use meteonode_core::constants::time::UPLOAD_TIMEOUT_S;
use meteonode_core::{Credentials, HttpResponse, Network, NodeError, NodeResult};

/// `Network` backed by a `ureq::Agent`
pub struct HttpNetwork {
    agent: ureq::Agent,
}

impl HttpNetwork {
    /// Agent with the default upload timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(UPLOAD_TIMEOUT_S))
    }

    /// Agent with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(&format!("meteonode/{}", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }

    fn execute(&self, result: Result<ureq::Response, ureq::Error>) -> NodeResult<HttpResponse> {
        match result {
            Ok(response) => Ok(into_response(response)),
            Err(ureq::Error::Status(_code, response)) => Ok(into_response(response)),
            Err(ureq::Error::Transport(e)) => {
                log::warn!("HTTP transport error: {}", e);
                Err(NodeError::Transport { reason: transport_reason(e.kind()) })
            }
        }
    }
}

impl Default for HttpNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl Network for HttpNetwork {
    fn begin_connect(&mut self, _credentials: &Credentials) {}

    fn is_connected(&self) -> bool {
        true
    }

    fn disconnect(&mut self) {}

    fn send_get(&mut self, url: &str) -> NodeResult<HttpResponse> {
        self.execute(self.agent.get(url).call())
    }

    fn send_post(
        &mut self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> NodeResult<HttpResponse> {
        let mut request = self.agent.post(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }
        self.execute(request.send_string(body))
    }
}

fn into_response(response: ureq::Response) -> HttpResponse {
    let status = response.status();
    // A body that fails to decode does not change the outcome
    let body = response.into_string().unwrap_or_default();
    HttpResponse::new(status, body)
}

fn transport_reason(kind: ureq::ErrorKind) -> &'static str {
    use ureq::ErrorKind::*;
    match kind {
        InvalidUrl | UnknownScheme => "invalid url",
        Dns => "dns lookup failed",
        InsecureRequestHttpsOnly => "https required",
        ConnectionFailed => "connection failed",
        TooManyRedirects => "too many redirects",
        BadStatus | BadHeader => "malformed response",
        Io => "i/o error",
        InvalidProxyUrl | ProxyConnect | ProxyUnauthorized => "proxy error",
        HTTP => "http error",
        #[allow(unreachable_patterns)]
        _ => "transport error",
    }
}
