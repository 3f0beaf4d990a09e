use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::{Service, SetupError, TransportError};
use crate::payload::Payload;
use crate::transport::{Method, Response, Transport};

/// Header Kibana requires on state-changing requests.
pub const XSRF_HEADER: &str = "kbn-xsrf";

/// Username/password pair shared by both services.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Base URL and credentials of one service.
#[derive(Debug, Clone)]
pub struct Endpoint {
    service: Service,
    base_url: String,
    credentials: Credentials,
}

impl Endpoint {
    pub fn new(service: Service, base_url: &str, credentials: Credentials) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            service,
            base_url,
            credentials,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// reqwest-backed [`Transport`] for one endpoint.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl HttpTransport {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Builds a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] if the HTTP client cannot be built.
    pub fn with_timeout(
        endpoint: Endpoint,
        timeout: Option<Duration>,
    ) -> Result<Self, SetupError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SetupError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let creds = &self.endpoint.credentials;
        self.http
            .request(method, url)
            .basic_auth(&creds.username, Some(&creds.password))
            .header(XSRF_HEADER, "true")
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn service(&self) -> Service {
        self.endpoint.service
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Payload>,
    ) -> Result<Response, TransportError> {
        let url = self.endpoint.url(path);
        tracing::debug!(service = %self.endpoint.service, %method, path, "sending request");

        let mut req = self.request(method, &url);
        if let Some(body) = body {
            req = req
                .header(CONTENT_TYPE, "application/json")
                .body(body.into_bytes());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::new(self.endpoint.service, path, e.to_string()))?;
        let status = resp.status().as_u16();
        Ok(Response::new(status, resp))
    }
}
