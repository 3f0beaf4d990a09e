use async_trait::async_trait;

pub use reqwest::Method;

use crate::error::{BodyError, Service, TransportError};
use crate::payload::Payload;

/// A response body that can be read to completion once.
///
/// Dropping the body without reading it releases the underlying connection.
#[async_trait]
pub trait ResponseBody: Send {
    async fn into_text(self: Box<Self>) -> Result<String, BodyError>;
}

#[async_trait]
impl ResponseBody for reqwest::Response {
    async fn into_text(self: Box<Self>) -> Result<String, BodyError> {
        self.text().await.map_err(|e| BodyError(e.to_string()))
    }
}

#[async_trait]
impl ResponseBody for String {
    async fn into_text(self: Box<Self>) -> Result<String, BodyError> {
        Ok(*self)
    }
}

/// Status code plus an owned body.
pub struct Response {
    status: u16,
    body: Box<dyn ResponseBody>,
}

impl Response {
    pub fn new(status: u16, body: impl ResponseBody + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reads the whole body as text, consuming the response.
    pub async fn text(self) -> Result<String, BodyError> {
        self.body.into_text().await
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Executes requests against one remote service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which service this transport is bound to.
    fn service(&self) -> Service;

    /// Sends `method path` with an optional body.
    ///
    /// An `Err` means no response was received. Any HTTP status, including
    /// errors, is an `Ok` response.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Payload>,
    ) -> Result<Response, TransportError>;
}
