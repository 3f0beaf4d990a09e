//! In-memory transport used by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::{Service, TransportError};
use crate::payload::Payload;
use crate::transport::{Method, Response, Transport};

pub(crate) enum Reply {
    Status(u16, String),
    Fail,
}

impl Reply {
    pub(crate) fn ok(status: u16, body: &str) -> Self {
        Self::Status(status, body.to_string())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Vec<u8>>,
    pub at: Instant,
}

/// Answers requests from a fixed script, in order, and records them.
pub(crate) struct ScriptedTransport {
    service: Service,
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub(crate) fn new(service: Service, replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            service,
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn service(&self) -> Service {
        self.service
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Payload>,
    ) -> Result<Response, TransportError> {
        self.requests.lock().unwrap().push(Recorded {
            method,
            path: path.to_string(),
            body: body.map(Payload::into_bytes),
            at: Instant::now(),
        });
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Status(status, body)) => Ok(Response::new(status, body)),
            Some(Reply::Fail) => Err(TransportError::new(self.service, path, "connection refused")),
            None => Err(TransportError::new(self.service, path, "script exhausted")),
        }
    }
}
