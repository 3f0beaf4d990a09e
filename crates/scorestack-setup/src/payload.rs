//! Request payloads and re-invokable payload producers.
//!
//! A [`Payload`] is consumed by exactly one request. Operations that send the
//! same logical body more than once (probe then create, or two dashboard
//! imports) take a [`PayloadSource`] instead, and call
//! [`PayloadSource::produce`] once per request.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SetupError;

/// An owned request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&serde_json::Value> for Payload {
    fn from(value: &serde_json::Value) -> Self {
        Self(value.to_string().into_bytes())
    }
}

/// Produces a fresh payload every time it is called.
pub trait PayloadSource: Send + Sync {
    /// Returns a new, independent payload.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Payload`] if the underlying data cannot be read.
    fn produce(&self) -> Result<Payload, SetupError>;
}

impl<F> PayloadSource for F
where
    F: Fn() -> Payload + Send + Sync,
{
    fn produce(&self) -> Result<Payload, SetupError> {
        Ok(self())
    }
}

impl PayloadSource for Payload {
    fn produce(&self) -> Result<Payload, SetupError> {
        Ok(self.clone())
    }
}

/// Reads a file from disk on every call to [`PayloadSource::produce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    path: PathBuf,
}

impl FilePayload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PayloadSource for FilePayload {
    fn produce(&self) -> Result<Payload, SetupError> {
        fs::read(&self.path)
            .map(Payload::from)
            .map_err(|source| SetupError::Payload {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_source_is_called_per_produce() {
        let calls = AtomicUsize::new(0);
        let source = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Payload::from("{}")
        };

        let first = source.produce().unwrap();
        let second = source.produce().unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_produced_payloads_are_independent() {
        let source = Payload::from("abc");
        let mut first = source.produce().unwrap().into_bytes();
        first.clear();

        let second = source.produce().unwrap();
        assert_eq!(second.as_bytes(), b"abc");
    }

    #[test]
    fn test_file_payload_reads_on_every_call() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a":1}}"#).unwrap();
        let source = FilePayload::new(file.path());

        assert_eq!(source.produce().unwrap().as_bytes(), br#"{"a":1}"#);

        write!(file, "\n").unwrap();
        assert_eq!(source.produce().unwrap().len(), 8);
    }

    #[test]
    fn test_missing_file_is_payload_error() {
        let source = FilePayload::new("/nonexistent/scorestack/payload.json");
        let err = source.produce().unwrap_err();
        assert!(matches!(err, SetupError::Payload { .. }));
        assert!(err.to_string().contains("payload.json"));
    }
}
