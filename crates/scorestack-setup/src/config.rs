use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::{Credentials, Endpoint};
use crate::error::{Service, SetupError};
use crate::health::HealthGateConfig;

pub const DEFAULT_ELASTICSEARCH_URL: &str = "https://localhost:9200";
pub const DEFAULT_KIBANA_URL: &str = "https://localhost:5601";
pub const DEFAULT_USERNAME: &str = "elastic";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    pub elasticsearch: String,
    pub kibana: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout. Unset means no timeout.
    pub request_timeout_secs: Option<u64>,
    pub health: HealthSettings,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            elasticsearch: DEFAULT_ELASTICSEARCH_URL.to_string(),
            kibana: DEFAULT_KIBANA_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
            request_timeout_secs: None,
            health: HealthSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub poll_interval_secs: u64,
    pub max_attempts: Option<u32>,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            max_attempts: None,
        }
    }
}

impl HealthSettings {
    pub fn gate_config(&self) -> HealthGateConfig {
        HealthGateConfig::new()
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_max_attempts(self.max_attempts)
    }
}

impl SetupConfig {
    /// `~/.scorestack/setup.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".scorestack").join("setup.toml"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SetupError> {
        toml::from_str(content).map_err(|e| SetupError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SetupError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| SetupError::Config(format!("{}: {e}", path.display())))
    }

    /// Loads the default config file if it exists, otherwise returns defaults.
    pub fn load_default() -> Result<Self, SetupError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        validate_url("elasticsearch", &self.elasticsearch)?;
        validate_url("kibana", &self.kibana)?;
        if self.username.is_empty() {
            return Err(SetupError::Config("username must not be empty".into()));
        }
        if self.health.poll_interval_secs == 0 {
            return Err(SetupError::Config(
                "health.poll_interval_secs must be > 0".into(),
            ));
        }
        if self.health.max_attempts == Some(0) {
            return Err(SetupError::Config("health.max_attempts must be > 0".into()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(SetupError::Config("request_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    pub fn storage_endpoint(&self) -> Endpoint {
        Endpoint::new(Service::Elasticsearch, &self.elasticsearch, self.credentials())
    }

    pub fn dashboard_endpoint(&self) -> Endpoint {
        Endpoint::new(Service::Kibana, &self.kibana, self.credentials())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), SetupError> {
    if value.is_empty() {
        return Err(SetupError::Config(format!("{field} URL must not be empty")));
    }
    let url = Url::parse(value)
        .map_err(|e| SetupError::Config(format!("{field} URL '{value}' is invalid: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SetupError::Config(format!(
            "{field} URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = SetupConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.health.gate_config(), HealthGateConfig::default());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg = SetupConfig::from_toml_str(
            r#"
            elasticsearch = "http://es:9200"
            password = "changeme"

            [health]
            max_attempts = 60
            "#,
        )
        .unwrap();

        assert_eq!(cfg.elasticsearch, "http://es:9200");
        assert_eq!(cfg.kibana, DEFAULT_KIBANA_URL);
        assert_eq!(cfg.username, DEFAULT_USERNAME);
        assert_eq!(cfg.health.poll_interval_secs, 5);
        assert_eq!(cfg.health.max_attempts, Some(60));
        assert_eq!(cfg.storage_endpoint().base_url(), "http://es:9200");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = SetupConfig {
            kibana: "ftp://kibana".into(),
            ..SetupConfig::default()
        };
        assert!(cfg.validate().is_err());

        cfg.kibana = DEFAULT_KIBANA_URL.into();
        cfg.health.poll_interval_secs = 0;
        assert!(cfg.validate().is_err());

        cfg.health.poll_interval_secs = 5;
        cfg.health.max_attempts = Some(0);
        assert!(cfg.validate().is_err());

        cfg.health.max_attempts = None;
        cfg.username.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.toml");
        fs::write(&path, "elasticsearch = 5").unwrap();

        let err = SetupConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("setup.toml"));
    }

    #[test]
    fn test_load_error_is_wrapped_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.toml");
        fs::write(&path, "elasticsearch = 5").unwrap();

        let err = SetupConfig::load(&path).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, SetupError::Config(_)));
        assert_eq!(msg.matches("invalid configuration").count(), 1);
        assert!(msg.starts_with("invalid configuration: "));
    }
}
