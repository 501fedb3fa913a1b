use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

const DEFAULT_API_URL: &str = "https://localhost:9005";
const DEFAULT_LOG_FILE: &str = "client-dashboard.log";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the client API, without the `/api/client` suffix
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Accept self-signed certificates from the backend
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Where tracing output goes; stdout belongs to the terminal UI
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            accept_invalid_certs: false,
            log_file: default_log_file(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Values given on the command line; each one wins over the environment
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub insecure: bool,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if the file exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(api_url) = overrides.api_url {
            self.api_url = api_url;
        }
        if overrides.insecure {
            self.accept_invalid_certs = true;
        }
        if let Some(log_file) = overrides.log_file {
            self.log_file = log_file;
        }
        self
    }

    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load the environment configuration and apply command-line overrides
pub fn init(overrides: Overrides) -> Result<Config> {
    let config = Config::load()?.with_overrides(overrides);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()));
        envy::from_iter::<_, Config>(vars).unwrap()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = from_pairs(&[]);
        assert_eq!(config.api_url(), "https://localhost:9005");
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.log_file, PathBuf::from("client-dashboard.log"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn environment_values_are_read() {
        let config = from_pairs(&[
            ("API_URL", "http://10.0.0.5:8080/"),
            ("ACCEPT_INVALID_CERTS", "true"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(config.api_url(), "http://10.0.0.5:8080");
        assert!(config.accept_invalid_certs);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn command_line_overrides_environment() {
        let config = from_pairs(&[("API_URL", "http://env-host")]).with_overrides(Overrides {
            api_url: Some("http://cli-host".to_string()),
            insecure: true,
            log_file: Some(PathBuf::from("/tmp/dash.log")),
        });
        assert_eq!(config.api_url(), "http://cli-host");
        assert!(config.accept_invalid_certs);
        assert_eq!(config.log_file, PathBuf::from("/tmp/dash.log"));
    }

    #[test]
    fn missing_overrides_keep_environment() {
        let config = from_pairs(&[("API_URL", "http://env-host")]).with_overrides(Overrides::default());
        assert_eq!(config.api_url(), "http://env-host");
    }
}
