//! Persisted settings for the `dogscats` CLI.
//! Stored in the platform-specific config directory via `directories::ProjectDirs`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;
use crate::endpoint::{EndpointHandle, DEFAULT_TIMEOUT_SECS};
use crate::inference::{ClassLabels, ResponseDecoder, DEFAULT_LABELS, DEFAULT_PROBABILITY_TOLERANCE};
use crate::session::Session;

/// Settings that can be saved and loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Explicit endpoint base URL; overrides name/region when set
    pub endpoint_url: String,
    /// Endpoint name
    pub endpoint_name: String,
    /// Hosting region
    pub region: String,
    /// Bearer credential (empty for none)
    pub api_key: String,
    /// Network timeout in seconds
    pub timeout_secs: u64,
    /// Talk to a local-mode container instead of the hosted endpoint
    pub local_mode: bool,
    /// Class labels in index order
    pub labels: Vec<String>,
    /// Allowed deviation of the probability sum from 1.0
    pub tolerance: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            endpoint_name: "dogscats-fastai".to_string(),
            region: "us-east-1".to_string(),
            api_key: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            local_mode: false,
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            tolerance: DEFAULT_PROBABILITY_TOLERANCE,
        }
    }
}

impl AppSettings {
    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "moderras", "dogscats")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path.
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.json"))
    }

    /// Load settings from the config file, falling back to defaults.
    pub fn load() -> Self {
        Self::settings_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|content| Self::from_json(&content))
            .unwrap_or_default()
    }

    /// Parse settings, backfilling fields older files left empty.
    pub fn from_json(content: &str) -> Self {
        let defaults = Self::default();
        let mut loaded: Self = match serde_json::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings file: {}", e);
                return defaults;
            }
        };

        if loaded.endpoint_name.is_empty() {
            loaded.endpoint_name = defaults.endpoint_name;
        }
        if loaded.region.is_empty() {
            loaded.region = defaults.region;
        }
        if loaded.timeout_secs == 0 {
            loaded.timeout_secs = defaults.timeout_secs;
        }
        if loaded.labels.is_empty() {
            loaded.labels = defaults.labels;
        }

        loaded
    }

    /// Save settings to the config file.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let dir = Self::config_dir().ok_or_else(|| ConfigError::Io {
            path: "<config dir>".to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine config directory",
            ),
        })?;

        fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let path = dir.join("settings.json");
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Ok(path)
    }

    /// Override fields from `DOGSCATS_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Override fields from a variable lookup. Unparseable numbers and a zero
    /// timeout are ignored.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DOGSCATS_ENDPOINT_URL") {
            self.endpoint_url = url;
        }
        if let Some(name) = lookup("DOGSCATS_ENDPOINT_NAME") {
            self.endpoint_name = name;
        }
        if let Some(region) = lookup("DOGSCATS_REGION") {
            self.region = region;
        }
        if let Some(key) = lookup("DOGSCATS_API_KEY") {
            self.api_key = key;
        }
        if let Some(timeout) = lookup("DOGSCATS_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|t| *t > 0)
        {
            self.timeout_secs = timeout;
        }
        if let Some(local) = lookup("DOGSCATS_LOCAL") {
            self.local_mode = local == "1" || local.eq_ignore_ascii_case("true");
        }
    }

    /// Session described by these settings.
    pub fn session(&self) -> Result<Session, ConfigError> {
        let session = if self.local_mode {
            Session::local()
        } else {
            Session::new(&self.region)?
        };
        let session = session.with_timeout(Duration::from_secs(self.timeout_secs));

        Ok(if self.api_key.is_empty() {
            session
        } else {
            session.with_api_key(&self.api_key)
        })
    }

    /// Endpoint handle described by these settings.
    pub fn endpoint_handle(&self) -> Result<EndpointHandle, ConfigError> {
        if self.endpoint_url.is_empty() {
            return self.session()?.endpoint(&self.endpoint_name);
        }

        let handle = EndpointHandle::new(&self.endpoint_name, &self.endpoint_url)?
            .with_timeout(Duration::from_secs(self.timeout_secs));
        Ok(if self.api_key.is_empty() {
            handle
        } else {
            handle.with_api_key(&self.api_key)
        })
    }

    /// Response decoder for the configured labels and tolerance.
    pub fn decoder(&self) -> Result<ResponseDecoder, ConfigError> {
        let labels = ClassLabels::new(self.labels.iter().cloned())?;
        ResponseDecoder::new(labels).with_tolerance(self.tolerance)
    }
}
