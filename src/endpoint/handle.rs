//! Addressing information for a prediction endpoint.

use reqwest::Url;
use std::fmt;
use std::time::Duration;

use crate::config::ConfigError;

/// Default network timeout for a single request in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Base URL of a model container running in local mode.
pub const LOCAL_ENDPOINT_URL: &str = "http://localhost:8080";

/// Identifies one endpoint and how to reach it.
///
/// A handle is read-only once built. It is moved into an
/// [`InferenceClient`](super::InferenceClient) for the length of a prediction
/// session and released with [`InferenceClient::close`](super::InferenceClient::close).
#[derive(Clone, PartialEq, Eq)]
pub struct EndpointHandle {
    name: String,
    base_url: Url,
    region: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for EndpointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointHandle")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("region", &self.region)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl EndpointHandle {
    /// Create a handle for an endpoint served at `base_url`.
    ///
    /// # Arguments
    /// * `name` - Endpoint identifier, used for logging.
    /// * `base_url` - Root that `/invocations` and `/ping` are appended to.
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidEndpointName(name));
        }

        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        Ok(Self {
            name,
            base_url: parsed,
            region: None,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Set the region the endpoint lives in.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a bearer credential sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the network timeout for each request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL of the prediction route.
    pub fn invocations_url(&self) -> Url {
        self.join("invocations")
    }

    /// URL of the health check route.
    pub fn ping_url(&self) -> Url {
        self.join("ping")
    }

    fn join(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        // Only fails for cannot-be-a-base URLs, which `new` rejects.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }
}
