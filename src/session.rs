//! Explicit platform context.
//!
//! A [`Session`] carries the region, credential, and timeout that endpoint
//! handles are built from. Nothing here reads process-wide state; callers
//! construct a session and pass it to whatever needs one.

use std::time::Duration;

use crate::config::{validate_endpoint_name, validate_region, ConfigError};
use crate::endpoint::{EndpointHandle, DEFAULT_TIMEOUT_SECS, LOCAL_ENDPOINT_URL};

/// Region name used by local-mode sessions.
pub const LOCAL_REGION: &str = "local";

/// Platform context for building endpoint handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    region: String,
    api_key: Option<String>,
    timeout: Duration,
    local: bool,
}

impl Session {
    /// Create a session for a hosted region such as `us-east-1`.
    pub fn new(region: impl Into<String>) -> Result<Self, ConfigError> {
        let region = region.into();
        validate_region(&region)?;
        Ok(Self {
            region,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            local: false,
        })
    }

    /// Create a local-mode session; every endpoint resolves to the container
    /// on this machine.
    pub fn local() -> Self {
        Self {
            region: LOCAL_REGION.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            local: true,
        }
    }

    /// Set a bearer credential for endpoints built from this session.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request network timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    /// Root URL of the runtime API for this session's region.
    pub fn runtime_url(&self) -> String {
        if self.local {
            LOCAL_ENDPOINT_URL.to_string()
        } else {
            format!("https://runtime.sagemaker.{}.amazonaws.com", self.region)
        }
    }

    /// Handle for a deployed endpoint.
    pub fn endpoint(&self, name: &str) -> Result<EndpointHandle, ConfigError> {
        validate_endpoint_name(name)?;
        if self.local {
            return self.local_endpoint(name);
        }

        let url = format!("{}/endpoints/{}", self.runtime_url(), name);
        let handle = EndpointHandle::new(name, &url)?.with_region(&self.region);
        Ok(self.apply(handle))
    }

    /// Handle for a model container served on this machine.
    pub fn local_endpoint(&self, name: &str) -> Result<EndpointHandle, ConfigError> {
        validate_endpoint_name(name)?;
        let handle = EndpointHandle::new(name, LOCAL_ENDPOINT_URL)?;
        Ok(self.apply(handle))
    }

    fn apply(&self, handle: EndpointHandle) -> EndpointHandle {
        let handle = handle.with_timeout(self.timeout);
        match &self.api_key {
            Some(key) => handle.with_api_key(key),
            None => handle,
        }
    }
}
