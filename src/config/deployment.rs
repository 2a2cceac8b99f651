//! Deployment configuration for the hosted endpoint.

use serde::{Deserialize, Serialize};

use super::validation::{is_local_instance, validate_endpoint_name, validate_instance, ConfigError};
use crate::endpoint::EndpointHandle;
use crate::session::Session;

/// Default CPU instance for serving.
pub const DEFAULT_HOSTING_INSTANCE: &str = "ml.t2.medium";

/// Where and how the trained model is served.
///
/// Built through [`DeploymentConfig::new`] or deserialization, both of which
/// validate every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DeploymentFile")]
pub struct DeploymentConfig {
    endpoint_name: String,
    instance_type: String,
    initial_instance_count: u32,
}

/// On-disk shape of a deployment config, before validation.
#[derive(Deserialize)]
struct DeploymentFile {
    endpoint_name: String,
    #[serde(default = "default_instance_type")]
    instance_type: String,
    #[serde(default = "default_instance_count")]
    initial_instance_count: u32,
}

fn default_instance_type() -> String {
    DEFAULT_HOSTING_INSTANCE.to_string()
}

fn default_instance_count() -> u32 {
    1
}

impl TryFrom<DeploymentFile> for DeploymentConfig {
    type Error = ConfigError;

    fn try_from(file: DeploymentFile) -> Result<Self, Self::Error> {
        DeploymentConfig::new(file.endpoint_name)?
            .with_instance(file.instance_type, file.initial_instance_count)
    }
}

impl DeploymentConfig {
    /// Create a deployment on a single default hosting instance.
    pub fn new(endpoint_name: impl Into<String>) -> Result<Self, ConfigError> {
        let config = Self {
            endpoint_name: endpoint_name.into(),
            instance_type: default_instance_type(),
            initial_instance_count: default_instance_count(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the hosting instance type and count.
    pub fn with_instance(
        mut self,
        instance_type: impl Into<String>,
        initial_instance_count: u32,
    ) -> Result<Self, ConfigError> {
        self.instance_type = instance_type.into();
        self.initial_instance_count = initial_instance_count;
        self.validate()?;
        Ok(self)
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    pub fn instance_type(&self) -> &str {
        &self.instance_type
    }

    pub fn initial_instance_count(&self) -> u32 {
        self.initial_instance_count
    }

    /// Whether the model is served by a local container.
    pub fn is_local(&self) -> bool {
        is_local_instance(&self.instance_type)
    }

    /// Handle for the endpoint once the deployment has completed.
    ///
    /// Local deployments resolve to the container on this machine regardless
    /// of the session's region.
    pub fn handle(&self, session: &Session) -> Result<EndpointHandle, ConfigError> {
        if self.is_local() {
            session.local_endpoint(&self.endpoint_name)
        } else {
            session.endpoint(&self.endpoint_name)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint_name(&self.endpoint_name)?;
        validate_instance(&self.instance_type, self.initial_instance_count)
    }
}
