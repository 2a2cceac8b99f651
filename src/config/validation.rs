//! Validation rules shared by sessions, endpoint handles, and job configs.

use thiserror::Error;

/// Maximum length of an endpoint name accepted by the hosting platform.
pub const MAX_ENDPOINT_NAME_LEN: usize = 63;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid endpoint name {0:?}: expected 1-63 alphanumerics or hyphens, not starting or ending with a hyphen")]
    InvalidEndpointName(String),
    #[error("Invalid region {0:?}")]
    InvalidRegion(String),
    #[error("Invalid class labels: {0}")]
    InvalidLabels(String),
    #[error("Invalid hyperparameter {name}: {reason}")]
    InvalidHyperparameter { name: &'static str, reason: String },
    #[error("Invalid S3 URI {0:?}")]
    InvalidS3Uri(String),
    #[error("Invalid role ARN {0:?}")]
    InvalidRoleArn(String),
    #[error("Invalid instance configuration: {0}")]
    InvalidInstance(String),
    #[error("Container image URI must not be empty")]
    EmptyImageUri,
    #[error("Invalid probability tolerance {0}")]
    InvalidTolerance(f32),
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Check an endpoint name against the platform naming rules.
pub fn validate_endpoint_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_ENDPOINT_NAME_LEN
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEndpointName(name.to_string()))
    }
}

/// Check a region identifier such as `us-east-1`.
pub fn validate_region(region: &str) -> Result<(), ConfigError> {
    let valid = !region.is_empty()
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidRegion(region.to_string()))
    }
}

/// Check that a URI points into an S3 bucket (`s3://bucket[/key]`).
pub fn validate_s3_uri(uri: &str) -> Result<(), ConfigError> {
    let bucket = uri
        .strip_prefix("s3://")
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default();

    if bucket.is_empty() {
        Err(ConfigError::InvalidS3Uri(uri.to_string()))
    } else {
        Ok(())
    }
}

/// Check that an execution role looks like an IAM role ARN.
pub fn validate_role_arn(arn: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    let valid = parts.len() == 6
        && parts[0] == "arn"
        && parts[2] == "iam"
        && parts[5].starts_with("role/")
        && parts[5].len() > "role/".len();

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidRoleArn(arn.to_string()))
    }
}

/// Whether an instance type targets local mode instead of hosted instances.
pub fn is_local_instance(instance_type: &str) -> bool {
    matches!(instance_type, "local" | "local_gpu")
}

/// Check an instance type and count.
pub fn validate_instance(instance_type: &str, count: u32) -> Result<(), ConfigError> {
    let known_family = is_local_instance(instance_type)
        || instance_type
            .strip_prefix("ml.")
            .map(|rest| rest.contains('.') && !rest.ends_with('.'))
            .unwrap_or(false);

    if !known_family {
        return Err(ConfigError::InvalidInstance(format!(
            "unknown instance type {:?}",
            instance_type
        )));
    }
    if count == 0 {
        return Err(ConfigError::InvalidInstance(
            "instance count must be at least 1".to_string(),
        ));
    }
    // Local mode runs a single container on this machine.
    if is_local_instance(instance_type) && count != 1 {
        return Err(ConfigError::InvalidInstance(format!(
            "local mode supports exactly one instance, got {}",
            count
        )));
    }

    Ok(())
}
