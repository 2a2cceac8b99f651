//! Training job configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::hyperparameters::Hyperparameters;
use super::validation::{validate_instance, validate_role_arn, validate_s3_uri, ConfigError};

/// Default GPU instance for fine-tuning.
pub const DEFAULT_TRAINING_INSTANCE: &str = "ml.p2.xlarge";

/// Everything the platform needs to launch the training container.
///
/// Instances are only built through [`TrainingJobConfig::new`] or
/// deserialization, both of which validate every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrainingJobFile")]
pub struct TrainingJobConfig {
    image_uri: String,
    role_arn: String,
    instance_type: String,
    instance_count: u32,
    train_data_uri: String,
    output_uri: String,
    hyperparameters: Hyperparameters,
}

/// On-disk shape of a training job config, before validation.
#[derive(Deserialize)]
struct TrainingJobFile {
    image_uri: String,
    role_arn: String,
    #[serde(default = "default_instance_type")]
    instance_type: String,
    #[serde(default = "default_instance_count")]
    instance_count: u32,
    train_data_uri: String,
    output_uri: String,
    #[serde(default)]
    hyperparameters: Hyperparameters,
}

fn default_instance_type() -> String {
    DEFAULT_TRAINING_INSTANCE.to_string()
}

fn default_instance_count() -> u32 {
    1
}

impl TryFrom<TrainingJobFile> for TrainingJobConfig {
    type Error = ConfigError;

    fn try_from(file: TrainingJobFile) -> Result<Self, Self::Error> {
        TrainingJobConfig::new(
            file.image_uri,
            file.role_arn,
            file.train_data_uri,
            file.output_uri,
        )?
        .with_instance(file.instance_type, file.instance_count)?
        .with_hyperparameters(file.hyperparameters)
    }
}

impl TrainingJobConfig {
    /// Create a config with the default instance and hyperparameters.
    ///
    /// # Arguments
    /// * `image_uri` - Container image holding the training script.
    /// * `role_arn` - IAM role the job runs under.
    /// * `train_data_uri` - S3 prefix holding the `train/` and `valid/` folders.
    /// * `output_uri` - S3 prefix receiving the packaged model artifacts.
    pub fn new(
        image_uri: impl Into<String>,
        role_arn: impl Into<String>,
        train_data_uri: impl Into<String>,
        output_uri: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            image_uri: image_uri.into(),
            role_arn: role_arn.into(),
            instance_type: default_instance_type(),
            instance_count: default_instance_count(),
            train_data_uri: train_data_uri.into(),
            output_uri: output_uri.into(),
            hyperparameters: Hyperparameters::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replace the instance type and count.
    pub fn with_instance(
        mut self,
        instance_type: impl Into<String>,
        instance_count: u32,
    ) -> Result<Self, ConfigError> {
        self.instance_type = instance_type.into();
        self.instance_count = instance_count;
        self.validate()?;
        Ok(self)
    }

    /// Replace the hyperparameters.
    pub fn with_hyperparameters(
        mut self,
        hyperparameters: Hyperparameters,
    ) -> Result<Self, ConfigError> {
        self.hyperparameters = hyperparameters;
        self.validate()?;
        Ok(self)
    }

    pub fn image_uri(&self) -> &str {
        &self.image_uri
    }

    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    pub fn instance_type(&self) -> &str {
        &self.instance_type
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn train_data_uri(&self) -> &str {
        &self.train_data_uri
    }

    pub fn output_uri(&self) -> &str {
        &self.output_uri
    }

    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    /// Hyperparameters in the string-valued form the platform expects.
    pub fn platform_hyperparameters(&self) -> BTreeMap<String, String> {
        self.hyperparameters.to_platform_map()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.image_uri.trim().is_empty() {
            return Err(ConfigError::EmptyImageUri);
        }
        validate_role_arn(&self.role_arn)?;
        validate_instance(&self.instance_type, self.instance_count)?;
        validate_s3_uri(&self.train_data_uri)?;
        validate_s3_uri(&self.output_uri)?;
        self.hyperparameters.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = "123456789012.dkr.ecr.us-east-1.amazonaws.com/fastai-dogscats:latest";
    const ROLE: &str = "arn:aws:iam::123456789012:role/SageMakerRole";

    fn sample() -> TrainingJobConfig {
        TrainingJobConfig::new(IMAGE, ROLE, "s3://bucket/dogscats", "s3://bucket/output").unwrap()
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = sample();
        assert_eq!(config.instance_type(), DEFAULT_TRAINING_INSTANCE);
        assert_eq!(config.instance_count(), 1);
        assert_eq!(config.hyperparameters(), &Hyperparameters::default());
        assert_eq!(config.platform_hyperparameters()["epochs"], "1");
    }

    #[test]
    fn test_new_rejects_invalid_fields() {
        assert!(matches!(
            TrainingJobConfig::new("", ROLE, "s3://b/d", "s3://b/o"),
            Err(ConfigError::EmptyImageUri)
        ));
        assert!(matches!(
            TrainingJobConfig::new(IMAGE, "role", "s3://b/d", "s3://b/o"),
            Err(ConfigError::InvalidRoleArn(_))
        ));
        assert!(matches!(
            TrainingJobConfig::new(IMAGE, ROLE, "/data/dogscats", "s3://b/o"),
            Err(ConfigError::InvalidS3Uri(_))
        ));
    }

    #[test]
    fn test_with_instance_and_hyperparameters() {
        let config = sample().with_instance("local", 1).unwrap();
        assert_eq!(config.instance_type(), "local");

        assert!(sample().with_instance("ml.p3.2xlarge", 0).is_err());
        assert!(sample()
            .with_hyperparameters(Hyperparameters::default().with_batch_size(0))
            .is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = format!(
            r#"{{
                "image_uri": "{IMAGE}",
                "role_arn": "{ROLE}",
                "train_data_uri": "s3://bucket/dogscats",
                "output_uri": "s3://bucket/output",
                "hyperparameters": {{ "epochs": 2 }}
            }}"#
        );
        let config: TrainingJobConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.hyperparameters().epochs, 2);
        assert_eq!(config.instance_type(), DEFAULT_TRAINING_INSTANCE);

        let bad = json.replace("s3://bucket/output", "bucket/output");
        assert!(serde_json::from_str::<TrainingJobConfig>(&bad).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("training-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, serde_json::to_string(&sample()).unwrap()).unwrap();

        let loaded = TrainingJobConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, sample());

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            TrainingJobConfig::from_json_file(&path),
            Err(ConfigError::Io { .. })
        ));
    }
}
