//! Typed configuration for training and hosting the classifier.

mod deployment;
mod hyperparameters;
mod training;
mod validation;

pub use deployment::{DeploymentConfig, DEFAULT_HOSTING_INSTANCE};
pub use hyperparameters::{Hyperparameters, MIN_IMAGE_SIZE};
pub use training::{TrainingJobConfig, DEFAULT_TRAINING_INSTANCE};
pub use validation::{
    is_local_instance, validate_endpoint_name, validate_region, ConfigError,
    MAX_ENDPOINT_NAME_LEN,
};
