//! Typed training hyperparameters.
//!
//! The hosting platform passes hyperparameters to the training container as a
//! flat map of strings. This type keeps them named and typed on our side and
//! only renders the string map at the boundary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::validation::ConfigError;

/// Smallest input resolution the pretrained architectures accept.
pub const MIN_IMAGE_SIZE: u32 = 32;

/// Hyperparameters for the dogs-vs-cats fine-tuning job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Number of passes over the training set.
    pub epochs: u32,
    /// Learning rate for the one-cycle schedule.
    pub learning_rate: f64,
    /// Mini-batch size.
    pub batch_size: u32,
    /// Square input resolution in pixels.
    pub image_size: u32,
    /// Pretrained backbone name.
    pub arch: String,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            epochs: 1,
            learning_rate: 0.01,
            batch_size: 64,
            image_size: 224,
            arch: "resnet34".to_string(),
        }
    }
}

impl Hyperparameters {
    /// Set the number of epochs.
    pub fn with_epochs(mut self, epochs: u32) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the input resolution.
    pub fn with_image_size(mut self, image_size: u32) -> Self {
        self.image_size = image_size;
        self
    }

    /// Set the backbone architecture.
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.epochs == 0 {
            return Err(invalid("epochs", "must be at least 1"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(invalid(
                "learning_rate",
                format!("must be a positive number, got {}", self.learning_rate),
            ));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if self.image_size < MIN_IMAGE_SIZE {
            return Err(invalid(
                "image_size",
                format!("must be at least {}, got {}", MIN_IMAGE_SIZE, self.image_size),
            ));
        }
        if self.arch.trim().is_empty() {
            return Err(invalid("arch", "must not be empty"));
        }
        Ok(())
    }

    /// Render the string-valued map handed to the training container.
    pub fn to_platform_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("epochs".to_string(), self.epochs.to_string()),
            ("lr".to_string(), self.learning_rate.to_string()),
            ("batch-size".to_string(), self.batch_size.to_string()),
            ("image-size".to_string(), self.image_size.to_string()),
            ("arch".to_string(), self.arch.clone()),
        ])
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidHyperparameter {
        name,
        reason: reason.into(),
    }
}
