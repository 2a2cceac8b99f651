//! Class labels for the classifier output.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Labels in the order the training data loader assigns class indices
/// (alphabetical folder names).
pub const DEFAULT_LABELS: [&str; 2] = ["cats", "dogs"];

/// Ordered, unique class labels. Index `i` names probability `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassLabels(Vec<String>);

impl Default for ClassLabels {
    fn default() -> Self {
        Self(DEFAULT_LABELS.iter().map(|l| l.to_string()).collect())
    }
}

impl ClassLabels {
    /// Build a label set; at least two unique, non-blank labels are required.
    pub fn new<I, S>(labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();

        if labels.len() < 2 {
            return Err(ConfigError::InvalidLabels(format!(
                "expected at least 2 classes, got {}",
                labels.len()
            )));
        }
        for (i, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(ConfigError::InvalidLabels(format!(
                    "label at index {} is blank",
                    i
                )));
            }
            if labels[..i].contains(label) {
                return Err(ConfigError::InvalidLabels(format!(
                    "duplicate label {:?}",
                    label
                )));
            }
        }

        Ok(Self(labels))
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a label set holds at least two classes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.0.iter().position(|l| l == label)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for ClassLabels {
    type Error = ConfigError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<ClassLabels> for Vec<String> {
    fn from(labels: ClassLabels) -> Self {
        labels.0
    }
}
