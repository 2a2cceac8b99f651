//! Decoding of class-probability responses.
//!
//! The endpoint answers with one of two JSON shapes:
//!
//! ```json
//! [0.83, 0.17]
//! {"probabilities": [0.83, 0.17], "label": "cats"}
//! ```
//!
//! Both decode to the same [`InferenceResponse`]. In the object form the
//! `label` field is optional; when present it must name a class holding the
//! highest probability, and on a tie it selects which of those classes wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::labels::ClassLabels;
use crate::config::ConfigError;

/// Allowed distance between the probability sum and 1.0.
pub const DEFAULT_PROBABILITY_TOLERANCE: f32 = 1e-3;

/// Reasons a response body cannot be turned into a prediction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Response does not match the probability schema: {0}")]
    UnexpectedShape(String),
    #[error("Expected {expected} class probabilities, got {actual}")]
    ClassCountMismatch { expected: usize, actual: usize },
    #[error("Probability at index {index} is out of range: {value}")]
    InvalidProbability { index: usize, value: f32 },
    #[error("Probabilities sum to {sum}, expected 1.0 within {tolerance}")]
    NotNormalized { sum: f32, tolerance: f32 },
    #[error("Unknown class label {0:?}")]
    UnknownLabel(String),
    #[error("Label {label:?} disagrees with the highest probability class {expected:?}")]
    LabelMismatch { label: String, expected: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Flat(Vec<f32>),
    Wrapped {
        probabilities: Vec<f32>,
        #[serde(default)]
        label: Option<String>,
    },
}

/// A decoded prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResponse {
    probabilities: Vec<f32>,
    predicted_index: usize,
    label: String,
}

impl InferenceResponse {
    /// Per-class probabilities, in label order.
    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// Index of the predicted class, always one holding the highest probability.
    pub fn predicted_index(&self) -> usize {
        self.predicted_index
    }

    /// Label of the predicted class.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Probability of the predicted class.
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.predicted_index]
    }
}

/// Index of the largest value. Ties resolve to the lowest index.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Validates response bodies against a label set.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDecoder {
    labels: ClassLabels,
    tolerance: f32,
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self {
            labels: ClassLabels::default(),
            tolerance: DEFAULT_PROBABILITY_TOLERANCE,
        }
    }
}

impl ResponseDecoder {
    pub fn new(labels: ClassLabels) -> Self {
        Self {
            labels,
            ..Self::default()
        }
    }

    /// Set the allowed deviation of the probability sum from 1.0.
    pub fn with_tolerance(mut self, tolerance: f32) -> Result<Self, ConfigError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Decode a raw response body.
    pub fn decode(&self, body: &[u8]) -> Result<InferenceResponse, ResponseError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ResponseError::InvalidJson(e.to_string()))?;
        let wire: WireResponse = serde_json::from_value(value)
            .map_err(|e| ResponseError::UnexpectedShape(e.to_string()))?;

        match wire {
            WireResponse::Flat(probabilities) => self.decode_probabilities(probabilities, None),
            WireResponse::Wrapped {
                probabilities,
                label,
            } => self.decode_probabilities(probabilities, label),
        }
    }

    /// Build a response from already parsed probabilities.
    pub fn decode_probabilities(
        &self,
        probabilities: Vec<f32>,
        label: Option<String>,
    ) -> Result<InferenceResponse, ResponseError> {
        if probabilities.len() != self.labels.len() {
            return Err(ResponseError::ClassCountMismatch {
                expected: self.labels.len(),
                actual: probabilities.len(),
            });
        }
        if let Some((index, &value)) = probabilities
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0 || **p > 1.0)
        {
            return Err(ResponseError::InvalidProbability { index, value });
        }

        let sum: f32 = probabilities.iter().sum();
        if (sum - 1.0).abs() > self.tolerance {
            return Err(ResponseError::NotNormalized {
                sum,
                tolerance: self.tolerance,
            });
        }

        let mut predicted_index =
            argmax(&probabilities).ok_or(ResponseError::ClassCountMismatch {
                expected: self.labels.len(),
                actual: 0,
            })?;

        // A label naming any class tied for the maximum picks that class.
        if let Some(label) = label {
            let Some(index) = self.labels.index_of(&label) else {
                return Err(ResponseError::UnknownLabel(label));
            };
            if probabilities[index] != probabilities[predicted_index] {
                return Err(ResponseError::LabelMismatch {
                    label,
                    expected: self.label_at(predicted_index),
                });
            }
            predicted_index = index;
        }

        Ok(InferenceResponse {
            probabilities,
            predicted_index,
            label: self.label_at(predicted_index),
        })
    }

    fn label_at(&self, index: usize) -> String {
        self.labels.get(index).unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.83, 0.17]), Some(0));
        assert_eq!(argmax(&[0.1, 0.9]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.2, 0.3, 0.5]), Some(2));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_decode_flat_array() {
        let decoder = ResponseDecoder::default();

        let response = decoder.decode(b"[0.83, 0.17]").unwrap();
        assert_eq!(response.predicted_index(), 0);
        assert_eq!(response.label(), "cats");
        assert_eq!(response.confidence(), 0.83);

        let response = decoder.decode(b"[0.1, 0.9]").unwrap();
        assert_eq!(response.predicted_index(), 1);
        assert_eq!(response.label(), "dogs");
        assert_eq!(response.probabilities().to_vec(), vec![0.1f32, 0.9]);
    }

    #[test]
    fn test_decode_wrapped_object() {
        let decoder = ResponseDecoder::default();

        let response = decoder
            .decode(br#"{"probabilities": [0.25, 0.75], "label": "dogs"}"#)
            .unwrap();
        assert_eq!(response.predicted_index(), 1);

        let response = decoder.decode(br#"{"probabilities": [0.6, 0.4]}"#).unwrap();
        assert_eq!(response.label(), "cats");
    }

    #[test]
    fn test_decode_rejects_malformed_bodies() {
        let decoder = ResponseDecoder::default();

        assert!(matches!(
            decoder.decode(b"<html>oops</html>"),
            Err(ResponseError::InvalidJson(_))
        ));
        assert!(matches!(
            decoder.decode(br#"{"scores": [0.5, 0.5]}"#),
            Err(ResponseError::UnexpectedShape(_))
        ));
        assert!(matches!(
            decoder.decode(br#"["a", "b"]"#),
            Err(ResponseError::UnexpectedShape(_))
        ));
        assert_eq!(
            decoder.decode(b"[0.2, 0.3, 0.5]"),
            Err(ResponseError::ClassCountMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert!(matches!(
            decoder.decode(b"[1.5, -0.5]"),
            Err(ResponseError::InvalidProbability { index: 0, .. })
        ));
        assert!(matches!(
            decoder.decode(b"[0.7, 0.7]"),
            Err(ResponseError::NotNormalized { .. })
        ));
    }

    #[test]
    fn test_decode_checks_label() {
        let decoder = ResponseDecoder::default();

        assert_eq!(
            decoder.decode(br#"{"probabilities": [0.9, 0.1], "label": "birds"}"#),
            Err(ResponseError::UnknownLabel("birds".to_string()))
        );
        assert!(matches!(
            decoder.decode(br#"{"probabilities": [0.9, 0.1], "label": "dogs"}"#),
            Err(ResponseError::LabelMismatch { .. })
        ));
    }

    #[test]
    fn test_label_breaks_tie() {
        let decoder = ResponseDecoder::default();

        let response = decoder
            .decode(br#"{"probabilities": [0.5, 0.5], "label": "dogs"}"#)
            .unwrap();
        assert_eq!(response.predicted_index(), 1);
        assert_eq!(response.label(), "dogs");
        assert_eq!(response.confidence(), 0.5);

        let response = decoder.decode(br#"{"probabilities": [0.5, 0.5]}"#).unwrap();
        assert_eq!(response.label(), "cats");
    }

    #[test]
    fn test_tolerance() {
        let strict = ResponseDecoder::default().with_tolerance(0.0).unwrap();
        assert!(strict.decode(b"[0.5, 0.5]").is_ok());

        let loose = ResponseDecoder::default().with_tolerance(0.05).unwrap();
        assert!(loose.decode(b"[0.52, 0.5]").is_ok());

        assert!(ResponseDecoder::default().with_tolerance(-1.0).is_err());
        assert!(ResponseDecoder::default().with_tolerance(f32::NAN).is_err());
    }

    #[test]
    fn test_custom_labels() {
        let labels = ClassLabels::new(["cat", "dog", "fox"]).unwrap();
        let decoder = ResponseDecoder::new(labels);

        let response = decoder.decode(b"[0.1, 0.2, 0.7]").unwrap();
        assert_eq!(response.label(), "fox");
        assert!(decoder.decode(b"[0.5, 0.5]").is_err());
    }
}
