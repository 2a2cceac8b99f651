//! Request and response types for image classification.

mod labels;
mod request;
mod response;

pub use labels::{ClassLabels, DEFAULT_LABELS};
pub use request::{InferenceRequest, RequestError, JPEG_CONTENT_TYPE};
pub use response::{
    argmax, InferenceResponse, ResponseDecoder, ResponseError, DEFAULT_PROBABILITY_TOLERANCE,
};
