//! Prediction endpoint client.

mod client;
mod handle;
#[cfg(test)]
mod mock;

pub use client::{predict, InferenceClient, InferenceError, INFERENCE_ID_HEADER};
pub use handle::{EndpointHandle, DEFAULT_TIMEOUT_SECS, LOCAL_ENDPOINT_URL};
