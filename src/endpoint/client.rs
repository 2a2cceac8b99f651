//! Client for image-classification endpoints.
//!
//! Each call is a single HTTP round trip. Nothing is retried; callers decide
//! what to do with a failure.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::handle::EndpointHandle;
use crate::inference::{InferenceRequest, InferenceResponse, ResponseDecoder, ResponseError};

/// Header carrying a per-request id the endpoint can echo into its logs.
pub const INFERENCE_ID_HEADER: &str = "X-Amzn-SageMaker-Inference-Id";

/// Inference client errors.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Endpoint returned HTTP {status}: {body}")]
    Remote { status: StatusCode, body: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] ResponseError),
    #[error("Image payload is empty")]
    EmptyPayload,
}

impl InferenceError {
    /// HTTP status for [`InferenceError::Remote`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            InferenceError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the transport gave up waiting.
    pub fn is_timeout(&self) -> bool {
        matches!(self, InferenceError::Network(e) if e.is_timeout())
    }
}

/// Sends images to one endpoint and decodes its class probabilities.
///
/// The client is cheap to clone and holds no mutable state, so one instance
/// can serve concurrent predictions over a shared connection pool.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    handle: EndpointHandle,
    decoder: ResponseDecoder,
    client: Client,
}

impl InferenceClient {
    /// Create a client for `handle` using the default dogs/cats labels.
    pub fn new(handle: EndpointHandle) -> Result<Self, InferenceError> {
        Self::with_decoder(handle, ResponseDecoder::default())
    }

    /// Create a client with a custom response decoder.
    pub fn with_decoder(
        handle: EndpointHandle,
        decoder: ResponseDecoder,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder().timeout(handle.timeout()).build()?;
        Ok(Self {
            handle,
            decoder,
            client,
        })
    }

    pub fn handle(&self) -> &EndpointHandle {
        &self.handle
    }

    pub fn decoder(&self) -> &ResponseDecoder {
        &self.decoder
    }

    /// Classify raw image bytes.
    ///
    /// The bytes are sent as they are with `Content-Type: image/jpeg`.
    ///
    /// # Errors
    /// * [`InferenceError::EmptyPayload`] if `image_bytes` is empty.
    /// * [`InferenceError::Network`] on connection failure or timeout.
    /// * [`InferenceError::Remote`] on a non-2xx status.
    /// * [`InferenceError::MalformedResponse`] if the body is not a valid
    ///   probability vector.
    pub async fn predict(&self, image_bytes: &[u8]) -> Result<InferenceResponse, InferenceError> {
        self.predict_request(InferenceRequest::new(image_bytes)).await
    }

    /// Classify a prepared request.
    pub async fn predict_request(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        if request.is_empty() {
            return Err(InferenceError::EmptyPayload);
        }

        let url = self.handle.invocations_url();
        let inference_id = Uuid::new_v4().to_string();
        debug!(
            endpoint = self.handle.name(),
            url = url.as_str(),
            inference_id = inference_id.as_str(),
            bytes = request.len(),
            "Sending inference request"
        );

        let started = Instant::now();
        let builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, request.content_type())
            .header(ACCEPT, "application/json")
            .header(INFERENCE_ID_HEADER, &inference_id)
            .body(request.into_body());
        let response = self.authorize(builder).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = self.error_body(response).await;
            warn!(
                endpoint = self.handle.name(),
                inference_id = inference_id.as_str(),
                %status,
                "Endpoint rejected inference request"
            );
            return Err(InferenceError::Remote { status, body });
        }

        let body = response.bytes().await?;
        let prediction = self.decoder.decode(&body)?;

        info!(
            endpoint = self.handle.name(),
            inference_id = inference_id.as_str(),
            label = prediction.label(),
            confidence = prediction.confidence(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prediction received"
        );
        Ok(prediction)
    }

    /// Check whether the endpoint is ready to serve `/invocations`.
    ///
    /// Returns `Ok(false)` for any status other than 200; only transport
    /// failures are errors.
    pub async fn ping(&self) -> Result<bool, InferenceError> {
        let url = self.handle.ping_url();
        let response = self.authorize(self.client.get(url)).send().await?;
        let ready = response.status() == StatusCode::OK;

        debug!(
            endpoint = self.handle.name(),
            status = %response.status(),
            ready,
            "Health check"
        );
        Ok(ready)
    }

    /// Release the client and its endpoint handle.
    ///
    /// The hosted endpoint itself is left running; tearing it down belongs to
    /// the platform.
    pub fn close(self) {
        info!(endpoint = self.handle.name(), "Closing endpoint handle");
    }

    /// Body of a rejected request, or an empty string if it cannot be read.
    async fn error_body(&self, response: Response) -> String {
        match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(
                    endpoint = self.handle.name(),
                    error = %e,
                    "Failed to read error response body"
                );
                String::new()
            }
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.handle.api_key() {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

/// One-shot prediction against `handle`.
///
/// Builds a fresh client per call; prefer [`InferenceClient`] when sending
/// more than one image.
pub async fn predict(
    handle: &EndpointHandle,
    image_bytes: &[u8],
) -> Result<InferenceResponse, InferenceError> {
    InferenceClient::new(handle.clone())?
        .predict(image_bytes)
        .await
}
