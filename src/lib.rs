// Copyright 2025 ModerRAS
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Dogs vs Cats Inference
//!
//! Client for a fast.ai dogs-vs-cats classifier packaged as a container and
//! hosted on a managed ML platform.
//!
//! Training and hosting happen on the platform. This crate covers the parts
//! that run on the caller's side: typed job configuration, an explicit
//! session, and the `/invocations` + `/ping` contract of the served model.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dogscats_inference::{InferenceClient, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = Session::new("us-east-1")?;
//!     let client = InferenceClient::new(session.endpoint("dogscats-fastai")?)?;
//!
//!     let image = std::fs::read("cat.jpg")?;
//!     let prediction = client.predict(&image).await?;
//!     println!("{} ({:.1}%)", prediction.label(), prediction.confidence() * 100.0);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod endpoint;
pub mod inference;
pub mod session;
pub mod settings;

pub use config::{ConfigError, DeploymentConfig, Hyperparameters, TrainingJobConfig};
pub use endpoint::{predict, EndpointHandle, InferenceClient, InferenceError};
pub use inference::{
    ClassLabels, InferenceRequest, InferenceResponse, RequestError, ResponseDecoder,
    ResponseError,
};
pub use session::Session;
pub use settings::AppSettings;
