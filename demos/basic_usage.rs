//! Basic usage example for the dogs-vs-cats client.
//!
//! Start the model container in local mode first (it listens on port 8080),
//! then run with: cargo run --example basic_usage -- path/to/image.jpg

use dogscats_inference::{
    DeploymentConfig, Hyperparameters, InferenceClient, InferenceRequest, Session,
    TrainingJobConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    // Typed job configuration, validated as it is built
    let training = TrainingJobConfig::new(
        "123456789012.dkr.ecr.us-east-1.amazonaws.com/fastai-dogscats:latest",
        "arn:aws:iam::123456789012:role/SageMakerRole",
        "s3://my-bucket/dogscats",
        "s3://my-bucket/output",
    )?
    .with_instance("local", 1)?
    .with_hyperparameters(Hyperparameters::default().with_epochs(1))?;
    println!("🧪 Hyperparameters: {:?}", training.platform_hyperparameters());

    // Local deployment resolves to the container on this machine
    let session = Session::local();
    let deployment = DeploymentConfig::new("dogscats-local")?.with_instance("local", 1)?;
    let client = InferenceClient::new(deployment.handle(&session)?)?;

    if !client.ping().await? {
        eprintln!("❌ Container is not ready");
        return Ok(());
    }

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/dogscats/test1/1.jpg".to_string());
    let request = InferenceRequest::from_path(&path)?;

    match client.predict_request(request).await {
        Ok(prediction) => {
            println!(
                "\n✅ {} -> {} ({:.1}%)",
                path,
                prediction.label(),
                prediction.confidence() * 100.0
            );
        }
        Err(e) => {
            eprintln!("\n❌ Prediction failed: {}", e);
        }
    }

    client.close();
    Ok(())
}
