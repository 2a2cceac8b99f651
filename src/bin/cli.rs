//! Dogs vs Cats - command line client for the hosted classifier
//!
//! Run with: cargo run --bin dogscats -- <command>

use anyhow::{bail, Context};
use dogscats_inference::{AppSettings, InferenceClient, InferenceRequest};
use std::env;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: dogscats <command>

Commands:
  ping                  Check whether the endpoint is ready
  predict <image>...    Classify one or more images
  settings [save]       Show (or persist) the effective settings

Environment:
  DOGSCATS_ENDPOINT_URL, DOGSCATS_ENDPOINT_NAME, DOGSCATS_REGION,
  DOGSCATS_API_KEY, DOGSCATS_TIMEOUT_SECS, DOGSCATS_LOCAL";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    // Settings file first, then environment overrides
    let mut settings = AppSettings::load();
    settings.apply_env();

    match args.get(1).map(String::as_str) {
        Some("ping") => run_ping(&settings).await,
        Some("predict") => run_predict(&settings, &args[2..]).await,
        Some("settings") => run_settings(&settings, args.get(2).map(String::as_str)),
        _ => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}

fn build_client(settings: &AppSettings) -> anyhow::Result<InferenceClient> {
    let handle = settings
        .endpoint_handle()
        .context("Invalid endpoint configuration")?;
    let decoder = settings.decoder().context("Invalid label configuration")?;
    Ok(InferenceClient::with_decoder(handle, decoder)?)
}

async fn run_ping(settings: &AppSettings) -> anyhow::Result<()> {
    let client = build_client(settings)?;
    let url = client.handle().ping_url();

    let ready = client
        .ping()
        .await
        .with_context(|| format!("Health check failed for {}", url))?;
    client.close();

    if ready {
        println!("✅ {} is ready", url);
        Ok(())
    } else {
        bail!("{} is not ready", url)
    }
}

async fn run_predict(settings: &AppSettings, paths: &[String]) -> anyhow::Result<()> {
    if paths.is_empty() {
        bail!("predict needs at least one image path\n\n{}", USAGE);
    }

    let client = build_client(settings)?;
    println!("🐾 Endpoint: {}", client.handle().invocations_url());

    // One request per image, all in flight at once
    let mut tasks = JoinSet::new();
    for (index, path) in paths.iter().cloned().enumerate() {
        let client = client.clone();
        tasks.spawn(async move {
            let result = match InferenceRequest::from_path(&path) {
                Ok(request) => client.predict_request(request).await.map_err(anyhow::Error::from),
                Err(e) => Err(anyhow::Error::from(e)),
            };
            (index, path, result)
        });
    }

    let mut results = Vec::with_capacity(paths.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.context("Prediction task panicked")?);
    }
    results.sort_by_key(|(index, _, _)| *index);

    let mut failures = 0;
    for (_, path, result) in results {
        match result {
            Ok(prediction) => {
                println!(
                    "{}: {} ({:.1}%) {:?}",
                    path,
                    prediction.label(),
                    prediction.confidence() * 100.0,
                    prediction.probabilities()
                );
            }
            Err(e) => {
                failures += 1;
                eprintln!("❌ {}: {:#}", path, e);
            }
        }
    }
    client.close();

    if failures > 0 {
        bail!("{} of {} predictions failed", failures, paths.len());
    }
    Ok(())
}

fn run_settings(settings: &AppSettings, action: Option<&str>) -> anyhow::Result<()> {
    match action {
        None => {
            let path = AppSettings::settings_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<unavailable>".to_string());
            println!("# {}", path);
            println!("{}", serde_json::to_string_pretty(settings)?);
            Ok(())
        }
        Some("save") => {
            let path = settings.save().context("Failed to save settings")?;
            println!("✅ Settings saved to {}", path.display());
            Ok(())
        }
        Some(other) => bail!("Unknown settings action {:?}\n\n{}", other, USAGE),
    }
}
