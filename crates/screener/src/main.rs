//! PHQ-9 screener - depression severity classification service
//!
//! Trains the severity model once at startup, then serves predictions
//! over HTTP until interrupted.

use anyhow::{Context, Result};
use phq9_screener::{api, config::ScreenerConfig};
use screener_lib::{
    dataset,
    health::{components, HealthRegistry},
    observability::{ScreenerMetrics, StructuredLogger},
    predictor::ModelTrainer,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting phq9-screener");

    let config = ScreenerConfig::load().context("invalid configuration")?;
    info!(
        port = config.api_port,
        corpus_path = %config.corpus_path.display(),
        n_estimators = config.n_estimators,
        seed = config.seed,
        "Screener configured"
    );

    let health_registry = HealthRegistry::new();
    let metrics = ScreenerMetrics::new();
    let logger = StructuredLogger::new(&config.service_name);

    let corpus_config = config.corpus();
    let corpus = dataset::acquire(&corpus_config, &logger);
    logger.log_corpus_loaded(corpus.source, corpus.len(), corpus.skipped_rows);

    // Training is CPU-bound and must finish before the listener is bound
    let trainer = ModelTrainer::new(config.training());
    let model = tokio::task::spawn_blocking(move || trainer.train(&corpus))
        .await
        .context("training task panicked")?
        .map_err(|err| {
            error!(event = "training_failed", error = %err, "Model training failed");
            err
        })
        .context("model training failed")?;

    logger.log_training_complete(model.metadata());
    metrics.set_model(model.metadata());
    health_registry.set_healthy(components::MODEL).await;

    let app_state = Arc::new(api::AppState::from_model(
        model,
        health_registry.clone(),
        metrics.clone(),
        logger.clone(),
    ));

    logger.log_startup(SERVICE_VERSION, config.api_port);

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            match result {
                Ok(Ok(())) => logger.log_shutdown("API server exited"),
                Ok(Err(err)) => {
                    health_registry.set_unhealthy(components::API, err.to_string()).await;
                    logger.log_shutdown("API server failed");
                    return Err(err.context("API server failed"));
                }
                Err(err) => {
                    logger.log_shutdown("API server task panicked");
                    return Err(err).context("API server task panicked");
                }
            }
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            health_registry.set_ready(false).await;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
