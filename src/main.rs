//! Supply-Chain Risk Engine - Main Entry Point
//!
//! Fits the anomaly model, loads the supplier network, then serves
//! evaluations, network summaries and simulations over NATS.

use anyhow::Result;
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use supply_chain_risk_engine::{
    config::{AppConfig, LoggingConfig},
    consumer::{decode_request, TransactionConsumer},
    metrics::{MetricsReporter, PipelineMetrics},
    producer::{AlertProducer, ErrorReply},
    workers::WorkerPool,
    RiskAlert, RiskEngine,
};
use serde_json::json;
use tracing::{debug, error, info, warn};

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("supply_chain_risk_engine={}", logging.level).parse()?);

    if logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    info!("Starting Supply-Chain Risk Engine");
    info!(
        network = %config.network.path,
        alert_band = %config.detection.alert_band,
        "Configuration loaded"
    );

    let metrics = Arc::new(PipelineMetrics::new());

    // Model fit and network load must finish before anything is served
    let engine = Arc::new(RiskEngine::new(&config)?);
    info!(
        features = engine.feature_extractor().feature_count(),
        suppliers = engine.network().len(),
        model_ready = true,
        "Risk engine ready"
    );

    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = TransactionConsumer::new(
        client.clone(),
        &config.nats.evaluate_subject,
        &config.nats.summary_subject,
        &config.nats.simulate_subject,
    );
    let producer = Arc::new(AlertProducer::new(client.clone(), &config.nats.alert_subject));

    let metrics_clone = metrics.clone();
    let interval = config.pipeline.metrics_interval_secs;
    tokio::spawn(async move {
        MetricsReporter::new(metrics_clone, interval).start().await;
    });

    // Network summary requests
    let mut summaries = consumer.subscribe_summary().await?;
    let summary_engine = engine.clone();
    let summary_producer = producer.clone();
    tokio::spawn(async move {
        while let Some(message) = summaries.next().await {
            let Some(reply) = message.reply.as_ref().map(|r| r.to_string()) else {
                debug!("Summary request without reply subject ignored");
                continue;
            };
            let summary = summary_engine.network_summary();
            if let Err(e) = summary_producer.reply(reply, &summary).await {
                error!(error = %e, "Failed to reply with network summary");
            }
        }
    });

    // Simulation requests
    let mut simulations = consumer.subscribe_simulate().await?;
    let simulate_engine = engine.clone();
    let simulate_producer = producer.clone();
    let batch = config.pipeline.simulation_batch;
    tokio::spawn(async move {
        while let Some(message) = simulations.next().await {
            let Some(reply) = message.reply.as_ref().map(|r| r.to_string()) else {
                debug!("Simulation request without reply subject ignored");
                continue;
            };
            let samples = simulate_engine.simulate_batch(batch);
            if let Err(e) = simulate_producer
                .reply(reply, &json!({ "samples": samples }))
                .await
            {
                error!(error = %e, "Failed to reply with simulation batch");
            }
        }
    });

    let num_workers = config.pipeline.workers.max(1);
    info!(
        workers = num_workers,
        subject = %consumer.subject(),
        alerts = %producer.subject(),
        "Starting evaluation loop"
    );

    let workers = WorkerPool::new(num_workers);
    let processed_count = Arc::new(AtomicU64::new(0));
    let alert_band = config.detection.alert_band;

    let mut subscription = consumer.subscribe().await?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        // Shutdown must be observable while every worker is busy
        let permit = tokio::select! {
            permit = workers.acquire() => permit?,
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        };

        let message = tokio::select! {
            message = subscription.next() => match message {
                Some(message) => message,
                None => break,
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        };

        let engine = engine.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();
            let reply = message.reply.as_ref().map(|r| r.to_string());

            let request = match decode_request(&message.payload) {
                Ok(request) => request,
                Err(e) => {
                    metrics.record_rejection();
                    warn!(error = %e, "Rejected transaction payload");
                    if let Some(reply) = reply {
                        if let Err(e) = producer.reply(reply, &ErrorReply::new(&e)).await {
                            error!(error = %e, "Failed to reply with rejection");
                        }
                    }
                    drop(permit);
                    return;
                }
            };

            let result = engine.evaluate(&request);
            let processing_time = start_time.elapsed();
            metrics.record_evaluation(
                processing_time,
                result.risk_score,
                result.risk_band,
                &result.reason_codes,
            );

            if let Some(reply) = reply {
                if let Err(e) = producer.reply(reply, &result).await {
                    error!(
                        transaction_id = %result.transaction_id,
                        error = %e,
                        "Failed to reply with evaluation"
                    );
                }
            }

            if result.risk_band >= alert_band {
                let alert = RiskAlert::new(result)
                    .with_processing_time(processing_time.as_micros() as u64);

                match producer.publish(&alert).await {
                    Ok(()) => {
                        metrics.record_alert();
                        info!(
                            transaction_id = %alert.result.transaction_id,
                            risk_score = alert.result.risk_score,
                            risk_band = %alert.result.risk_band,
                            reason_codes = ?alert.result.reason_codes,
                            processing_time_us = alert.processing_time_us,
                            "Risk alert published"
                        );
                    }
                    Err(e) => {
                        error!(
                            transaction_id = %alert.result.transaction_id,
                            error = %e,
                            "Failed to publish risk alert"
                        );
                    }
                }
            } else {
                debug!(
                    transaction_id = %result.transaction_id,
                    risk_score = result.risk_score,
                    risk_band = %result.risk_band,
                    processing_time_us = processing_time.as_micros() as u64,
                    "Transaction evaluated (below alert band)"
                );
            }

            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
            if count % 100 == 0 {
                let stats = metrics.get_processing_stats();
                info!(
                    processed = count,
                    throughput = format!("{:.1} tx/s", metrics.get_throughput()),
                    avg_latency_us = stats.mean_us,
                    "Processing milestone"
                );
            }

            drop(permit);
        });
    }

    info!(
        in_flight = workers.in_flight(),
        "Risk engine shutting down, waiting for in-flight evaluations..."
    );
    workers.drain().await?;
    metrics.print_summary();

    Ok(())
}
