//! Test Transaction Producer
//!
//! Generates simulated supply-chain transactions and publishes them to NATS
//! for end-to-end testing of the risk engine.
//!
//! Usage: test_producer [nats_url] [subject] [count] [network_path] [delay_ms]

use std::time::Duration;
use supply_chain_risk_engine::{SupplierNetwork, TransactionGenerator};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Transaction Producer");

    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or("supplychain.transactions");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let network_path = args
        .get(4)
        .map(|s| s.as_str())
        .unwrap_or("data/supplier_network.json");
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        network = %network_path,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let network = SupplierNetwork::load(network_path)?;

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(&network, count, delay_ms).await;
        }
    };

    let mut generator = TransactionGenerator::new();
    let mut flagged = 0u64;

    info!("Starting to publish {} transactions...", count);

    for i in 0..count {
        let transaction = generator.generate(&network);
        if transaction.sanctions_hit || transaction.split_invoice_pattern {
            flagged += 1;
        }

        let payload = serde_json::to_vec(&transaction)?;
        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} transactions ({} with sanctions or splitting flags)",
                i + 1,
                count,
                flagged
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    client.flush().await?;

    info!(
        "Completed! Published {} transactions ({} flagged)",
        count, flagged
    );

    Ok(())
}

async fn run_dry_mode(network: &SupplierNetwork, count: u64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = TransactionGenerator::new();

    for i in 0..count {
        let transaction = generator.generate(network);
        let json = serde_json::to_string_pretty(&transaction)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample transaction {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
