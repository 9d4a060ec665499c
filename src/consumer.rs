//! NATS subscriptions for incoming transactions and control requests

use crate::types::transaction::{TransactionRequest, ValidationError};
use anyhow::Result;
use async_nats::{Client, Subscriber};
use thiserror::Error;
use tracing::info;

/// Why an incoming payload never reached the scoring core.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed transaction payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid transaction: {0}")]
    Invalid(#[from] ValidationError),
}

/// Parse and validate a transaction payload.
pub fn decode_request(payload: &[u8]) -> Result<TransactionRequest, DecodeError> {
    let request: TransactionRequest = serde_json::from_slice(payload)?;
    request.validate()?;
    Ok(request)
}

/// Consumer for transaction and request/reply subjects
pub struct TransactionConsumer {
    client: Client,
    evaluate_subject: String,
    summary_subject: String,
    simulate_subject: String,
}

impl TransactionConsumer {
    pub fn new(
        client: Client,
        evaluate_subject: &str,
        summary_subject: &str,
        simulate_subject: &str,
    ) -> Self {
        Self {
            client,
            evaluate_subject: evaluate_subject.to_string(),
            summary_subject: summary_subject.to_string(),
            simulate_subject: simulate_subject.to_string(),
        }
    }

    /// Subscribe to transactions awaiting evaluation
    pub async fn subscribe(&self) -> Result<Subscriber> {
        self.subscribe_to(&self.evaluate_subject).await
    }

    /// Subscribe to network summary requests
    pub async fn subscribe_summary(&self) -> Result<Subscriber> {
        self.subscribe_to(&self.summary_subject).await
    }

    /// Subscribe to simulation requests
    pub async fn subscribe_simulate(&self) -> Result<Subscriber> {
        self.subscribe_to(&self.simulate_subject).await
    }

    async fn subscribe_to(&self, subject: &str) -> Result<Subscriber> {
        let subscriber = self.client.subscribe(subject.to_string()).await?;
        info!(subject = %subject, "Subscribed");
        Ok(subscriber)
    }

    pub fn subject(&self) -> &str {
        &self.evaluate_subject
    }
}
