//! NATS publishing for risk alerts and request replies

use crate::types::alert::RiskAlert;
use anyhow::Result;
use async_nats::Client;
use serde::Serialize;
use tracing::debug;

/// Producer for publishing risk alerts and replying to requests
#[derive(Clone)]
pub struct AlertProducer {
    client: Client,
    subject: String,
}

impl AlertProducer {
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a risk alert
    pub async fn publish(&self, alert: &RiskAlert) -> Result<()> {
        let payload = serde_json::to_vec(alert)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            alert_id = %alert.alert_id,
            transaction_id = %alert.result.transaction_id,
            risk_score = alert.result.risk_score,
            "Published risk alert"
        );

        Ok(())
    }

    /// Send a JSON body to a request's reply subject
    pub async fn reply<T: Serialize>(&self, reply_subject: String, body: &T) -> Result<()> {
        let payload = serde_json::to_vec(body)?;
        self.client.publish(reply_subject, payload.into()).await?;
        Ok(())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Error body returned to requesters whose payload was rejected.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReply {
    pub error: String,
}

impl ErrorReply {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
