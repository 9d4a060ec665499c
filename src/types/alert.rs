//! Risk alert envelope published for high-risk verdicts

use crate::types::assessment::EvaluationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert emitted when a verdict reaches the configured alert band.
///
/// Wraps the deterministic [`EvaluationResult`] with identity and timing so the
/// verdict itself stays reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    /// Unique alert identifier
    pub alert_id: String,

    /// When the evaluation completed
    pub evaluated_at: DateTime<Utc>,

    /// Time spent validating and scoring, in microseconds
    pub processing_time_us: u64,

    #[serde(flatten)]
    pub result: EvaluationResult,
}

impl RiskAlert {
    pub fn new(result: EvaluationResult) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            evaluated_at: Utc::now(),
            processing_time_us: 0,
            result,
        }
    }

    pub fn with_processing_time(mut self, processing_time_us: u64) -> Self {
        self.processing_time_us = processing_time_us;
        self
    }
}
