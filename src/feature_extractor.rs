//! Feature extraction for the anomaly model.
//!
//! The anomaly model sees six numeric features per transaction, always in the
//! order the synthetic training populations were generated in.

use crate::types::transaction::TransactionRequest;

/// Number of numeric features the anomaly model is trained on.
pub const FEATURE_COUNT: usize = 6;

/// Fixed-order numeric footprint of a transaction.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Transforms transactions into anomaly-model input features.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the six anomaly features from a transaction.
    pub fn extract(&self, tx: &TransactionRequest) -> FeatureVector {
        [
            tx.invoice_amount,
            tx.invoice_count_last_30d as f64,
            tx.shipment_distance_km,
            tx.shipment_delay_hours,
            tx.payment_term_days as f64,
            tx.country_risk_index,
        ]
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> [&'static str; FEATURE_COUNT] {
        [
            "invoice_amount",
            "invoice_count_last_30d",
            "shipment_distance_km",
            "shipment_delay_hours",
            "payment_term_days",
            "country_risk_index",
        ]
    }
}
