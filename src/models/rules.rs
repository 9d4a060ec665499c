//! Deterministic rule scoring over explicit risk conditions

use crate::types::transaction::TransactionRequest;

pub const SANCTIONS_WEIGHT: f64 = 0.45;
pub const OWNER_MISMATCH_WEIGHT: f64 = 0.20;
pub const SPLIT_INVOICE_WEIGHT: f64 = 0.15;
pub const DELAY_WEIGHT: f64 = 0.10;
pub const CONTRACT_OVERRUN_WEIGHT: f64 = 0.10;

/// Shipment delay (hours) above which the delay rule fires.
pub const DELAY_HOURS_LIMIT: f64 = 36.0;

/// Share of contract value an invoice may reach before the overrun rule fires.
pub const CONTRACT_UTILIZATION_LIMIT: f64 = 0.85;

/// Additive rule scorer. Each condition contributes independently and the sum
/// is clamped to [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleScorer;

impl RuleScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, tx: &TransactionRequest) -> f64 {
        Self::checks(tx)
            .into_iter()
            .filter(|&(fired, _)| fired)
            .map(|(_, weight)| weight)
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    fn checks(tx: &TransactionRequest) -> [(bool, f64); 5] {
        [
            (tx.sanctions_hit, SANCTIONS_WEIGHT),
            (tx.beneficial_owner_mismatch, OWNER_MISMATCH_WEIGHT),
            (tx.split_invoice_pattern, SPLIT_INVOICE_WEIGHT),
            (tx.shipment_delay_hours > DELAY_HOURS_LIMIT, DELAY_WEIGHT),
            (
                tx.invoice_amount > tx.contract_value * CONTRACT_UTILIZATION_LIMIT,
                CONTRACT_OVERRUN_WEIGHT,
            ),
        ]
    }
}
