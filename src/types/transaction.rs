//! Supply-chain transaction submitted for risk evaluation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest and highest supply-chain tier a transaction may declare.
pub const MIN_TIER_LEVEL: u32 = 1;
pub const MAX_TIER_LEVEL: u32 = 6;

/// A single invoice/shipment event between a buyer and a supplier.
///
/// Constructed per message, evaluated once and dropped. Numeric bounds are
/// checked by [`TransactionRequest::validate`] before the request reaches the
/// scoring core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Unique transaction identifier
    pub transaction_id: String,

    /// Supplier identifier, looked up in the supplier network
    pub supplier_id: String,

    /// Buyer identifier
    pub buyer_id: String,

    /// Invoice amount in `invoice_currency`
    pub invoice_amount: f64,

    #[serde(default = "default_currency")]
    pub invoice_currency: String,

    /// Invoices raised by this supplier in the last 30 days
    pub invoice_count_last_30d: u32,

    pub shipment_distance_km: f64,

    pub shipment_delay_hours: f64,

    pub payment_term_days: u32,

    /// Value of the governing contract
    pub contract_value: f64,

    /// Country risk index in [0, 1]
    pub country_risk_index: f64,

    #[serde(default)]
    pub sanctions_hit: bool,

    #[serde(default)]
    pub beneficial_owner_mismatch: bool,

    #[serde(default)]
    pub split_invoice_pattern: bool,

    /// Declared tier of the supplier in the chain (1..=6)
    pub tier_level: u32,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Reasons a request is rejected before scoring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("transaction_id must not be empty")]
    EmptyTransactionId,

    #[error("{field} must be a finite value >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("country_risk_index must be within [0, 1], got {0}")]
    CountryRiskOutOfRange(f64),

    #[error("tier_level must be within [1, 6], got {0}")]
    TierOutOfRange(u32),
}

impl TransactionRequest {
    /// Create a request with neutral values for every optional signal.
    pub fn new(transaction_id: String, supplier_id: String, buyer_id: String) -> Self {
        Self {
            transaction_id,
            supplier_id,
            buyer_id,
            invoice_amount: 0.0,
            invoice_currency: default_currency(),
            invoice_count_last_30d: 0,
            shipment_distance_km: 0.0,
            shipment_delay_hours: 0.0,
            payment_term_days: 0,
            contract_value: 0.0,
            country_risk_index: 0.0,
            sanctions_hit: false,
            beneficial_owner_mismatch: false,
            split_invoice_pattern: false,
            tier_level: MIN_TIER_LEVEL,
        }
    }

    /// Check every field bound the scoring core relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.transaction_id.trim().is_empty() {
            return Err(ValidationError::EmptyTransactionId);
        }

        let non_negative = [
            ("invoice_amount", self.invoice_amount),
            ("shipment_distance_km", self.shipment_distance_km),
            ("shipment_delay_hours", self.shipment_delay_hours),
            ("contract_value", self.contract_value),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::Negative { field, value });
            }
        }

        if !(0.0..=1.0).contains(&self.country_risk_index) {
            return Err(ValidationError::CountryRiskOutOfRange(
                self.country_risk_index,
            ));
        }

        if !(MIN_TIER_LEVEL..=MAX_TIER_LEVEL).contains(&self.tier_level) {
            return Err(ValidationError::TierOutOfRange(self.tier_level));
        }

        Ok(())
    }
}
