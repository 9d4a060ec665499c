//! Evaluation verdicts returned by the scoring engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical risk verdict, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "high")]
    High,
    #[serde(alias = "critical")]
    Critical,
}

impl RiskBand {
    pub const CRITICAL_FLOOR: f64 = 0.78;
    pub const HIGH_FLOOR: f64 = 0.58;
    pub const MEDIUM_FLOOR: f64 = 0.36;

    /// Band for a composite risk score. Lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= Self::CRITICAL_FLOOR {
            RiskBand::Critical
        } else if score >= Self::HIGH_FLOOR {
            RiskBand::High
        } else if score >= Self::MEDIUM_FLOOR {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }

    /// Operational action attached to the band.
    pub fn recommendation(self) -> &'static str {
        match self {
            RiskBand::Critical => {
                "Block payment, run enhanced due diligence, and notify compliance immediately."
            }
            RiskBand::High => {
                "Hold transaction, request ownership proof, and perform manual review."
            }
            RiskBand::Medium => {
                "Approve conditionally and monitor counterparty activity for 30 days."
            }
            RiskBand::Low => "Approve with standard controls.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
            RiskBand::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable explanation tag attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    AnomalousTransactionPattern,
    RuleAlertTriggered,
    SupplierNetworkRiskPropagation,
    SanctionsProximity,
    InvoiceSplittingSignal,
    NoMaterialAlerts,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::AnomalousTransactionPattern => "ANOMALOUS_TRANSACTION_PATTERN",
            ReasonCode::RuleAlertTriggered => "RULE_ALERT_TRIGGERED",
            ReasonCode::SupplierNetworkRiskPropagation => "SUPPLIER_NETWORK_RISK_PROPAGATION",
            ReasonCode::SanctionsProximity => "SANCTIONS_PROXIMITY",
            ReasonCode::InvoiceSplittingSignal => "INVOICE_SPLITTING_SIGNAL",
            ReasonCode::NoMaterialAlerts => "NO_MATERIAL_ALERTS",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-signal sub-scores, each in [0, 1] and rounded to 4 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub anomaly_score: f64,
    pub rule_score: f64,
    pub network_score: f64,
}

/// Explainable verdict for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub transaction_id: String,

    /// Composite score in [0, 1], rounded to 4 decimals
    pub risk_score: f64,

    pub risk_band: RiskBand,

    pub score_breakdown: ScoreBreakdown,

    /// Never empty; each code appears at most once
    pub reason_codes: Vec<ReasonCode>,

    pub recommendation: String,
}

/// Read-only aggregate view over the supplier network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub total_suppliers: usize,
    pub max_tier: u32,
    /// Mean base risk, rounded to 3 decimals
    pub average_base_risk: f64,
    /// Suppliers with base risk above 0.75, in network order
    pub critical_suppliers: Vec<String>,
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
