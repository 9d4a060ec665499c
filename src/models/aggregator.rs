//! Composite risk aggregation: weights, band, reason codes, recommendation

use crate::types::assessment::{round_to, EvaluationResult, ReasonCode, RiskBand, ScoreBreakdown};
use crate::types::transaction::TransactionRequest;

pub const ANOMALY_WEIGHT: f64 = 0.44;
pub const RULE_WEIGHT: f64 = 0.28;
pub const NETWORK_WEIGHT: f64 = 0.28;

/// Sub-score above which the signal is named in the reason codes.
pub const ANOMALY_ALERT_LEVEL: f64 = 0.6;
pub const RULE_ALERT_LEVEL: f64 = 0.4;
pub const NETWORK_ALERT_LEVEL: f64 = 0.55;

/// Unrounded sub-scores for one transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalScores {
    pub anomaly: f64,
    pub rule: f64,
    pub network: f64,
}

/// Combines the three signals into an explainable verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeRiskAggregator;

impl CompositeRiskAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Weighted composite score in [0, 1].
    pub fn combine(&self, scores: &SignalScores) -> f64 {
        (scores.anomaly * ANOMALY_WEIGHT
            + scores.rule * RULE_WEIGHT
            + scores.network * NETWORK_WEIGHT)
            .clamp(0.0, 1.0)
    }

    /// Reason codes in fixed order; `NoMaterialAlerts` when nothing fired.
    pub fn reason_codes(&self, tx: &TransactionRequest, scores: &SignalScores) -> Vec<ReasonCode> {
        let mut codes = Vec::with_capacity(5);

        if scores.anomaly > ANOMALY_ALERT_LEVEL {
            codes.push(ReasonCode::AnomalousTransactionPattern);
        }
        if scores.rule > RULE_ALERT_LEVEL {
            codes.push(ReasonCode::RuleAlertTriggered);
        }
        if scores.network > NETWORK_ALERT_LEVEL {
            codes.push(ReasonCode::SupplierNetworkRiskPropagation);
        }
        if tx.sanctions_hit {
            codes.push(ReasonCode::SanctionsProximity);
        }
        if tx.split_invoice_pattern {
            codes.push(ReasonCode::InvoiceSplittingSignal);
        }
        if codes.is_empty() {
            codes.push(ReasonCode::NoMaterialAlerts);
        }

        codes
    }

    /// Build the verdict. Band and codes use unrounded scores; only the
    /// reported numbers are rounded to 4 decimals.
    pub fn aggregate(&self, tx: &TransactionRequest, scores: &SignalScores) -> EvaluationResult {
        let risk_score = self.combine(scores);
        let risk_band = RiskBand::from_score(risk_score);

        EvaluationResult {
            transaction_id: tx.transaction_id.clone(),
            risk_score: round_to(risk_score, 4),
            risk_band,
            score_breakdown: ScoreBreakdown {
                anomaly_score: round_to(scores.anomaly, 4),
                rule_score: round_to(scores.rule, 4),
                network_score: round_to(scores.network, 4),
            },
            reason_codes: self.reason_codes(tx, scores),
            recommendation: risk_band.recommendation().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx() -> TransactionRequest {
        TransactionRequest::new("TXN-7".into(), "SUP-1".into(), "BUY-1".into())
    }

    fn scores(anomaly: f64, rule: f64, network: f64) -> SignalScores {
        SignalScores {
            anomaly,
            rule,
            network,
        }
    }

    #[test]
    fn test_weighted_combination() {
        let aggregator = CompositeRiskAggregator::new();
        let combined = aggregator.combine(&scores(0.5, 0.5, 0.5));
        assert!((combined - 0.5).abs() < 1e-12);

        assert_eq!(aggregator.combine(&scores(0.0, 0.0, 0.0)), 0.0);
        assert!((aggregator.combine(&scores(1.0, 1.0, 1.0)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_quiet_transaction() {
        let result = CompositeRiskAggregator::new().aggregate(&tx(), &scores(0.2, 0.0, 0.3));

        assert_eq!(result.transaction_id, "TXN-7");
        assert_eq!(result.reason_codes, vec![ReasonCode::NoMaterialAlerts]);
        assert_eq!(result.risk_band, RiskBand::Low);
        assert_eq!(result.recommendation, "Approve with standard controls.");
        // 0.2*0.44 + 0.3*0.28
        assert_eq!(result.risk_score, 0.172);
    }

    #[test]
    fn test_reason_code_order() {
        let mut request = tx();
        request.sanctions_hit = true;
        request.split_invoice_pattern = true;

        let codes = CompositeRiskAggregator::new().reason_codes(&request, &scores(0.9, 0.8, 0.7));
        assert_eq!(
            codes,
            vec![
                ReasonCode::AnomalousTransactionPattern,
                ReasonCode::RuleAlertTriggered,
                ReasonCode::SupplierNetworkRiskPropagation,
                ReasonCode::SanctionsProximity,
                ReasonCode::InvoiceSplittingSignal,
            ]
        );
    }

    #[test]
    fn test_alert_levels_are_strict() {
        let codes = CompositeRiskAggregator::new().reason_codes(&tx(), &scores(0.6, 0.4, 0.55));
        assert_eq!(codes, vec![ReasonCode::NoMaterialAlerts]);
    }

    #[test]
    fn test_band_uses_unrounded_score() {
        // Composite of 0.779995 is reported near 0.78 but stays High
        let network = (0.779995 - ANOMALY_WEIGHT - RULE_WEIGHT) / NETWORK_WEIGHT;
        let result = CompositeRiskAggregator::new().aggregate(&tx(), &scores(1.0, 1.0, network));
        assert_eq!(result.risk_band, RiskBand::High);
    }

    #[test]
    fn test_critical_verdict() {
        let mut request = tx();
        request.sanctions_hit = true;
        let result = CompositeRiskAggregator::new().aggregate(&request, &scores(0.95, 0.9, 0.9));

        assert_eq!(result.risk_band, RiskBand::Critical);
        assert!(result.recommendation.starts_with("Block payment"));
        assert!(result.reason_codes.contains(&ReasonCode::SanctionsProximity));
    }
}
