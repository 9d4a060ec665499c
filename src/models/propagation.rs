//! Supplier-network risk propagation
//!
//! Blends a supplier's intrinsic risk with the mean risk of its declared
//! upstream suppliers, the transaction's tier depth and its country risk.

use crate::network::{SupplierNetwork, DEFAULT_BASE_RISK};
use crate::types::transaction::{TransactionRequest, MAX_TIER_LEVEL};
use std::sync::Arc;

pub const INTRINSIC_WEIGHT: f64 = 0.45;
pub const UPSTREAM_WEIGHT: f64 = 0.35;
pub const TIER_WEIGHT: f64 = 0.2;

/// Country risk multiplier. Added on top of the weighted terms, so the raw
/// sum can exceed 1 and saturates at the clamp.
pub const GEO_WEIGHT: f64 = 0.35;

/// Score for suppliers the network does not describe.
pub const UNKNOWN_SUPPLIER_SCORE: f64 = DEFAULT_BASE_RISK;

/// Propagates network risk onto a single transaction.
#[derive(Debug, Clone)]
pub struct NetworkRiskPropagator {
    network: Arc<SupplierNetwork>,
}

impl NetworkRiskPropagator {
    pub fn new(network: Arc<SupplierNetwork>) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &SupplierNetwork {
        &self.network
    }

    pub fn score(&self, tx: &TransactionRequest) -> f64 {
        let node = match self.network.get(&tx.supplier_id) {
            Some(node) if !node.is_bare() => node,
            _ => return UNKNOWN_SUPPLIER_SCORE,
        };

        let intrinsic = node.base_risk();
        let upstream = node.upstream();
        let upstream_avg = if upstream.is_empty() {
            intrinsic
        } else {
            self.upstream_average(upstream).unwrap_or(DEFAULT_BASE_RISK)
        };

        let tier_pressure = (tx.tier_level as f64 / MAX_TIER_LEVEL as f64).min(1.0);
        let geo_pressure = tx.country_risk_index * GEO_WEIGHT;

        (intrinsic * INTRINSIC_WEIGHT
            + upstream_avg * UPSTREAM_WEIGHT
            + tier_pressure * TIER_WEIGHT
            + geo_pressure)
            .clamp(0.0, 1.0)
    }

    /// Mean base risk over upstream references present in the network.
    /// Dangling references are skipped; `None` when nothing resolves, which
    /// then reads as the unknown-supplier baseline.
    fn upstream_average(&self, upstream: &[String]) -> Option<f64> {
        let (sum, count) = upstream
            .iter()
            .filter_map(|id| self.network.get(id))
            .fold((0.0, 0usize), |(sum, count), node| {
                (sum + node.base_risk(), count + 1)
            });

        (count > 0).then(|| sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SupplierNode;

    fn network() -> Arc<SupplierNetwork> {
        let mut network = SupplierNetwork::default();
        network.insert("SUP-108", SupplierNode::new(0.8, 3, vec![]));
        network.insert(
            "SUP-200",
            SupplierNode::new(0.4, 2, vec!["SUP-108".into(), "SUP-300".into()]),
        );
        network.insert("SUP-300", SupplierNode::new(0.2, 3, vec![]));
        network.insert(
            "SUP-DANGLING",
            SupplierNode::new(0.5, 1, vec!["SUP-GONE".into(), "SUP-300".into()]),
        );
        network.insert(
            "SUP-ORPHAN",
            SupplierNode::new(0.6, 1, vec!["SUP-GONE".into()]),
        );
        network.insert("SUP-HOT", SupplierNode::new(1.0, 6, vec!["SUP-108".into()]));
        Arc::new(network)
    }

    fn request(supplier_id: &str, tier_level: u32, country_risk_index: f64) -> TransactionRequest {
        let mut tx = TransactionRequest::new("TXN".into(), supplier_id.into(), "BUY".into());
        tx.tier_level = tier_level;
        tx.country_risk_index = country_risk_index;
        tx
    }

    #[test]
    fn test_unknown_supplier_baseline() {
        let propagator = NetworkRiskPropagator::new(network());
        for tier in 1..=6 {
            let tx = request("SUP-NOPE", tier, 1.0);
            assert_eq!(propagator.score(&tx), 0.3);
        }
    }

    #[test]
    fn test_bare_node_scores_as_unknown() {
        let network =
            SupplierNetwork::from_json(r#"{"suppliers": {"SUP-X": {}}}"#).unwrap();
        let propagator = NetworkRiskPropagator::new(Arc::new(network));
        assert_eq!(propagator.score(&request("SUP-X", 6, 1.0)), 0.3);
    }

    #[test]
    fn test_empty_upstream_uses_intrinsic() {
        let propagator = NetworkRiskPropagator::new(network());
        let score = propagator.score(&request("SUP-108", 3, 0.5));

        // 0.8*0.45 + 0.8*0.35 + 0.5*0.2 + 0.5*0.35
        assert!((score - 0.915).abs() < 1e-9);
    }

    #[test]
    fn test_upstream_mean() {
        let propagator = NetworkRiskPropagator::new(network());
        let score = propagator.score(&request("SUP-200", 2, 0.0));

        let expected = 0.4 * 0.45 + 0.5 * 0.35 + (2.0 / 6.0) * 0.2;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_dangling_upstream_skipped() {
        let propagator = NetworkRiskPropagator::new(network());

        // Only SUP-300 resolves, so the mean is 0.2
        let score = propagator.score(&request("SUP-DANGLING", 1, 0.0));
        let expected = 0.5 * 0.45 + 0.2 * 0.35 + (1.0 / 6.0) * 0.2;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unresolved_upstream_uses_baseline() {
        let propagator = NetworkRiskPropagator::new(network());

        // Non-empty upstream with nothing resolvable reads as 0.3, not intrinsic
        let score = propagator.score(&request("SUP-ORPHAN", 1, 0.0));
        let expected = 0.6 * 0.45 + 0.3 * 0.35 + (1.0 / 6.0) * 0.2;
        assert!((score - expected).abs() < 1e-9);
        assert_eq!((score * 1e4).round() / 1e4, 0.4083);
    }

    #[test]
    fn test_null_node_scores_as_unknown() {
        let network =
            SupplierNetwork::from_json(r#"{"suppliers": {"SUP-NULL": null}}"#).unwrap();
        let propagator = NetworkRiskPropagator::new(Arc::new(network));
        assert_eq!(propagator.score(&request("SUP-NULL", 6, 1.0)), 0.3);
    }

    #[test]
    fn test_saturates_at_one() {
        let propagator = NetworkRiskPropagator::new(network());
        // 0.45 + 0.28 + 0.2 + 0.35 > 1
        assert_eq!(propagator.score(&request("SUP-HOT", 6, 1.0)), 1.0);
    }
}
