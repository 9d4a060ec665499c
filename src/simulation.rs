//! Synthetic transaction generation for demonstrations and load tests.
//!
//! Draws schema-valid requests over realistic ranges. Sanctions hits come up
//! one time in four; ownership mismatches and split invoices one time in three.

use crate::network::SupplierNetwork;
use crate::types::assessment::round_to;
use crate::types::transaction::TransactionRequest;
use rand::rngs::ThreadRng;
use rand::Rng;

/// Random transaction generator over any RNG.
pub struct TransactionGenerator<R: Rng = ThreadRng> {
    rng: R,
}

impl TransactionGenerator<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for TransactionGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TransactionGenerator<R> {
    /// Generator over a caller-supplied RNG, e.g. a seeded one for tests.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a transaction against a supplier drawn from `network`.
    ///
    /// An empty network yields a synthetic supplier id that the network does
    /// not know, so the request scores with the unknown-supplier baseline.
    pub fn generate(&mut self, network: &SupplierNetwork) -> TransactionRequest {
        let supplier_id = if network.is_empty() {
            format!("SUP-{}", self.rng.gen_range(100..=999))
        } else {
            let pick = self.rng.gen_range(0..network.len());
            network
                .supplier_ids()
                .nth(pick)
                .map(str::to_string)
                .unwrap_or_default()
        };

        TransactionRequest {
            transaction_id: format!("SIM-{}", self.rng.gen_range(10_000..=99_999)),
            supplier_id,
            buyer_id: format!("BUY-{}", self.rng.gen_range(100..=999)),
            invoice_amount: round_to(self.rng.gen_range(18_000.0..=130_000.0), 2),
            invoice_currency: "USD".to_string(),
            invoice_count_last_30d: self.rng.gen_range(4..=34),
            shipment_distance_km: round_to(self.rng.gen_range(100.0..=1_700.0), 2),
            shipment_delay_hours: round_to(self.rng.gen_range(0.0..=56.0), 2),
            payment_term_days: self.rng.gen_range(7..=70),
            contract_value: round_to(self.rng.gen_range(60_000.0..=180_000.0), 2),
            country_risk_index: round_to(self.rng.gen_range(0.12..=0.88), 3),
            sanctions_hit: self.rng.gen_ratio(1, 4),
            beneficial_owner_mismatch: self.rng.gen_ratio(1, 3),
            split_invoice_pattern: self.rng.gen_ratio(1, 3),
            tier_level: self.rng.gen_range(1..=5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SupplierNode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn network() -> SupplierNetwork {
        let mut network = SupplierNetwork::default();
        network.insert("SUP-1", SupplierNode::new(0.2, 1, vec![]));
        network.insert("SUP-2", SupplierNode::new(0.9, 2, vec!["SUP-1".into()]));
        network
    }

    #[test]
    fn test_generated_requests_are_valid() {
        let network = network();
        let mut generator = TransactionGenerator::with_rng(StdRng::seed_from_u64(7));

        for _ in 0..500 {
            let tx = generator.generate(&network);
            assert!(tx.validate().is_ok(), "invalid request: {:?}", tx);
            assert!(tx.transaction_id.starts_with("SIM-"));
            assert!(network.get(&tx.supplier_id).is_some());
            assert!((1..=5).contains(&tx.tier_level));
            assert!((0.12..=0.88).contains(&tx.country_risk_index));
            assert!((4..=34).contains(&tx.invoice_count_last_30d));
        }
    }

    #[test]
    fn test_flag_frequencies() {
        let network = network();
        let mut generator = TransactionGenerator::with_rng(StdRng::seed_from_u64(11));

        let samples: Vec<TransactionRequest> = (0..3000).map(|_| generator.generate(&network)).collect();
        let rate = |f: fn(&TransactionRequest) -> bool| {
            samples.iter().filter(|tx| f(tx)).count() as f64 / samples.len() as f64
        };

        assert!((rate(|tx| tx.sanctions_hit) - 0.25).abs() < 0.05);
        assert!((rate(|tx| tx.beneficial_owner_mismatch) - 1.0 / 3.0).abs() < 0.05);
        assert!((rate(|tx| tx.split_invoice_pattern) - 1.0 / 3.0).abs() < 0.05);
    }

    #[test]
    fn test_empty_network_uses_synthetic_supplier() {
        let mut generator = TransactionGenerator::with_rng(StdRng::seed_from_u64(3));
        let tx = generator.generate(&SupplierNetwork::default());
        assert!(tx.supplier_id.starts_with("SUP-"));
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_seeded_generation_reproducible() {
        let network = network();
        let mut a = TransactionGenerator::with_rng(StdRng::seed_from_u64(99));
        let mut b = TransactionGenerator::with_rng(StdRng::seed_from_u64(99));
        assert_eq!(a.generate(&network), b.generate(&network));
    }
}
