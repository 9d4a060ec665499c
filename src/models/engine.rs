//! Risk engine: the immutable service object behind every evaluation.
//!
//! Built once at startup (model fit + network load), then shared read-only
//! through an `Arc`. Evaluations never mutate it, so any number of tasks may
//! score concurrently without locking.

use crate::config::{AnomalyConfig, AppConfig};
use crate::feature_extractor::FeatureExtractor;
use crate::models::aggregator::{CompositeRiskAggregator, SignalScores};
use crate::models::anomaly::AnomalyScorer;
use crate::models::propagation::NetworkRiskPropagator;
use crate::models::rules::RuleScorer;
use crate::network::SupplierNetwork;
use crate::simulation::TransactionGenerator;
use crate::types::assessment::{EvaluationResult, NetworkSummary};
use crate::types::transaction::TransactionRequest;
use anyhow::Result;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

/// Composite fraud-risk scoring engine.
pub struct RiskEngine {
    extractor: FeatureExtractor,
    anomaly: AnomalyScorer,
    rules: RuleScorer,
    propagator: NetworkRiskPropagator,
    aggregator: CompositeRiskAggregator,
}

impl RiskEngine {
    /// Load the network and fit the anomaly model from configuration.
    ///
    /// Fails when the network file is missing or unreadable, or when the
    /// anomaly parameters cannot produce a model.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let network = SupplierNetwork::load(&config.network.path)?;
        Self::with_network(network, &config.anomaly)
    }

    /// Build an engine over an already loaded network.
    pub fn with_network(network: SupplierNetwork, anomaly: &AnomalyConfig) -> Result<Self> {
        let anomaly = AnomalyScorer::fit(anomaly)?;
        let network = Arc::new(network);

        info!(
            suppliers = network.len(),
            "Risk engine initialized"
        );

        Ok(Self {
            extractor: FeatureExtractor::new(),
            anomaly,
            rules: RuleScorer::new(),
            propagator: NetworkRiskPropagator::new(network),
            aggregator: CompositeRiskAggregator::new(),
        })
    }

    /// Raw sub-scores for a transaction.
    pub fn signal_scores(&self, tx: &TransactionRequest) -> SignalScores {
        let features = self.extractor.extract(tx);
        SignalScores {
            anomaly: self.anomaly.score(&features),
            rule: self.rules.score(tx),
            network: self.propagator.score(tx),
        }
    }

    /// Score a validated transaction. Deterministic for a given engine.
    pub fn evaluate(&self, tx: &TransactionRequest) -> EvaluationResult {
        let scores = self.signal_scores(tx);
        let result = self.aggregator.aggregate(tx, &scores);

        debug!(
            transaction_id = %result.transaction_id,
            anomaly = scores.anomaly,
            rule = scores.rule,
            network = scores.network,
            risk_score = result.risk_score,
            risk_band = %result.risk_band,
            "Transaction evaluated"
        );

        result
    }

    pub fn network_summary(&self) -> NetworkSummary {
        self.propagator.network().summarize()
    }

    /// Generate a random transaction and evaluate it.
    pub fn random_sample(&self) -> EvaluationResult {
        self.random_sample_with(&mut TransactionGenerator::new())
    }

    pub fn random_sample_with<R: Rng>(
        &self,
        generator: &mut TransactionGenerator<R>,
    ) -> EvaluationResult {
        let tx = generator.generate(self.network());
        self.evaluate(&tx)
    }

    /// `count` independent simulated evaluations.
    pub fn simulate_batch(&self, count: usize) -> Vec<EvaluationResult> {
        let mut generator = TransactionGenerator::new();
        (0..count)
            .map(|_| self.random_sample_with(&mut generator))
            .collect()
    }

    pub fn network(&self) -> &SupplierNetwork {
        self.propagator.network()
    }

    pub fn feature_extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }
}
