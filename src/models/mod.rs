//! Scoring components and the engine that combines them

pub mod aggregator;
pub mod anomaly;
pub mod engine;
pub mod propagation;
pub mod rules;

pub use aggregator::{CompositeRiskAggregator, SignalScores};
pub use anomaly::{AnomalyScorer, IsolationForest};
pub use engine::RiskEngine;
pub use propagation::NetworkRiskPropagator;
pub use rules::RuleScorer;
