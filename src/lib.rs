//! Supply-Chain Risk Engine Library
//!
//! Composite fraud-risk scoring for multi-tier supply-chain transactions:
//! an isolation-forest anomaly signal, deterministic rules and supplier
//! network propagation, combined into a banded, explainable verdict.

pub mod config;
pub mod consumer;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod network;
pub mod producer;
pub mod simulation;
pub mod types;
pub mod workers;

pub use config::AppConfig;
pub use consumer::TransactionConsumer;
pub use feature_extractor::FeatureExtractor;
pub use models::engine::RiskEngine;
pub use network::SupplierNetwork;
pub use producer::AlertProducer;
pub use simulation::TransactionGenerator;
pub use types::{
    alert::RiskAlert,
    assessment::{EvaluationResult, NetworkSummary, ReasonCode, RiskBand},
    transaction::TransactionRequest,
};
