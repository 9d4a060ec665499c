//! Type definitions for the supply-chain risk engine

pub mod alert;
pub mod assessment;
pub mod transaction;

pub use alert::RiskAlert;
pub use assessment::{EvaluationResult, NetworkSummary, ReasonCode, RiskBand, ScoreBreakdown};
pub use transaction::{TransactionRequest, ValidationError};
