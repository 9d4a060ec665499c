//! Configuration management for the risk engine service

use crate::types::assessment::RiskBand;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub anomaly: AnomalyConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection and subject layout
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject carrying transactions to evaluate
    pub evaluate_subject: String,
    /// Subject receiving risk alerts
    pub alert_subject: String,
    /// Request/reply subject for the network summary
    pub summary_subject: String,
    /// Request/reply subject for simulated evaluations
    pub simulate_subject: String,
}

/// Supplier network source
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_network_path")]
    pub path: String,
}

fn default_network_path() -> String {
    "data/supplier_network.json".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            path: default_network_path(),
        }
    }
}

/// Anomaly model fit parameters.
///
/// The defaults reproduce the reference calibration; changing them changes
/// every anomaly score the service emits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Seed for both the synthetic populations and the forest
    pub seed: u64,
    /// Number of isolation trees
    pub n_estimators: usize,
    /// Expected fraction of anomalies in the training data
    pub contamination: f64,
    /// Points drawn per tree
    pub max_samples: usize,
    pub normal_samples: usize,
    pub anomalous_samples: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_estimators: 120,
            contamination: 0.14,
            max_samples: 256,
            normal_samples: 900,
            anomalous_samples: 150,
        }
    }
}

/// Alert publishing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Lowest band that is published as an alert
    #[serde(default = "default_alert_band")]
    pub alert_band: RiskBand,
}

fn default_alert_band() -> RiskBand {
    RiskBand::High
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            alert_band: default_alert_band(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum evaluations in flight
    pub workers: usize,
    /// Samples per simulation reply
    #[serde(default = "default_simulation_batch")]
    pub simulation_batch: usize,
    /// Seconds between metrics summaries
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,
}

fn default_simulation_batch() -> usize {
    5
}

fn default_metrics_interval() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                evaluate_subject: "supplychain.transactions".to_string(),
                alert_subject: "supplychain.risk.alerts".to_string(),
                summary_subject: "supplychain.network.summary".to_string(),
                simulate_subject: "supplychain.simulate".to_string(),
            },
            network: NetworkConfig::default(),
            anomaly: AnomalyConfig::default(),
            detection: DetectionConfig::default(),
            pipeline: PipelineConfig {
                workers: 4,
                simulation_batch: default_simulation_batch(),
                metrics_interval_secs: default_metrics_interval(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
