//! In-memory supplier network loaded once at startup
//!
//! The network is read-only after load and shared by every evaluation without
//! locking. Optional node attributes are resolved to their defaults on access,
//! so a node stored without `base_risk` reads as the baseline risk.

use crate::types::assessment::{round_to, NetworkSummary};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Risk assumed for a supplier or attribute the network does not describe.
pub const DEFAULT_BASE_RISK: f64 = 0.3;

/// Tier assumed when a node omits it.
pub const DEFAULT_TIER: u32 = 1;

/// Base risk above which a supplier is listed as critical.
pub const CRITICAL_BASE_RISK: f64 = 0.75;

/// A supplier as stored in the network source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SupplierNode {
    #[serde(default)]
    base_risk: Option<f64>,
    #[serde(default)]
    tier: Option<u32>,
    /// Upstream supplier ids; lookup keys only, may dangle
    #[serde(default)]
    upstream: Option<Vec<String>>,
}

impl SupplierNode {
    pub fn new(base_risk: f64, tier: u32, upstream: Vec<String>) -> Self {
        Self {
            base_risk: Some(base_risk),
            tier: Some(tier),
            upstream: Some(upstream),
        }
    }

    pub fn base_risk(&self) -> f64 {
        self.base_risk.unwrap_or(DEFAULT_BASE_RISK)
    }

    pub fn tier(&self) -> u32 {
        self.tier.unwrap_or(DEFAULT_TIER)
    }

    pub fn upstream(&self) -> &[String] {
        self.upstream.as_deref().unwrap_or(&[])
    }

    /// True when the source declared no attributes at all.
    pub fn is_bare(&self) -> bool {
        self.base_risk.is_none() && self.tier.is_none() && self.upstream.is_none()
    }
}

/// Supplier id to node mapping that remembers source order.
#[derive(Debug, Clone, Default)]
pub struct SupplierNetwork {
    entries: Vec<(String, SupplierNode)>,
    index: HashMap<String, usize>,
}

/// Raw document; `preserve_order` keeps `suppliers` in source order.
#[derive(Deserialize)]
struct NetworkDocument {
    #[serde(default)]
    suppliers: Map<String, Value>,
}

impl SupplierNetwork {
    /// Load the network from a JSON file with a top-level `suppliers` object.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read supplier network from {}", path.display()))?;
        let network = Self::from_json(&raw)
            .with_context(|| format!("Failed to parse supplier network {}", path.display()))?;

        info!(
            path = %path.display(),
            suppliers = network.len(),
            "Supplier network loaded"
        );

        Ok(network)
    }

    /// Parse a network document from a JSON string.
    ///
    /// A `null` node is kept as a bare node, which scores like an unknown
    /// supplier.
    pub fn from_json(raw: &str) -> Result<Self> {
        let document: NetworkDocument =
            serde_json::from_str(raw).context("Invalid supplier network document")?;

        let mut network = Self::default();
        for (supplier_id, value) in document.suppliers {
            let node: Option<SupplierNode> = serde_json::from_value(value)
                .with_context(|| format!("Invalid supplier node {supplier_id}"))?;
            network.insert(supplier_id, node.unwrap_or_default());
        }
        Ok(network)
    }

    /// Insert or replace a node, keeping the original position on replace.
    pub fn insert(&mut self, supplier_id: impl Into<String>, node: SupplierNode) {
        let supplier_id = supplier_id.into();
        match self.index.get(&supplier_id) {
            Some(&slot) => self.entries[slot].1 = node,
            None => {
                self.index.insert(supplier_id.clone(), self.entries.len());
                self.entries.push((supplier_id, node));
            }
        }
    }

    pub fn get(&self, supplier_id: &str) -> Option<&SupplierNode> {
        self.index.get(supplier_id).map(|&slot| &self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn supplier_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// Aggregate view: size, deepest tier, mean base risk and critical suppliers.
    pub fn summarize(&self) -> NetworkSummary {
        let max_tier = self
            .entries
            .iter()
            .map(|(_, node)| node.tier())
            .max()
            .unwrap_or(DEFAULT_TIER);

        let total_risk: f64 = self.entries.iter().map(|(_, node)| node.base_risk()).sum();
        let average_base_risk = total_risk / self.entries.len().max(1) as f64;

        let critical_suppliers = self
            .entries
            .iter()
            .filter(|(_, node)| node.base_risk.unwrap_or(0.0) > CRITICAL_BASE_RISK)
            .map(|(id, _)| id.clone())
            .collect();

        NetworkSummary {
            total_suppliers: self.entries.len(),
            max_tier,
            average_base_risk: round_to(average_base_risk, 3),
            critical_suppliers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"{
        "suppliers": {
            "SUP-Z": { "base_risk": 0.9, "tier": 4, "upstream": ["SUP-A"] },
            "SUP-A": { "base_risk": 0.2, "tier": 1 },
            "SUP-M": { "tier": 2, "upstream": ["SUP-A", "SUP-GONE"] },
            "SUP-C": { "base_risk": 0.8 }
        }
    }"#;

    #[test]
    fn test_preserves_source_order() {
        let network = SupplierNetwork::from_json(DOC).unwrap();
        let ids: Vec<&str> = network.supplier_ids().collect();
        assert_eq!(ids, vec!["SUP-Z", "SUP-A", "SUP-M", "SUP-C"]);
    }

    #[test]
    fn test_defaults_applied_on_access() {
        let network = SupplierNetwork::from_json(DOC).unwrap();

        let m = network.get("SUP-M").unwrap();
        assert_eq!(m.base_risk(), DEFAULT_BASE_RISK);
        assert_eq!(m.tier(), 2);
        assert_eq!(m.upstream(), &["SUP-A".to_string(), "SUP-GONE".to_string()]);

        let c = network.get("SUP-C").unwrap();
        assert_eq!(c.tier(), DEFAULT_TIER);
        assert!(c.upstream().is_empty());
        assert!(network.get("SUP-GONE").is_none());
    }

    #[test]
    fn test_summary() {
        let network = SupplierNetwork::from_json(DOC).unwrap();
        let summary = network.summarize();

        assert_eq!(summary.total_suppliers, 4);
        assert_eq!(summary.max_tier, 4);
        // (0.9 + 0.2 + 0.3 + 0.8) / 4
        assert_eq!(summary.average_base_risk, 0.55);
        assert_eq!(summary.critical_suppliers, vec!["SUP-Z", "SUP-C"]);
    }

    #[test]
    fn test_empty_network_summary() {
        let network = SupplierNetwork::from_json(r#"{"suppliers": {}}"#).unwrap();
        let summary = network.summarize();

        assert_eq!(summary.total_suppliers, 0);
        assert_eq!(summary.max_tier, 1);
        assert_eq!(summary.average_base_risk, 0.0);
        assert!(summary.critical_suppliers.is_empty());

        let missing_key = SupplierNetwork::from_json("{}").unwrap();
        assert!(missing_key.is_empty());
    }

    #[test]
    fn test_bare_node() {
        let network = SupplierNetwork::from_json(r#"{"suppliers": {"SUP-X": {}}}"#).unwrap();
        assert!(network.get("SUP-X").unwrap().is_bare());
        assert!(!SupplierNode::new(0.1, 1, vec![]).is_bare());
    }

    #[test]
    fn test_null_node_is_bare() {
        let network = SupplierNetwork::from_json(
            r#"{"suppliers": {"SUP-B": {"base_risk": 0.4}, "SUP-N": null}}"#,
        )
        .unwrap();

        assert_eq!(network.len(), 2);
        let node = network.get("SUP-N").unwrap();
        assert!(node.is_bare());
        assert_eq!(node.base_risk(), DEFAULT_BASE_RISK);
    }

    #[test]
    fn test_malformed_node_is_error() {
        let err = SupplierNetwork::from_json(r#"{"suppliers": {"SUP-B": {"tier": "two"}}}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("SUP-B"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();

        let network = SupplierNetwork::load(file.path()).unwrap();
        assert_eq!(network.len(), 4);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(SupplierNetwork::load("does/not/exist.json").is_err());
    }
}
