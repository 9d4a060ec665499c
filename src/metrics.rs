//! Throughput, latency and verdict statistics for the risk engine service.

use crate::types::assessment::{ReasonCode, RiskBand};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

const BANDS: [RiskBand; 4] = [RiskBand::Low, RiskBand::Medium, RiskBand::High, RiskBand::Critical];

/// Metrics collector for the evaluation pipeline
pub struct PipelineMetrics {
    /// Transactions evaluated
    pub evaluations: AtomicU64,
    /// Payloads rejected before scoring
    pub rejected: AtomicU64,
    /// Alerts published
    pub alerts_published: AtomicU64,
    by_band: RwLock<HashMap<RiskBand, u64>>,
    by_reason: RwLock<HashMap<ReasonCode, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Risk score distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            evaluations: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            alerts_published: AtomicU64::new(0),
            by_band: RwLock::new(HashMap::new()),
            by_reason: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a completed evaluation
    pub fn record_evaluation(
        &self,
        processing_time: Duration,
        risk_score: f64,
        band: RiskBand,
        reasons: &[ReasonCode],
    ) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent window
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (risk_score.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_band) = self.by_band.write() {
            *by_band.entry(band).or_insert(0) += 1;
        }

        if let Ok(mut by_reason) = self.by_reason.write() {
            for reason in reasons {
                *by_reason.entry(*reason).or_insert(0) += 1;
            }
        }
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert(&self) {
        self.alerts_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Processing time statistics over the retained window
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let mut sorted = match self.processing_times.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return ProcessingStats::default(),
        };
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: at(0.5),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Evaluations per second since start
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.evaluations.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or_default()
    }

    pub fn get_band_counts(&self) -> HashMap<RiskBand, u64> {
        self.by_band.read().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn get_reason_counts(&self) -> HashMap<ReasonCode, u64> {
        self.by_reason.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let evaluations = self.evaluations.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let alerts = self.alerts_published.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();
        let bands = self.get_band_counts();
        let score_dist = self.get_score_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║          SUPPLY-CHAIN RISK ENGINE - METRICS SUMMARY          ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Evaluated: {:>8}  │  Rejected: {:>6}  │  Alerts: {:>6}   ║",
            evaluations, rejected, alerts
        );
        info!(
            "║ Throughput: {:>6.1} tx/s  │  Latency (μs): p50={:>5} p99={:>5} ║",
            self.get_throughput(),
            processing.p50_us,
            processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Verdicts by Risk Band:                                       ║");
        for band in BANDS {
            let count = bands.get(&band).copied().unwrap_or(0);
            let pct = if evaluations > 0 {
                (count as f64 / evaluations as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)", band.as_str(), count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Reason Codes:                                                ║");
        for (reason, count) in &self.get_reason_counts() {
            info!("║   {:34}: {:>6}", reason.as_str(), count);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Risk Score Distribution:                                     ║");
        let total: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics summary logger
pub struct MetricsReporter {
    metrics: std::sync::Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs: interval_secs.max(1),
        }
    }

    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
