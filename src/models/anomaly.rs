//! Unsupervised anomaly scoring over the six numeric transaction features.
//!
//! An isolation forest is fit once at startup on two seeded synthetic
//! populations (typical and anomalous supply-chain activity). Raw decision
//! values are positive for typical inputs and negative for outliers; they are
//! mapped onto [0, 1] with a fixed affine calibration so that outliers land
//! near 1.

use crate::config::AnomalyConfig;
use crate::feature_extractor::{FeatureVector, FEATURE_COUNT};
use anyhow::{anyhow, bail, Result};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

/// Raw decision value mapped to an anomaly score of 0.5.
pub const CALIBRATION_CENTER: f64 = 0.35;

/// Raw decision range spread over the [0, 1] anomaly score.
pub const CALIBRATION_SPAN: f64 = 0.7;

/// (mean, standard deviation) per feature for typical activity: mid-size
/// invoices, few invoices per month, moderate distance, short delays,
/// standard payment terms and low country risk.
pub const NORMAL_PROFILE: [(f64, f64); FEATURE_COUNT] = [
    (42_000.0, 12_000.0),
    (10.0, 4.0),
    (650.0, 220.0),
    (8.0, 5.0),
    (45.0, 10.0),
    (0.32, 0.12),
];

/// (mean, standard deviation) per feature for anomalous activity.
pub const ANOMALOUS_PROFILE: [(f64, f64); FEATURE_COUNT] = [
    (118_000.0, 25_000.0),
    (28.0, 8.0),
    (1_250.0, 400.0),
    (42.0, 14.0),
    (12.0, 5.0),
    (0.74, 0.15),
];

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful binary-search-tree lookup over `n`
/// points; normalizes isolation depths.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Draw `samples` rows where every column follows its own Gaussian.
fn gaussian_population(
    rng: &mut StdRng,
    profile: &[(f64, f64); FEATURE_COUNT],
    samples: usize,
) -> Result<Vec<FeatureVector>> {
    let mut rows = vec![[0.0; FEATURE_COUNT]; samples];
    for (column, &(mean, std_dev)) in profile.iter().enumerate() {
        let normal = Normal::new(mean, std_dev)
            .map_err(|e| anyhow!("Invalid distribution for feature {}: {}", column, e))?;
        for row in rows.iter_mut() {
            row[column] = normal.sample(rng);
        }
    }
    Ok(rows)
}

/// Typical population followed by the anomalous population, seeded.
pub fn synthetic_training_data(config: &AnomalyConfig) -> Result<Vec<FeatureVector>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut data = gaussian_population(&mut rng, &NORMAL_PROFILE, config.normal_samples)?;
    data.extend(gaussian_population(
        &mut rng,
        &ANOMALOUS_PROFILE,
        config.anomalous_samples,
    )?);
    Ok(data)
}

#[derive(Debug, Clone)]
enum IsolationNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: IsolationNode,
}

impl IsolationTree {
    fn build(samples: &[FeatureVector], max_depth: usize, rng: &mut StdRng) -> Self {
        Self {
            root: Self::build_node(samples, 0, max_depth, rng),
        }
    }

    fn build_node(
        samples: &[FeatureVector],
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> IsolationNode {
        if depth >= max_depth || samples.len() <= 1 {
            return IsolationNode::Leaf {
                size: samples.len(),
            };
        }

        // Only features that still vary inside this node can split it
        let ranges: Vec<(usize, f64, f64)> = (0..FEATURE_COUNT)
            .filter_map(|feature| {
                let (min, max) = samples.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(min, max), row| (min.min(row[feature]), max.max(row[feature])),
                );
                (max > min).then_some((feature, min, max))
            })
            .collect();

        if ranges.is_empty() {
            return IsolationNode::Leaf {
                size: samples.len(),
            };
        }

        let (feature, min, max) = ranges[rng.gen_range(0..ranges.len())];
        let threshold = rng.gen_range(min..max);

        let (left, right): (Vec<FeatureVector>, Vec<FeatureVector>) =
            samples.iter().partition(|row| row[feature] < threshold);

        IsolationNode::Split {
            feature,
            threshold,
            left: Box::new(Self::build_node(&left, depth + 1, max_depth, rng)),
            right: Box::new(Self::build_node(&right, depth + 1, max_depth, rng)),
        }
    }

    fn path_length(&self, point: &FeatureVector) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;
        loop {
            match node {
                IsolationNode::Leaf { size } => {
                    return depth as f64 + average_path_length(*size);
                }
                IsolationNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if point[*feature] < *threshold { left } else { right };
                    depth += 1;
                }
            }
        }
    }
}

/// Seeded isolation forest with a contamination-derived decision offset.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fit the forest on `data`.
    pub fn fit(data: &[FeatureVector], config: &AnomalyConfig) -> Result<Self> {
        if data.is_empty() {
            bail!("Cannot fit isolation forest on an empty dataset");
        }
        if config.n_estimators == 0 {
            bail!("n_estimators must be at least 1");
        }
        if config.max_samples == 0 {
            bail!("max_samples must be at least 1");
        }
        if !(config.contamination > 0.0 && config.contamination <= 0.5) {
            bail!(
                "contamination must be within (0, 0.5], got {}",
                config.contamination
            );
        }

        let sample_size = config.max_samples.min(data.len());
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_estimators)
            .map(|_| {
                let subset: Vec<FeatureVector> = index::sample(&mut rng, data.len(), sample_size)
                    .into_iter()
                    .map(|i| data[i])
                    .collect();
                IsolationTree::build(&subset, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.0,
        };

        let training_scores: Vec<f64> = data.iter().map(|row| forest.score_samples(row)).collect();
        forest.offset = percentile(&training_scores, config.contamination * 100.0);

        debug!(
            trees = forest.trees.len(),
            sample_size,
            max_depth,
            offset = forest.offset,
            "Isolation forest fitted"
        );

        Ok(forest)
    }

    /// Opposite of the isolation anomaly score: in [-1, 0), lower is more anomalous.
    pub fn score_samples(&self, point: &FeatureVector) -> f64 {
        let mean_path = self
            .trees
            .iter()
            .map(|tree| tree.path_length(point))
            .sum::<f64>()
            / self.trees.len() as f64;

        let normalizer = average_path_length(self.sample_size);
        if normalizer <= 0.0 {
            return -0.5;
        }
        -(2f64.powf(-mean_path / normalizer))
    }

    /// Shifted score: positive for inliers, negative for outliers.
    pub fn decision_function(&self, point: &FeatureVector) -> f64 {
        self.score_samples(point) - self.offset
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }
}

/// Calibrated anomaly scorer; immutable once fitted.
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    forest: IsolationForest,
}

impl AnomalyScorer {
    /// Generate the synthetic populations and fit the model.
    pub fn fit(config: &AnomalyConfig) -> Result<Self> {
        let data = synthetic_training_data(config)?;
        let forest = IsolationForest::fit(&data, config)?;

        info!(
            training_rows = data.len(),
            n_estimators = forest.n_estimators(),
            contamination = config.contamination,
            seed = config.seed,
            "Anomaly model fitted"
        );

        Ok(Self { forest })
    }

    /// Raw model decision value (higher = more typical).
    pub fn raw_score(&self, features: &FeatureVector) -> f64 {
        self.forest.decision_function(features)
    }

    /// Anomaly score in [0, 1]; outliers map toward 1.
    pub fn score(&self, features: &FeatureVector) -> f64 {
        calibrate(self.raw_score(features))
    }

    pub fn forest(&self) -> &IsolationForest {
        &self.forest
    }
}

/// Fixed affine remap from raw decision value to [0, 1].
pub fn calibrate(raw: f64) -> f64 {
    ((CALIBRATION_CENTER - raw) / CALIBRATION_SPAN).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typical() -> FeatureVector {
        NORMAL_PROFILE.map(|(mean, _)| mean)
    }

    fn extreme() -> FeatureVector {
        [450_000.0, 90.0, 6_000.0, 220.0, 0.0, 1.0]
    }

    fn scorer() -> AnomalyScorer {
        AnomalyScorer::fit(&AnomalyConfig::default()).unwrap()
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // Reference value for 256-point subsamples
        assert!((average_path_length(256) - 10.2448).abs() < 1e-3);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 4.0);
        assert!((percentile(&values, 50.0) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_calibration() {
        assert_eq!(calibrate(0.35), 0.0);
        assert_eq!(calibrate(-0.35), 1.0);
        assert!((calibrate(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(calibrate(0.9), 0.0);
        assert_eq!(calibrate(-2.0), 1.0);
    }

    #[test]
    fn test_training_data_shape_and_determinism() {
        let config = AnomalyConfig::default();
        let a = synthetic_training_data(&config).unwrap();
        let b = synthetic_training_data(&config).unwrap();

        assert_eq!(a.len(), 1050);
        assert_eq!(a, b);

        let typical_mean = a[..900].iter().map(|row| row[0]).sum::<f64>() / 900.0;
        let anomalous_mean = a[900..].iter().map(|row| row[0]).sum::<f64>() / 150.0;
        assert!((typical_mean - 42_000.0).abs() < 2_000.0);
        assert!((anomalous_mean - 118_000.0).abs() < 6_000.0);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let a = scorer();
        let b = scorer();
        for point in [typical(), extreme(), [0.0; FEATURE_COUNT]] {
            assert_eq!(a.score(&point).to_bits(), b.score(&point).to_bits());
        }
        assert_eq!(a.forest().offset().to_bits(), b.forest().offset().to_bits());
    }

    #[test]
    fn test_outliers_score_higher_than_typical() {
        let scorer = scorer();
        let typical_score = scorer.score(&typical());
        let extreme_score = scorer.score(&extreme());

        assert!(typical_score < 0.6, "typical scored {}", typical_score);
        assert!(extreme_score > 0.6, "extreme scored {}", extreme_score);
        assert!(scorer.raw_score(&typical()) > scorer.raw_score(&extreme()));
    }

    #[test]
    fn test_scores_bounded() {
        let scorer = scorer();
        let points = [
            [0.0; FEATURE_COUNT],
            [f64::MAX / 4.0, 1e9, 1e9, 1e9, 1e9, 1.0],
            ANOMALOUS_PROFILE.map(|(mean, _)| mean),
            typical(),
        ];
        for point in points {
            let score = scorer.score(&point);
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let data = vec![[1.0; FEATURE_COUNT]; 10];

        let mut config = AnomalyConfig::default();
        config.n_estimators = 0;
        assert!(IsolationForest::fit(&data, &config).is_err());

        let mut config = AnomalyConfig::default();
        config.contamination = 0.0;
        assert!(IsolationForest::fit(&data, &config).is_err());

        assert!(IsolationForest::fit(&[], &AnomalyConfig::default()).is_err());
    }

    #[test]
    fn test_constant_data_fits() {
        let data = vec![[1.0; FEATURE_COUNT]; 32];
        let forest = IsolationForest::fit(&data, &AnomalyConfig::default()).unwrap();
        let score = calibrate(forest.decision_function(&[1.0; FEATURE_COUNT]));
        assert!((0.0..=1.0).contains(&score));
    }
}
