//! K-means clustering over standardized numeric features.
//!
//! The engine imputes missing values with the feature mean, standardizes each
//! feature to zero mean and unit variance, runs seeded k-means with several
//! initializations and projects the standardized rows onto two principal axes
//! for plotting. Per-cluster means are reported on the original scale.

mod kmeans;
mod projection;

use crate::config::AnalysisConfig;
use crate::dataset::DatasetView;
use crate::error::{AnalysisError, Result};
use crate::utils::{mean, percentage, population_std};
use kmeans::{KMeansParams, kmeans};
use projection::project_2d;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Minimum number of features clustering needs.
pub const MIN_FEATURES: usize = 2;

// =============================================================================
// Result Types
// =============================================================================

/// Summary of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterStatistics {
    pub cluster: usize,
    pub size: usize,
    /// Share of all rows, in percent.
    pub percentage: f64,
    /// Mean of each feature's present values within the cluster.
    pub mean_values: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    pub n_clusters: usize,
    pub features_used: Vec<String>,
    /// One center per cluster, in standardized feature space.
    pub cluster_centers: Vec<Vec<f64>>,
    pub inertia: f64,
    /// Variance share captured by each projection axis.
    pub pca_explained_variance: [f64; 2],
    /// Cluster id to number of rows.
    pub cluster_distribution: BTreeMap<usize, usize>,
    pub pca_coordinates: Vec<[f64; 2]>,
    pub cluster_labels: Vec<usize>,
    pub cluster_statistics: Vec<ClusterStatistics>,
}

/// Returned when the dataset cannot be clustered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusteringUnavailable {
    pub reason: String,
}

/// Outcome of [`ClusteringEngine::cluster_analysis`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClusterOutcome {
    Clustered(ClusterReport),
    Unavailable(ClusteringUnavailable),
}

impl ClusterOutcome {
    pub fn report(&self) -> Option<&ClusterReport> {
        match self {
            Self::Clustered(report) => Some(report),
            Self::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Clustered(_))
    }
}

fn unavailable(reason: String) -> ClusterOutcome {
    info!("Clustering unavailable: {}", reason);
    ClusterOutcome::Unavailable(ClusteringUnavailable { reason })
}

// =============================================================================
// Engine
// =============================================================================

/// Clusters rows by their numeric features.
#[derive(Debug, Clone)]
pub struct ClusteringEngine {
    n_clusters: usize,
    n_init: usize,
    max_iter: usize,
    tolerance: f64,
    seed: u64,
}

impl Default for ClusteringEngine {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ClusteringEngine {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            n_clusters: config.n_clusters,
            n_init: config.kmeans_n_init,
            max_iter: config.kmeans_max_iter,
            tolerance: config.kmeans_tolerance,
            seed: config.random_seed,
        }
    }

    /// Configured default cluster count.
    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    /// Cluster the dataset into `k` groups.
    ///
    /// `features` defaults to every numeric column; repeated names count once.
    /// Fewer than two distinct features yields [`ClusterOutcome::Unavailable`].
    /// A named feature that is absent or not numeric, or `k == 0`, is an
    /// error. `k` above the row count is clamped.
    pub fn cluster_analysis(
        &self,
        dataset: &DatasetView,
        k: usize,
        features: Option<&[String]>,
    ) -> Result<ClusterOutcome> {
        let mut requested: Vec<String> = match features {
            Some(names) => names.to_vec(),
            None => dataset
                .numeric_columns()
                .into_iter()
                .map(String::from)
                .collect(),
        };
        let mut seen = HashSet::new();
        requested.retain(|name| seen.insert(name.clone()));

        if requested.len() < MIN_FEATURES {
            return Ok(unavailable(format!(
                "At least {} numeric features are required, got {}",
                MIN_FEATURES,
                requested.len()
            )));
        }
        for name in &requested {
            dataset.require_numeric(name)?;
        }
        if k == 0 {
            return Err(AnalysisError::InvalidClusterCount(k));
        }

        let mut feature_names = Vec::new();
        let mut raw_columns = Vec::new();
        for name in requested {
            let values = dataset.numeric_values(&name)?;
            if values.iter().all(Option::is_none) {
                debug!("Dropping all-missing feature '{}' from clustering", name);
                continue;
            }
            feature_names.push(name);
            raw_columns.push(values);
        }

        if feature_names.len() < MIN_FEATURES {
            return Ok(unavailable(format!(
                "At least {} features with values are required, got {}",
                MIN_FEATURES,
                feature_names.len()
            )));
        }

        let rows = dataset.row_count();
        if rows == 0 {
            return Ok(unavailable("Dataset has no rows".to_string()));
        }

        let points = standardize(&raw_columns, rows);
        let effective_k = k.min(rows);
        if effective_k < k {
            debug!("Clamping cluster count {} to row count {}", k, rows);
        }

        let fit = kmeans(
            &points,
            &KMeansParams {
                k: effective_k,
                n_init: self.n_init,
                max_iter: self.max_iter,
                tolerance: self.tolerance,
                seed: self.seed,
            },
        );
        let projection = project_2d(&points);

        let mut cluster_distribution = BTreeMap::new();
        let mut cluster_statistics = Vec::with_capacity(effective_k);
        for cluster in 0..effective_k {
            let members: Vec<usize> = fit
                .labels
                .iter()
                .enumerate()
                .filter(|(_, label)| **label == cluster)
                .map(|(row, _)| row)
                .collect();

            let mean_values = feature_names
                .iter()
                .zip(&raw_columns)
                .map(|(name, column)| {
                    let present: Vec<f64> = members.iter().filter_map(|row| column[*row]).collect();
                    (name.clone(), mean(&present))
                })
                .collect();

            cluster_distribution.insert(cluster, members.len());
            cluster_statistics.push(ClusterStatistics {
                cluster,
                size: members.len(),
                percentage: percentage(members.len(), rows),
                mean_values,
            });
        }

        info!(
            "Clustered {} rows into {} clusters over {} features (inertia {:.4})",
            rows,
            effective_k,
            feature_names.len(),
            fit.inertia
        );

        Ok(ClusterOutcome::Clustered(ClusterReport {
            n_clusters: effective_k,
            features_used: feature_names,
            cluster_centers: fit.centroids,
            inertia: fit.inertia,
            pca_explained_variance: projection.explained_variance_ratio,
            cluster_distribution,
            pca_coordinates: projection.coordinates,
            cluster_labels: fit.labels,
            cluster_statistics,
        }))
    }
}

/// Mean-impute and scale each column to zero mean and unit variance.
///
/// Returns row-major points. Zero-variance columns are only centered.
fn standardize(columns: &[Vec<Option<f64>>], rows: usize) -> Vec<Vec<f64>> {
    let mut points = vec![Vec::with_capacity(columns.len()); rows];

    for column in columns {
        let present: Vec<f64> = column.iter().flatten().copied().collect();
        let center = mean(&present).unwrap_or(0.0);
        let spread = population_std(&present);
        let scale = if spread > 0.0 { spread } else { 1.0 };

        for (point, value) in points.iter_mut().zip(column) {
            // Imputed values sit at the mean, i.e. zero after centering.
            point.push((value.unwrap_or(center) - center) / scale);
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn blobs() -> DataFrame {
        df![
            "x" => [1.0, 1.2, 0.8, 1.1, 10.0, 10.2, 9.8, 10.1],
            "y" => [2.0, 2.1, 1.9, 2.2, 20.0, 20.1, 19.9, 20.2],
            "label" => ["a", "a", "a", "a", "b", "b", "b", "b"],
        ]
        .unwrap()
    }

    fn report(outcome: &ClusterOutcome) -> &ClusterReport {
        outcome.report().expect("expected a cluster report")
    }

    #[test]
    fn test_two_blobs() {
        let outcome = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(blobs()), 2, None)
            .unwrap();
        let report = report(&outcome);

        assert_eq!(report.n_clusters, 2);
        assert_eq!(report.features_used, vec!["x", "y"]);
        assert_eq!(report.cluster_labels.len(), 8);
        assert_eq!(report.pca_coordinates.len(), 8);
        assert_eq!(report.cluster_centers.len(), 2);

        let first = report.cluster_labels[0];
        assert!(report.cluster_labels[..4].iter().all(|l| *l == first));
        assert!(report.cluster_labels[4..].iter().all(|l| *l != first));

        let stats = &report.cluster_statistics[first];
        assert_eq!(stats.size, 4);
        assert_eq!(stats.percentage, 50.0);
        assert!((stats.mean_values["x"].unwrap() - 1.025).abs() < 1e-12);
        assert_eq!(report.cluster_distribution.values().sum::<usize>(), 8);
        assert!(report.pca_explained_variance[0] > 0.9);
    }

    #[test]
    fn test_fewer_than_two_features_is_unavailable() {
        let df = df!["x" => [1.0, 2.0, 3.0], "label" => ["a", "b", "c"]].unwrap();
        let outcome = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(df), 3, None)
            .unwrap();
        assert!(matches!(outcome, ClusterOutcome::Unavailable(_)));

        // Too few names wins over invalid names.
        let names = vec!["nonexistent".to_string()];
        let outcome = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(blobs()), 3, Some(&names))
            .unwrap();
        assert!(!outcome.is_available());
    }

    #[test]
    fn test_repeated_feature_counts_once() {
        let names = vec!["x".to_string(), "x".to_string()];
        let outcome = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(blobs()), 2, Some(&names))
            .unwrap();
        assert!(!outcome.is_available());

        let names = vec!["y".to_string(), "x".to_string(), "y".to_string()];
        let outcome = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(blobs()), 2, Some(&names))
            .unwrap();
        assert_eq!(report(&outcome).features_used, vec!["y", "x"]);
    }

    #[test]
    fn test_categorical_feature_is_rejected() {
        let names = vec!["x".to_string(), "label".to_string()];
        let err = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(blobs()), 2, Some(&names))
            .unwrap_err();
        assert!(err.is_input_shape_error());
    }

    #[test]
    fn test_zero_clusters_is_rejected() {
        let err = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(blobs()), 0, None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidClusterCount(0)));
    }

    #[test]
    fn test_k_is_clamped_to_rows() {
        let df = df!["a" => [1.0, 2.0], "b" => [3.0, 5.0]].unwrap();
        let outcome = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(df), 5, None)
            .unwrap();
        assert_eq!(report(&outcome).n_clusters, 2);
        assert!(report(&outcome).inertia.abs() < 1e-12);
    }

    #[test]
    fn test_missing_values_and_constant_feature() {
        let df = df![
            "a" => [Some(1.0), None, Some(3.0), Some(10.0)],
            "b" => [4.0, 4.0, 4.0, 4.0],
            "empty" => [None::<f64>, None, None, None],
        ]
        .unwrap();
        let outcome = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(df), 2, None)
            .unwrap();
        let report = report(&outcome);

        assert_eq!(report.features_used, vec!["a", "b"]);
        assert!(report.cluster_centers.iter().flatten().all(|v| v.is_finite()));
        assert!(report.pca_coordinates.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_all_missing_leaves_one_feature() {
        let df = df![
            "a" => [1.0, 2.0, 3.0],
            "empty" => [None::<f64>, None, None],
        ]
        .unwrap();
        let outcome = ClusteringEngine::default()
            .cluster_analysis(&DatasetView::new(df), 2, None)
            .unwrap();
        assert!(!outcome.is_available());
    }

    #[test]
    fn test_deterministic() {
        let engine = ClusteringEngine::default();
        let view = DatasetView::new(blobs());
        let a = engine.cluster_analysis(&view, 3, None).unwrap();
        let b = engine.cluster_analysis(&view, 3, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_standardize() {
        let points = standardize(&[vec![Some(1.0), Some(3.0), None]], 3);
        assert_eq!(points, vec![vec![-1.0], vec![1.0], vec![0.0]]);
    }
}
