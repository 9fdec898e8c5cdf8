//! Two-component principal projection for plotting.

use nalgebra::{DMatrix, SymmetricEigen};

/// 2D coordinates of every point plus the variance share of each axis.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Projection {
    pub coordinates: Vec<[f64; 2]>,
    pub explained_variance_ratio: [f64; 2],
}

/// Project already-standardized points onto their top two principal axes.
///
/// Axis signs are normalized so each axis' largest-magnitude loading is
/// positive, which keeps coordinates stable across runs.
pub(crate) fn project_2d(points: &[Vec<f64>]) -> Projection {
    let n = points.len();
    let d = points.first().map_or(0, Vec::len);
    if n < 2 || d == 0 {
        return Projection {
            coordinates: vec![[0.0, 0.0]; n],
            explained_variance_ratio: [0.0, 0.0],
        };
    }

    let raw = DMatrix::from_fn(n, d, |r, c| points[r][c]);
    let means = raw.row_mean();
    let centered = DMatrix::from_fn(n, d, |r, c| raw[(r, c)] - means[c]);
    let covariance = centered.transpose() * &centered / (n - 1) as f64;

    let eigen = SymmetricEigen::new(covariance);
    let eigenvalues = eigen.eigenvalues;

    let mut order: Vec<usize> = (0..d).collect();
    order.sort_by(|a, b| eigenvalues[*b].total_cmp(&eigenvalues[*a]));

    let total: f64 = eigenvalues.iter().map(|v| v.max(0.0)).sum();
    let mut axes: Vec<Vec<f64>> = Vec::with_capacity(2);
    let mut ratios = [0.0; 2];
    for (slot, &idx) in order.iter().take(2).enumerate() {
        let mut axis: Vec<f64> = eigen.eigenvectors.column(idx).iter().copied().collect();
        normalize_sign(&mut axis);
        axes.push(axis);
        if total > f64::EPSILON {
            ratios[slot] = eigenvalues[idx].max(0.0) / total;
        }
    }

    let coordinates = centered
        .row_iter()
        .map(|point| {
            let mut coord = [0.0; 2];
            for (c, axis) in coord.iter_mut().zip(&axes) {
                *c = point.iter().zip(axis).map(|(x, w)| x * w).sum();
            }
            coord
        })
        .collect();

    Projection {
        coordinates,
        explained_variance_ratio: ratios,
    }
}

fn normalize_sign(axis: &mut [f64]) {
    let pivot = axis
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if pivot < 0.0 {
        for v in axis.iter_mut() {
            *v = -*v;
        }
    }
}
