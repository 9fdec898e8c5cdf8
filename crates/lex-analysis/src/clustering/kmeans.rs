//! K-means with k-means++ seeding and Lloyd refinement.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for a k-means run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KMeansParams {
    pub k: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub seed: u64,
}

/// Best run across all initializations.
#[derive(Debug, Clone)]
pub(crate) struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    /// Sum of squared distances to the assigned centroid.
    pub inertia: f64,
}

/// Run k-means `n_init` times and keep the lowest-inertia run.
///
/// Initialization `i` is seeded with `seed + i`. Callers guarantee
/// `1 <= k <= points.len()` and equal point dimensions.
pub(crate) fn kmeans(points: &[Vec<f64>], params: &KMeansParams) -> KMeansFit {
    let mut best: Option<KMeansFit> = None;

    for init in 0..params.n_init.max(1) {
        let seed = params.seed.wrapping_add(init as u64);
        let fit = kmeans_single(points, params, seed);
        if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }

    best.unwrap_or_else(|| kmeans_single(points, params, params.seed))
}

fn kmeans_single(points: &[Vec<f64>], params: &KMeansParams, seed: u64) -> KMeansFit {
    let n = points.len();
    let d = points.first().map_or(0, Vec::len);
    let k = params.k;

    let mut centroids = kmeans_plus_plus(points, k, seed);
    let mut labels = vec![0usize; n];

    for _ in 0..params.max_iter {
        for (label, point) in labels.iter_mut().zip(points) {
            *label = nearest(point, &centroids).0;
        }

        let mut sums = vec![vec![0.0; d]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (acc, v) in sums[label].iter_mut().zip(point) {
                *acc += v;
            }
        }

        let mut max_shift = 0.0f64;
        for (c, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
            // Empty cluster: keep old centroid.
            if count == 0 {
                continue;
            }
            let updated: Vec<f64> = sum.into_iter().map(|s| s / count as f64).collect();
            max_shift = max_shift.max(squared_distance(&centroids[c], &updated).sqrt());
            centroids[c] = updated;
        }

        if max_shift < params.tolerance {
            break;
        }
    }

    // Final assignment against the settled centroids.
    let mut inertia = 0.0;
    for (label, point) in labels.iter_mut().zip(points) {
        let (c, dist) = nearest(point, &centroids);
        *label = c;
        inertia += dist;
    }

    KMeansFit {
        centroids,
        labels,
        inertia,
    }
}

/// Distance-proportional seeding.
fn kmeans_plus_plus(points: &[Vec<f64>], k: usize, seed: u64) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);

    centroids.push(points[rng.gen_range(0..n)].clone());
    let mut min_dists = vec![f64::INFINITY; n];

    while centroids.len() < k {
        let last = &centroids[centroids.len() - 1];
        for (dist, point) in min_dists.iter_mut().zip(points) {
            *dist = dist.min(squared_distance(point, last));
        }

        let total: f64 = min_dists.iter().sum();
        let chosen = if total <= f64::EPSILON {
            // All remaining points coincide with a centroid.
            rng.gen_range(0..n)
        } else {
            let target = rng.r#gen::<f64>() * total;
            let mut cumulative = 0.0;
            min_dists
                .iter()
                .position(|dist| {
                    cumulative += dist;
                    cumulative >= target
                })
                .unwrap_or(n - 1)
        };
        centroids.push(points[chosen].clone());
    }

    centroids
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best.1 {
            best = (c, dist);
        }
    }
    best
}

#[inline]
pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(k: usize) -> KMeansParams {
        KMeansParams {
            k,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.5, 0.5],
            vec![0.2, 0.3],
            vec![10.0, 10.0],
            vec![10.5, 10.5],
            vec![10.2, 10.3],
        ]
    }

    #[test]
    fn test_separates_two_blobs() {
        let fit = kmeans(&two_blobs(), &params(2));
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[1], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert!(fit.inertia < 1.0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = kmeans(&two_blobs(), &params(2));
        let b = kmeans(&two_blobs(), &params(2));
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_single_cluster_centroid_is_mean() {
        let points = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let fit = kmeans(&points, &params(1));
        assert_eq!(fit.centroids, vec![vec![2.0, 3.0]]);
        assert_eq!(fit.labels, vec![0, 0]);
        assert!((fit.inertia - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_equal_to_points_has_zero_inertia() {
        let points = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0]];
        let fit = kmeans(&points, &params(3));
        assert!(fit.inertia.abs() < 1e-12);
    }
}
