// src/clustering/kmeans.rs
//! Seeded k-means with k-means++ initialization

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct KMeansOptions {
    pub k: usize,
    pub restarts: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            k: 4,
            restarts: 10,
            max_iter: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    pub inertia: f64,
    pub iterations: usize,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the closest centroid; ties go to the lower index.
pub fn nearest(centroids: &[Vec<f64>], point: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(c, point);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Run `restarts` seeded k-means passes and keep the lowest inertia.
/// `points` must be non-empty and share one dimension.
pub fn fit(points: &[Vec<f64>], options: &KMeansOptions) -> KMeansFit {
    let restarts = options.restarts.max(1);
    let mut best: Option<KMeansFit> = None;

    for run in 0..restarts {
        let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(run as u64));
        let candidate = lloyd(points, init_plus_plus(points, options.k, &mut rng), options);
        debug!(
            "k-means run {}: inertia {:.4} after {} iterations",
            run, candidate.inertia, candidate.iterations
        );
        if best.as_ref().map_or(true, |b| candidate.inertia < b.inertia) {
            best = Some(candidate);
        }
    }

    best.unwrap_or_else(|| KMeansFit {
        centroids: Vec::new(),
        labels: Vec::new(),
        inertia: 0.0,
        iterations: 0,
    })
}

/// k-means++ seeding. When every point already coincides with a chosen
/// center the next one is drawn uniformly, so `k` may exceed the number of
/// distinct points.
fn init_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    if points.is_empty() {
        return centroids;
    }
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = points.iter().map(|p| nearest(&centroids, p).1).collect();
        let total: f64 = weights.iter().sum();

        let index = if total <= 0.0 {
            rng.gen_range(0..points.len())
        } else {
            let mut target = rng.gen_range(0.0..total);
            let mut chosen = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        };
        centroids.push(points[index].clone());
    }
    centroids
}

fn lloyd(points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, options: &KMeansOptions) -> KMeansFit {
    let dim = points.first().map_or(0, Vec::len);
    let mut labels = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    while iterations < options.max_iter {
        iterations += 1;

        let mut changed = false;
        for (label, point) in labels.iter_mut().zip(points) {
            let (closest, _) = nearest(&centroids, point);
            if *label != closest {
                *label = closest;
                changed = true;
            }
        }

        let mut sums = vec![vec![0.0; dim]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (label, point) in labels.iter().zip(points) {
            counts[*label] += 1;
            for (s, v) in sums[*label].iter_mut().zip(point) {
                *s += v;
            }
        }

        let mut shift = 0.0;
        for (i, centroid) in centroids.iter_mut().enumerate() {
            // An empty cluster keeps its previous centroid.
            if counts[i] == 0 {
                continue;
            }
            let updated: Vec<f64> = sums[i].iter().map(|s| s / counts[i] as f64).collect();
            shift += squared_distance(centroid, &updated);
            *centroid = updated;
        }

        if !changed || shift <= options.tolerance {
            break;
        }
    }

    // Final assignment against the settled centroids.
    let mut inertia = 0.0;
    for (label, point) in labels.iter_mut().zip(points) {
        let (closest, d) = nearest(&centroids, point);
        *label = closest;
        inertia += d;
    }

    KMeansFit {
        centroids,
        labels,
        inertia,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ]
    }

    #[test]
    fn test_separates_two_blobs() {
        let options = KMeansOptions { k: 2, ..KMeansOptions::default() };
        let result = fit(&blobs(), &options);
        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[0], result.labels[2]);
        assert_eq!(result.labels[3], result.labels[4]);
        assert_ne!(result.labels[0], result.labels[3]);
        assert!(result.inertia < 0.1);
    }

    #[test]
    fn test_same_seed_same_result() {
        let options = KMeansOptions { k: 3, ..KMeansOptions::default() };
        assert_eq!(fit(&blobs(), &options), fit(&blobs(), &options));
    }

    #[test]
    fn test_more_clusters_than_distinct_points() {
        let points = vec![vec![1.0], vec![1.0], vec![1.0]];
        let options = KMeansOptions { k: 4, ..KMeansOptions::default() };
        let result = fit(&points, &options);
        assert_eq!(result.centroids.len(), 4);
        assert_eq!(result.labels.len(), 3);
        assert!(result.labels.iter().all(|l| *l < 4));
        assert_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_nearest_prefers_lower_index_on_ties() {
        let centroids = vec![vec![0.0], vec![2.0]];
        assert_eq!(nearest(&centroids, &[1.0]).0, 0);
    }
}
