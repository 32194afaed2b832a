// src/clustering/mod.rs
//! Unsupervised cohort grouping of profiles. Independent of role labels.

pub mod kmeans;

use crate::core::FsOps;
use crate::error::{PipelineError, PipelineResult};
use crate::features::{MultiHotEncoder, StandardScaler};
use crate::profiles::Profile;
use chrono::{DateTime, Utc};
use kmeans::KMeansOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

pub const SCORE_FEATURE: &str = "score";

/// Fitted clustering bundle: feature transform plus centroids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    pub encoder: MultiHotEncoder,
    pub scaler: StandardScaler,
    pub centroids: Vec<Vec<f64>>,
    pub feature_names: Vec<String>,
    pub inertia: f64,
}

impl ClusterModel {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Scaled score followed by the multi-hot skill vector.
    pub fn features(&self, profile: &Profile) -> Vec<f64> {
        let mut features = Vec::with_capacity(1 + self.encoder.dimension());
        features.push(self.scaler.transform(profile.score));
        features.extend(self.encoder.transform(&profile.skills).into_iter().map(f64::from));
        features
    }

    pub fn assign(&self, profile: &Profile) -> usize {
        kmeans::nearest(&self.centroids, &self.features(profile)).0
    }

    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        FsOps::write_json(path, self)
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        FsOps::read_artifact(path, "cluster model", "cluster")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    pub mean_score: f64,
    pub top_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterReport {
    pub k: usize,
    pub generated_at: DateTime<Utc>,
    pub clusters: Vec<ClusterSummary>,
}

impl ClusterReport {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Cluster Analysis\n");
        let _ = writeln!(out, "Number of clusters: {}\n", self.k);
        let _ = writeln!(out, "Generated: {}\n", self.generated_at.to_rfc3339());
        for summary in &self.clusters {
            let _ = writeln!(out, "## Cluster {}", summary.cluster);
            let _ = writeln!(out, "- Size: {}", summary.size);
            let _ = writeln!(out, "- Avg Score: {:.2}", summary.mean_score);
            let _ = writeln!(out, "- Top Skills: {}\n", summary.top_skills.join(", "));
        }
        out
    }

    pub fn save_markdown(&self, path: &Path) -> PipelineResult<()> {
        FsOps::write_atomic(path, self.to_markdown().as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct ClusterFit {
    pub model: ClusterModel,
    pub assignments: Vec<usize>,
    pub report: ClusterReport,
}

pub struct ProfileClusterer {
    options: KMeansOptions,
}

impl ProfileClusterer {
    pub fn new(k: usize, restarts: usize, seed: u64) -> Self {
        Self {
            options: KMeansOptions {
                k,
                restarts,
                seed,
                ..KMeansOptions::default()
            },
        }
    }

    pub fn fit(&self, profiles: &[Profile]) -> PipelineResult<ClusterFit> {
        if self.options.k == 0 {
            return Err(PipelineError::InvalidParameter(
                "cluster count must be at least 1".to_string(),
            ));
        }
        if profiles.is_empty() {
            return Err(PipelineError::EmptyTrainingSet);
        }
        info!(
            "Training k-means with k={} on {} profiles",
            self.options.k,
            profiles.len()
        );

        let encoder = MultiHotEncoder::fit(profiles.iter().map(|p| &p.skills));
        let scores: Vec<f64> = profiles.iter().map(|p| p.score).collect();
        let scaler = StandardScaler::fit(&scores);

        let mut feature_names = vec![SCORE_FEATURE.to_string()];
        feature_names.extend(encoder.classes().iter().cloned());

        let mut model = ClusterModel {
            encoder,
            scaler,
            centroids: Vec::new(),
            feature_names,
            inertia: 0.0,
        };

        let points: Vec<Vec<f64>> = profiles.iter().map(|p| model.features(p)).collect();
        let result = kmeans::fit(&points, &self.options);
        model.centroids = result.centroids;
        model.inertia = result.inertia;

        let report = summarize(profiles, &result.labels, self.options.k);
        for summary in &report.clusters {
            info!(
                "Cluster {}: {} profiles, mean score {:.2}",
                summary.cluster, summary.size, summary.mean_score
            );
        }

        Ok(ClusterFit {
            model,
            assignments: result.labels,
            report,
        })
    }
}

/// Size, mean score and the three most frequent skills per cluster. Empty
/// clusters report zeros.
pub fn summarize(profiles: &[Profile], assignments: &[usize], k: usize) -> ClusterReport {
    let clusters = (0..k)
        .map(|cluster| {
            let members: Vec<&Profile> = profiles
                .iter()
                .zip(assignments)
                .filter(|(_, c)| **c == cluster)
                .map(|(p, _)| p)
                .collect();

            let size = members.len();
            let mean_score = if size > 0 {
                members.iter().map(|p| p.score).sum::<f64>() / size as f64
            } else {
                0.0
            };

            let mut frequency: BTreeMap<&str, usize> = BTreeMap::new();
            for skill in members.iter().flat_map(|p| p.skills.iter()) {
                *frequency.entry(skill.as_str()).or_insert(0) += 1;
            }
            let mut ranked: Vec<(&str, usize)> = frequency.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

            ClusterSummary {
                cluster,
                size,
                mean_score,
                top_skills: ranked.into_iter().take(3).map(|(s, _)| s.to_string()).collect(),
            }
        })
        .collect();

    ClusterReport {
        k,
        generated_at: Utc::now(),
        clusters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::generator;

    #[test]
    fn test_k4_assigns_every_profile_in_range() {
        let profiles = generator::generate(60, 11);
        let fit = ProfileClusterer::new(4, 5, 42).fit(&profiles).unwrap();

        assert_eq!(fit.assignments.len(), profiles.len());
        assert!(fit.assignments.iter().all(|c| *c < 4));
        assert_eq!(fit.model.k(), 4);
        let total: usize = fit.report.clusters.iter().map(|c| c.size).sum();
        assert_eq!(total, profiles.len());
    }

    #[test]
    fn test_fewer_profiles_than_clusters() {
        let profiles = vec![Profile::new("a", 7.0, ["python"]), Profile::new("b", 9.0, ["java"])];
        let fit = ProfileClusterer::new(4, 3, 1).fit(&profiles).unwrap();
        assert_eq!(fit.assignments.len(), 2);
        assert!(fit.assignments.iter().all(|c| *c < 4));
        assert!(fit.report.clusters.iter().any(|c| c.size == 0 && c.mean_score == 0.0));
    }

    #[test]
    fn test_zero_clusters_is_rejected() {
        let profiles = vec![Profile::new("a", 7.0, ["python"])];
        assert!(matches!(
            ProfileClusterer::new(0, 3, 1).fit(&profiles),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_profiles_is_an_error() {
        assert!(matches!(
            ProfileClusterer::new(4, 1, 1).fit(&[]),
            Err(PipelineError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_assign_matches_training_assignment_and_ignores_unseen_skills() {
        let profiles = generator::generate(40, 5);
        let fit = ProfileClusterer::new(4, 5, 42).fit(&profiles).unwrap();
        for (profile, cluster) in profiles.iter().zip(&fit.assignments) {
            assert_eq!(fit.model.assign(profile), *cluster);
        }

        let mut stranger = profiles[0].clone();
        stranger.skills.insert("cobol".to_string());
        assert_eq!(fit.model.features(&stranger).len(), fit.model.feature_names.len());
        assert_eq!(fit.model.assign(&stranger), fit.assignments[0]);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let profiles = generator::generate(50, 2);
        let a = ProfileClusterer::new(4, 5, 42).fit(&profiles).unwrap();
        let b = ProfileClusterer::new(4, 5, 42).fit(&profiles).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.model, b.model);
    }

    #[test]
    fn test_summary_top_skills() {
        let profiles = vec![
            Profile::new("a", 6.0, ["python", "sql", "aws"]),
            Profile::new("b", 8.0, ["python", "sql"]),
            Profile::new("c", 10.0, ["python", "docker"]),
        ];
        let report = summarize(&profiles, &[0, 0, 0], 2);
        assert_eq!(report.clusters[0].top_skills, vec!["python", "sql", "aws"]);
        assert!((report.clusters[0].mean_score - 8.0).abs() < 1e-12);
        assert_eq!(report.clusters[1].size, 0);
        assert!(report.to_markdown().contains("## Cluster 1"));
    }

    #[test]
    fn test_model_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cluster.json");
        let profiles = generator::generate(20, 8);
        let fit = ProfileClusterer::new(4, 2, 42).fit(&profiles).unwrap();
        fit.model.save(&path).unwrap();

        let loaded = ClusterModel::load(&path).unwrap();
        assert_eq!(loaded.assign(&profiles[3]), fit.assignments[3]);
    }
}
