// src/classifier/mod.rs
//! Supervised role classifier over multi-hot skill vectors.

pub mod forest;
pub mod metrics;

pub use forest::{ForestOptions, RandomForest};
pub use metrics::{AverageMetrics, ClassMetrics, ClassificationReport};

use crate::core::FsOps;
use crate::error::{PipelineError, PipelineResult};
use crate::features::MultiHotEncoder;
use crate::profiles::Profile;
use crate::skills::Skill;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub test_fraction: f64,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            n_estimators: 100,
            max_depth: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePrediction {
    pub role: String,
    pub confidence: f64,
}

/// Encoder, forest and the class labels indexed by the forest's outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierModel {
    pub encoder: MultiHotEncoder,
    pub forest: RandomForest,
    pub classes: Vec<String>,
}

impl ClassifierModel {
    /// Probability per class, in `classes` order. Always sums to 1.
    pub fn predict_proba(&self, skills: &BTreeSet<Skill>) -> Vec<f64> {
        self.forest.predict_proba(&self.encoder.transform(skills))
    }

    /// Top `k` roles by descending probability; equal probabilities keep
    /// class-label order.
    pub fn predict(&self, skills: &BTreeSet<Skill>, k: usize) -> Vec<RolePrediction> {
        rank(&self.classes, &self.predict_proba(skills), k)
    }

    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        FsOps::write_json(path, self)
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        FsOps::read_artifact(path, "classifier model", "train")
    }
}

fn rank(classes: &[String], probabilities: &[f64], k: usize) -> Vec<RolePrediction> {
    let mut ranked: Vec<(usize, f64)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(k)
        .map(|(i, confidence)| RolePrediction {
            role: classes[i].clone(),
            confidence,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: ClassifierModel,
    pub report: ClassificationReport,
    pub train_size: usize,
    pub test_size: usize,
}

pub struct RoleClassifier {
    options: TrainOptions,
}

impl RoleClassifier {
    pub fn new(options: TrainOptions) -> Self {
        Self { options }
    }

    /// Train on every profile that carries a `target_role`. The holdout is
    /// `ceil(n * test_fraction)` profiles after a seeded shuffle, capped so at
    /// least one profile is left to train on.
    pub fn train(&self, profiles: &[Profile]) -> PipelineResult<TrainingOutcome> {
        let labeled: Vec<(&Profile, &str)> = profiles
            .iter()
            .filter_map(|p| p.target_role.as_deref().map(|role| (p, role)))
            .collect();
        if labeled.is_empty() {
            return Err(PipelineError::EmptyTrainingSet);
        }
        if labeled.len() < profiles.len() {
            warn!(
                "Skipping {} profiles without a target role",
                profiles.len() - labeled.len()
            );
        }

        let classes: Vec<String> = labeled
            .iter()
            .map(|(_, role)| *role)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let encoder = MultiHotEncoder::fit(labeled.iter().map(|(p, _)| &p.skills));
        let rows: Vec<Vec<f32>> = labeled.iter().map(|(p, _)| encoder.transform(&p.skills)).collect();
        let labels: Vec<usize> = labeled
            .iter()
            .map(|(_, role)| classes.iter().position(|c| c == role).unwrap_or(0))
            .collect();

        let mut order: Vec<usize> = (0..labeled.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(self.options.seed));
        let test_size = ((labeled.len() as f64 * self.options.test_fraction).ceil() as usize)
            .min(labeled.len() - 1);
        let (test_idx, train_idx) = order.split_at(test_size);

        info!(
            "Training random forest: {} train / {} test profiles, {} classes, {} features",
            train_idx.len(),
            test_idx.len(),
            classes.len(),
            encoder.dimension()
        );

        let train_rows: Vec<Vec<f32>> = train_idx.iter().map(|&i| rows[i].clone()).collect();
        let train_labels: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();
        let forest = RandomForest::fit(
            &train_rows,
            &train_labels,
            classes.len(),
            &ForestOptions {
                n_estimators: self.options.n_estimators,
                max_depth: self.options.max_depth,
                seed: self.options.seed,
                ..ForestOptions::default()
            },
        );

        let evaluation = if test_idx.is_empty() {
            warn!("Holdout set is empty; evaluating on the training profiles");
            train_idx
        } else {
            test_idx
        };
        let truth: Vec<String> = evaluation.iter().map(|&i| classes[labels[i]].clone()).collect();
        let predicted: Vec<String> = evaluation
            .iter()
            .map(|&i| classes[forest.predict(&rows[i])].clone())
            .collect();
        let report = ClassificationReport::from_predictions(&truth, &predicted);
        info!("Holdout accuracy: {:.3}", report.accuracy);

        Ok(TrainingOutcome {
            model: ClassifierModel {
                encoder,
                forest,
                classes,
            },
            report,
            train_size: train_idx.len(),
            test_size,
        })
    }
}
