// src/pipeline.rs
//! Stage orchestration. Each stage reads its predecessor's artifact from
//! disk and writes its own, so stages can be run one at a time.

use crate::association::{AssociationTable, RoleSkillAssociator};
use crate::classifier::{ClassificationReport, RoleClassifier, TrainOptions};
use crate::clustering::{ClusterReport, ProfileClusterer};
use crate::core::{ConfigManager, FsOps, PipelineConfig};
use crate::postings::mock::DEFAULT_ROLES;
use crate::postings::{JobPosting, MockPostingSource, PostingLoader, TfidfVectorizer};
use crate::profiles::{self, labeler, LabelSource, Profile, ProfileGenerator};
use crate::skills::{SkillExtractor, SkillIndex, SkillVocabulary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Posting ids kept per role in `examples_by_role.json`.
const EXAMPLES_PER_ROLE: usize = 5;

/// Vocabulary cap of the posting TF-IDF matrix.
const TFIDF_MAX_FEATURES: usize = 1000;

/// Contents of `metrics.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    pub generated_at: DateTime<Utc>,
    pub label_source: LabelSource,
    pub train_size: usize,
    pub test_size: usize,
    pub classes: Vec<String>,
    pub report: ClassificationReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub postings: usize,
    pub skipped: usize,
    pub distinct_skills: usize,
    pub tfidf_terms: usize,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub extract: ExtractSummary,
    pub association_rows: usize,
    pub clusters: ClusterReport,
    pub metrics: MetricsReport,
}

pub struct Pipeline {
    config: PipelineConfig,
    vocabulary: SkillVocabulary,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let vocabulary = SkillVocabulary::from_config(&config.vocabulary)
            .context("Failed to build skill vocabulary")?;
        Ok(Self { config, vocabulary })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Drop synthetic postings into the raw directory for local runs.
    pub fn mock_postings(&self, count_per_role: usize, seed: Option<u64>) -> Result<usize> {
        let seed = seed.unwrap_or(self.config.training.seed);
        let written = MockPostingSource::new(seed)
            .write_to_dir(&self.config.paths.raw_postings_dir, &DEFAULT_ROLES, count_per_role)
            .context("Failed to write mock postings")?;
        Ok(written.len())
    }

    /// Raw postings → `jobs.json`, `skill_dict.json` and `job_tfidf.json`.
    pub fn extract(&self) -> Result<ExtractSummary> {
        let paths = &self.config.paths;
        let extractor = SkillExtractor::new(self.vocabulary.clone())?;
        let corpus = PostingLoader::new(&extractor)
            .load_dir(&paths.raw_postings_dir)
            .with_context(|| format!("Failed to read postings from {}", paths.raw_postings_dir.display()))?;

        if corpus.postings.is_empty() {
            warn!(
                "No postings found in {}. Run `mock-postings` or add JSON files.",
                paths.raw_postings_dir.display()
            );
        }

        let index = SkillIndex::build(&corpus.postings);
        FsOps::write_json(&paths.parsed_postings_path, &corpus.postings)?;
        FsOps::write_json(&paths.skill_index_path(), &index)?;

        let tfidf = TfidfVectorizer::new(TFIDF_MAX_FEATURES).fit_transform(&corpus.postings);
        tfidf.save(&paths.tfidf_path())?;

        for (skill, count) in index.most_common(5) {
            info!("Top skill {}: {} postings", skill, count);
        }

        Ok(ExtractSummary {
            postings: corpus.postings.len(),
            skipped: corpus.skipped.len(),
            distinct_skills: index.counts.len(),
            tfidf_terms: tfidf.vocabulary.len(),
        })
    }

    /// `jobs.json` → `role_skill_matrix.csv` and `examples_by_role.json`.
    pub fn associate(&self) -> Result<AssociationTable> {
        let paths = &self.config.paths;
        let postings: Vec<JobPosting> =
            FsOps::read_artifact(&paths.parsed_postings_path, "parsed postings", "extract")?;

        let associator = RoleSkillAssociator::default();
        let table = associator.build(&postings);
        table.write_csv(&paths.association_table_path())?;

        let examples = associator.examples_by_role(&postings, EXAMPLES_PER_ROLE);
        FsOps::write_json(&paths.examples_by_role_path(), &examples)?;

        info!("Association table: {} rows over {} roles", table.rows().len(), table.roles().len());
        Ok(table)
    }

    fn profiles(&self, profiles_path: Option<&Path>) -> Result<Vec<Profile>> {
        match profiles_path {
            Some(path) => profiles::load_profiles(path, &self.vocabulary)
                .with_context(|| format!("Failed to load profiles from {}", path.display())),
            None => {
                let training = &self.config.training;
                Ok(ProfileGenerator::new(training.seed).generate(training.profile_count))
            }
        }
    }

    /// Profiles → `kmeans_cluster_model.json` and `cluster_analysis.md`.
    pub fn cluster(&self, profiles_path: Option<&Path>) -> Result<ClusterReport> {
        let training = &self.config.training;
        let profiles = self.profiles(profiles_path)?;

        let fit = ProfileClusterer::new(training.clusters, training.cluster_restarts, training.seed)
            .fit(&profiles)
            .context("Clustering failed")?;

        fit.model.save(&self.config.paths.cluster_model_path())?;
        fit.report.save_markdown(&self.config.paths.cluster_report_path())?;
        Ok(fit.report)
    }

    /// Profiles + association table → `best_model.json` and `metrics.json`.
    /// Without an association table the profiles are labeled at random and
    /// the metrics say so.
    pub fn train(&self, profiles_path: Option<&Path>) -> Result<MetricsReport> {
        let paths = &self.config.paths;
        let training = &self.config.training;
        let profiles = self.profiles(profiles_path)?;

        let labeled = labeler::label_or_degrade(
            AssociationTable::read_csv(&paths.association_table_path()),
            profiles,
            &DEFAULT_ROLES,
            training.seed,
        )?;

        let outcome = RoleClassifier::new(TrainOptions {
            test_fraction: training.test_fraction,
            n_estimators: training.n_estimators,
            max_depth: training.max_depth,
            seed: training.seed,
        })
        .train(&labeled.profiles)
        .context("Classifier training failed")?;

        info!("Classification report:\n{}", outcome.report.to_table());
        outcome.model.save(&paths.classifier_model_path())?;

        let metrics = MetricsReport {
            generated_at: Utc::now(),
            label_source: labeled.source,
            train_size: outcome.train_size,
            test_size: outcome.test_size,
            classes: outcome.model.classes.clone(),
            report: outcome.report,
        };
        FsOps::write_json(&paths.metrics_report_path(), &metrics)?;
        Ok(metrics)
    }

    /// Every stage in order.
    pub fn run(&self, profiles_path: Option<&Path>) -> Result<RunSummary> {
        ConfigManager::ensure_directories(&self.config)?;

        info!("Stage 1/4: extract");
        let extract = self.extract()?;
        info!("Stage 2/4: associate");
        let table = self.associate()?;
        info!("Stage 3/4: cluster");
        let clusters = self.cluster(profiles_path)?;
        info!("Stage 4/4: train");
        let metrics = self.train(profiles_path)?;

        info!("Pipeline completed");
        Ok(RunSummary {
            extract,
            association_rows: table.rows().len(),
            clusters,
            metrics,
        })
    }
}
