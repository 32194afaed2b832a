// src/core/config_manager.rs
//! Pipeline configuration loaded from `config.yaml`

use crate::core::FsOps;
use crate::error::PipelineResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub raw_postings_dir: PathBuf,
    pub parsed_postings_path: PathBuf,
    pub skills_dir: PathBuf,
    pub models_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_postings_dir: PathBuf::from("data/jobs/raw"),
            parsed_postings_path: PathBuf::from("data/jobs/parsed/jobs.json"),
            skills_dir: PathBuf::from("data/skills"),
            models_dir: PathBuf::from("models"),
            reports_dir: PathBuf::from("reports"),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl PathsConfig {
    pub fn skill_index_path(&self) -> PathBuf {
        self.skills_dir.join("skill_dict.json")
    }

    pub fn tfidf_path(&self) -> PathBuf {
        self.skills_dir.join("job_tfidf.json")
    }

    pub fn association_table_path(&self) -> PathBuf {
        self.models_dir.join("role_skill_matrix.csv")
    }

    pub fn examples_by_role_path(&self) -> PathBuf {
        self.data_dir.join("examples_by_role.json")
    }

    pub fn cluster_model_path(&self) -> PathBuf {
        self.models_dir.join("kmeans_cluster_model.json")
    }

    pub fn classifier_model_path(&self) -> PathBuf {
        self.models_dir.join("best_model.json")
    }

    pub fn metrics_report_path(&self) -> PathBuf {
        self.reports_dir.join("metrics.json")
    }

    pub fn cluster_report_path(&self) -> PathBuf {
        self.reports_dir.join("cluster_analysis.md")
    }

    fn resolve(self, base: &Path) -> Self {
        Self {
            raw_postings_dir: FsOps::normalize_path(base, &self.raw_postings_dir),
            parsed_postings_path: FsOps::normalize_path(base, &self.parsed_postings_path),
            skills_dir: FsOps::normalize_path(base, &self.skills_dir),
            models_dir: FsOps::normalize_path(base, &self.models_dir),
            reports_dir: FsOps::normalize_path(base, &self.reports_dir),
            data_dir: FsOps::normalize_path(base, &self.data_dir),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub profile_count: usize,
    pub seed: u64,
    pub clusters: usize,
    pub cluster_restarts: usize,
    pub test_fraction: f64,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            profile_count: 500,
            seed: 42,
            clusters: 4,
            cluster_restarts: 10,
            test_fraction: 0.2,
            n_estimators: 100,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub top_k: usize,
    pub gap_top_n: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            gap_top_n: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

/// Additions on top of the built-in skill vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub extra_skills: Vec<String>,
    pub extra_aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub training: TrainingConfig,
    pub inference: InferenceConfig,
    pub server: ServerConfig,
    pub vocabulary: VocabularyConfig,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: PipelineConfig,
    #[serde(default)]
    production: PipelineConfig,
}

pub struct ConfigManager;

impl ConfigManager {
    /// Load the section of `path` matching the current environment, or the
    /// built-in defaults when the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<PipelineConfig> {
        let environment = Self::get_environment();
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let base_dir = std::env::current_dir().context("Failed to get current directory")?;

        let config = if config_path.exists() {
            info!(
                "Loading configuration for environment '{}' from {}",
                environment,
                config_path.display()
            );
            Self::load_from_file(&config_path, &environment)?
        } else if path.is_some() {
            anyhow::bail!("Config file not found: {}", config_path.display());
        } else {
            info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
            PipelineConfig::default()
        };

        Ok(PipelineConfig {
            paths: config.paths.resolve(&base_dir),
            ..config
        })
    }

    fn get_environment() -> String {
        std::env::var("ROLE_MAPPER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_from_file(config_path: &Path, environment: &str) -> Result<PipelineConfig> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::parse(&content, environment)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn parse(content: &str, environment: &str) -> PipelineResult<PipelineConfig> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    /// Create every output directory the pipeline writes into.
    pub fn ensure_directories(config: &PipelineConfig) -> PipelineResult<()> {
        let paths = &config.paths;
        FsOps::ensure_dir_exists(&paths.raw_postings_dir)?;
        FsOps::ensure_dir_exists(&paths.skills_dir)?;
        FsOps::ensure_dir_exists(&paths.models_dir)?;
        FsOps::ensure_dir_exists(&paths.reports_dir)?;
        FsOps::ensure_dir_exists(&paths.data_dir)?;
        if let Some(parent) = paths.parsed_postings_path.parent() {
            FsOps::ensure_dir_exists(parent)?;
        }
        Ok(())
    }
}
