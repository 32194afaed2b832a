// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the analytical pipeline.
///
/// Per-record problems (`MalformedInput`) are reported and skipped by batch
/// callers; a `MissingArtifact` aborts the dependent stage unless that stage
/// has a degraded path.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing {artifact} at {}. Run the `{stage}` stage first.", path.display())]
    MissingArtifact {
        artifact: &'static str,
        path: PathBuf,
        stage: &'static str,
    },

    #[error("Malformed input {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },

    #[error("No profiles to fit a model on")]
    EmptyTrainingSet,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid skill vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    pub fn missing(artifact: &'static str, path: impl Into<PathBuf>, stage: &'static str) -> Self {
        PipelineError::MissingArtifact {
            artifact,
            path: path.into(),
            stage,
        }
    }

    pub fn is_missing_artifact(&self) -> bool {
        matches!(self, PipelineError::MissingArtifact { .. })
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_message_names_stage() {
        let err = PipelineError::missing("association table", "models/m.csv", "associate");
        let msg = err.to_string();
        assert!(msg.contains("models/m.csv"));
        assert!(msg.contains("`associate`"));
        assert!(err.is_missing_artifact());
    }

    #[test]
    fn test_other_errors_are_not_missing_artifacts() {
        assert!(!PipelineError::EmptyTrainingSet.is_missing_artifact());
    }
}
