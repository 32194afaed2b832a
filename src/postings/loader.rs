// src/postings/loader.rs
use super::JobPosting;
use crate::core::FsOps;
use crate::error::{PipelineError, PipelineResult};
use crate::skills::SkillExtractor;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Postings that parsed cleanly, plus the records that were skipped.
#[derive(Debug, Default)]
pub struct PostingCorpus {
    pub postings: Vec<JobPosting>,
    pub skipped: Vec<PipelineError>,
}

pub struct PostingLoader<'a> {
    extractor: &'a SkillExtractor,
}

impl<'a> PostingLoader<'a> {
    pub fn new(extractor: &'a SkillExtractor) -> Self {
        Self { extractor }
    }

    /// Load every `*.json` posting under `dir` in file-name order and extract
    /// its skills. A record that cannot be read or parsed is skipped; so is a
    /// record whose id was already seen.
    pub fn load_dir(&self, dir: &Path) -> PipelineResult<PostingCorpus> {
        let files = FsOps::list_json_files(dir)?;
        info!("Processing {} posting files from {}", files.len(), dir.display());

        let parsed: Vec<PipelineResult<JobPosting>> = files
            .par_iter()
            .map(|path| self.load_file(path))
            .collect();

        let mut corpus = PostingCorpus::default();
        let mut seen_ids = HashSet::new();

        for (path, result) in files.into_iter().zip(parsed) {
            match result {
                Ok(posting) if !seen_ids.insert(posting.id.clone()) => {
                    let err = malformed(&path, format!("duplicate posting id '{}'", posting.id));
                    warn!("Skipping posting: {}", err);
                    corpus.skipped.push(err);
                }
                Ok(posting) => corpus.postings.push(posting),
                Err(err) => {
                    warn!("Skipping posting: {}", err);
                    corpus.skipped.push(err);
                }
            }
        }

        info!(
            "Loaded {} postings ({} skipped)",
            corpus.postings.len(),
            corpus.skipped.len()
        );
        Ok(corpus)
    }

    fn load_file(&self, path: &Path) -> PipelineResult<JobPosting> {
        let content = fs::read_to_string(path).map_err(|e| malformed(path, e.to_string()))?;
        let posting: JobPosting =
            serde_json::from_str(&content).map_err(|e| malformed(path, e.to_string()))?;

        if posting.id.trim().is_empty() {
            return Err(malformed(path, "empty posting id".to_string()));
        }

        Ok(posting.with_extracted_skills(self.extractor))
    }
}

fn malformed(path: &Path, reason: String) -> PipelineError {
    PipelineError::MalformedInput {
        path: PathBuf::from(path),
        reason,
    }
}
