// src/postings/mod.rs
//! Job postings: the raw corpus record, its extracted skills and its TF-IDF
//! representation

pub mod loader;
pub mod mock;
pub mod tfidf;

pub use loader::{PostingCorpus, PostingLoader};
pub use mock::MockPostingSource;
pub use tfidf::{TfidfMatrix, TfidfVectorizer};

use crate::skills::{Skill, SkillExtractor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub extracted_skills: BTreeSet<Skill>,
}

impl JobPosting {
    pub fn new(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            company: None,
            location: None,
            posted_date: None,
            source: None,
            url: None,
            extracted_skills: BTreeSet::new(),
        }
    }

    /// Title and description, the text skills are extracted from.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Replace `extracted_skills` with a fresh extraction. Running it twice
    /// leaves the posting unchanged.
    pub fn with_extracted_skills(mut self, extractor: &SkillExtractor) -> Self {
        self.extracted_skills = extractor.extract(&self.text());
        self
    }
}
