// src/postings/tfidf.rs
//! TF-IDF representation of the posting corpus, written by the `extract`
//! stage next to the skill index.

use super::JobPosting;
use crate::core::FsOps;
use crate::error::PipelineResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

pub const DEFAULT_MAX_FEATURES: usize = 1000;

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "do", "done", "down", "due",
    "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "get", "give", "go", "had", "has", "have", "he", "hence",
    "her", "here", "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his",
    "how", "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just",
    "keep", "last", "latter", "least", "less", "made", "many", "may", "me", "meanwhile",
    "might", "more", "moreover", "most", "mostly", "much", "must", "my", "myself", "namely",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "several", "she", "should", "since", "so", "some", "somehow",
    "someone", "something", "sometime", "sometimes", "somewhere", "still", "such", "than",
    "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
    "thereby", "therefore", "therein", "thereupon", "these", "they", "this", "those", "though",
    "through", "throughout", "thru", "thus", "to", "together", "too", "toward", "towards",
    "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby",
    "wherein", "whereupon", "wherever", "whether", "which", "while", "who", "whoever", "whole",
    "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your",
    "yours", "yourself", "yourselves",
];

/// Lower-cased runs of at least two word characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
}

/// Sparse TF-IDF matrix with one L2-normalized row per posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfidfMatrix {
    /// Terms in lexicographic order; a term's position is its column.
    pub vocabulary: Vec<String>,
    pub idf: Vec<f64>,
    pub job_ids: Vec<String>,
    /// `(column, weight)` pairs in ascending column order.
    pub rows: Vec<Vec<(usize, f64)>>,
}

impl TfidfMatrix {
    /// Weight of `term` in the posting `job_id`. `None` when either is unknown.
    pub fn weight(&self, job_id: &str, term: &str) -> Option<f64> {
        let row = self.job_ids.iter().position(|id| id == job_id)?;
        let column = self.vocabulary.binary_search_by(|t| t.as_str().cmp(term)).ok()?;
        Some(
            self.rows[row]
                .iter()
                .find(|(c, _)| *c == column)
                .map_or(0.0, |(_, w)| *w),
        )
    }

    pub fn save(&self, path: &Path) -> PipelineResult<()> {
        FsOps::write_json(path, self)
    }

    pub fn load(path: &Path) -> PipelineResult<Self> {
        FsOps::read_artifact(path, "TF-IDF matrix", "extract")
    }
}

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: usize,
    stop_words: HashSet<&'static str>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEATURES)
    }
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    fn term_counts(&self, text: &str) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for token in tokenize(text).filter(|t| !self.stop_words.contains(t.as_str())) {
            *counts.entry(token).or_insert(0) += 1;
        }
        counts
    }

    /// Keeps the `max_features` terms most frequent across the corpus (ties by
    /// term), weights raw counts by smoothed idf `ln((1 + n) / (1 + df)) + 1`
    /// and normalizes each row to unit length.
    pub fn fit_transform(&self, postings: &[JobPosting]) -> TfidfMatrix {
        let counts: Vec<BTreeMap<String, usize>> =
            postings.iter().map(|p| self.term_counts(&p.text())).collect();

        let mut corpus_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for document in &counts {
            for (term, n) in document {
                *corpus_frequency.entry(term.as_str()).or_insert(0) += n;
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = corpus_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);
        let vocabulary: Vec<String> = ranked
            .into_iter()
            .map(|(term, _)| term)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let n = postings.len() as f64;
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|term| {
                let df = document_frequency.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let columns: BTreeMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();
        let rows: Vec<Vec<(usize, f64)>> = counts
            .iter()
            .map(|document| {
                let mut row: Vec<(usize, f64)> = document
                    .iter()
                    .filter_map(|(term, n)| {
                        columns.get(term.as_str()).map(|&c| (c, *n as f64 * idf[c]))
                    })
                    .collect();
                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|(_, w)| *w /= norm);
                }
                row
            })
            .collect();

        info!(
            "TF-IDF over {} postings with {} terms",
            postings.len(),
            vocabulary.len()
        );

        TfidfMatrix {
            job_ids: postings.iter().map(|p| p.id.clone()).collect(),
            vocabulary,
            idf,
            rows,
        }
    }
}
