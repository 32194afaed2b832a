// src/skills/extractor.rs
use super::vocabulary::{Skill, SkillVocabulary};
use crate::error::{PipelineError, PipelineResult};
use regex::Regex;
use std::collections::BTreeSet;
use tracing::debug;

/// A compiled vocabulary term and the canonical skill it reports.
#[derive(Debug, Clone)]
struct TermMatcher {
    pattern: Regex,
    canonical: Skill,
}

/// Keyword extractor over a [`SkillVocabulary`].
///
/// Matching is case-insensitive and whole-word: the character before a term
/// must be absent or neither a word character nor `.`, and the character
/// after it must be absent or a non-word character. A leading dot marks a
/// suffix such as the `js` in `node.js`, which is not a mention of its own.
#[derive(Debug, Clone)]
pub struct SkillExtractor {
    matchers: Vec<TermMatcher>,
}

impl SkillExtractor {
    pub fn new(vocabulary: SkillVocabulary) -> PipelineResult<Self> {
        let canonical = vocabulary.skills().map(|s| (s.clone(), s.clone()));
        let aliases = vocabulary
            .aliases()
            .map(|(alias, target)| (alias.clone(), target.clone()));

        let matchers = canonical
            .chain(aliases)
            .map(|(term, target)| {
                let pattern = format!(r"(?:^|[^\w.]){}(?:$|\W)", regex::escape(&term));
                Regex::new(&pattern)
                    .map(|pattern| TermMatcher {
                        pattern,
                        canonical: target,
                    })
                    .map_err(|e| PipelineError::InvalidVocabulary(format!("{term}: {e}")))
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        Ok(Self { matchers })
    }

    pub fn builtin() -> PipelineResult<Self> {
        Self::new(SkillVocabulary::builtin())
    }

    /// Canonical skills mentioned in `text`. Never fails; text without any
    /// vocabulary term yields an empty set.
    pub fn extract(&self, text: &str) -> BTreeSet<Skill> {
        let text_lower = text.to_lowercase();

        let found: BTreeSet<Skill> = self
            .matchers
            .iter()
            .filter(|m| m.pattern.is_match(&text_lower))
            .map(|m| m.canonical.clone())
            .collect();

        debug!("Extracted {} skills from {} chars", found.len(), text.len());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SkillExtractor {
        SkillExtractor::builtin().unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<Skill> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extracts_basic_skills() {
        let skills = extractor().extract("We need a Python developer with SQL and AWS experience.");
        assert_eq!(skills, set(&["aws", "python", "sql"]));
    }

    #[test]
    fn test_java_is_not_found_inside_javascript() {
        let skills = extractor().extract("Frontend role: JavaScript and TypeScript only");
        assert!(skills.contains("javascript"));
        assert!(!skills.contains("java"));
    }

    #[test]
    fn test_java_standalone_is_found() {
        let skills = extractor().extract("Java, Spring Boot; some javascript.");
        assert!(skills.contains("java"));
        assert!(skills.contains("spring boot"));
        assert!(skills.contains("javascript"));
    }

    #[test]
    fn test_aliases_are_reported_as_canonical() {
        let skills = extractor().extract("Strong ML background, py scripting, ReactJS");
        assert_eq!(skills, set(&["machine learning", "python", "react"]));
        assert!(!skills.contains("ml"));
        assert!(!skills.contains("py"));
    }

    #[test]
    fn test_punctuated_terms() {
        let skills = extractor().extract("C++ and C# engineers; Node.js services.");
        assert!(skills.contains("c++"));
        assert!(skills.contains("c#"));
        assert!(skills.contains("node.js"));
        assert!(!skills.contains("javascript"));
    }

    #[test]
    fn test_multi_word_terms() {
        let skills = extractor().extract("Machine Learning and big data pipelines (ETL)");
        assert_eq!(skills, set(&["big data", "etl", "machine learning"]));
    }

    #[test]
    fn test_unknown_text_is_empty() {
        assert!(extractor().extract("Cooking, gardening and pottery").is_empty());
        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let ex = extractor();
        let text = "Docker, Kubernetes, Terraform, Jenkins on Linux with Bash";
        assert_eq!(ex.extract(text), ex.extract(text));
    }
}
