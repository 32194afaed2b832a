// src/skills/vocabulary.rs
use crate::core::config_manager::VocabularyConfig;
use crate::error::{PipelineError, PipelineResult};
use std::collections::{BTreeMap, BTreeSet};

/// Canonical, lower-case, alias-resolved competency tag.
pub type Skill = String;

const CANONICAL_SKILLS: &[&str] = &[
    "python", "java", "c++", "c#", "javascript", "typescript", "react", "angular", "vue",
    "sql", "nosql", "mongodb", "postgresql", "mysql", "oracle",
    "aws", "azure", "gcp", "docker", "kubernetes", "jenkins", "terraform", "ansible",
    "machine learning", "deep learning", "tensorflow", "pytorch", "scikit-learn", "pandas", "numpy",
    "spark", "hadoop", "kafka", "airflow", "etl", "big data",
    "html", "css", "flask", "django", "spring boot", "node.js",
    "git", "linux", "bash", "agile", "scrum",
];

const ALIASES: &[(&str, &str)] = &[
    ("py", "python"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("reactjs", "react"),
    ("aws cloud", "aws"),
    ("ml", "machine learning"),
    ("dl", "deep learning"),
];

/// Canonical skill dictionary plus the alias table that folds variants onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillVocabulary {
    skills: BTreeSet<Skill>,
    aliases: BTreeMap<String, Skill>,
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SkillVocabulary {
    /// Build a vocabulary, rejecting aliases that shadow a canonical skill or
    /// point at a skill the dictionary does not contain.
    pub fn new<S, A>(skills: S, aliases: A) -> PipelineResult<Self>
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        A: IntoIterator<Item = (String, String)>,
    {
        let mut vocabulary = Self {
            skills: BTreeSet::new(),
            aliases: BTreeMap::new(),
        };
        for skill in skills {
            vocabulary.add_skill(skill.as_ref())?;
        }
        for (alias, canonical) in aliases {
            vocabulary.add_alias(&alias, &canonical)?;
        }
        Ok(vocabulary)
    }

    pub fn builtin() -> Self {
        Self {
            skills: CANONICAL_SKILLS.iter().map(|s| s.to_string()).collect(),
            aliases: ALIASES
                .iter()
                .map(|(a, c)| (a.to_string(), c.to_string()))
                .collect(),
        }
    }

    /// The built-in vocabulary extended with configured skills and aliases.
    pub fn from_config(config: &VocabularyConfig) -> PipelineResult<Self> {
        let mut vocabulary = Self::builtin();
        for skill in &config.extra_skills {
            vocabulary.add_skill(skill)?;
        }
        for (alias, canonical) in &config.extra_aliases {
            vocabulary.add_alias(alias, canonical)?;
        }
        Ok(vocabulary)
    }

    fn add_skill(&mut self, skill: &str) -> PipelineResult<()> {
        let skill = normalize_term(skill);
        if skill.is_empty() {
            return Err(PipelineError::InvalidVocabulary("empty skill".to_string()));
        }
        if self.aliases.contains_key(&skill) {
            return Err(PipelineError::InvalidVocabulary(format!(
                "'{skill}' is already an alias"
            )));
        }
        self.skills.insert(skill);
        Ok(())
    }

    fn add_alias(&mut self, alias: &str, canonical: &str) -> PipelineResult<()> {
        let alias = normalize_term(alias);
        let canonical = normalize_term(canonical);
        if alias.is_empty() {
            return Err(PipelineError::InvalidVocabulary("empty alias".to_string()));
        }
        if !self.skills.contains(&canonical) {
            return Err(PipelineError::InvalidVocabulary(format!(
                "alias '{alias}' targets unknown skill '{canonical}'"
            )));
        }
        if self.skills.contains(&alias) {
            return Err(PipelineError::InvalidVocabulary(format!(
                "alias '{alias}' shadows a canonical skill"
            )));
        }
        match self.aliases.get(&alias) {
            Some(existing) if existing != &canonical => Err(PipelineError::InvalidVocabulary(
                format!("alias '{alias}' already resolves to '{existing}'"),
            )),
            _ => {
                self.aliases.insert(alias, canonical);
                Ok(())
            }
        }
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&String, &Skill)> {
        self.aliases.iter()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    /// Resolve free-form input (any case, alias or canonical) to a canonical
    /// skill. Terms outside the vocabulary come back lower-cased and trimmed so
    /// callers can still compare them.
    pub fn normalize(&self, term: &str) -> Skill {
        let term = normalize_term(term);
        self.aliases.get(&term).cloned().unwrap_or(term)
    }

    /// Like [`normalize`](Self::normalize) but `None` for unknown terms.
    pub fn resolve(&self, term: &str) -> Option<Skill> {
        let skill = self.normalize(term);
        self.skills.contains(&skill).then_some(skill)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}
