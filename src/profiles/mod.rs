// src/profiles/mod.rs
//! Candidate profiles: synthetic generation, loading and role labeling

pub mod generator;
pub mod labeler;

pub use generator::ProfileGenerator;
pub use labeler::{LabelSource, LabelingOutcome, ProfileLabeler, FALLBACK_ROLE};

use crate::core::FsOps;
use crate::error::PipelineResult;
use crate::skills::{Skill, SkillVocabulary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    /// Numeric attribute on a 0–10 scale.
    pub score: f64,
    pub skills: BTreeSet<Skill>,
    #[serde(default)]
    pub interests: BTreeSet<String>,
    #[serde(default)]
    pub experience_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
}

impl Profile {
    pub fn new<I, S>(id: &str, score: f64, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Skill>,
    {
        Self {
            id: id.to_string(),
            score,
            skills: skills.into_iter().map(Into::into).collect(),
            interests: BTreeSet::new(),
            experience_count: 0,
            target_role: None,
        }
    }
}

/// Load externally supplied profiles from a JSON array, folding every skill
/// onto its canonical form.
pub fn load_profiles(path: &Path, vocabulary: &SkillVocabulary) -> PipelineResult<Vec<Profile>> {
    let mut profiles: Vec<Profile> = FsOps::read_artifact(path, "profile file", "generate")?;
    for profile in &mut profiles {
        profile.skills = profile.skills.iter().map(|s| vocabulary.normalize(s)).collect();
    }
    info!("Loaded {} profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_profiles_normalizes_skills() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(
            &path,
            r#"[{"id": "p1", "score": 8.5, "skills": ["Py", "SQL", "Cobol"]}]"#,
        )
        .unwrap();

        let profiles = load_profiles(&path, &SkillVocabulary::builtin()).unwrap();
        assert_eq!(profiles.len(), 1);
        let skills: Vec<_> = profiles[0].skills.iter().map(String::as_str).collect();
        assert_eq!(skills, vec!["cobol", "python", "sql"]);
        assert_eq!(profiles[0].experience_count, 0);
        assert!(profiles[0].target_role.is_none());
    }
}
