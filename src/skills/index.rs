// src/skills/index.rs
use super::vocabulary::Skill;
use crate::postings::JobPosting;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-skill posting frequency and the ids of the postings mentioning it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillIndex {
    pub counts: BTreeMap<Skill, usize>,
    pub mapping: BTreeMap<Skill, Vec<String>>,
}

impl SkillIndex {
    pub fn build(postings: &[JobPosting]) -> Self {
        let mut index = Self::default();
        for posting in postings {
            for skill in &posting.extracted_skills {
                *index.counts.entry(skill.clone()).or_insert(0) += 1;
                index
                    .mapping
                    .entry(skill.clone())
                    .or_default()
                    .push(posting.id.clone());
            }
        }
        index
    }

    /// Skills ordered by descending frequency, then name.
    pub fn most_common(&self, n: usize) -> Vec<(&Skill, usize)> {
        let mut ranked: Vec<_> = self.counts.iter().map(|(s, c)| (s, *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(n);
        ranked
    }
}
