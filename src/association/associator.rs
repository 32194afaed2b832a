// src/association/associator.rs
use super::rules::RoleRules;
use super::table::{AssociationRow, AssociationTable};
use crate::postings::JobPosting;
use crate::skills::Skill;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct RoleBucket {
    postings: usize,
    skill_counts: BTreeMap<Skill, usize>,
}

/// Builds the role ↔ skill association table from extracted postings.
pub struct RoleSkillAssociator {
    rules: RoleRules,
}

impl Default for RoleSkillAssociator {
    fn default() -> Self {
        Self::new(RoleRules::default())
    }
}

impl RoleSkillAssociator {
    pub fn new(rules: RoleRules) -> Self {
        Self { rules }
    }

    /// Every rule role gets a bucket even without postings, so its rows exist
    /// with zero counts. The `Unknown` bucket exists only when some title
    /// matched no rule.
    pub fn build(&self, postings: &[JobPosting]) -> AssociationTable {
        let mut buckets: BTreeMap<String, RoleBucket> = self
            .rules
            .roles()
            .into_iter()
            .map(|role| (role.to_string(), RoleBucket::default()))
            .collect();
        let mut all_skills: BTreeSet<&Skill> = BTreeSet::new();

        for posting in postings {
            let role = self.rules.classify(&posting.title);
            let bucket = buckets.entry(role.to_string()).or_default();
            bucket.postings += 1;
            for skill in &posting.extracted_skills {
                *bucket.skill_counts.entry(skill.clone()).or_insert(0) += 1;
                all_skills.insert(skill);
            }
        }

        let mut rows = Vec::with_capacity(buckets.len() * all_skills.len());
        for (role, bucket) in &buckets {
            debug!("Role '{}': {} postings", role, bucket.postings);
            for skill in &all_skills {
                let count = bucket.skill_counts.get(*skill).copied().unwrap_or(0);
                let conditional_probability = if bucket.postings > 0 {
                    count as f64 / bucket.postings as f64
                } else {
                    0.0
                };
                rows.push(AssociationRow {
                    role: role.clone(),
                    skill: (*skill).clone(),
                    count,
                    role_postings: bucket.postings,
                    conditional_probability,
                });
            }
        }

        info!(
            "Built association table: {} roles x {} skills from {} postings",
            buckets.len(),
            all_skills.len(),
            postings.len()
        );
        AssociationTable::from_rows(rows)
    }

    /// Up to `limit` posting ids per role, in corpus order.
    pub fn examples_by_role(
        &self,
        postings: &[JobPosting],
        limit: usize,
    ) -> BTreeMap<String, Vec<String>> {
        let mut examples: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for posting in postings {
            let ids = examples
                .entry(self.rules.classify(&posting.title).to_string())
                .or_default();
            if ids.len() < limit {
                ids.push(posting.id.clone());
            }
        }
        examples
    }
}
