// src/recommend.rs
//! Inference: ranked roles for a skill set plus the skill gap for the top role.

use crate::association::AssociationTable;
use crate::classifier::{ClassifierModel, RolePrediction};
use crate::core::config_manager::InferenceConfig;
use crate::core::PipelineConfig;
use crate::error::PipelineResult;
use crate::skills::{Skill, SkillVocabulary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    /// Top skills of the role the query lacks, most important first.
    pub missing_skills: Vec<Skill>,
    pub matched_skills: Vec<Skill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub query_skills: Vec<Skill>,
    pub predictions: Vec<RolePrediction>,
    pub target_role: Option<String>,
    pub missing_skills: Vec<Skill>,
    pub matched_skills: Vec<Skill>,
}

/// Compare `query` against the `top_n` skills of `role`. Skills never seen in
/// the role's postings are not part of its profile.
pub fn skill_gap(table: &AssociationTable, role: &str, query: &BTreeSet<Skill>, top_n: usize) -> SkillGap {
    let mut gap = SkillGap::default();
    for row in table
        .top_skills(role, top_n)
        .into_iter()
        .filter(|r| r.conditional_probability > 0.0)
    {
        if query.contains(&row.skill) {
            gap.matched_skills.push(row.skill.clone());
        } else {
            gap.missing_skills.push(row.skill.clone());
        }
    }
    gap
}

pub struct Recommender {
    vocabulary: SkillVocabulary,
    model: ClassifierModel,
    table: AssociationTable,
    top_k: usize,
    gap_top_n: usize,
}

impl Recommender {
    pub fn new(
        vocabulary: SkillVocabulary,
        model: ClassifierModel,
        table: AssociationTable,
        inference: &InferenceConfig,
    ) -> Self {
        Self {
            vocabulary,
            model,
            table,
            top_k: inference.top_k,
            gap_top_n: inference.gap_top_n,
        }
    }

    /// Load the classifier and association table produced by earlier stages.
    pub fn load(config: &PipelineConfig) -> PipelineResult<Self> {
        let vocabulary = SkillVocabulary::from_config(&config.vocabulary)?;
        let model = ClassifierModel::load(&config.paths.classifier_model_path())?;
        let table = AssociationTable::read_csv(&config.paths.association_table_path())?;
        info!(
            "Recommender ready: {} roles, {} association rows",
            model.classes.len(),
            table.rows().len()
        );
        Ok(Self::new(vocabulary, model, table, &config.inference))
    }

    pub fn classes(&self) -> &[String] {
        &self.model.classes
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Lower-case, trim and resolve aliases; blank terms are dropped.
    pub fn normalize_query<S: AsRef<str>>(&self, skills: &[S]) -> BTreeSet<Skill> {
        skills
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(|s| self.vocabulary.normalize(s))
            .collect()
    }

    pub fn recommend<S: AsRef<str>>(&self, skills: &[S], k: Option<usize>) -> Recommendation {
        let query = self.normalize_query(skills);
        let predictions = self.model.predict(&query, k.unwrap_or(self.top_k));
        let target_role = predictions.first().map(|p| p.role.clone());

        let gap = target_role
            .as_deref()
            .map(|role| skill_gap(&self.table, role, &query, self.gap_top_n))
            .unwrap_or_default();
        debug!(
            "Query {:?} -> {:?}, {} missing skills",
            query,
            target_role,
            gap.missing_skills.len()
        );

        Recommendation {
            query_skills: query.into_iter().collect(),
            predictions,
            target_role,
            missing_skills: gap.missing_skills,
            matched_skills: gap.matched_skills,
        }
    }
}
