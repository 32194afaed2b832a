// src/association/table.rs
use crate::core::FsOps;
use crate::error::{PipelineError, PipelineResult};
use crate::skills::Skill;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

/// One (role, skill) cell of the association table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRow {
    pub role: String,
    pub skill: Skill,
    /// Postings of `role` mentioning `skill`.
    pub count: usize,
    /// Postings classified as `role`.
    pub role_postings: usize,
    /// `count / role_postings`, 0 when the role has no postings.
    pub conditional_probability: f64,
}

/// Role × skill co-occurrence table. Complete over its roles and skills: every
/// pair has a row, zero-count pairs included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationTable {
    rows: Vec<AssociationRow>,
}

impl AssociationTable {
    pub fn from_rows(mut rows: Vec<AssociationRow>) -> Self {
        rows.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.skill.cmp(&b.skill)));
        Self { rows }
    }

    pub fn rows(&self) -> &[AssociationRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Roles in lexicographic order.
    pub fn roles(&self) -> Vec<&str> {
        let roles: BTreeSet<&str> = self.rows.iter().map(|r| r.role.as_str()).collect();
        roles.into_iter().collect()
    }

    pub fn skills(&self) -> Vec<&str> {
        let skills: BTreeSet<&str> = self.rows.iter().map(|r| r.skill.as_str()).collect();
        skills.into_iter().collect()
    }

    pub fn probability(&self, role: &str, skill: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.role == role && r.skill == skill)
            .map(|r| r.conditional_probability)
    }

    /// skill → (role → probability), roles iterating in lexicographic order.
    pub fn skill_role_lookup(&self) -> BTreeMap<&str, BTreeMap<&str, f64>> {
        let mut lookup: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
        for row in &self.rows {
            lookup
                .entry(row.skill.as_str())
                .or_default()
                .insert(row.role.as_str(), row.conditional_probability);
        }
        lookup
    }

    /// The `n` skills most associated with `role`: probability descending,
    /// then count descending, then skill name.
    pub fn top_skills(&self, role: &str, n: usize) -> Vec<&AssociationRow> {
        let mut rows: Vec<&AssociationRow> = self.rows.iter().filter(|r| r.role == role).collect();
        rows.sort_by(|a, b| {
            b.conditional_probability
                .total_cmp(&a.conditional_probability)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a.skill.cmp(&b.skill))
        });
        rows.truncate(n);
        rows
    }

    pub fn to_csv_bytes(&self) -> PipelineResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| PipelineError::Io(e.into_error()))
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> PipelineResult<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<AssociationRow>, csv::Error>>()?;
        Ok(Self::from_rows(rows))
    }

    pub fn write_csv(&self, path: &Path) -> PipelineResult<()> {
        FsOps::write_atomic(path, &self.to_csv_bytes()?)?;
        info!("Saved role-skill table ({} rows) to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Load the table written by the `associate` stage.
    pub fn read_csv(path: &Path) -> PipelineResult<Self> {
        if !path.exists() {
            return Err(PipelineError::missing("role-skill association table", path, "associate"));
        }
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }
}
