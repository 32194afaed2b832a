// src/profiles/labeler.rs
use super::Profile;
use crate::association::AssociationTable;
use crate::error::{PipelineError, PipelineResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Label for profiles whose skills carry no association weight for any role.
pub const FALLBACK_ROLE: &str = "Generalist";

/// Where a set of labels came from. Degraded labels are random and must not
/// be mistaken for association-backed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    Association,
    Degraded,
}

#[derive(Debug, Clone)]
pub struct LabelingOutcome {
    pub profiles: Vec<Profile>,
    pub source: LabelSource,
}

/// Assigns each profile the role whose skills it covers best.
pub struct ProfileLabeler<'a> {
    lookup: BTreeMap<&'a str, BTreeMap<&'a str, f64>>,
}

impl<'a> ProfileLabeler<'a> {
    pub fn new(table: &'a AssociationTable) -> Self {
        Self {
            lookup: table.skill_role_lookup(),
        }
    }

    /// Sum the conditional probabilities of the profile's skills per role and
    /// take the highest. Equal scores go to the lexicographically first role.
    pub fn target_role(&self, profile: &Profile) -> String {
        let mut scores: BTreeMap<&str, f64> = BTreeMap::new();
        for skill in &profile.skills {
            if let Some(roles) = self.lookup.get(skill.as_str()) {
                for (role, p) in roles {
                    *scores.entry(*role).or_insert(0.0) += *p;
                }
            }
        }

        let mut best: Option<(&str, f64)> = None;
        for (role, score) in scores {
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((role, score));
            }
        }

        best.map(|(role, _)| role.to_string())
            .unwrap_or_else(|| FALLBACK_ROLE.to_string())
    }

    pub fn label(&self, profiles: Vec<Profile>) -> Vec<Profile> {
        info!("Labeling {} profiles", profiles.len());
        profiles
            .into_iter()
            .map(|mut profile| {
                profile.target_role = Some(self.target_role(&profile));
                profile
            })
            .collect()
    }
}

/// Random role assignment for when no association table exists.
pub fn label_degraded(profiles: Vec<Profile>, roles: &[&str], seed: u64) -> Vec<Profile> {
    let mut rng = StdRng::seed_from_u64(seed);
    profiles
        .into_iter()
        .map(|mut profile| {
            let role = roles.choose(&mut rng).copied().unwrap_or(FALLBACK_ROLE);
            profile.target_role = Some(role.to_string());
            profile
        })
        .collect()
}

/// Label against `table`, or fall back to degraded labeling when the table
/// artifact is missing. Any other load failure is returned.
pub fn label_or_degrade(
    table: PipelineResult<AssociationTable>,
    profiles: Vec<Profile>,
    fallback_roles: &[&str],
    seed: u64,
) -> PipelineResult<LabelingOutcome> {
    match table {
        Ok(table) => Ok(LabelingOutcome {
            profiles: ProfileLabeler::new(&table).label(profiles),
            source: LabelSource::Association,
        }),
        Err(err @ PipelineError::MissingArtifact { .. }) => {
            warn!("{}. Using DEGRADED random labeling for bootstrapping.", err);
            Ok(LabelingOutcome {
                profiles: label_degraded(profiles, fallback_roles, seed),
                source: LabelSource::Degraded,
            })
        }
        Err(err) => Err(err),
    }
}
