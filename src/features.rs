// src/features.rs
//! Feature encoders fitted once and then frozen inside a model artifact

use crate::skills::Skill;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Fixed-length binary vector over a vocabulary learned at fit time.
///
/// Each model owns its own encoder; refitting one never changes another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "EncoderState", into = "EncoderState")]
pub struct MultiHotEncoder {
    classes: Vec<Skill>,
    positions: BTreeMap<Skill, usize>,
}

/// Persisted form: the ordered vocabulary. Positions are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct EncoderState {
    classes: Vec<Skill>,
}

impl From<EncoderState> for MultiHotEncoder {
    fn from(state: EncoderState) -> Self {
        Self::from_classes(state.classes)
    }
}

impl From<MultiHotEncoder> for EncoderState {
    fn from(encoder: MultiHotEncoder) -> Self {
        Self {
            classes: encoder.classes,
        }
    }
}

impl MultiHotEncoder {
    pub fn fit<'a, I>(skill_sets: I) -> Self
    where
        I: IntoIterator<Item = &'a BTreeSet<Skill>>,
    {
        let classes: BTreeSet<&Skill> = skill_sets.into_iter().flatten().collect();
        Self::from_classes(classes.into_iter().cloned().collect())
    }

    fn from_classes(classes: Vec<Skill>) -> Self {
        let positions = classes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self { classes, positions }
    }

    pub fn classes(&self) -> &[Skill] {
        &self.classes
    }

    pub fn dimension(&self) -> usize {
        self.classes.len()
    }

    /// Skills outside the fitted vocabulary are dropped.
    pub fn transform<'a, I>(&self, skills: I) -> Vec<f32>
    where
        I: IntoIterator<Item = &'a Skill>,
    {
        let mut vector = vec![0.0; self.classes.len()];
        let mut unseen = 0usize;
        for skill in skills {
            match self.positions.get(skill) {
                Some(&i) => vector[i] = 1.0,
                None => unseen += 1,
            }
        }
        if unseen > 0 {
            debug!("Ignored {} skills outside the encoder vocabulary", unseen);
        }
        vector
    }
}

/// Zero-mean, unit-variance scaling of one numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self {
            mean: 0.0,
            scale: 1.0,
        }
    }
}

impl StandardScaler {
    /// Population standard deviation; a constant attribute gets scale 1.
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        Self {
            mean,
            scale: if std > f64::EPSILON { std } else { 1.0 },
        }
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}
