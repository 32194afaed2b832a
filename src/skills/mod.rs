// src/skills/mod.rs
//! Skill vocabulary, keyword extraction and the skill → posting index

pub mod extractor;
pub mod index;
pub mod vocabulary;

pub use extractor::SkillExtractor;
pub use index::SkillIndex;
pub use vocabulary::{Skill, SkillVocabulary};
