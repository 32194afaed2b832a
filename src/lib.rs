//! Skill extraction, role association and role prediction from job postings
//! and candidate profiles.

pub mod association;
pub mod classifier;
pub mod cli;
pub mod clustering;
pub mod core;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod postings;
pub mod profiles;
pub mod recommend;
pub mod skills;
pub mod web;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::Pipeline;
pub use recommend::{Recommendation, Recommender};
pub use web::start_web_server;
