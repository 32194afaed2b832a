// src/core/mod.rs
//! Configuration and file system services shared by the pipeline stages

pub mod config_manager;
pub mod fs_ops;

pub use config_manager::{ConfigManager, PipelineConfig};
pub use fs_ops::FsOps;
