// src/cli.rs
use crate::core::ConfigManager;
use crate::pipeline::Pipeline;
use crate::recommend::Recommender;
use crate::web::start_web_server;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "role-mapper")]
#[command(about = "Map skill sets to career roles and report the skill gap")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML config with `local` and `production` sections
    #[arg(long, global = true, env = "ROLE_MAPPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write JSON logs to this file (truncated on start)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write synthetic postings into the raw postings directory
    MockPostings {
        #[arg(long, default_value_t = 20)]
        count_per_role: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Extract skills from raw postings
    Extract,
    /// Build the role-skill association table
    Associate,
    /// Cluster profiles into cohorts
    Cluster {
        /// JSON array of profiles; synthetic profiles when omitted
        #[arg(long)]
        profiles: Option<PathBuf>,
    },
    /// Label profiles and train the role classifier
    Train {
        #[arg(long)]
        profiles: Option<PathBuf>,
    },
    /// Run extract, associate, cluster and train in order
    Run {
        #[arg(long)]
        profiles: Option<PathBuf>,
    },
    /// Predict roles for a skill set
    Predict {
        #[arg(long, value_delimiter = ',', required = true)]
        skills: Vec<String>,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Serve predictions over HTTP
    Serve {
        #[arg(long, env = "ROCKET_PORT")]
        port: Option<u16>,
    },
}

pub async fn handle_command(cli: Cli) -> Result<()> {
    let config = ConfigManager::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let recommender = Recommender::load(&config)
                .context("Failed to load prediction artifacts. Run the pipeline first.")?;
            start_web_server(recommender, port).await
        }
        Command::Predict { skills, top_k } => {
            let recommender = Recommender::load(&config)?;
            let recommendation = recommender.recommend(&skills, top_k);
            println!("{}", serde_json::to_string_pretty(&recommendation)?);
            Ok(())
        }
        command => {
            // Stages are CPU bound; keep them off the async runtime.
            tokio::task::spawn_blocking(move || run_stage(command, Pipeline::new(config)?))
                .await
                .context("Pipeline task panicked")?
        }
    }
}

fn run_stage(command: Command, pipeline: Pipeline) -> Result<()> {
    match command {
        Command::MockPostings {
            count_per_role,
            seed,
        } => {
            let written = pipeline.mock_postings(count_per_role, seed)?;
            info!("Wrote {} mock postings", written);
        }
        Command::Extract => {
            let summary = pipeline.extract()?;
            info!(
                "Extracted {} distinct skills and {} TF-IDF terms from {} postings ({} skipped)",
                summary.distinct_skills, summary.tfidf_terms, summary.postings, summary.skipped
            );
        }
        Command::Associate => {
            let table = pipeline.associate()?;
            info!("Association table has {} rows", table.rows().len());
        }
        Command::Cluster { profiles } => {
            let report = pipeline.cluster(profiles.as_deref())?;
            println!("{}", report.to_markdown());
        }
        Command::Train { profiles } => {
            let metrics = pipeline.train(profiles.as_deref())?;
            println!("{}", metrics.report.to_table());
        }
        Command::Run { profiles } => {
            let summary = pipeline.run(profiles.as_deref())?;
            info!(
                "Run finished: {} postings, {} association rows, accuracy {:.3} ({:?} labels)",
                summary.extract.postings,
                summary.association_rows,
                summary.metrics.report.accuracy,
                summary.metrics.label_source
            );
        }
        Command::Predict { .. } | Command::Serve { .. } => {}
    }
    Ok(())
}
