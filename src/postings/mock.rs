// src/postings/mock.rs
//! Synthetic posting source for development and tests. Real acquisition
//! happens outside this crate and drops documents into the same directory.

use super::JobPosting;
use crate::core::FsOps;
use crate::error::PipelineResult;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_ROLES: [&str; 5] = [
    "Data Engineer",
    "Data Scientist",
    "Backend Engineer",
    "Frontend Engineer",
    "DevOps Engineer",
];

/// Posting dates count back from this day so a seed fixes the whole document.
const BASE_POSTED_DATE: (i32, u32, u32) = (2024, 6, 1);

const SENIORITY_LEVELS: [&str; 5] = ["Junior", "Mid-Level", "Senior", "Lead", "Principal"];
const LOCATIONS: [&str; 5] = [
    "Remote",
    "New York, NY",
    "San Francisco, CA",
    "Bangalore, IN",
    "London, UK",
];

fn skills_pool(role: &str) -> &'static [&'static str] {
    match role {
        "Data Engineer" => &["Python", "SQL", "Spark", "AWS", "Airflow", "Kafka", "ETL", "BigQuery"],
        "Data Scientist" => &[
            "Python", "Pandas", "Scikit-learn", "TensorFlow", "PyTorch", "Statistics", "SQL",
        ],
        "Backend Engineer" => &[
            "Java", "Spring Boot", "Python", "Django", "PostgreSQL", "Docker", "Kubernetes", "Redis",
        ],
        "Frontend Engineer" => &["JavaScript", "React", "TypeScript", "CSS", "HTML", "Redux", "Webpack"],
        "DevOps Engineer" => &[
            "Linux", "Bash", "AWS", "Terraform", "Docker", "Kubernetes", "CI/CD", "Jenkins",
        ],
        _ => &["General Skills"],
    }
}

fn posted_date(age_days: i64) -> Option<String> {
    let (year, month, day) = BASE_POSTED_DATE;
    NaiveDate::from_ymd_opt(year, month, day).map(|base| (base - Duration::days(age_days)).to_string())
}

pub struct MockPostingSource {
    rng: StdRng,
}

impl MockPostingSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self, roles: &[&str], count_per_role: usize) -> Vec<JobPosting> {
        info!("Generating {} mock postings for roles: {:?}", count_per_role, roles);
        let mut postings = Vec::with_capacity(roles.len() * count_per_role);

        for role in roles {
            let skills = skills_pool(role);
            for i in 0..count_per_role {
                postings.push(self.posting(role, skills, i));
            }
        }

        postings
    }

    /// Generate postings and write one JSON document per posting into `dir`.
    pub fn write_to_dir(
        &mut self,
        dir: &Path,
        roles: &[&str],
        count_per_role: usize,
    ) -> PipelineResult<Vec<PathBuf>> {
        FsOps::ensure_dir_exists(dir)?;
        let postings = self.generate(roles, count_per_role);

        let mut written = Vec::with_capacity(postings.len());
        for posting in &postings {
            let path = dir.join(format!("{}.json", posting.id));
            FsOps::write_json(&path, posting)?;
            written.push(path);
        }

        info!("Mock generation completed. Total postings written: {}", written.len());
        Ok(written)
    }

    fn posting(&mut self, role: &str, skills: &[&str], index: usize) -> JobPosting {
        let id = format!("mock_{}_{:04}", role.replace(' ', "_"), index);
        let seniority = SENIORITY_LEVELS.choose(&mut self.rng).copied().unwrap_or("Senior");
        let location = LOCATIONS.choose(&mut self.rng).copied().unwrap_or("Remote");
        let company = format!("MockCompany_{}", self.rng.gen_range(1..=100));
        let age_days: i64 = self.rng.gen_range(0..=30);

        JobPosting {
            company: Some(company),
            location: Some(location.to_string()),
            posted_date: posted_date(age_days),
            source: Some("mock_generator".to_string()),
            url: Some(format!("https://example.com/jobs/{id}")),
            ..JobPosting::new(
                &id,
                &format!("{seniority} {role}"),
                &self.description(role, skills),
            )
        }
    }

    fn description(&mut self, role: &str, skills: &[&str]) -> String {
        let required = self.sample(skills, 3);
        let bonus = self.sample(skills, 2);
        format!(
            "We are looking for a {role} to join our team.\n\n\
             Responsibilities:\n\
             - Design and implement scalable solutions.\n\
             - Collaborate with cross-functional teams.\n\
             - Maintain and improve existing codebases.\n\n\
             Requirements:\n\
             - Proficiency in {}.\n\
             - Experience with {} is a plus.\n\
             - Strong problem-solving skills.\n\
             - Bachelor's degree in Computer Science or related field.\n",
            required.join(", "),
            bonus.join(", ")
        )
    }

    fn sample(&mut self, skills: &[&str], k: usize) -> Vec<String> {
        skills
            .choose_multiple(&mut self.rng, k.min(skills.len()))
            .map(|s| s.to_string())
            .collect()
    }
}
