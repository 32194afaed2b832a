// src/profiles/generator.rs
use super::Profile;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

const SKILLS_POOL: [&str; 9] = [
    "python", "java", "sql", "react", "aws", "docker", "pandas", "pytorch", "node.js",
];
const INTERESTS_POOL: [&str; 4] = ["Data Science", "Web Development", "DevOps", "Cloud Computing"];

/// Synthetic profiles for bootstrapping when no real profile data exists.
/// Same seed, same profiles.
pub struct ProfileGenerator {
    rng: StdRng,
}

impl ProfileGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self, count: usize) -> Vec<Profile> {
        info!("Generating {} synthetic profiles", count);
        (0..count).map(|i| self.profile(i)).collect()
    }

    fn profile(&mut self, index: usize) -> Profile {
        let score = (self.rng.gen_range(6.0..=10.0_f64) * 100.0).round() / 100.0;
        let skill_count = self.rng.gen_range(2..=6);
        let interest_count = self.rng.gen_range(1..=2);

        Profile {
            interests: INTERESTS_POOL
                .choose_multiple(&mut self.rng, interest_count)
                .map(|s| s.to_string())
                .collect(),
            experience_count: self.rng.gen_range(0..=2),
            ..Profile::new(
                &format!("profile_{index}"),
                score,
                SKILLS_POOL
                    .choose_multiple(&mut self.rng, skill_count)
                    .map(|s| s.to_string()),
            )
        }
    }
}

/// Convenience wrapper: `count` profiles from `seed`.
pub fn generate(count: usize, seed: u64) -> Vec<Profile> {
    ProfileGenerator::new(seed).generate(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_count_and_ids() {
        let profiles = generate(10, 1);
        assert_eq!(profiles.len(), 10);
        assert_eq!(profiles[0].id, "profile_0");
        assert_eq!(profiles[9].id, "profile_9");
    }

    #[test]
    fn test_same_seed_same_profiles() {
        assert_eq!(generate(25, 42), generate(25, 42));
    }

    #[test]
    fn test_attributes_stay_in_range() {
        for profile in generate(200, 7) {
            assert!((6.0..=10.0).contains(&profile.score));
            assert!((2..=6).contains(&profile.skills.len()));
            assert!((1..=2).contains(&profile.interests.len()));
            assert!(profile.experience_count <= 2);
            assert!(profile.skills.iter().all(|s| SKILLS_POOL.contains(&s.as_str())));
            assert!(profile.target_role.is_none());
        }
    }
}
