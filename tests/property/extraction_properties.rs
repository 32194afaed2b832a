use proptest::prelude::*;
use role_mapper::association::RoleSkillAssociator;
use role_mapper::features::MultiHotEncoder;
use role_mapper::postings::JobPosting;
use role_mapper::skills::{SkillExtractor, SkillVocabulary};
use std::collections::BTreeSet;

fn canonical_skills() -> Vec<String> {
    SkillVocabulary::builtin().skills().cloned().collect()
}

fn title() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Senior Data Engineer",
        "Data Scientist",
        "Backend Developer",
        "Frontend Engineer",
        "DevOps Lead",
        "Office Manager",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #[test]
    fn extract_is_deterministic(text in ".{0,200}") {
        let extractor = SkillExtractor::builtin().unwrap();
        prop_assert_eq!(extractor.extract(&text), extractor.extract(&text));
    }

    #[test]
    fn extracted_skills_are_canonical(text in "[a-zA-Z+#. ,]{0,200}") {
        let extractor = SkillExtractor::builtin().unwrap();
        let vocabulary = SkillVocabulary::builtin();
        for skill in extractor.extract(&text) {
            prop_assert!(vocabulary.contains(&skill), "{} is not canonical", skill);
        }
    }

    #[test]
    fn standalone_terms_are_found(
        skill in prop::sample::select(canonical_skills()),
        before in "[a-z]{0,8}",
        after in "[a-z]{0,8}",
    ) {
        let extractor = SkillExtractor::builtin().unwrap();
        let text = format!("{} {} {}", before, skill.to_uppercase(), after);
        prop_assert!(extractor.extract(&text).contains(&skill), "{} not found in {:?}", skill, text);
    }

    #[test]
    fn embedded_terms_are_not_found(prefix in "[a-z]{1,6}", suffix in "[a-z]{1,6}") {
        let extractor = SkillExtractor::builtin().unwrap();
        let java = "java".to_string();
        let prefixed = format!("{prefix}java");
        let suffixed = format!("java{suffix}");
        prop_assert!(!extractor.extract(&prefixed).contains(&java));
        prop_assert!(!extractor.extract(&suffixed).contains(&java));
    }

    #[test]
    fn association_probabilities_are_bounded(
        postings in prop::collection::vec(
            (title(), prop::collection::btree_set(prop::sample::select(canonical_skills()), 0..6)),
            0..25,
        )
    ) {
        let postings: Vec<JobPosting> = postings
            .into_iter()
            .enumerate()
            .map(|(i, (title, skills))| JobPosting {
                extracted_skills: skills,
                ..JobPosting::new(&i.to_string(), &title, "")
            })
            .collect();

        let table = RoleSkillAssociator::default().build(&postings);
        let observed: BTreeSet<&str> = postings
            .iter()
            .flat_map(|p| p.extracted_skills.iter().map(String::as_str))
            .collect();
        prop_assert_eq!(table.skills(), observed.into_iter().collect::<Vec<_>>());
        prop_assert_eq!(table.rows().len(), table.roles().len() * table.skills().len());

        for row in table.rows() {
            prop_assert!((0.0..=1.0).contains(&row.conditional_probability));
            if row.count == 0 {
                prop_assert_eq!(row.conditional_probability, 0.0);
            }
        }
    }

    #[test]
    fn encoding_has_fixed_length(query in prop::collection::btree_set("[a-z]{1,8}", 0..10)) {
        let training: Vec<BTreeSet<String>> = vec![
            ["python", "sql"].iter().map(|s| s.to_string()).collect(),
            ["react", "css", "html"].iter().map(|s| s.to_string()).collect(),
        ];
        let encoder = MultiHotEncoder::fit(&training);
        let vector = encoder.transform(&query);
        prop_assert_eq!(vector.len(), 5);
        prop_assert!(vector.iter().all(|v| *v == 0.0 || *v == 1.0));
    }
}
