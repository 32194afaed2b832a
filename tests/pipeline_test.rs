use role_mapper::association::AssociationTable;
use role_mapper::core::config_manager::PathsConfig;
use role_mapper::core::PipelineConfig;
use role_mapper::postings::TfidfMatrix;
use role_mapper::profiles::{LabelSource, Profile, ProfileLabeler};
use role_mapper::skills::SkillIndex;
use role_mapper::{Pipeline, Recommender};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn config(dir: &TempDir) -> PipelineConfig {
    let root = dir.path();
    let mut config = PipelineConfig {
        paths: PathsConfig {
            raw_postings_dir: root.join("data/jobs/raw"),
            parsed_postings_path: root.join("data/jobs/parsed/jobs.json"),
            skills_dir: root.join("data/skills"),
            models_dir: root.join("models"),
            reports_dir: root.join("reports"),
            data_dir: root.join("data"),
        },
        ..PipelineConfig::default()
    };
    config.training.profile_count = 80;
    config.training.n_estimators = 15;
    config.training.cluster_restarts = 3;
    config
}

fn write_posting(dir: &Path, file: &str, body: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(file), body).unwrap();
}

#[test]
fn test_single_posting_end_to_end() {
    let dir = tempdir().unwrap();
    let config = config(&dir);
    write_posting(
        &config.paths.raw_postings_dir,
        "job_1.json",
        r#"{"id": "job_1", "title": "Senior Data Engineer", "description": "Requires Python, SQL, AWS"}"#,
    );

    let pipeline = Pipeline::new(config.clone()).unwrap();
    let summary = pipeline.extract().unwrap();
    assert_eq!(summary.postings, 1);

    let index: SkillIndex =
        serde_json::from_slice(&fs::read(config.paths.skill_index_path()).unwrap()).unwrap();
    let skills: Vec<_> = index.counts.keys().map(String::as_str).collect();
    assert_eq!(skills, vec!["aws", "python", "sql"]);
    assert_eq!(index.mapping["python"], vec!["job_1"]);

    let tfidf = TfidfMatrix::load(&config.paths.tfidf_path()).unwrap();
    assert_eq!(tfidf.job_ids, vec!["job_1"]);
    assert_eq!(summary.tfidf_terms, tfidf.vocabulary.len());
    assert!(tfidf.weight("job_1", "python").unwrap() > 0.0);
    assert_eq!(tfidf.weight("job_1", "requires").map(|w| w > 0.0), Some(true));

    let table = pipeline.associate().unwrap();
    assert_eq!(table.probability("Data Engineer", "python"), Some(1.0));
    assert_eq!(table.probability("Data Scientist", "python"), Some(0.0));

    let reloaded = AssociationTable::read_csv(&config.paths.association_table_path()).unwrap();
    assert_eq!(reloaded, table);

    let profile = Profile::new("p", 8.0, ["python", "sql"]);
    assert_eq!(ProfileLabeler::new(&table).target_role(&profile), "Data Engineer");
}

#[test]
fn test_malformed_posting_is_skipped() {
    let dir = tempdir().unwrap();
    let config = config(&dir);
    let raw = &config.paths.raw_postings_dir;
    write_posting(raw, "a.json", r#"{"id": "a", "title": "Backend Developer", "description": "Java and Docker"}"#);
    write_posting(raw, "b.json", "{ not json");
    write_posting(raw, "c.json", r#"{"id": "c", "title": "Frontend Developer", "description": "React, CSS"}"#);

    let summary = Pipeline::new(config).unwrap().extract().unwrap();
    assert_eq!(summary.postings, 2);
    assert_eq!(summary.skipped, 1);
}

#[test]
fn test_full_run_on_mock_postings_and_predict() {
    let dir = tempdir().unwrap();
    let config = config(&dir);
    let pipeline = Pipeline::new(config.clone()).unwrap();

    assert_eq!(pipeline.mock_postings(6, Some(3)).unwrap(), 30);
    let summary = pipeline.run(None).unwrap();

    assert_eq!(summary.extract.postings, 30);
    assert_eq!(summary.metrics.label_source, LabelSource::Association);
    assert_eq!(summary.clusters.clusters.len(), 4);
    assert_eq!(
        summary.clusters.clusters.iter().map(|c| c.size).sum::<usize>(),
        80
    );

    for path in [
        config.paths.skill_index_path(),
        config.paths.tfidf_path(),
        config.paths.association_table_path(),
        config.paths.examples_by_role_path(),
        config.paths.cluster_model_path(),
        config.paths.classifier_model_path(),
        config.paths.metrics_report_path(),
        config.paths.cluster_report_path(),
        config.paths.parsed_postings_path.clone(),
    ] {
        assert!(path.exists(), "missing {}", path.display());
    }

    let metrics: serde_json::Value =
        serde_json::from_slice(&fs::read(config.paths.metrics_report_path()).unwrap()).unwrap();
    assert_eq!(metrics["label_source"], "association");

    let recommender = Recommender::load(&config).unwrap();
    let result = recommender.recommend(&["python", "cobol"], Some(3));
    assert!(!result.predictions.is_empty());
    assert!(result.predictions.len() <= 3);
    let top = result.target_role.clone().unwrap();
    assert_eq!(result.predictions[0].role, top);
    assert!(!result.query_skills.contains(&"Python".to_string()));

    let unseen = recommender.recommend(&["cobol"], Some(usize::MAX));
    let total: f64 = unseen.predictions.iter().map(|p| p.confidence).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_predict_before_training_reports_missing_artifact() {
    let dir = tempdir().unwrap();
    let err = match Recommender::load(&config(&dir)) {
        Err(err) => err,
        Ok(_) => panic!("expected a missing artifact"),
    };
    assert!(err.is_missing_artifact());
    assert!(err.to_string().contains("`train`"));
}

#[test]
fn test_train_with_external_profiles() {
    let dir = tempdir().unwrap();
    let config = config(&dir);
    let profiles_path = dir.path().join("profiles.json");
    fs::write(
        &profiles_path,
        r#"[
            {"id": "a", "score": 7.5, "skills": ["Py", "SQL"]},
            {"id": "b", "score": 9.0, "skills": ["react", "JS"]},
            {"id": "c", "score": 6.0, "skills": ["docker", "kubernetes"]}
        ]"#,
    )
    .unwrap();

    let pipeline = Pipeline::new(config).unwrap();
    let metrics = pipeline.train(Some(&profiles_path)).unwrap();
    assert_eq!(metrics.label_source, LabelSource::Degraded);
    assert_eq!(metrics.train_size + metrics.test_size, 3);

    let report = pipeline.cluster(Some(&profiles_path)).unwrap();
    assert_eq!(report.clusters.iter().map(|c| c.size).sum::<usize>(), 3);
}
