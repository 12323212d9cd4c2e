//! Sources are independent: a missing or broken source is reported on its
//! own and never changes what the others produce.

use std::fs;

use talent_ranker::{Pipeline, Source, SourceOutcome};

const GITHUB_CSV: &str = "\
username,public_repos,total_stars,total_forks,commits_12m,has_cicd,dominant_language
zed,4,40,4,40,1,Rust
amy,4,40,4,40,1,Rust
kit,9,2,0,400,0,Go
";

const SO_CSV: &str = "\
display_name,reputation,total_answer_score_fetched,avg_score_per_answer,accepted_answer_ratio,top_tags
Jon,1200,50,2.5,0.8,\"sql-server,database\"
Ann,500,80,4.0,0.95,rust
";

fn fixture() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("github_candidates_1.csv"), GITHUB_CSV).unwrap();
    fs::write(tmp.path().join("stackoverflow_200.csv"), SO_CSV).unwrap();
    tmp
}

#[test]
fn missing_source_is_skipped_with_notice() {
    let tmp = fixture();
    let p = Pipeline::default().with_data_dir(tmp.path());

    assert!(p.load(Source::Kaggle).unwrap_err().is_missing_source());

    let all = p.run_all(&Source::ALL);
    let kaggle = all.get(Source::Kaggle).unwrap();
    assert_eq!(
        kaggle.outcome,
        SourceOutcome::Skipped {
            notice: "Error: 'kaggle-preprocessed.csv' not found. Skipping Kaggle analysis.".into()
        }
    );

    let without = p.run_all(&[Source::GitHub, Source::StackOverflow]);
    assert_eq!(all.get(Source::GitHub), without.get(Source::GitHub));
    assert_eq!(
        all.get(Source::StackOverflow),
        without.get(Source::StackOverflow)
    );
    assert!(all.render_text().contains("Skipping Kaggle analysis."));
}

#[test]
fn broken_source_fails_alone() {
    let tmp = fixture();
    // header lacks Medals and size
    fs::write(
        tmp.path().join("kaggle-preprocessed.csv"),
        "Dataset_name,Author_name,No_of_files,Upvotes,Usability\nA,kim,1,2,3\n",
    )
    .unwrap();
    let p = Pipeline::default().with_data_dir(tmp.path());
    let all = p.run_all(&Source::ALL);

    match &all.get(Source::Kaggle).unwrap().outcome {
        SourceOutcome::Failed { error } => assert!(error.contains("Medals"), "{error}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(all.get(Source::GitHub).unwrap().rankings().is_some());
    assert!(all.get(Source::StackOverflow).unwrap().rankings().is_some());
}

#[test]
fn non_numeric_cell_fails_the_source() {
    let tmp = fixture();
    fs::write(
        tmp.path().join("stackoverflow_200.csv"),
        "display_name,reputation,total_answer_score_fetched,avg_score_per_answer,accepted_answer_ratio,top_tags\nJon,lots,1,1,0.5,rust\n",
    )
    .unwrap();
    let p = Pipeline::default().with_data_dir(tmp.path());
    let report = p.run_source(Source::StackOverflow);
    assert!(matches!(report.outcome, SourceOutcome::Failed { .. }));
}

#[test]
fn repeated_runs_are_identical_including_ties() {
    let tmp = fixture();
    let p = Pipeline::default().with_data_dir(tmp.path());

    let first = p.run_all(&Source::ALL);
    let second = p.run_all(&Source::ALL);
    assert_eq!(
        serde_json::to_string(&first.sources).unwrap(),
        serde_json::to_string(&second.sources).unwrap()
    );

    // amy and zed tie on every column; identity order breaks the tie
    let gh = first.get(Source::GitHub).unwrap().rankings().unwrap();
    let senior: Vec<_> = gh[1].entries.iter().map(|e| e.identity.as_str()).collect();
    assert_eq!(senior, ["amy", "zed", "kit"]);
    assert_eq!(gh[1].entries[0].score, gh[1].entries[1].score);
}
