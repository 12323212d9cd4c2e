//! Config files drive data location, shortlist size and weights.

use std::fs;

use talent_ranker::{Pipeline, PipelineError, RankerConfig, Role, Source};

const GITHUB_CSV: &str = "\
username,public_repos,total_stars,total_forks,commits_12m,has_cicd,dominant_language
ana,1,0,0,900,0,Rust
ben,30,0,0,10,0,Go
cid,2,0,0,20,0,C
";

#[test]
fn toml_config_redirects_files_and_weights() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("gh.csv"), GITHUB_CSV).unwrap();

    let cfg_path = tmp.path().join("ranker.toml");
    fs::write(
        &cfg_path,
        format!(
            r#"
data_dir = "{}"
top_k = 1

[files]
github = "gh.csv"

[weights.github.developer]
public_repos = 1.0
"#,
            data.display()
        ),
    )
    .unwrap();

    let cfg = RankerConfig::load_from(&cfg_path).unwrap();
    let p = Pipeline::from_config(&cfg).unwrap();
    let report = p.run_source(Source::GitHub);
    let rankings = report.rankings().unwrap();
    let dev = &rankings[0];
    assert_eq!(dev.role, Role::Developer);
    // repos-only formula puts ben first; the default would pick ana
    assert_eq!(dev.entries.len(), 1);
    assert_eq!(dev.entries[0].identity, "ben");

    let default = Pipeline::default().with_data_dir(&data);
    let table = p.load(Source::GitHub).unwrap();
    assert_eq!(
        default.run_table(Source::GitHub, &table).unwrap()[0].entries[0].identity,
        "ana"
    );
}

#[test]
fn invalid_weights_reject_the_config() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("ranker.json");
    fs::write(
        &cfg_path,
        r#"{"weights": {"kaggle": {"architect": {"files": 0.5, "usability": 0.6}}}}"#,
    )
    .unwrap();
    let cfg = RankerConfig::load_from(&cfg_path).unwrap();
    let err = Pipeline::from_config(&cfg).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidWeights {
            platform: Source::Kaggle,
            role: Role::SolutionArchitect,
            ..
        }
    ));
}

#[serial_test::serial]
#[test]
fn env_top_k_applies_over_file() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg_path = tmp.path().join("ranker.toml");
    fs::write(&cfg_path, "top_k = 1").unwrap();

    std::env::set_var("RANKER_TOP_K", "2");
    let cfg = RankerConfig::resolve(Some(&cfg_path));
    std::env::remove_var("RANKER_TOP_K");
    assert_eq!(cfg.unwrap().top_k, 2);
}
